//! Text views of programs and VM state, for diagnostics.

use std::fmt::Write;

use crate::compiler::Program;
use crate::vm::{Tape, Vm};

/// Instructions shown on each side of the current one in a state dump.
pub const CODE_WINDOW: usize = 10;
/// Tape cells shown on each side of the current one in a state dump.
pub const TAPE_WINDOW: usize = 20;

/// Renders instructions `start..=end` (clamped to the program), one per
/// line, marking the line whose address equals `current`.
pub fn disassemble(
    program: &Program,
    start: usize,
    end: usize,
    current: Option<usize>,
) -> String {
    let mut text = String::new();
    if program.is_empty() {
        return text;
    }

    let end = end.min(program.len() - 1);
    for addr in start..=end {
        let (inst, info) = match (program.get(addr), program.debug_info(addr)) {
            (Some(inst), Some(info)) => (inst, info),
            _ => break,
        };
        let marker = if current == Some(addr) { "=>" } else { "  " };
        let op = match inst.operand() {
            Some(operand) => format!("{} {}", info.mnemonic, operand),
            None => info.mnemonic.to_string(),
        };
        // writing to a String cannot fail
        let _ = writeln!(
            text,
            "{} {:>6}  {:<12} {}",
            marker,
            addr,
            op,
            info.source.escape_debug()
        );
    }
    text
}

pub fn disassemble_all(program: &Program) -> String {
    disassemble(program, 0, program.len(), None)
}

/// Renders cells within `radius` of `center`, the center cell in brackets.
pub fn tape_window(tape: &Tape, center: usize, radius: usize) -> String {
    if tape.is_empty() {
        return String::new();
    }

    let start = center.saturating_sub(radius);
    let end = center.saturating_add(radius).min(tape.len() - 1);
    let mut text = format!("{:>6}:", start);
    for addr in start..=end {
        if addr == center {
            let _ = write!(text, " [{}]", tape[addr]);
        } else {
            let _ = write!(text, " {}", tape[addr]);
        }
    }
    text
}

/// Final VM state: both pointers, the code around the instruction pointer
/// and the tape around the data pointer.
pub fn dump_state(vm: &Vm, program: &Program) -> String {
    let ip = vm.code_ptr();
    let dp = vm.data_ptr();
    let config = vm.config();
    format!(
        "Instruction pointer: {}\nData pointer: {}\nCode:\n{}Memory ({} cells mod {}):\n{}\n",
        ip,
        dp,
        disassemble(
            program,
            ip.saturating_sub(CODE_WINDOW),
            ip.saturating_add(CODE_WINDOW),
            Some(ip)
        ),
        config.tape_len,
        config.cell_size,
        tape_window(vm.tape(), dp, TAPE_WINDOW)
    )
}
