use bf_vm::io::Scripted;
use bf_vm::{compile, run, CompileError, Error, Instruction, Vm, VmConfig, VmError};

const HELLO_PREFIX: &str =
    "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.";

const HELLO_WORLD: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

fn output_of(code: &str, input: &str) -> Vec<u8> {
    let mut out = Vec::new();
    run(code, &mut Scripted::new(input), &mut out).unwrap();
    out
}

#[test]
fn hello_prefix_prints_hell() {
    let out = output_of(HELLO_PREFIX, "");
    assert_eq!(&out[..4], b"Hell");
}

#[test]
fn hello_world() {
    assert_eq!(output_of(HELLO_WORLD, ""), b"Hello World!\n");
}

#[test]
fn hello_world_with_comments() {
    let commented: String = HELLO_WORLD.chars().flat_map(|c| [c, ' ', 'x']).collect();
    assert_eq!(output_of(&commented, ""), b"Hello World!\n");
}

#[test]
fn echo_single_char() {
    assert_eq!(output_of(",.", "A"), b"A");
}

#[test]
fn cat_until_zero() {
    // reads and echoes until a NUL char arrives
    assert_eq!(output_of(",[.,]", "abc\0"), b"abc");
}

#[test]
fn reverse_input() {
    assert_eq!(output_of(">,[>,]<[.<]", "rust\0"), b"tsur");
}

#[test]
fn lone_close_fails_to_compile() {
    assert_eq!(
        compile("]"),
        Err(CompileError::UnopenedLoop { ch: ']', position: 0 })
    );
    let err = run("]", &mut Scripted::default(), &mut Vec::new()).unwrap_err();
    assert!(matches!(err, Error::Compile(_)));
}

#[test]
fn lone_open_compiles_and_completes() {
    let program = compile("[").unwrap();
    assert_eq!(program.instructions(), &[Instruction::LoopOpen(None)]);

    let mut vm = Vm::new(VmConfig::default()).unwrap();
    vm.run(&program, &mut Scripted::default(), &mut Vec::new()).unwrap();
    assert!(vm.tape().cells().iter().all(|&c| c == 0));
}

#[test]
fn unclosed_loop_with_body_fails_at_run_time() {
    let err = run("[-", &mut Scripted::default(), &mut Vec::new()).unwrap_err();
    assert!(matches!(err, Error::Vm(VmError::UnclosedLoop { address: 0 })));
}

#[test]
fn nested_loops_multiply() {
    // 3 * 4 * 5 lands in cell 2
    let code = "+++[>++++[>+++++<-]<-]";
    let vm = run(code, &mut Scripted::default(), &mut Vec::new()).unwrap();
    assert_eq!(vm.tape().cells()[..3], [0, 0, 60]);
    assert_eq!(vm.data_ptr(), 0);
}

#[test]
fn cell_overflow_wraps() {
    let code = "+".repeat(300);
    let vm = run(&code, &mut Scripted::default(), &mut Vec::new()).unwrap();
    assert_eq!(vm.tape()[0], 44);
}

#[test]
fn high_cell_prints_single_byte() {
    let code = "+".repeat(200) + ".";
    assert_eq!(output_of(&code, ""), [200]);
}

#[test]
fn utf8_text_passes_through_bytewise() {
    assert_eq!(output_of(",.,.,.", "☺"), "☺".as_bytes());
}
