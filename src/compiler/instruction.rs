use std::collections::HashMap;
use std::fmt;

/// Operation families. `+`/`-` and `>`/`<` share a family so that runs of
/// either character merge into a single instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Move,
    LoopOpen,
    LoopClose,
    Input,
    Output,
}

lazy_static! {
    // char -> (family, contribution to a merged run)
    static ref OPCODES: HashMap<char, (Opcode, i64)> = {
        let mut m = HashMap::new();
        m.insert('+', (Opcode::Add, 1));
        m.insert('-', (Opcode::Add, -1));
        m.insert('>', (Opcode::Move, 1));
        m.insert('<', (Opcode::Move, -1));
        m.insert('[', (Opcode::LoopOpen, 0));
        m.insert(']', (Opcode::LoopClose, 0));
        m.insert(',', (Opcode::Input, 0));
        m.insert('.', (Opcode::Output, 0));
        m
    };
}

/// Looks up the family of a source character. Anything outside the eight
/// operation characters is comment text.
pub fn opcode(ch: char) -> Option<Opcode> {
    OPCODES.get(&ch).map(|&(op, _)| op)
}

/// A compiled instruction. Loop variants carry the address of their partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Add(i64),
    Move(i64),
    /// `None` until the matching `]` has been compiled.
    LoopOpen(Option<usize>),
    LoopClose(usize),
    Input,
    Output,
}

impl Instruction {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Add(_) => "add",
            Instruction::Move(_) => "move",
            Instruction::LoopOpen(_) => "jz",
            Instruction::LoopClose(_) => "jnz",
            Instruction::Input => "in",
            Instruction::Output => "out",
        }
    }

    /// Signed delta or jump target as listed after the mnemonic; `?` for a
    /// loop-open that was never closed.
    pub fn operand(&self) -> Option<String> {
        match self {
            Instruction::Add(delta) | Instruction::Move(delta) => Some(format!("{:+}", delta)),
            Instruction::LoopOpen(Some(target)) | Instruction::LoopClose(target) => {
                Some(target.to_string())
            }
            Instruction::LoopOpen(None) => Some("?".to_string()),
            Instruction::Input | Instruction::Output => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand() {
            Some(operand) => write!(f, "{} {}", self.mnemonic(), operand),
            None => f.write_str(self.mnemonic()),
        }
    }
}

/// What a translation rule produced at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    /// A run that cancelled out.
    Nothing,
    Emit(Instruction),
    /// `[`; the compiler assigns the target later.
    Open,
    /// `]`; the compiler links it to the innermost open loop.
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub fragment: Fragment,
    /// Cursor just past the last character the rule consumed.
    pub end: usize,
}

impl Opcode {
    /// Applies this family's rule to `source` at `cursor`, which must hold a
    /// character of this family.
    pub fn translate(self, source: &[char], cursor: usize) -> Translation {
        match self {
            Opcode::Add => merge_run(self, source, cursor, Instruction::Add),
            Opcode::Move => merge_run(self, source, cursor, Instruction::Move),
            Opcode::LoopOpen => single(cursor, Fragment::Open),
            Opcode::LoopClose => single(cursor, Fragment::Close),
            Opcode::Input => single(cursor, Fragment::Emit(Instruction::Input)),
            Opcode::Output => single(cursor, Fragment::Emit(Instruction::Output)),
        }
    }
}

fn single(cursor: usize, fragment: Fragment) -> Translation {
    Translation {
        fragment,
        end: cursor + 1,
    }
}

// Sums the maximal run of `family` characters starting at `cursor`. Comment
// characters inside the run are stepped over; any other operation ends it.
fn merge_run(
    family: Opcode,
    source: &[char],
    cursor: usize,
    make: fn(i64) -> Instruction,
) -> Translation {
    let mut delta = 0;
    let mut end = cursor;
    for (i, ch) in source.iter().enumerate().skip(cursor) {
        match OPCODES.get(ch) {
            Some(&(op, step)) if op == family => {
                delta += step;
                end = i + 1;
            }
            Some(_) => break,
            None => {}
        }
    }

    let fragment = if delta == 0 {
        Fragment::Nothing
    } else {
        Fragment::Emit(make(delta))
    };
    Translation { fragment, end }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_add_run_is_summed() {
        let src = chars("++-++.");
        let t = Opcode::Add.translate(&src, 0);
        assert_eq!(t.fragment, Fragment::Emit(Instruction::Add(3)));
        assert_eq!(t.end, 5);
    }

    #[test]
    fn test_cancelled_run_emits_nothing() {
        let src = chars("<><>+");
        let t = Opcode::Move.translate(&src, 0);
        assert_eq!(t.fragment, Fragment::Nothing);
        assert_eq!(t.end, 4);
    }

    #[test]
    fn test_run_steps_over_comments_but_not_trailing_ones() {
        let src = chars(">> x > y");
        let t = Opcode::Move.translate(&src, 0);
        assert_eq!(t.fragment, Fragment::Emit(Instruction::Move(3)));
        assert_eq!(t.end, 6);
    }

    #[test]
    fn test_run_stops_at_other_family() {
        let src = chars("+>+");
        let t = Opcode::Add.translate(&src, 0);
        assert_eq!(t.fragment, Fragment::Emit(Instruction::Add(1)));
        assert_eq!(t.end, 1);
    }

    #[test]
    fn test_single_char_rules() {
        let src = chars("[],.");
        assert_eq!(Opcode::LoopOpen.translate(&src, 0).fragment, Fragment::Open);
        assert_eq!(Opcode::LoopClose.translate(&src, 1).fragment, Fragment::Close);
        assert_eq!(
            Opcode::Input.translate(&src, 2),
            Translation {
                fragment: Fragment::Emit(Instruction::Input),
                end: 3
            }
        );
        assert_eq!(Opcode::Output.translate(&src, 3).end, 4);
    }

    #[test]
    fn test_opcode_lookup() {
        assert_eq!(opcode('+'), Some(Opcode::Add));
        assert_eq!(opcode('<'), Some(Opcode::Move));
        assert_eq!(opcode('#'), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Instruction::Add(-2).to_string(), "add -2");
        assert_eq!(Instruction::Move(4).to_string(), "move +4");
        assert_eq!(Instruction::LoopOpen(None).to_string(), "jz ?");
        assert_eq!(Instruction::LoopOpen(Some(7)).to_string(), "jz 7");
        assert_eq!(Instruction::LoopClose(0).to_string(), "jnz 0");
        assert_eq!(Instruction::Output.to_string(), "out");
    }

    #[test]
    fn test_operand() {
        assert_eq!(Instruction::Add(3).operand().as_deref(), Some("+3"));
        assert_eq!(Instruction::LoopClose(5).operand().as_deref(), Some("5"));
        assert_eq!(Instruction::Input.operand(), None);
    }
}
