//! The three-address instruction set and the append-only program buffer
//! that holds them, with in-place patching for backpatched jump targets.

use derive_more::Display;
use std::fmt;

/// The operations our tiny virtual machine understands.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Op {
    #[display("ADD")]
    Add,
    #[display("SUB")]
    Sub,
    #[display("MULT")]
    Mult,
    #[display("ASSIGN")]
    Assign,
    #[display("JP")]
    Jp,
    #[display("JPF")]
    Jpf,
    #[display("EQ")]
    Eq,
    #[display("LT")]
    Lt,
    #[display("PRINT")]
    Print,
}

/// A single three-address instruction. Operands are stored already
/// rendered (via [`crate::middle::Address::non_jump`] /
/// [`crate::middle::Address::jump`]); unused slots are the empty string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instruction {
    pub op: Op,
    pub a: String,
    pub b: String,
    pub c: String,
}

impl Instruction {
    pub fn new(op: Op, a: impl Into<String>, b: impl Into<String>, c: impl Into<String>) -> Self {
        Instruction {
            op,
            a: a.into(),
            b: b.into(),
            c: c.into(),
        }
    }

    pub fn one(op: Op, a: impl Into<String>) -> Self {
        Instruction::new(op, a, "", "")
    }

    pub fn two(op: Op, a: impl Into<String>, b: impl Into<String>) -> Self {
        Instruction::new(op, a, b, "")
    }

    pub fn three(op: Op, a: impl Into<String>, b: impl Into<String>, c: impl Into<String>) -> Self {
        Instruction::new(op, a, b, c)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.op, self.a, self.b, self.c)
    }
}

/// An append-only, index-addressed sequence of instructions. Forward jumps
/// are emitted with an unknown placeholder and patched once their target
/// index is known — patching is the only mutation previously written
/// instructions ever undergo.
#[derive(Debug, Default)]
pub struct ProgramBuffer {
    instructions: Vec<Instruction>,
}

impl ProgramBuffer {
    pub fn new() -> Self {
        ProgramBuffer {
            instructions: Vec::new(),
        }
    }

    /// Append an instruction, returning the index it was stored at.
    pub fn push(&mut self, instruction: Instruction) -> usize {
        self.instructions.push(instruction);
        self.instructions.len() - 1
    }

    /// Reserve a slot (used by `break`, whose eventual jump target isn't
    /// known until the enclosing loop finishes).
    pub fn push_placeholder(&mut self) -> usize {
        self.push(Instruction::one(Op::Jp, ""))
    }

    /// Replace a previously appended instruction wholesale.
    pub fn set(&mut self, idx: usize, instruction: Instruction) {
        self.instructions[idx] = instruction;
    }

    /// Patch operand `a` of a previously appended instruction (the jump
    /// target slot for `JP`, and the "else"-target slot for a patched `JP`
    /// used after an `if`).
    pub fn patch_a(&mut self, idx: usize, text: impl Into<String>) {
        self.instructions[idx].a = text.into();
    }

    /// Patch operand `b` of a previously appended instruction (the
    /// false-branch target slot of `JPF`).
    pub fn patch_b(&mut self, idx: usize, text: impl Into<String>) {
        self.instructions[idx].b = text.into();
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, idx: usize) -> &Instruction {
        &self.instructions[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    /// Render the whole buffer as `"{idx}\t{instruction}\n"` lines.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, instruction) in self.instructions.iter().enumerate() {
            out.push_str(&format!("{i}\t{instruction}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_returns_index() {
        let mut pb = ProgramBuffer::new();
        assert_eq!(pb.push(Instruction::two(Op::Assign, "#4", "0")), 0);
        assert_eq!(pb.push(Instruction::one(Op::Jp, "")), 1);
        assert_eq!(pb.len(), 2);
    }

    #[test]
    fn patch_rewrites_in_place() {
        let mut pb = ProgramBuffer::new();
        let idx = pb.push(Instruction::one(Op::Jp, ""));
        pb.patch_a(idx, "7");
        assert_eq!(pb.get(idx).a, "7");
    }

    #[test]
    fn render_uses_tab_separated_index() {
        let mut pb = ProgramBuffer::new();
        pb.push(Instruction::two(Op::Assign, "#4", "0"));
        assert_eq!(pb.render(), "0\t(ASSIGN, #4, 0, )\n");
    }
}
