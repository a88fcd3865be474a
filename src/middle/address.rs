//! The address model: a tagged operand referring to a storage location, a
//! numeric literal, or an as-yet-unknown jump target awaiting a backpatch.

use derive_more::Display;

/// What kind of storage an [`Address`] refers to.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum AddressKind {
    /// A literal numeric constant.
    Const,
    /// A direct memory cell address.
    Immediate,
    /// A pointer stored in a memory cell (dereferenced before use).
    Indirect,
    /// A placeholder used before a backpatch fills in the real target.
    Unknown,
}

/// An operand: a piece of text (usually a decimal number) paired with the
/// addressing mode that says how to interpret it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Address {
    pub text: String,
    pub kind: AddressKind,
}

impl Address {
    pub fn new(text: impl Into<String>, kind: AddressKind) -> Self {
        Address {
            text: text.into(),
            kind,
        }
    }

    pub fn constant(n: impl ToString) -> Self {
        Address::new(n.to_string(), AddressKind::Const)
    }

    pub fn immediate(n: impl ToString) -> Self {
        Address::new(n.to_string(), AddressKind::Immediate)
    }

    pub fn indirect(n: impl ToString) -> Self {
        Address::new(n.to_string(), AddressKind::Indirect)
    }

    pub fn unknown() -> Self {
        Address::new("", AddressKind::Unknown)
    }

    /// Render this address as a non-jump operand: `#N` for a constant, `@N`
    /// for an indirect cell, `N` for a direct cell, `""` if unknown.
    pub fn non_jump(&self) -> String {
        match self.kind {
            AddressKind::Const => format!("#{}", self.text),
            AddressKind::Indirect => format!("@{}", self.text),
            AddressKind::Immediate => self.text.clone(),
            AddressKind::Unknown => String::new(),
        }
    }

    /// Render this address as a jump target: `N` for a constant index, `@N`
    /// for an indirect target, `""` otherwise.
    pub fn jump(&self) -> String {
        match self.kind {
            AddressKind::Const => self.text.clone(),
            AddressKind::Immediate => format!("@{}", self.text),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_jump_rendering() {
        assert_eq!(Address::constant(4).non_jump(), "#4");
        assert_eq!(Address::indirect(0).non_jump(), "@0");
        assert_eq!(Address::immediate(500).non_jump(), "500");
        assert_eq!(Address::unknown().non_jump(), "");
    }

    #[test]
    fn jump_rendering() {
        assert_eq!(Address::constant(4).jump(), "4");
        assert_eq!(Address::immediate(500).jump(), "@500");
        assert_eq!(Address::indirect(0).jump(), "");
        assert_eq!(Address::unknown().jump(), "");
    }
}
