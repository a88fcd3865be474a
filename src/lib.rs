//! A single-pass code generator for a small C-like language, plus the
//! lexer and recursive-descent parser that drive it.
//!
//! The interesting part of this crate is `back`: the semantic-action engine
//! that the parser calls into while it walks the grammar. It resolves
//! identifiers, lays out memory, and emits three-address instructions for a
//! simple register-less virtual machine, all in one forward pass.

pub mod back;
pub mod common;
pub mod front;
pub mod middle;
