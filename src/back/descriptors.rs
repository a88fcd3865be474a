//! Descriptors for the syntactic contexts that are open at any point during
//! the walk: a function being declared, a call being assembled, an `if` or
//! `for` whose jumps aren't backpatched yet. These form explicit stacks
//! rather than riding the parser's own call stack, since the parser drives
//! a flat stream of actions rather than recursing per nesting level.

use std::cell::RefCell;
use std::rc::Rc;

use crate::middle::Address;

use super::symtab::SymbolType;

/// A function argument's declared shape: its name, whether it's a plain
/// variable or an array, and the temp cell it's bound to.
#[derive(Clone, Debug)]
pub struct ArgDetails {
    pub name: String,
    pub arg_type: SymbolType,
    pub address: Address,
}

/// A function declaration, live from `start_function_declaration` through
/// the rest of compilation (looked up by name for every call site).
///
/// Shared via `Rc<RefCell<_>>` because the function table, the
/// declaration-in-progress stack, and the generator's notion of "the
/// enclosing function" all need to observe parameters appended to `args`
/// while the parameter list is still being parsed.
#[derive(Clone, Debug)]
pub struct FunctionDetails {
    pub name: String,
    pub data_type: super::symtab::SymbolDataType,
    pub pb_idx: usize,
    pub scope: i32,
    pub args: Vec<ArgDetails>,
    pub return_address: Address,
    pub return_value_address: Address,
}

pub type FunctionRef = Rc<RefCell<FunctionDetails>>;

/// A `for` loop awaiting its backpatches: the back-edge target, the
/// condition's false-branch jump, every `break` emitted inside it, and the
/// verbatim-captured step-expression actions to replay at `end_for`.
#[derive(Debug)]
pub struct LoopDetails {
    pub label_pb_idx: usize,
    pub lineno: u32,
    pub condition_jp_pb_idx: usize,
    pub breaks_pb_idx: Vec<usize>,
    pub iterator_expression_pb: Vec<(String, crate::front::lex::Token)>,
    pub next_pb_idx: Option<usize>,
}

impl LoopDetails {
    pub fn new(label_pb_idx: usize, lineno: u32) -> Self {
        LoopDetails {
            label_pb_idx,
            lineno,
            condition_jp_pb_idx: 0,
            breaks_pb_idx: Vec::new(),
            iterator_expression_pb: Vec::new(),
            next_pb_idx: None,
        }
    }
}

/// An `if` awaiting the backpatch(es) for its false-branch / else jump.
#[derive(Debug)]
pub struct IfDetails {
    pub condition_jpf_pb_idx: usize,
    pub else_jp_pb_idx: Option<usize>,
}

impl IfDetails {
    pub fn new(condition_jpf_pb_idx: usize) -> Self {
        IfDetails {
            condition_jpf_pb_idx,
            else_jp_pb_idx: None,
        }
    }
}

/// A function call being assembled: the resolved callee and the argument
/// values popped off the value stack by `add_arg` so far. `function` is
/// `None` when the callee name didn't resolve (already reported as a
/// scoping error by the `push_address` that named it) so the call can still
/// be assembled and discarded cleanly instead of desyncing the call stack.
#[derive(Debug)]
pub struct FunctionCallDetails {
    pub function: Option<FunctionRef>,
    pub args: Vec<ArgDetails>,
}

impl FunctionCallDetails {
    pub fn new(function: Option<FunctionRef>) -> Self {
        FunctionCallDetails {
            function,
            args: Vec::new(),
        }
    }
}
