//! The semantic-action engine: a stack-based code generator driven by the
//! parser. This is the core of the compiler — see [`codegen::CodeGenerator`].

pub mod codegen;
pub mod descriptors;
pub mod errors;
pub mod symtab;

pub use codegen::{CodeGenerator, CodegenOutcome};
pub use descriptors::{
    ArgDetails, FunctionCallDetails, FunctionDetails, FunctionRef, IfDetails, LoopDetails,
};
pub use errors::{ErrorCollector, SemanticError, SemanticErrorKind};
pub use symtab::{SymbolDataType, SymbolTable, SymbolTableItem, SymbolType};

#[cfg(test)]
mod tests;
