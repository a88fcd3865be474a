//! Semantic error collection. Errors are non-fatal: recording one sets a
//! flag and appends a record, but the walk keeps going so later errors are
//! also collected. Only at finalization does the flag decide whether code
//! is emitted at all.

use std::fmt;

use super::symtab::SymbolType;

/// The semantic error taxonomy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SemanticErrorKind {
    Scoping,
    VoidType,
    FunctionParamNumber,
    Break,
    TypeMismatch,
    FunctionParamTypeMismatch,
}

/// A recorded semantic error, attributed to a source line.
#[derive(Clone, Debug)]
pub struct SemanticError {
    pub lineno: u32,
    pub message: String,
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} : Semantic Error! {}.", self.lineno, self.message)
    }
}

/// `VARIABLE -> int`, `ARRAY -> array`, `FUNCTION -> function`. Never
/// called with `Unknown`.
fn describe_symbol_type(symbol_type: SymbolType) -> &'static str {
    match symbol_type {
        SymbolType::Array => "array",
        SymbolType::Variable => "int",
        SymbolType::Function => "function",
        SymbolType::Unknown => "int",
    }
}

/// Accumulates every semantic error raised during the walk.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    has_error: bool,
    errors: Vec<SemanticError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        ErrorCollector {
            has_error: false,
            errors: Vec::new(),
        }
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    fn push(&mut self, lineno: u32, message: String) {
        self.has_error = true;
        self.errors.push(SemanticError { lineno, message });
    }

    pub fn scoping(&mut self, lineno: u32, id: &str) {
        self.push(lineno, format!("'{id}' is not defined"));
    }

    pub fn void_type(&mut self, lineno: u32, id: &str) {
        self.push(lineno, format!("Illegal type of void for '{id}'"));
    }

    pub fn function_param_number(&mut self, lineno: u32, id: &str) {
        self.push(
            lineno,
            format!("Mismatch in numbers of arguments of '{id}'"),
        );
    }

    pub fn break_outside_loop(&mut self, lineno: u32) {
        self.push(lineno, "No 'for' found for 'break'".to_string());
    }

    pub fn type_mismatch(&mut self, lineno: u32, got: SymbolType, expected: SymbolType) {
        self.push(
            lineno,
            format!(
                "Type mismatch in operands, Got {} instead of {}",
                describe_symbol_type(got),
                describe_symbol_type(expected)
            ),
        );
    }

    pub fn function_param_type_mismatch(
        &mut self,
        lineno: u32,
        func_name: &str,
        arg_num: usize,
        expected: SymbolType,
        got: SymbolType,
    ) {
        self.push(
            lineno,
            format!(
                "Mismatch in type of argument {arg_num} of '{func_name}'. Expected '{}' but got '{}' instead",
                describe_symbol_type(expected),
                describe_symbol_type(got)
            ),
        );
    }

    /// Consume the collector, returning every error sorted by line number
    /// (stable, so ties keep insertion order).
    pub fn into_sorted(mut self) -> Vec<SemanticError> {
        self.errors.sort_by_key(|e| e.lineno);
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_scoping_error() {
        let mut errors = ErrorCollector::new();
        errors.scoping(3, "a");
        let sorted = errors.into_sorted();
        assert_eq!(sorted[0].to_string(), "#3 : Semantic Error! 'a' is not defined.");
    }

    #[test]
    fn sorts_by_lineno_stably() {
        let mut errors = ErrorCollector::new();
        errors.scoping(5, "a");
        errors.break_outside_loop(1);
        errors.scoping(1, "b");
        let sorted = errors.into_sorted();
        assert_eq!(sorted[0].lineno, 1);
        assert_eq!(sorted[1].lineno, 1);
        assert!(sorted[0].message.contains("'for' found"));
        assert_eq!(sorted[2].lineno, 5);
    }
}
