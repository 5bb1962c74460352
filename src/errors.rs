//! Hata turleri: derleme ve calisma zamani taksonomisi.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CompileErrorKind {
    #[error("unexpected symbol after '{0}'")]
    UnexpectedSymbol(String),
    #[error("undefined variable ('{0}')")]
    UndefinedVariable(String),
    #[error("variable redefinition ('{0}')")]
    VariableRedefinition(String),
    #[error("no default constructor defined for the '{0}' type")]
    NoDefaultConstructor(String),
    #[error("invalid member access operator ('{0}' is a pointer)")]
    InvalidMemberAccessOperatorPtr(String),
    #[error("invalid member access operator ('{0}' is not a pointer)")]
    InvalidMemberAccessOperatorNonPtr(String),
    #[error("invalid operator for the '{0}' type")]
    InvalidOperator(String),
    #[error("no member named '{0}'")]
    MissingMember(String),
    #[error("'{0}' must be an integer value")]
    NonIntegerValue(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    #[error("null pointer access ('{0}')")]
    NullPointerAccess(String),
    #[error("invalid array index ('{0}')")]
    InvalidArrayIndex(String),
    #[error("division by zero")]
    DivisionByZero,
}

/// Parse asamasinda uretilen hata; `line` 1 tabanli kaynak satiri.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("[Compile Error] Line {line}: {kind}")]
pub struct CompileError {
    pub line: u16,
    pub kind: CompileErrorKind,
}

impl CompileError {
    pub fn new(line: u16, kind: CompileErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("[Runtime Error] Line {line}: {kind}")]
pub struct RuntimeError {
    pub line: u16,
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub fn new(line: u16, kind: RuntimeErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_format() {
        let e = CompileError::new(3, CompileErrorKind::VariableRedefinition("x".into()));
        assert_eq!(e.to_string(), "[Compile Error] Line 3: variable redefinition ('x')");
    }

    #[test]
    fn runtime_error_format() {
        let e = RuntimeError::new(7, RuntimeErrorKind::DivisionByZero);
        assert_eq!(e.to_string(), "[Runtime Error] Line 7: division by zero");
        let e = RuntimeError::new(2, RuntimeErrorKind::NullPointerAccess("p".into()));
        assert_eq!(e.to_string(), "[Runtime Error] Line 2: null pointer access ('p')");
    }
}
