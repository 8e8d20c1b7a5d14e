use std::fmt;

/// The main error type for IVORY parsing and resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum IvoryError {
    SyntaxError {
        message: String,
        line: usize,
        column: usize,
        hint: Option<String>,
    },
    InvalidToken {
        token: String,
        line: usize,
        column: usize,
        hint: Option<String>,
    },
    UnexpectedEof {
        message: String,
        line: usize,
        column: usize,
    },
    /// Raised when a string literal is not closed.
    UnclosedString {
        quote: char,
        line: usize,
        column: usize,
    },
    /// Raised for characters that match no token rule.
    UnexpectedCharacter {
        character: char,
        line: usize,
        column: usize,
    },
    /// A reference names a path with no matching declaration.
    UnresolvedReference {
        path: Vec<String>,
    },
    /// A path transitively depends on itself. Carries the ordered chain,
    /// ending on the path that closed the loop.
    CyclicReference {
        cycle: Vec<String>,
    },
    /// Typed access asked for a conversion the value cannot satisfy.
    TypeError {
        message: String,
        hint: Option<String>,
    },
    FileError {
        message: String,
        path: String,
    },
    Operator(OperatorError),
}

/// Errors raised while evaluating an `@name(args)` call.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorError {
    UnknownOperator {
        name: String,
    },
    ArgumentMismatch {
        operator: String,
        expected: String,
        got: String,
    },
    MissingEnvironment {
        name: String,
    },
    DivisionByZero {
        operator: String,
    },
    ValidationFailed {
        rule: String,
        value: String,
    },
    UnknownAlgorithm {
        algorithm: String,
    },
}

impl From<OperatorError> for IvoryError {
    fn from(err: OperatorError) -> Self {
        IvoryError::Operator(err)
    }
}

impl fmt::Display for IvoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IvoryError::SyntaxError { message, line, column, hint } =>
                write!(f, "[IVORY] Syntax Error at {}:{}: {}{}",
                    line, column, message,
                    hint.as_ref().map_or(String::new(), |h| format!(" Hint: {}", h))
                ),
            IvoryError::InvalidToken { token, line, column, hint } =>
                write!(f, "[IVORY] Invalid Token '{}' at {}:{}{}",
                    token, line, column,
                    hint.as_ref().map_or(String::new(), |h| format!(" Hint: {}", h))
                ),
            IvoryError::UnexpectedEof { message, line, column } =>
                write!(f, "[IVORY] Unexpected EOF at {}:{}: {}", line, column, message),
            IvoryError::UnclosedString { quote, line, column } =>
                write!(f, "[IVORY] Unclosed string starting with '{}' at {}:{}", quote, line, column),
            IvoryError::UnexpectedCharacter { character, line, column } =>
                write!(f, "[IVORY] Unexpected character '{}' at {}:{}", character, line, column),
            IvoryError::UnresolvedReference { path } =>
                write!(f, "[IVORY] Unresolved reference '{}'", path.join(".")),
            IvoryError::CyclicReference { cycle } =>
                write!(f, "[IVORY] Cyclic reference: {}", cycle.join(" -> ")),
            IvoryError::TypeError { message, hint } =>
                write!(f, "[IVORY] Type Error: {}{}",
                    message,
                    hint.as_ref().map_or(String::new(), |h| format!(" Hint: {}", h))
                ),
            IvoryError::FileError { message, path } =>
                write!(f, "[IVORY] File Error '{}': {}", path, message),
            IvoryError::Operator(err) => write!(f, "[IVORY] {}", err),
        }
    }
}

impl fmt::Display for OperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorError::UnknownOperator { name } =>
                write!(f, "Unknown operator '@{}'", name),
            OperatorError::ArgumentMismatch { operator, expected, got } =>
                write!(f, "Argument mismatch for '@{}': expected {}, got {}", operator, expected, got),
            OperatorError::MissingEnvironment { name } =>
                write!(f, "Environment variable '{}' is not set and no default was given", name),
            OperatorError::DivisionByZero { operator } =>
                write!(f, "Division by zero in '@{}'", operator),
            OperatorError::ValidationFailed { rule, value } =>
                write!(f, "Validation '{}' failed for value '{}'", rule, value),
            OperatorError::UnknownAlgorithm { algorithm } =>
                write!(f, "No provider registered for algorithm '{}'", algorithm),
        }
    }
}

impl std::error::Error for IvoryError {}
impl std::error::Error for OperatorError {}
