use alloc::string::String;

#[derive(thiserror::Error, Debug)]
pub enum PropertiesErrorKind {
    #[error("Malformed property at line {line}, expected `key=value`")]
    Malformed { line: usize },
    #[error("Duplicate property `{key}` at line {line}")]
    DuplicateKey { key: String, line: usize },
    #[cfg(feature = "std")]
    #[error("Failed to read property source: {0}")]
    Io(#[from] std::io::Error),
}
