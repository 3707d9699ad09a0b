use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad weight, out-of-range threshold, etc.).
    ConfigValidation(String),
    /// Input table is not the expected shape (too few columns, no header).
    MalformedInput { table: String, detail: String },
    /// Required columns are missing from a table that carries headers.
    SchemaMismatch { table: String, missing: Vec<String> },
    /// CSV-level read or write failure.
    Csv { table: String, detail: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MalformedInput { table, detail } => {
                write!(f, "malformed {table}: {detail}")
            }
            Self::SchemaMismatch { table, missing } => {
                write!(f, "{table}: missing column(s): {}", missing.join(", "))
            }
            Self::Csv { table, detail } => write!(f, "{table}: {detail}"),
        }
    }
}

impl std::error::Error for EngineError {}
