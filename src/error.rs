// error.rs - error kinds for the assignment engine

use std::fmt;

/// Configuration, contention, I/O, and internal invariant violations.
/// External-facing messages still read like the teacher's plain
/// `format!("...: {}", e)` strings via `Display`.
#[derive(Debug)]
pub enum LinCodeError {
    Config(String),
    Contention(String),
    Io(String),
    Internal(String),
}

impl LinCodeError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        LinCodeError::Config(msg.into())
    }

    pub fn io<S: Into<String>>(msg: S) -> Self {
        LinCodeError::Io(msg.into())
    }

    pub fn internal<S: Into<String>>(msg: S) -> Self {
        LinCodeError::Internal(msg.into())
    }

    pub fn contention<S: Into<String>>(msg: S) -> Self {
        LinCodeError::Contention(msg.into())
    }

    /// Contention is always 1; everything else fatal is non-zero too, but
    /// kept distinct so callers can special-case it.
    pub fn exit_code(&self) -> i32 {
        match self {
            LinCodeError::Contention(_) => 1,
            _ => 1,
        }
    }
}

impl fmt::Display for LinCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinCodeError::Config(msg) => write!(f, "configuration error: {}", msg),
            LinCodeError::Contention(msg) => write!(f, "{}", msg),
            LinCodeError::Io(msg) => write!(f, "I/O error: {}", msg),
            LinCodeError::Internal(msg) => write!(f, "internal invariant violated: {}", msg),
        }
    }
}

impl std::error::Error for LinCodeError {}

impl From<LinCodeError> for String {
    fn from(e: LinCodeError) -> String {
        e.to_string()
    }
}
