use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum IoError {
    /// Input directory missing or not a directory.
    Open { path: PathBuf, reason: String },
    /// Directory listing failed.
    Read { path: PathBuf, reason: String },
    /// Output file or directory could not be written.
    Write { path: PathBuf, reason: String },
    /// Discovery glob did not compile.
    Glob { pattern: String, reason: String },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, reason } => write!(f, "cannot open {}: {reason}", path.display()),
            Self::Read { path, reason } => write!(f, "cannot read {}: {reason}", path.display()),
            Self::Write { path, reason } => write!(f, "cannot write {}: {reason}", path.display()),
            Self::Glob { pattern, reason } => write!(f, "bad file pattern '{pattern}': {reason}"),
        }
    }
}

impl std::error::Error for IoError {}
