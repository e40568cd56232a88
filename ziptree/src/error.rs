use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// The root or a nested container could not be opened.
    Open { path: PathBuf, reason: String },
    /// The entry table of a container is structurally invalid.
    MalformedArchive(String),
    EntryNotFound(String),
    /// Reading the bytes of one entry failed.
    Read { path: String, source: std::io::Error },
    SessionClosed,
    /// A directory total does not fit in a `u64`.
    SizeOverflow(String),
    InvalidConfig(String),
    IoError(std::io::Error),
    ZipError(zip::result::ZipError),
    JsonError(serde_json::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::Open { ref path, ref reason } => {
                write!(f, "Cannot open {}: {reason}", path.display())
            }
            Error::MalformedArchive(ref msg) => write!(f, "Malformed archive: {msg}"),
            Error::EntryNotFound(ref path) => write!(f, "Entry not found: {path}"),
            Error::Read { ref path, ref source } => write!(f, "Cannot read {path}: {source}"),
            Error::SessionClosed => write!(f, "Archive session is closed"),
            Error::SizeOverflow(ref path) => write!(f, "Size of {path} overflows 64 bits"),
            Error::InvalidConfig(ref msg) => write!(f, "Invalid configuration: {msg}"),
            Error::IoError(ref err) => write!(f, "{err}"),
            Error::ZipError(ref err) => write!(f, "{err}"),
            Error::JsonError(ref err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Read { ref source, .. } => Some(source),
            Error::IoError(ref err) => Some(err),
            Error::ZipError(ref err) => Some(err),
            Error::JsonError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl std::convert::From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Error {
        Error::IoError(error)
    }
}

impl std::convert::From<zip::result::ZipError> for Error {
    fn from(error: zip::result::ZipError) -> Error {
        match error {
            zip::result::ZipError::InvalidArchive(msg) => {
                Error::MalformedArchive(msg.to_string())
            }
            other => Error::ZipError(other),
        }
    }
}

impl std::convert::From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Error {
        Error::JsonError(error)
    }
}

impl Error {
    /// True for failures that belong to one entry and must not stop work on
    /// its siblings.
    pub fn is_entry_local(&self) -> bool {
        matches!(
            *self,
            Error::Read { .. }
                | Error::EntryNotFound(_)
                | Error::SizeOverflow(_)
                | Error::ZipError(_)
                | Error::IoError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_zip_maps_to_malformed() {
        let err: Error = zip::result::ZipError::InvalidArchive("bad cd".into()).into();
        assert!(matches!(err, Error::MalformedArchive(ref m) if m == "bad cd"));
    }

    #[test]
    fn test_file_not_found_keeps_the_zip_error() {
        let err: Error = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, Error::ZipError(zip::result::ZipError::FileNotFound)));
    }

    #[test]
    fn test_session_closed_is_not_entry_local() {
        assert!(!Error::SessionClosed.is_entry_local());
        assert!(Error::EntryNotFound("a".to_string()).is_entry_local());
    }

    #[test]
    fn test_display_open() {
        let err = Error::Open {
            path: PathBuf::from("/tmp/missing.apk"),
            reason: "No such file".to_string(),
        };
        assert_eq!(err.to_string(), "Cannot open /tmp/missing.apk: No such file");
    }
}
