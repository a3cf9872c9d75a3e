use std::fmt;

/// Errors raised inside the save core.
///
/// These never cross the public boundary: the storage adapter and the
/// import path turn them into `None` / `false` after logging.
#[derive(Debug)]
pub enum SaveError {
    /// Filesystem error on native targets.
    Io(std::io::Error),
    /// A record could not be turned into JSON.
    Encode(String),
    /// Stored text is not JSON.
    Decode(String),
    /// The storage medium cannot be reached at all.
    StorageUnavailable(String),
    /// The medium refused the write for lack of space.
    QuotaExceeded { key: String, bytes: usize },
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "save file: {e}"),
            SaveError::Encode(msg) => write!(f, "could not encode save: {msg}"),
            SaveError::Decode(msg) => write!(f, "stored save is not JSON: {msg}"),
            SaveError::StorageUnavailable(msg) => write!(f, "storage unavailable: {msg}"),
            SaveError::QuotaExceeded { key, bytes } => {
                write!(f, "storage full, {bytes} bytes for '{key}' refused")
            }
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let SaveError::Io(e) = self {
            Some(e)
        } else {
            None
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

/// Only reads go through `?`; encode failures are built explicitly.
impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_unavailable_names_the_cause() {
        let err = SaveError::StorageUnavailable("no window".into());
        assert_eq!(err.to_string(), "storage unavailable: no window");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_quota_exceeded_names_key_and_size() {
        let err = SaveError::QuotaExceeded {
            key: "veggie-farm".into(),
            bytes: 2048,
        };
        assert_eq!(err.to_string(), "storage full, 2048 bytes for 'veggie-farm' refused");
    }

    #[test]
    fn test_unparseable_text_is_a_decode_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{\"money\":").unwrap_err();
        let err = SaveError::from(json_err);
        assert!(matches!(err, SaveError::Decode(_)));
        assert!(err.to_string().starts_with("stored save is not JSON"));
    }

    #[test]
    fn test_file_errors_keep_their_source() {
        let err: SaveError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, SaveError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
