use crate::types::StoreKind;
use thiserror::Error;

pub type RecsResult<T> = Result<T, RecsError>;

#[derive(Error, Debug)]
pub enum RecsError {
    #[error("Snapshot load error in {path}: {reason}")]
    Snapshot { path: String, reason: String },

    #[error("Upstream store '{store}' unreachable: {reason}")]
    UpstreamUnreachable { store: StoreKind, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecsError {
    pub fn snapshot(path: impl Into<String>, reason: impl Into<String>) -> Self {
        RecsError::Snapshot {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn unreachable(store: StoreKind, reason: impl Into<String>) -> Self {
        RecsError::UpstreamUnreachable {
            store,
            reason: reason.into(),
        }
    }

    /// Attribute a failure to the snapshot at `path`. Errors that already
    /// name their snapshot pass through unchanged.
    pub fn into_snapshot(self, path: &str) -> Self {
        match self {
            RecsError::Snapshot { .. } => self,
            other => RecsError::snapshot(path, other.to_string()),
        }
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, RecsError::UpstreamUnreachable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error_becomes_snapshot_failure() {
        let err: RecsError = io::Error::new(io::ErrorKind::NotFound, "no such file").into();
        match err.into_snapshot("data/similar.jsonl") {
            RecsError::Snapshot { path, reason } => {
                assert_eq!(path, "data/similar.jsonl");
                assert!(reason.contains("no such file"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_snapshot_error_keeps_its_reason() {
        let err = RecsError::snapshot("personal", "line 2: missing field `item_id`");
        match err.into_snapshot("data/recommendations.jsonl") {
            RecsError::Snapshot { path, reason } => {
                assert_eq!(path, "personal");
                assert!(reason.starts_with("line 2"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_only_unreachable_is_upstream() {
        assert!(RecsError::unreachable(StoreKind::Offline, "timeout").is_upstream());
        assert!(!RecsError::snapshot("p", "r").is_upstream());
    }
}
