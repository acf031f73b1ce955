use thiserror::Error;

/// Rejections of a match operation. Nothing is mutated when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("unknown zone: {label}")]
    InvalidZone { label: String },

    #[error("no actions recorded in the current bout")]
    EmptyLog,

    #[error("all {capacity} archive slots are already used")]
    ArchiveFull { capacity: usize },
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    Serde(#[from] serde_json::Error),
}
