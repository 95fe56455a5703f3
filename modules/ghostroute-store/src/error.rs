use ghostroute_common::ValidationReport;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Batch rejected before any mutation; carries every violation found.
    #[error("batch failed validation: {0}")]
    Validation(ValidationReport),

    #[error("event_order {order} already exists in partition {}", partition_label(.chapter))]
    DuplicateOrder { chapter: Option<i32>, order: i32 },

    /// Connectivity or timeout: the store could not be reached at all.
    #[error("store unreachable: {0}")]
    Unavailable(String),

    #[error("malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    /// Stable machine-readable discriminator for API responses and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Validation(_) => "validation",
            StoreError::DuplicateOrder { .. } => "duplicate_order",
            StoreError::Unavailable(_) => "store_unavailable",
            StoreError::Malformed(_) => "validation",
            StoreError::Database(_) => "database",
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Unavailable(e.to_string()),
            other => StoreError::Database(other),
        }
    }
}

fn partition_label(chapter: &Option<i32>) -> String {
    match chapter {
        Some(c) => format!("chapter {c}"),
        None => "default".to_string(),
    }
}
