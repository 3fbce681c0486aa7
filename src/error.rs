use thiserror::Error;

/// Errors surfaced by configuration I/O and admin mutations.
///
/// Sampling and container filling never return these: a failed draw is
/// `None` at the call site and a failed fill is a partially filled container.
#[derive(Error, Debug)]
pub enum LootError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no container profile named `{0}`")]
    UnknownContainer(String),

    #[error("no loot group named `{0}`")]
    UnknownGroup(String),

    #[error("item `{0}` is not in the catalog")]
    UnknownItem(String),

    #[error("loot group `{0}` already exists")]
    GroupExists(String),

    #[error("loot group `{0}` has no valid items")]
    EmptyGroup(String),

    #[error("invalid probability for `{item}`: {value} (expected 0..=100)")]
    InvalidProbability { item: String, value: f64 },
}
