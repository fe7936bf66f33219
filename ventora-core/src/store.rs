/// Failure signal from a collaborator store. Lookups that simply find
/// nothing return `Ok(None)`; this error means the call itself did not
/// happen.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("conflicting write: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
