use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The person performing an operation. Passed explicitly into every
/// orchestration call; there is no process-wide current user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
}

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
