use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::StoreResult;

/// One line of the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub actor_id: Uuid,
    /// Dotted verb, e.g. "sale.registered", "installment.paid".
    pub action: String,
    /// Identity of the entity the action touched.
    pub subject: Uuid,
    pub description: String,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        actor_id: Uuid,
        action: impl Into<String>,
        subject: Uuid,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id,
            action: action.into(),
            subject,
            description: description.into(),
            recorded_at: Utc::now(),
        }
    }
}

/// Audit trail destination. Appends are fire-and-forget: callers log a
/// failed append and continue, a broken sink must never abort a sale.
pub trait AuditSink: Send + Sync {
    fn append(&self, event: AuditEvent) -> StoreResult<()>;
}

/// Append to a sink without letting a sink failure escape.
pub fn append_best_effort(sink: &dyn AuditSink, event: AuditEvent) {
    let action = event.action.clone();
    if let Err(err) = sink.append(event) {
        tracing::warn!(%action, error = %err, "audit append failed, continuing");
    }
}
