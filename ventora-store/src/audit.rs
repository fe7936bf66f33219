use std::sync::RwLock;

use ventora_core::{AuditEvent, AuditSink, StoreError, StoreResult};

/// Recording sink. Keeps every appended event; `events()` returns a
/// snapshot in append order.
#[derive(Default)]
pub struct MemoryAuditSink {
    events: RwLock<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        match self.events.read() {
            Ok(events) => events.clone(),
            Err(_) => Vec::new(),
        }
    }
}

impl AuditSink for MemoryAuditSink {
    fn append(&self, event: AuditEvent) -> StoreResult<()> {
        self.events
            .write()
            .map_err(|_| StoreError::Backend("audit lock poisoned".into()))?
            .push(event);
        Ok(())
    }
}

/// Sink that forwards audit events to the log and keeps nothing.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn append(&self, event: AuditEvent) -> StoreResult<()> {
        tracing::info!(
            actor_id = %event.actor_id,
            action = %event.action,
            subject = %event.subject,
            description = %event.description,
            "audit"
        );
        Ok(())
    }
}
