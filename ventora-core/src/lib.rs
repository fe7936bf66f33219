pub mod actor;
pub mod audit;
pub mod customer;
pub mod store;

pub use actor::Actor;
pub use audit::{AuditEvent, AuditSink};
pub use customer::{Customer, CustomerStore};
pub use store::{StoreError, StoreResult};
