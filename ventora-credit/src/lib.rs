pub mod lifecycle;
pub mod models;
pub mod schedule;

pub use lifecycle::{CreditError, CreditLifecycle, NewCredit, SaleCompletion};
pub use models::{
    Credit, CreditStatus, CreditStore, DelinquencySummary, Installment, InstallmentStore,
};
pub use schedule::build_schedule;
