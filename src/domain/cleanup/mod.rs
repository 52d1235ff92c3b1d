//! Knowledge base cleanup - enumerate, confirm, delete children then parents

mod batch;
mod cleaner;
mod config;
mod confirmation;
mod report;

pub use batch::batch_ranges;
pub use cleaner::KnowledgeBaseCleaner;
pub use config::{CallDeadlines, CleanupConfig, CleanupDelays};
pub use confirmation::{is_confirmed, Confirmation, CONFIRMATION_LITERAL};
pub use report::{CleanupOutcome, CleanupReport, FailedDeletion};
