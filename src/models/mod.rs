pub mod job;
pub mod outcome;
pub mod record;
pub mod result;

pub use job::{Job, JobStatus};
pub use outcome::{MatchOutcome, OutcomeStatus};
pub use record::{Origin, TransactionRecord};
pub use result::{Counts, Flag, FlagType, ReconciliationResult, ReportRow, Severity, Verdict};
