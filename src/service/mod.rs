pub mod matcher;
pub mod normalizer;
pub mod reconcile;
pub mod report;

pub use matcher::{MatchTolerance, Matcher};
pub use normalizer::{normalize, RawAmount, RecordInput};
pub use reconcile::{reconcile, reconcile_records, ReconcileRequest, ReconcileService};
