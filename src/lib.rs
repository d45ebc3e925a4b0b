pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod registry;
pub mod service;

pub use config::AppConfig;
pub use error::{ErrorInfo, ReconError, Result};
pub use registry::{spawn_daily_sweep, JobRegistry, RetentionPolicy};
pub use service::{MatchTolerance, Matcher, ReconcileService};
