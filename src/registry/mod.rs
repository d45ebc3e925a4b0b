pub mod store;
pub mod sweeper;

pub use store::JobRegistry;
pub use sweeper::{duration_until_next, spawn_daily_sweep, RetentionPolicy};
