//! HTTP handlers.

pub mod analyze;
pub mod fruits;
pub mod health;

pub use analyze::analyze;
pub use fruits::list_fruits;
pub use health::{health, ready};
