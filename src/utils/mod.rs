//! # Utility Modules
//!
//! Supporting utilities for logging and observability.
//!
//! ## Components
//! - **Logging**: Subscriber setup from [`LoggingConfig`](crate::config::LoggingConfig)
//! - **Metrics**: Thread-safe codec counters

pub mod logging;
pub mod metrics;

pub use metrics::{global_metrics, Metrics, MetricsSnapshot};
