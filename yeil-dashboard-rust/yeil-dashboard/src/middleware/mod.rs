pub mod error_handling;
pub mod metrics;

pub use error_handling::{json_config, not_found, ErrorResponseBuilder};
pub use metrics::MetricsMiddleware;
