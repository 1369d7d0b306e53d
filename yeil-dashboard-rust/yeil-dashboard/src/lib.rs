pub mod api;
pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod middleware;
pub mod utils;
