pub mod aggregate;
pub mod app;
pub mod config;
pub mod delta;
pub mod errors;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod report;
pub mod source;
pub mod state;
pub mod ui;

pub use app::router;
pub use config::ReportConfig;
pub use state::AppState;
