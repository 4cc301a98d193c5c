pub mod handlers;
pub mod server;

// Re-export commonly used handler functions for convenience
pub use handlers::{format_scan_report, format_sites_table, parse_url_line};
pub use server::{AppState, router, serve};
