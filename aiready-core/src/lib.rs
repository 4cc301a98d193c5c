pub mod config;
pub mod error;
pub mod monitor;
pub mod registry;
pub mod scan;

pub use config::{MonitorConfig, ServerConfig};
pub use error::MonitorError;
pub use monitor::{CycleSummary, Monitor, MonitorClient, ScanAck};
pub use registry::{SiteRecord, SiteRegistry};
pub use scan::{ScanReport, Scanner};

/// Print the startup banner
pub fn print_banner() {
    println!(
        r#"
   __ _(_)_ __ ___  __ _  __| |_   _
  / _` | | '__/ _ \/ _` |/ _` | | | |
 | (_| | | | |  __/ (_| | (_| | |_| |
  \__,_|_|_|  \___|\__,_|\__,_|\__, |
                               |___/   v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
