use aiready::handlers::{handle_monitor, handle_scan, handle_serve, handle_sites};
use aiready_core::print_banner;
use anyhow::Result;
use commands::command_argument_builder;
use tracing_subscriber::EnvFilter;

mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    init_logging();

    match chosen_command.subcommand() {
        Some(("serve", primary_command)) => handle_serve(primary_command).await,
        Some(("monitor", primary_command)) => handle_monitor(primary_command).await,
        Some(("scan", primary_command)) => handle_scan(primary_command).await,
        Some(("sites", primary_command)) => handle_sites(primary_command).await,
        // No subcommand provided, just show the banner
        _ => Ok(()),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
