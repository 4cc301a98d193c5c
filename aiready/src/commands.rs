use crate::CLAP_STYLING;
use aiready_core::config::{
    DEFAULT_API_URL, DEFAULT_BIND, DEFAULT_MONITOR_REQUEST_TIMEOUT_SECS,
    DEFAULT_SCAN_INTERVAL_SECS,
};
use aiready_scanner::fetcher::DEFAULT_FETCH_TIMEOUT_SECS;
use clap::{arg, command};
use std::net::SocketAddr;

fn interval_arg() -> clap::Arg {
    arg!(--"interval" <SECONDS>)
        .required(false)
        .help("Seconds to wait between monitoring cycles")
        .env("AIREADY_INTERVAL_SECS")
        .value_parser(clap::value_parser!(u64).range(1..))
        .default_value(DEFAULT_SCAN_INTERVAL_SECS.to_string())
}

fn fetch_timeout_arg() -> clap::Arg {
    arg!(--"fetch-timeout" <SECONDS>)
        .required(false)
        .help("Timeout for fetching a page, in seconds")
        .env("AIREADY_FETCH_TIMEOUT_SECS")
        .value_parser(clap::value_parser!(u64).range(1..))
        .default_value(DEFAULT_FETCH_TIMEOUT_SECS.to_string())
}

fn api_arg() -> clap::Arg {
    arg!(-a --"api" <URL>)
        .required(false)
        .help("Base URL of the aiready API")
        .env("AIREADY_API_URL")
        .default_value(DEFAULT_API_URL)
}

fn format_arg() -> clap::Arg {
    arg!(-f --"format" <FORMAT>)
        .required(false)
        .help("Output format: text, json")
        .value_parser(["text", "json"])
        .default_value("text")
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("aiready")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("aiready")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("serve")
                .about("Run the AI readiness API (POST /sites, GET /sites, POST /scan)")
                .arg(
                    arg!(-b --"bind" <ADDR>)
                        .required(false)
                        .help("Address to bind the HTTP server to (host:port)")
                        .env("AIREADY_BIND")
                        .value_parser(clap::value_parser!(SocketAddr))
                        .default_value(DEFAULT_BIND),
                )
                .arg(fetch_timeout_arg())
                .arg(
                    arg!(--"monitor")
                        .required(false)
                        .help("Also re-scan every registered site periodically")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(interval_arg()),
        )
        .subcommand(
            command!("monitor")
                .about("Periodically re-scan every site registered with a running API")
                .arg(api_arg())
                .arg(interval_arg())
                .arg(
                    arg!(--"request-timeout" <SECONDS>)
                        .required(false)
                        .help("Timeout for each list or scan request to the API")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .default_value(DEFAULT_MONITOR_REQUEST_TIMEOUT_SECS.to_string()),
                ),
        )
        .subcommand(
            command!("scan")
                .about("Score a single page locally and print the report")
                .arg(arg!(<URL>).help("The page to scan"))
                .arg(fetch_timeout_arg())
                .arg(format_arg()),
        )
        .subcommand(
            command!("sites")
                .about("List the sites registered with a running API")
                .arg(api_arg())
                .arg(format_arg()),
        )
}
