//! platboard - Terminal Departure Board
//!
//! Subscribes to a server-sent-event endpoint publishing allocation updates and
//! renders them as a live countdown table with a ticker and a clock.

use anyhow::Result;
use clap::{Arg, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging for development
    env_logger::init();

    // Parse command-line arguments
    let matches = Command::new("platboard")
        .version(platboard::VERSION)
        .about("A terminal departure board for live allocation feeds")
        .long_about(
            "platboard subscribes to a server-sent-event endpoint publishing \
             allocation updates and renders them as a live countdown table with \
             a rotating announcement ticker and a clock. The connection retries \
             indefinitely with exponential backoff.",
        )
        .arg(
            Arg::new("url")
                .help("Feed endpoint URL (can also be set at runtime with the e key)")
                .index(1),
        )
        .arg(
            Arg::new("event")
                .long("event")
                .value_name("NAME")
                .default_value("updateAlloc")
                .help("Stream event name carrying allocation updates"),
        )
        .arg(
            Arg::new("max-backoff-ms")
                .long("max-backoff-ms")
                .value_name("MS")
                .default_value("2000")
                .value_parser(clap::value_parser!(u64))
                .help("Upper bound on the reconnection delay in milliseconds"),
        )
        .arg(
            Arg::new("line")
                .long("line")
                .value_name("NAME")
                .default_value("Nagahashi Line")
                .help("Line name shown in the header"),
        )
        .arg(
            Arg::new("platform")
                .long("platform")
                .value_name("N")
                .default_value("1")
                .help("Platform number shown in the header"),
        )
        .get_matches();

    let options = platboard::AppOptions {
        endpoint: matches.get_one::<String>("url").cloned().unwrap_or_default(),
        event_name: matches
            .get_one::<String>("event")
            .expect("defaulted")
            .clone(),
        max_backoff_ms: *matches
            .get_one::<u64>("max-backoff-ms")
            .expect("defaulted"),
        line_name: matches.get_one::<String>("line").expect("defaulted").clone(),
        platform: matches
            .get_one::<String>("platform")
            .expect("defaulted")
            .clone(),
    };

    // Initialize the Application and start the event loop
    use platboard::board::TerminalBoard;
    use platboard::Application;

    let renderer = Box::new(TerminalBoard::new(
        options.line_name.clone(),
        options.platform.clone(),
    )?);
    let mut app = Application::new(options, renderer)?;

    app.run().await?;

    Ok(())
}
