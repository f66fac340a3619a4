//! # escpos-monitor CLI
//!
//! Command-line interface for ESC/POS receipt printers on a serial port.
//!
//! ## Usage
//!
//! ```bash
//! # Query online / error / chute status
//! escpos-monitor status
//!
//! # Same, as JSON, with a slower printer
//! escpos-monitor --timeout-ms 500 status --json
//!
//! # Check the paper sensor
//! escpos-monitor paper
//!
//! # Print centered, large text and cut
//! escpos-monitor print --justify c --size l --cut "Hello World!"
//!
//! # Show the bytes a command would send, without a printer
//! escpos-monitor --dry-run print "Hello"
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use escpos_monitor::{
    EscPosPrinter, MonitorError, PrinterConfig,
    poller::{MonotonicClock, SessionOutcome},
    protocol::commands::{Justify, Size},
    transport::{MockTransport, Transport, TtyTransport},
};

/// escpos-monitor - ESC/POS receipt printer utility
#[derive(Parser, Debug)]
#[command(name = "escpos-monitor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Printer device path
    #[arg(long, global = true)]
    device: Option<String>,

    /// Line speed in baud
    #[arg(long, global = true)]
    baud: Option<u32>,

    /// Delay before a status reply is looked at (ms)
    #[arg(long, global = true)]
    grace_ms: Option<u64>,

    /// Longest wait for a status reply (ms)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Attempts made by the paper check
    #[arg(long, global = true)]
    paper_attempts: Option<u32>,

    /// Sleep between paper check attempts (ms)
    #[arg(long, global = true)]
    paper_interval_ms: Option<u64>,

    /// Print the bytes that would be sent instead of opening the device
    #[arg(long, global = true)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Query online, error and chute status
    Status {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Sleep between poller ticks (ms)
        #[arg(long, default_value = "1")]
        tick_ms: u64,
    },

    /// Check whether paper is loaded
    Paper,

    /// Print a line of text
    Print {
        /// Text to print
        text: String,

        /// Justification: l, c or r
        #[arg(long, default_value = "l")]
        justify: char,

        /// Size: s, m, l or x
        #[arg(long, default_value = "s")]
        size: char,

        /// Lines to feed after the text
        #[arg(long, default_value = "2")]
        feed: u8,

        /// Cut after printing
        #[arg(long)]
        cut: bool,
    },

    /// Print the printer's self-test page
    TestPage,

    /// Feed paper by a number of lines
    Feed {
        #[arg(default_value = "1")]
        lines: u8,
    },

    /// Cut the paper
    Cut,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), MonitorError> {
    let config = resolve_config(&cli)?;
    tracing::debug!(?config, "resolved configuration");

    if cli.dry_run {
        let mut printer = EscPosPrinter::with_config(MockTransport::new(), config.poll);
        execute(&mut printer, &cli.command)?;
        println!("{}", hex(printer.transport().written()));
        return Ok(());
    }

    let transport = TtyTransport::open(&config.device, config.baud_rate)?;
    tracing::info!(printer = %config.name, device = %config.device, "connected");
    let mut printer = EscPosPrinter::with_config(transport, config.poll);
    execute(&mut printer, &cli.command)
}

/// Config file first, then command-line overrides.
fn resolve_config(cli: &Cli) -> Result<PrinterConfig, MonitorError> {
    let mut config = match &cli.config {
        Some(path) => PrinterConfig::load(path)?,
        None => PrinterConfig::default(),
    };

    if let Some(device) = &cli.device {
        config.device = device.clone();
    }
    if let Some(baud) = cli.baud {
        config.baud_rate = baud;
    }
    if let Some(ms) = cli.grace_ms {
        config.poll.grace_period_ms = ms;
    }
    if let Some(ms) = cli.timeout_ms {
        config.poll.reply_timeout_ms = ms;
    }
    if let Some(attempts) = cli.paper_attempts {
        config.poll.paper_poll_attempts = attempts;
    }
    if let Some(ms) = cli.paper_interval_ms {
        config.poll.paper_poll_interval_ms = ms;
    }

    config.poll.validate()?;
    Ok(config)
}

fn execute<T: Transport>(
    printer: &mut EscPosPrinter<T>,
    command: &Commands,
) -> Result<(), MonitorError> {
    match command {
        Commands::Status { json, tick_ms } => {
            let clock = MonotonicClock::new();
            let outcome = printer.query_status(&clock, Duration::from_millis(*tick_ms))?;
            let (report, responded) = match outcome {
                SessionOutcome::Complete(report) => (report, true),
                SessionOutcome::TimedOut(report) => (report, false),
            };

            if *json {
                let value = serde_json::json!({
                    "responded": responded,
                    "health": report.health(),
                    "report": report,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else if responded {
                println!("Printer is {}", report.health());
                println!(
                    "online=0x{:02X} error=0x{:02X} chute=0x{:02X}",
                    report.online, report.error, report.chute
                );
            }

            if !responded {
                return Err(MonitorError::Transport(
                    "printer did not answer status query".to_string(),
                ));
            }
        }

        Commands::Paper => {
            if printer.has_paper()? {
                println!("Paper present");
            } else {
                println!("Paper out");
            }
        }

        Commands::Print {
            text,
            justify,
            size,
            feed,
            cut,
        } => {
            let justify = Justify::parse(*justify)?;
            let size = Size::parse(*size)?;
            printer.init()?;
            printer.justify(justify)?;
            printer.set_size(size)?;
            printer.println(text)?;
            printer.set_size(Size::Small)?;
            printer.justify(Justify::Left)?;
            printer.feed(*feed)?;
            if *cut {
                printer.auto_cut()?;
            }
        }

        Commands::TestPage => printer.test_page()?,

        Commands::Feed { lines } => printer.feed(*lines)?,

        Commands::Cut => printer.auto_cut()?,
    }

    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
