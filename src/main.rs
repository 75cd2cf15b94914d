use std::fs::File;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use vendo::application::session::Session;
use vendo::domain::machine::{MachineConfig, VendingMachine};
use vendo::interfaces::csv::op_reader::OpReader;
use vendo::interfaces::csv::report_writer::ReportWriter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file
    input: PathBuf,

    /// Machine configuration (JSON). Defaults to the built-in catalog.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Price the session as a registered member.
    #[arg(long)]
    member: bool,

    /// Emit the full machine report as JSON instead of inventory CSV.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => {
            let file = File::open(path).into_diagnostic()?;
            MachineConfig::from_json(file).into_diagnostic()?
        }
        None => MachineConfig::default(),
    };
    if cli.member {
        config.member = true;
    }

    let mut session = Session::new(VendingMachine::new(config));

    let file = File::open(cli.input).into_diagnostic()?;
    for op_result in OpReader::new(file).ops() {
        match op_result {
            Ok(op) => {
                if let Err(e) = session.apply(op) {
                    eprintln!("Error applying operation: {e}");
                }
            }
            Err(e) => {
                eprintln!("Error reading operation: {e}");
            }
        }
    }

    let report = session.into_report();

    let stdout = io::stdout();
    if cli.json {
        serde_json::to_writer_pretty(stdout.lock(), &report).into_diagnostic()?;
        println!();
    } else {
        let mut writer = ReportWriter::new(stdout.lock());
        writer.write_report(&report).into_diagnostic()?;
    }

    Ok(())
}
