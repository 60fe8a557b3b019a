//! Interactive shell entry point.
//!
//! # Responsibility
//! - Parse arguments and start file logging.
//! - Load the collection and run the shell on stdin/stdout.

use clap::Parser;
use log::info;
use personbook_core::{
    core_version, default_log_dir, default_log_level, init_logging, Flow, InteractiveSource,
    LogConfig, Session, DEFAULT_COLLECTION_FILE,
};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Manage a collection of people stored in an XML file.
#[derive(Debug, Parser)]
#[command(name = "personbook", version)]
struct Args {
    /// Collection file to load and save.
    #[arg(value_name = "FILE", default_value = DEFAULT_COLLECTION_FILE)]
    file: PathBuf,

    /// trace|debug|info|warn|error
    #[arg(long, env = "PERSONBOOK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory for rotating log files.
    #[arg(long, env = "PERSONBOOK_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    start_logging(&args);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("personbook: {err}");
            ExitCode::FAILURE
        }
    }
}

fn start_logging(args: &Args) {
    let level = args.log_level.as_deref().unwrap_or(default_log_level());
    let log_dir = match &args.log_dir {
        Some(dir) if dir.is_relative() => std::env::current_dir()
            .map(|cwd| cwd.join(dir))
            .unwrap_or_else(|_| dir.clone()),
        Some(dir) => dir.clone(),
        None => default_log_dir(),
    };

    let started = LogConfig::new(level, &log_dir).and_then(init_logging);
    if let Err(err) = started {
        eprintln!("personbook: logging disabled: {err}");
    }
}

fn run(args: Args) -> std::io::Result<()> {
    info!(
        "event=shell_start module=cli status=ok version={} file={}",
        core_version(),
        args.file.display()
    );

    let stdout = std::io::stdout();
    let mut session = Session::open(&args.file, stdout.lock())?;
    {
        let out = session.output_mut();
        writeln!(out, "Welcome to personbook {}.", core_version())?;
        writeln!(out, "Type `help` to list available commands.")?;
    }

    let stdin = std::io::stdin();
    let mut source = InteractiveSource::new(stdin.lock());
    let flow = session.run(&mut source).map_err(std::io::Error::other)?;
    if flow == Flow::Continue {
        writeln!(session.output_mut(), "Input closed. Goodbye.")?;
    }
    session.output_mut().flush()?;
    Ok(())
}
