use std::{
    cell::Cell,
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
    rc::Rc,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{command::CommandExecutor, trace::TraceFile, viewer::TraceViewer};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "coverage-explorer",
    author,
    version,
    about = "Step through coverage traces recorded by the profiler",
    long_about = None
)]
pub struct Args {
    /// Decoded coverage trace to explore
    #[arg(value_name = "TRACE")]
    pub trace: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Read commands from a file instead of stdin
    #[arg(long, value_name = "PATH")]
    pub script: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub trace_path: PathBuf,
    pub verbose: bool,
    pub script: Option<PathBuf>,
}

impl From<Args> for AppConfig {
    fn from(value: Args) -> Self {
        Self {
            trace_path: value.trace,
            verbose: value.verbose,
            script: value.script,
        }
    }
}

pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

pub fn run(config: AppConfig) -> Result<()> {
    let trace_file = TraceFile::open(&config.trace_path).with_context(|| {
        format!(
            "could not load the coverage trace at {}",
            config.trace_path.display()
        )
    })?;
    let viewer = TraceViewer::load(&trace_file.trace, &trace_file.resolver)
        .context("could not build the trace viewer")?;

    let exited = Rc::new(Cell::new(false));
    let flag = Rc::clone(&exited);
    let mut executor = CommandExecutor::new(viewer, move || flag.set(true));

    let input: Box<dyn BufRead> = match &config.script {
        Some(path) => Box::new(BufReader::new(File::open(path).with_context(|| {
            format!("failed to open command script at {}", path.display())
        })?)),
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let mut output = stdout.lock();
    run_session(&mut executor, input, &mut output, &exited)?;

    info!("Coverage explorer session finished");
    Ok(())
}

/// Read-eval-print loop: show the current location, read one command, print
/// its result. Stops when `exited` is raised or the input ends.
pub fn run_session<R: BufRead, W: Write>(
    executor: &mut CommandExecutor,
    input: R,
    output: &mut W,
    exited: &Cell<bool>,
) -> Result<()> {
    writeln!(output, "entered the report, explore with your commands\n")?;

    let mut lines = input.lines();
    while !exited.get() {
        writeln!(output, "Currently on:")?;
        match executor.viewer().current_location() {
            Ok(location) => writeln!(output, "{}", executor.viewer().describe(location))?,
            Err(err) => writeln!(output, "! {err}")?,
        }
        writeln!(output)?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read command")?;
        let command = line.trim();
        if command.starts_with('#') {
            continue;
        }

        match executor.execute_line(command) {
            Some(Ok(text)) if text.is_empty() => {}
            Some(Ok(text)) => writeln!(output, "{text}\n")?,
            Some(Err(err)) => writeln!(output, "! {err}\n")?,
            None => {}
        }
    }

    output.flush()?;
    Ok(())
}
