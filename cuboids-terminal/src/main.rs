/// Cuboids Terminal Demo
///
/// Renders either the swinging arm or the tumbling cuboid field as lit
/// ASCII art. Press Q or Esc to quit.
use anyhow::Context;
use clap::Parser;
use cuboids_core::{DemoConfig, DemoKind};
use cuboids_terminal::TerminalApp;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cuboids-terminal", about = "Lit cuboid demos rendered in the terminal")]
struct Cli {
    /// Demo to run: `arm` or `cuboids`
    #[arg(default_value = "cuboids")]
    demo: DemoKind,

    /// JSON config file; replaces the demo preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the cuboid layout (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of cuboids in the field
    #[arg(long)]
    count: Option<usize>,

    /// Print the effective config as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Where log output goes while the viewport owns the terminal
#[derive(Debug, PartialEq)]
enum LogTarget<'a> {
    Off,
    Stderr,
    File(&'a Path),
}

impl Cli {
    /// Stderr shares the alternate screen with the frame, so it is only
    /// used when verbose output is asked for without a log file.
    fn log_target(&self) -> LogTarget<'_> {
        match (&self.log_file, self.verbose) {
            (Some(path), _) => LogTarget::File(path),
            (None, true) => LogTarget::Stderr,
            (None, false) => LogTarget::Off,
        }
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match cli.log_target() {
        LogTarget::Off => {}
        LogTarget::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<DemoConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            DemoConfig::from_json(&text)?
        }
        None => {
            let mut config = DemoConfig::preset(cli.demo);
            config.cuboids.seed = clock_seed();
            config
        }
    };

    if let Some(seed) = cli.seed {
        config.cuboids.seed = seed;
    }
    if let Some(count) = cli.count {
        config.cuboids.count = count;
    }
    config.validate()?;
    Ok(config)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = load_config(&cli)?;
    if cli.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }
    tracing::info!(demo = %config.demo, seed = config.cuboids.seed, "starting");

    let (mut app, context) = TerminalApp::new(config)?;
    let context = app.run(context)?;

    tracing::info!(frames = context.frame, "stopped");
    Ok(())
}
