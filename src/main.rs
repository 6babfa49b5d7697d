//! hashmark CLI - classic Markdown to HTML converter

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use hashmark::{Error, Markdown, Options, Overrides};
use tracing_subscriber::EnvFilter;

/// Convert Markdown to HTML. Reads FILE, or stdin when FILE is absent or `-`.
#[derive(Debug, Parser)]
#[command(name = "hashmark", version, about)]
struct Cli {
    /// Markdown input file.
    file: Option<PathBuf>,

    /// TOML options file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Close void elements with `>` instead of ` />`.
    #[arg(long)]
    html: bool,

    /// Tab stop width.
    #[arg(long, value_name = "N")]
    tab_width: Option<usize>,

    /// Escape raw HTML instead of passing it through.
    #[arg(long)]
    no_markup: bool,

    /// Escape every `&`, character references included.
    #[arg(long)]
    no_entities: bool,

    /// Log level when RUST_LOG is unset.
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let mut options = match &cli.config {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    options.apply_overrides(&Overrides {
        html: cli.html,
        tab_width: cli.tab_width,
        no_markup: cli.no_markup,
        no_entities: cli.no_entities,
    });
    let engine = Markdown::new(options)?;

    let input = match cli.file.as_deref() {
        Some(path) if path.as_os_str() != "-" => std::fs::read(path)?,
        _ => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let html = engine.transform_bytes(&input)?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(html.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
