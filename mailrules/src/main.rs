use anyhow::{Context, Result};
use clap::Parser;
use mailrules::conversion_summary::render as render_conversion_summary;
use mailrules::convert::{convert_file, ConvertRequest};
use mailrules::settings::Settings;
use mailrules::Format;

mod cli;
mod path_guard;

use cli::{Cli, Command, ConvertArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Convert(args) => run_convert(args),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let from = resolve_from_format(&args);
    let to = Format::from(args.to);

    if let Some(output) = &args.output {
        path_guard::ensure_output_not_same(output, &args.filename)?;
    }

    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let summary = convert_file(&ConvertRequest {
        source: &args.filename,
        from,
        to,
        output: args.output.as_deref(),
        settings: &settings,
    })
    .with_context(|| format!("failed to convert {}", args.filename.display()))?;

    println!("Saved to {}", summary.destination.display());
    println!("{}", render_conversion_summary(&summary));
    Ok(())
}

/// Explicit `--from`, else the first format named in the file name, else
/// common.
fn resolve_from_format(args: &ConvertArgs) -> Format {
    if let Some(source) = args.source {
        return source.into();
    }
    match Format::infer_from_path(&args.filename) {
        Some(format) => {
            log::info!(
                "detected {format} rules from file name {}",
                args.filename.display()
            );
            format
        }
        None => {
            log::info!(
                "no format named in {}; assuming common",
                args.filename.display()
            );
            Format::Common
        }
    }
}
