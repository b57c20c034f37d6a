use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use mailrules::Format;

#[derive(Parser, Debug)]
#[command(name = "mailrules")]
#[command(about = "Convert email filter rules between Gmail, Fastmail, and a common format")]
pub struct Cli {
    /// Increase log output (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Convert a rules file to another format.
    Convert(ConvertArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum RulesFormat {
    Common,
    Gmail,
    Fastmail,
}

impl From<RulesFormat> for Format {
    fn from(format: RulesFormat) -> Self {
        match format {
            RulesFormat::Common => Format::Common,
            RulesFormat::Gmail => Format::Gmail,
            RulesFormat::Fastmail => Format::Fastmail,
        }
    }
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Rules file to convert.
    pub filename: PathBuf,
    /// Source format (detected from the file name when omitted).
    #[arg(long = "from", value_enum)]
    pub source: Option<RulesFormat>,
    /// Destination format.
    #[arg(long, value_enum)]
    pub to: RulesFormat,
    /// Output path (defaults to `<stem>.<to><suffix>` beside the source).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Settings TOML overriding the built-in feed header values.
    #[arg(long)]
    pub config: Option<PathBuf>,
}
