//! CLI argument definitions for the claims mapper.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "claims-mapper",
    version,
    about = "Suggest which claims file columns feed each field of a target layout",
    long_about = "Suggest which claims file columns feed each field of a target layout.\n\n\
                  Columns are scored by name similarity, recognized code shapes \
                  (ICD, CPT, NPI, ZIP), and a coarse type guess over sampled values."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML file with [engine] and [confidence] settings.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow sampled claim values in trace output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Suggest and review a mapping for one or more claims files.
    Suggest(SuggestArgs),

    /// Show how every column scores against one layout field.
    Explain(ExplainArgs),

    /// Summarize a layout file.
    Layout(LayoutArgs),

    /// List stored mapping templates.
    Templates(TemplatesArgs),
}

/// How claims files are parsed.
#[derive(Args, Clone, Default)]
pub struct InputArgs {
    /// Field separator (sniffed from the first lines when omitted).
    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Source encoding label such as latin1 (UTF-8 with a Windows-1252
    /// fallback when omitted).
    #[arg(long = "encoding", value_name = "LABEL")]
    pub encoding: Option<String>,

    /// File whose first line names the columns of headerless claims files.
    #[arg(long = "header-file", value_name = "PATH")]
    pub header_file: Option<PathBuf>,

    /// Read every column as text, keeping leading zeros.
    #[arg(long = "text-only")]
    pub text_only: bool,
}

#[derive(Parser)]
pub struct SuggestArgs {
    /// Layout file listing the target fields.
    #[arg(long = "layout", value_name = "PATH")]
    pub layout: PathBuf,

    /// Claims file to map. Repeat to process a batch.
    #[arg(long = "claims", value_name = "PATH", required = true)]
    pub claims: Vec<PathBuf>,

    /// Minimum raw score for a suggestion.
    #[arg(long = "threshold", value_name = "SCORE")]
    pub threshold: Option<f64>,

    /// Leading non-null values sampled per column.
    #[arg(long = "sample-size", value_name = "N")]
    pub sample_size: Option<usize>,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,

    /// Map a field to a column by hand (FIELD=COLUMN). Repeatable.
    #[arg(long = "override", value_name = "FIELD=COLUMN")]
    pub overrides: Vec<String>,

    /// Leave a field unmapped. Repeatable.
    #[arg(long = "reject", value_name = "FIELD")]
    pub rejects: Vec<String>,

    /// Replay stored templates from this directory before suggesting.
    #[arg(long = "reuse", value_name = "DIR")]
    pub reuse: Option<PathBuf>,

    /// Store the reviewed mappings as templates in this directory.
    #[arg(long = "save", value_name = "DIR")]
    pub save: Option<PathBuf>,

    /// Description stored with saved templates.
    #[arg(long = "description", value_name = "TEXT", requires = "save")]
    pub description: Option<String>,

    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Parser)]
pub struct ExplainArgs {
    #[arg(long = "layout", value_name = "PATH")]
    pub layout: PathBuf,

    #[arg(long = "claims", value_name = "PATH")]
    pub claims: PathBuf,

    /// Layout field to explain.
    #[arg(long = "field", value_name = "NAME")]
    pub field: String,

    #[arg(long = "threshold", value_name = "SCORE")]
    pub threshold: Option<f64>,

    #[arg(long = "sample-size", value_name = "N")]
    pub sample_size: Option<usize>,

    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Parser)]
pub struct LayoutArgs {
    #[arg(long = "layout", value_name = "PATH")]
    pub layout: PathBuf,
}

#[derive(Parser)]
pub struct TemplatesArgs {
    /// Template directory.
    #[arg(long = "repo", value_name = "DIR")]
    pub repo: PathBuf,

    /// Only list templates for this layout.
    #[arg(long = "layout-name", value_name = "NAME")]
    pub layout_name: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn suggest_collects_repeated_flags() {
        let cli = Cli::parse_from([
            "claims-mapper",
            "suggest",
            "--layout",
            "layout.csv",
            "--claims",
            "a.csv",
            "--claims",
            "b.csv",
            "--override",
            "Zip=ZIP5",
            "--reject",
            "Claim Amount",
            "--threshold",
            "0.4",
        ]);
        let Command::Suggest(args) = cli.command else {
            panic!("expected suggest");
        };
        assert_eq!(args.claims.len(), 2);
        assert_eq!(args.overrides, vec!["Zip=ZIP5"]);
        assert_eq!(args.rejects, vec!["Claim Amount"]);
        assert_eq!(args.threshold, Some(0.4));
        assert!(args.format == OutputFormatArg::Table);
    }

    #[test]
    fn description_requires_save() {
        let result = Cli::try_parse_from([
            "claims-mapper",
            "suggest",
            "--layout",
            "layout.csv",
            "--claims",
            "a.csv",
            "--description",
            "monthly feed",
        ]);
        assert!(result.is_err());
    }
}
