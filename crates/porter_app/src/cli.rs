//! Command-line definition.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "journal-porter")]
#[command(about = "Convert an Apple Journal export into a Day One import archive", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Input Apple Journal ZIP file
    #[arg(short, long, value_name = "ZIP")]
    pub input: PathBuf,

    /// Output Day One ZIP file
    #[arg(short, long, value_name = "ZIP")]
    pub output: PathBuf,

    /// Time zone name recorded on every entry (e.g. America/New_York)
    #[arg(long = "tz", default_value = "UTC")]
    pub time_zone: String,

    /// Renderer used for entry text
    #[arg(long, value_enum, default_value_t = ConverterKind::Native)]
    pub converter: ConverterKind,

    /// Log per-file details
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write the log to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConverterKind {
    /// Built-in converter tuned for journal exports
    Native,
    /// The html2md crate
    Html2md,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let cli = Cli::try_parse_from(["journal-porter", "-i", "in.zip", "-o", "out.zip"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("in.zip"));
        assert_eq!(cli.time_zone, "UTC");
        assert_eq!(cli.converter, ConverterKind::Native);
        assert!(!cli.verbose && !cli.quiet);
    }

    #[test]
    fn input_and_output_are_required() {
        assert!(Cli::try_parse_from(["journal-porter", "-i", "in.zip"]).is_err());
        assert!(Cli::try_parse_from(["journal-porter", "-o", "out.zip"]).is_err());
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["journal-porter", "-i", "a", "-o", "b", "-v", "-q"]).is_err());
    }

    #[test]
    fn options_parse() {
        let cli = Cli::try_parse_from([
            "journal-porter",
            "--input",
            "a.zip",
            "--output",
            "b.zip",
            "--tz",
            "Europe/Oslo",
            "--converter",
            "html2md",
        ])
        .unwrap();
        assert_eq!(cli.time_zone, "Europe/Oslo");
        assert_eq!(cli.converter, ConverterKind::Html2md);
    }
}
