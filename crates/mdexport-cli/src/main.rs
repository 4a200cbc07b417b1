// SPDX-License-Identifier: AGPL-3.0-or-later
//! mdexport - convert a markdown file to a spreadsheet, word-processor or text document

mod commands;
mod config;
mod prompt;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use config::ExportConfig;
use mdexport_core::TargetFormat;
use prompt::Prompter;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Markdown file to convert (prompted for when omitted)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output format (prompted for when omitted)
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Output file (defaults to the input path with the format's extension)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// TOML settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the parsed blocks as JSON instead of exporting
    #[arg(long)]
    dump_blocks: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    #[value(alias = "excel", alias = "xlsx")]
    Spreadsheet,
    #[value(alias = "docx")]
    Word,
    #[value(alias = "txt")]
    Text,
}

impl From<FormatArg> for TargetFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Spreadsheet => TargetFormat::Spreadsheet,
            FormatArg::Word => TargetFormat::WordProcessor,
            FormatArg::Text => TargetFormat::PlainText,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ExportConfig::load(path)?,
        None => ExportConfig::default(),
    };

    let stdin = io::stdin();

    if cli.dump_blocks {
        // prompts go to stderr so stdout carries only JSON
        let mut prompter = Prompter::new(stdin.lock(), io::stderr());
        return dump_blocks(cli.input, &mut prompter, &mut io::stdout().lock());
    }

    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    if cli.format.is_none() || cli.input.is_none() {
        prompter.banner()?;
    }
    let target = match cli.format {
        Some(arg) => TargetFormat::from(arg),
        None => prompter.choose_target()?,
    };
    let input = match cli.input {
        Some(path) => path,
        None => prompter.ask_path()?,
    };

    let blocks = commands::load_blocks(&input)?;
    let output = cli
        .output
        .unwrap_or_else(|| commands::output_path(&input, target));
    refuse_overwrite(&input, &output)?;

    commands::export(&blocks, target, &output, &config)?;
    println!("{} exported: {}", target.label(), output.display());
    Ok(())
}

/// Print the parsed blocks of `input` as pretty JSON to `out`
fn dump_blocks<R: BufRead, W: Write>(
    input: Option<PathBuf>,
    prompter: &mut Prompter<R, W>,
    out: &mut impl Write,
) -> Result<()> {
    let input = match input {
        Some(path) => path,
        None => prompter.ask_path()?,
    };
    let blocks = commands::load_blocks(&input)?;
    serde_json::to_writer_pretty(&mut *out, &blocks)?;
    writeln!(out)?;
    Ok(())
}

fn refuse_overwrite(input: &Path, output: &Path) -> Result<()> {
    // an output that does not exist yet cannot be the input
    let resolve = |path: &Path| std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if resolve(input) == resolve(output) {
        anyhow::bail!("Output path would overwrite the input: {}", output.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsString;
    use std::io::Cursor;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_format_aliases() {
        let cli = Cli::try_parse_from(["mdexport", "notes.md", "-f", "excel"]).unwrap();
        assert_eq!(cli.format, Some(FormatArg::Spreadsheet));

        let cli = Cli::try_parse_from(["mdexport", "-f", "docx"]).unwrap();
        assert_eq!(TargetFormat::from(cli.format.unwrap()), TargetFormat::WordProcessor);
        assert!(cli.input.is_none());

        assert!(Cli::try_parse_from(["mdexport", "-f", "pdf"]).is_err());
    }

    #[test]
    fn test_verbosity_count() {
        let cli = Cli::try_parse_from(["mdexport", "-vvv", "--dump-blocks", "a.md"]).unwrap();
        assert_eq!(cli.verbose, 3);
        assert!(cli.dump_blocks);
    }

    #[test]
    fn test_refuse_overwrite() {
        let path = Path::new("notes.md");
        assert!(refuse_overwrite(path, path).is_err());
        assert!(refuse_overwrite(path, Path::new("notes.txt")).is_ok());
    }

    #[test]
    fn test_refuse_overwrite_through_equivalent_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        std::fs::write(&input, "text").unwrap();

        let dotted = dir.path().join(".").join("doc.md");
        assert!(refuse_overwrite(&input, &dotted).is_err());

        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let parent = dir.path().join("sub").join("..").join("doc.md");
        assert!(refuse_overwrite(&input, &parent).is_err());

        assert!(refuse_overwrite(&input, &dir.path().join("doc.txt")).is_ok());
    }

    #[test]
    fn test_dump_blocks_keeps_prompts_out_of_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        std::fs::write(&input, "## Title\n\n- a").unwrap();

        let answer = format!("{}\n", input.display());
        let mut prompter = Prompter::new(Cursor::new(answer.into_bytes()), Vec::new());
        let mut out = Vec::new();
        dump_blocks(None, &mut prompter, &mut out).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json[0]["type"], "heading");
        assert_eq!(json[0]["level"], 2);
        assert_eq!(json[1]["type"], "list");
        assert!(!String::from_utf8(out).unwrap().contains("Path of the markdown file"));
    }

    #[test]
    fn test_run_exports_with_explicit_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        std::fs::write(&input, "# Title\n\n- one\n- two\n").unwrap();

        let args: Vec<OsString> = vec![
            "mdexport".into(),
            input.clone().into_os_string(),
            "-f".into(),
            "text".into(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        run(cli).unwrap();

        let written = std::fs::read_to_string(dir.path().join("doc.txt")).unwrap();
        assert!(written.starts_with("Title\n====="));
    }
}
