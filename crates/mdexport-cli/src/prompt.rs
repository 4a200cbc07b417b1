// SPDX-License-Identifier: AGPL-3.0-or-later
//! Interactive prompts for values not given on the command line

use anyhow::{bail, Result};
use mdexport_core::TargetFormat;
use std::io::{BufRead, Write};
use std::path::PathBuf;

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn banner(&mut self) -> Result<()> {
        let rule = "=".repeat(50);
        writeln!(self.output, "{rule}")?;
        writeln!(self.output, "  Markdown Export (MD -> Spreadsheet / Word / Text)")?;
        writeln!(self.output, "{rule}")?;
        writeln!(self.output)?;
        Ok(())
    }

    /// Show the target menu and ask until a valid choice is entered
    pub fn choose_target(&mut self) -> Result<TargetFormat> {
        writeln!(self.output, "Select the output format:")?;
        for (i, target) in TargetFormat::ALL.iter().enumerate() {
            writeln!(self.output, "  [{}] {} (.{})", i + 1, target.label(), target.extension())?;
        }
        writeln!(self.output)?;

        loop {
            let answer = self.ask(&format!("Enter a number (1-{}): ", TargetFormat::ALL.len()))?;
            match parse_choice(&answer) {
                Some(target) => return Ok(target),
                None => {
                    tracing::debug!(answer = %answer, "unrecognised format choice");
                    writeln!(self.output, "Please enter 1, 2 or 3.")?;
                }
            }
        }
    }

    /// Ask for the markdown file path, stripping surrounding quotes
    pub fn ask_path(&mut self) -> Result<PathBuf> {
        writeln!(self.output)?;
        loop {
            let answer = self.ask("Path of the markdown file to convert: ")?;
            let path = clean_path(&answer);
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("Input closed while waiting for an answer");
        }
        Ok(line.trim().to_string())
    }
}

fn parse_choice(answer: &str) -> Option<TargetFormat> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "1" | "spreadsheet" | "excel" | "xlsx" => Some(TargetFormat::Spreadsheet),
        "2" | "word" | "docx" => Some(TargetFormat::WordProcessor),
        "3" | "text" | "txt" => Some(TargetFormat::PlainText),
        _ => None,
    }
}

fn clean_path(answer: &str) -> &str {
    answer.trim().trim_matches('"').trim_matches('\'')
}
