//! Yes/no approval from the operator.
//!
//! Interactive runs read the answer from stdin. Server mode runs unattended
//! and every question gets its default answer.

use std::io::{self, BufRead, Write};

use tracing::warn;

pub trait Prompt {
    fn approve(&self, question: &str, default: bool) -> bool;
}

pub struct Interactive;

pub struct Unattended;

impl Prompt for Interactive {
    /// The question goes to stderr so `--json` output on stdout stays clean.
    fn approve(&self, question: &str, default: bool) -> bool {
        ask(question, default, io::stdin().lock(), io::stderr())
    }
}

fn ask(question: &str, default: bool, mut input: impl BufRead, mut output: impl Write) -> bool {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    let _ = write!(output, "> {question}? {hint} ");
    let _ = output.flush();

    let mut line = String::new();
    if input.read_line(&mut line).is_err() {
        return default;
    }

    parse_answer(&line).unwrap_or_else(|| {
        warn!("invalid answer \"{}\", using default [{default}]", line.trim());
        default
    })
}

impl Prompt for Unattended {
    fn approve(&self, _question: &str, default: bool) -> bool {
        default
    }
}

/// Some(true) for y/ye/yes, Some(false) for n/no, None otherwise.
pub fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_lowercase().as_str() {
        "y" | "ye" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
