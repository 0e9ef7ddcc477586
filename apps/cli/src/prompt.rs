//! # Prompts
//!
//! Line-based questions over any `BufRead`/`Write` pair, so the menu can be
//! driven by a terminal or by a scripted buffer in tests.
//!
//! ```text
//! ask ──► "" ──────────────► None (field skipped)
//!     ──► "text" ──► parse ──► Ok  ──► Some(value)
//!                         └──► Err ──► print reason, ask again
//!     ──► bytes that are not UTF-8 ──► print reason, ask again
//! EOF ─────────────────────────────► ShellError::EndOfInput
//! ```

use std::fmt::Display;
use std::io::{BufRead, Write};

use chrono::NaiveDate;
use tally_core::validation::{validate_price, validate_quantity};
use tally_core::{Money, Percent, ValidationError};
use tracing::warn;

use crate::error::{ShellError, ShellResult};

/// Date pattern accepted by the report filters.
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompter { input, output }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// Prints one line.
    pub fn say(&mut self, line: impl Display) -> ShellResult<()> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    /// Reads one trimmed answer. `None` means the answer was left empty.
    pub fn ask(&mut self, prompt: &str) -> ShellResult<Option<String>> {
        let line = self.read_answer(prompt)?;
        let answer = line.trim();
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    }

    /// Reads one answer with only the line ending removed.
    pub fn ask_raw(&mut self, prompt: &str) -> ShellResult<String> {
        let mut line = self.read_answer(prompt)?;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    /// Prints `prompt` and reads one line of text, asking again while the
    /// line is not valid UTF-8.
    fn read_answer(&mut self, prompt: &str) -> ShellResult<String> {
        loop {
            write!(self.output, "{prompt}")?;
            self.output.flush()?;

            let mut bytes = Vec::new();
            if self.input.read_until(b'\n', &mut bytes)? == 0 {
                return Err(ShellError::EndOfInput);
            }

            match String::from_utf8(bytes) {
                Ok(line) => return Ok(line),
                Err(_) => {
                    warn!("Discarded an input line that is not valid UTF-8");
                    self.say("Invalid input: not valid text. Please try again.")?;
                }
            }
        }
    }

    /// Asks until the answer parses or is left empty.
    pub fn ask_parsed<T, E, F>(&mut self, prompt: &str, parse: F) -> ShellResult<Option<T>>
    where
        E: Display,
        F: Fn(&str) -> Result<T, E>,
    {
        loop {
            let Some(answer) = self.ask(prompt)? else {
                return Ok(None);
            };
            match parse(&answer) {
                Ok(value) => return Ok(Some(value)),
                Err(reason) => self.say(format_args!("Invalid input: {reason}. Please try again."))?,
            }
        }
    }

    /// Asks until a non-empty answer parses.
    pub fn require<T, E, F>(&mut self, prompt: &str, parse: F) -> ShellResult<T>
    where
        E: Display,
        F: Fn(&str) -> Result<T, E>,
    {
        loop {
            match self.ask_parsed(prompt, &parse)? {
                Some(value) => return Ok(value),
                None => self.say("A value is required.")?,
            }
        }
    }
}

// =============================================================================
// Parsers
// =============================================================================

/// Unit price: decimal with at most two fractional digits, not negative.
pub fn parse_price(input: &str) -> Result<Money, ValidationError> {
    let price: Money = input.parse()?;
    validate_price(price)?;
    Ok(price)
}

/// Stock level: any whole number, zero included.
pub fn parse_stock(input: &str) -> Result<u32, ValidationError> {
    input
        .parse()
        .map_err(|_| ValidationError::invalid_format("quantity", "expected a whole number"))
}

/// Quantity on a sale line: a whole number above zero.
pub fn parse_sale_quantity(input: &str) -> Result<u32, ValidationError> {
    let quantity = parse_stock(input)?;
    validate_quantity(quantity)?;
    Ok(quantity)
}

/// Discount or tax rate in percent (`"10"`, `"8.25"`).
pub fn parse_percent(input: &str) -> Result<Percent, ValidationError> {
    input.parse()
}

/// Calendar date as `YYYY-MM-DD`.
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(input, INPUT_DATE_FORMAT)
        .map_err(|_| ValidationError::invalid_format("date", "expected YYYY-MM-DD"))
}
