//! # tally-cli: Interactive Shell for Tally
//!
//! ## Startup Sequence
//! 1. Parse flags and environment ([`config::Args`])
//! 2. Initialize tracing (stderr, so it never mixes with menu output)
//! 3. Load the data file (missing file = empty inventory)
//! 4. Run the menu loop ([`menu::Shell`])
//! 5. Save on "save and exit" or end of input
//!
//! `main.rs` only wires these together; everything here is testable with
//! in-memory input and output.

pub mod config;
pub mod error;
pub mod menu;
pub mod prompt;
pub mod render;

pub use config::Args;
pub use error::{ShellError, ShellResult};
pub use menu::{MenuChoice, Shell};
