//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init` |
//! | Task | Work item management | `task add`, `task move`, `task show` |
//! | Note | Task comments | `note add`, `note list` |
//! | Dep | Task relationships | `dep add`, `dep remove` |
//! | Views | Read-only reports | `board`, `activity`, `conflicts`, `stats` |
//! | Cache | SQLite cache upkeep | `cache rebuild`, `cache status` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! The default can be changed with `default_format` in the global config.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logging; `RUST_LOG` overrides it:
//! ```bash
//! taskflow --verbose conflicts
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod cache_cmd;
mod dep;
mod note;
mod output;
mod task;
mod view;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
