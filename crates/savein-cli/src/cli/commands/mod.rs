//! CLI command handlers, one file per command.

mod check;
mod config_path;
mod probe;
mod rewrite;
mod shortcut;

pub use check::run_check;
pub use config_path::run_config_path;
pub use probe::run_probe;
pub use rewrite::{run_rewrite, RewriteArgs};
pub use shortcut::run_shortcut;
