pub mod config;
pub mod error;
pub mod logging;

// Engine: pure functions over a download context.
pub mod assemble;
pub mod context;
pub mod destinations;
pub mod rewrite;
pub mod rules;
pub mod sanitize;
pub mod shortcut;
pub mod special_dirs;
pub mod url_parts;

// Host-facing state.
pub mod session;
