//! CLI for the savein path and filename rewriting engine.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use savein_core::config::{self, SaveInConfig};
use savein_core::context::MediaType;
use savein_core::shortcut::ShortcutType;
use std::path::{Path, PathBuf};

use commands::{run_check, run_config_path, run_probe, run_rewrite, run_shortcut, RewriteArgs};

/// Top-level CLI for savein.
#[derive(Debug, Parser)]
#[command(name = "savein")]
#[command(about = "savein: route browser downloads into folders and rewrite their filenames", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/savein/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Parse destinations and rules from the config and report problems.
    Check {
        /// Exit with an error if any destination or rule is rejected.
        #[arg(long)]
        strict: bool,
    },

    /// Simulate a context-menu click and print the resulting download.
    Rewrite {
        /// Source URL of the clicked image, video or audio.
        #[arg(long)]
        src: Option<String>,
        /// Media kind of --src.
        #[arg(long, default_value = "image")]
        media_type: MediaType,
        /// URL of the clicked link.
        #[arg(long)]
        link_url: Option<String>,
        /// Visible text of the clicked link.
        #[arg(long)]
        link_text: Option<String>,
        /// URL of the page the click happened on.
        #[arg(long)]
        page_url: Option<String>,
        /// Selected text.
        #[arg(long)]
        selection: Option<String>,
        /// Title of the current tab.
        #[arg(long)]
        title: Option<String>,
        /// Menu entry clicked, e.g. `save-in-images` or `save-in-route-exclusive`.
        #[arg(long, default_value = "save-in-.")]
        menu_id: String,
        /// Click time (RFC 3339); defaults to now.
        #[arg(long, value_name = "TIME")]
        at: Option<String>,
        /// Print the download request as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run every rule against a filename or URL and show captures.
    Probe {
        /// Filename or URL to test.
        subject: String,
        /// Rule file to use instead of the config's filename_patterns.
        #[arg(long, value_name = "PATH")]
        rules: Option<PathBuf>,
    },

    /// Print a shortcut file that redirects to URL.
    Shortcut {
        /// Target URL.
        url: String,
        /// html, windows, mac or freedesktop; defaults to the configured type.
        #[arg(long = "type")]
        shortcut_type: Option<ShortcutType>,
        /// Title used for the suggested filename.
        #[arg(long)]
        title: Option<String>,
    },

    /// Show where the config and log files live.
    ConfigPath,
}

fn load_config(explicit: Option<&Path>) -> Result<SaveInConfig> {
    let cfg = match explicit {
        Some(path) => config::load_from_path(path)?,
        None => config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let config_file = cli.config.as_deref();

        match cli.command {
            CliCommand::Check { strict } => run_check(&load_config(config_file)?, strict)?,
            CliCommand::Rewrite {
                src,
                media_type,
                link_url,
                link_text,
                page_url,
                selection,
                title,
                menu_id,
                at,
                json,
            } => {
                let args = RewriteArgs {
                    src,
                    media_type,
                    link_url,
                    link_text,
                    page_url,
                    selection,
                    title,
                    menu_id,
                    at,
                    json,
                };
                run_rewrite(load_config(config_file)?, &args)?;
            }
            CliCommand::Probe { subject, rules } => {
                let cfg = load_config(config_file)?;
                run_probe(&cfg, rules.as_deref(), &subject)?;
            }
            CliCommand::Shortcut {
                url,
                shortcut_type,
                title,
            } => {
                let cfg = load_config(config_file)?;
                run_shortcut(&cfg, &url, shortcut_type, title.as_deref())?;
            }
            CliCommand::ConfigPath => run_config_path(config_file)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
