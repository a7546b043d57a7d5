//! `savein rewrite` – run one simulated click through the whole pipeline.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local};
use savein_core::config::SaveInConfig;
use savein_core::context::{DownloadInfo, MediaType, TabInfo};
use savein_core::session::Session;

/// Click description gathered from the command line.
#[derive(Debug, Clone)]
pub struct RewriteArgs {
    pub src: Option<String>,
    pub media_type: MediaType,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    pub page_url: Option<String>,
    pub selection: Option<String>,
    pub title: Option<String>,
    pub menu_id: String,
    pub at: Option<String>,
    pub json: bool,
}

impl RewriteArgs {
    fn download_info(&self) -> DownloadInfo {
        DownloadInfo {
            media_type: self.src.as_ref().map(|_| self.media_type),
            src_url: self.src.clone(),
            link_url: self.link_url.clone(),
            link_text: self.link_text.clone(),
            page_url: self.page_url.clone(),
            selection_text: self.selection.clone(),
        }
    }

    fn timestamp(&self) -> Result<DateTime<FixedOffset>> {
        match &self.at {
            Some(at) => DateTime::parse_from_rfc3339(at).with_context(|| format!("parse --at {at}")),
            None => Ok(Local::now().fixed_offset()),
        }
    }
}

pub fn run_rewrite(cfg: SaveInConfig, args: &RewriteArgs) -> Result<()> {
    let now = args.timestamp()?;
    let mut session = Session::init(cfg);
    if args.title.is_some() {
        session.tab_activated(TabInfo {
            id: 0,
            title: args.title.clone(),
        });
    }

    let Some(request) = session.handle_click(&args.menu_id, &args.download_info(), now)? else {
        println!("Nothing to save: no configured destination, or the click has nothing to download.");
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&request)?);
        return Ok(());
    }

    println!("path:     {}", request.relative_path);
    println!(
        "filename: {}",
        request.suggested_filename.as_deref().unwrap_or("(chosen by browser)")
    );
    println!("type:     {}", request.download_type.as_str());
    match request.matched_rule_line {
        Some(line) => println!("rule:     line {line}"),
        None => println!("rule:     (none)"),
    }
    if request.source_url.starts_with("data:") {
        println!("source:   (generated content)");
    } else {
        println!("source:   {}", request.source_url);
    }
    Ok(())
}
