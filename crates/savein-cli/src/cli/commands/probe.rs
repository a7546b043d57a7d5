//! `savein probe` – show which rules match a filename or URL.

use anyhow::{Context, Result};
use chrono::Local;
use savein_core::config::SaveInConfig;
use savein_core::context::{DownloadContext, DownloadInfo};
use savein_core::rewrite::{get_capture_matches, rewrite_filename, Captures};
use savein_core::rules::parse_rules;
use savein_core::url_parts::filename_from_url_path;
use std::fs;
use std::path::Path;

fn format_captures(caps: &Captures) -> String {
    if caps.is_empty() {
        return "(no groups)".to_string();
    }
    caps.iter()
        .enumerate()
        .map(|(i, c)| match c {
            Some(text) => format!("${}={:?}", i + 1, text),
            None => format!("${}=-", i + 1),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn run_probe(cfg: &SaveInConfig, rules_file: Option<&Path>, subject: &str) -> Result<()> {
    let text = match rules_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("read rules {}", path.display()))?,
        None => cfg.filename_patterns.clone(),
    };
    let parsed = parse_rules(&text);
    for err in &parsed.errors {
        eprintln!("skipped {err}: {}", err.text);
    }

    let info = DownloadInfo::default();
    for rule in &parsed.rules {
        match get_capture_matches(rule, &info, subject) {
            Some(caps) => println!("line {:>4}  match  {}", rule.line, format_captures(&caps)),
            None => println!("line {:>4}  -", rule.line),
        }
    }

    let ctx = if subject.contains("://") {
        let ctx = DownloadContext::new(subject, Local::now().fixed_offset());
        match filename_from_url_path(subject) {
            Some(name) => ctx.with_filename(name),
            None => ctx,
        }
    } else {
        DownloadContext::new("", Local::now().fixed_offset()).with_filename(subject)
    };
    let result = rewrite_filename(&parsed.rules, &ctx);
    match &result.matched_rule {
        Some(rule) => println!("result: {} (line {})", result.filename, rule.line),
        None => println!("result: {} (no rule matched)", result.filename),
    }
    Ok(())
}
