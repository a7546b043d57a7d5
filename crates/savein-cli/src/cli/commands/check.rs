//! `savein check` – parse destinations and rules, report what was rejected.

use anyhow::Result;
use savein_core::config::SaveInConfig;
use savein_core::destinations::MenuEntry;
use savein_core::session::Session;

pub fn run_check(cfg: &SaveInConfig, strict: bool) -> Result<()> {
    let session = Session::init(cfg.clone());

    println!("Destinations:");
    for entry in &session.destinations().entries {
        match entry {
            MenuEntry::Separator => println!("  ----"),
            MenuEntry::Path(dest) => println!("  {:<30} {}", dest.template.raw(), dest.menu_id),
        }
    }

    println!("Rules:");
    if session.rules().is_empty() {
        println!("  (none)");
    }
    for rule in session.rules() {
        println!(
            "  {:>4}  {:<10} {} -> {}",
            rule.line,
            rule.target.keyword(),
            rule.matcher.as_str(),
            rule.replacement
        );
    }

    let errors = session.option_errors();
    for e in &errors.paths {
        println!("path error: {} ({})", e.message, e.error);
    }
    for e in &errors.filename_patterns {
        println!("rule error: {} ({})", e.message, e.error);
    }

    let count = errors.paths.len() + errors.filename_patterns.len();
    if count == 0 {
        println!("No problems found.");
    } else if strict {
        anyhow::bail!("{count} option error(s)");
    }
    Ok(())
}
