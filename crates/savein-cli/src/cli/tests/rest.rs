//! Tests for check, probe, shortcut, config-path and the global --config flag.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use savein_core::shortcut::ShortcutType;
use std::path::PathBuf;

#[test]
fn cli_parse_check() {
    match parse(&["savein", "check"]) {
        CliCommand::Check { strict } => assert!(!strict),
        _ => panic!("expected Check"),
    }
    match parse(&["savein", "check", "--strict"]) {
        CliCommand::Check { strict } => assert!(strict),
        _ => panic!("expected Check --strict"),
    }
}

#[test]
fn cli_parse_probe() {
    match parse(&["savein", "probe", "photo.jpeg"]) {
        CliCommand::Probe { subject, rules } => {
            assert_eq!(subject, "photo.jpeg");
            assert!(rules.is_none());
        }
        _ => panic!("expected Probe"),
    }
}

#[test]
fn cli_parse_probe_with_rule_file() {
    match parse(&["savein", "probe", "--rules", "/tmp/rules.txt", "https://x.test/a.jpg"]) {
        CliCommand::Probe { subject, rules } => {
            assert_eq!(subject, "https://x.test/a.jpg");
            assert_eq!(rules, Some(PathBuf::from("/tmp/rules.txt")));
        }
        _ => panic!("expected Probe with --rules"),
    }
}

#[test]
fn cli_parse_shortcut() {
    match parse(&["savein", "shortcut", "https://example.com/", "--type", "windows"]) {
        CliCommand::Shortcut {
            url,
            shortcut_type,
            title,
        } => {
            assert_eq!(url, "https://example.com/");
            assert_eq!(shortcut_type, Some(ShortcutType::Windows));
            assert!(title.is_none());
        }
        _ => panic!("expected Shortcut"),
    }
}

#[test]
fn cli_parse_config_path() {
    match parse(&["savein", "config-path"]) {
        CliCommand::ConfigPath => {}
        _ => panic!("expected ConfigPath"),
    }
}

#[test]
fn cli_parse_global_config_flag() {
    let cli = Cli::try_parse_from(["savein", "check", "--config", "alt.toml"]).unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));

    let cli = Cli::try_parse_from(["savein", "--config", "alt.toml", "config-path"]).unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
}

#[test]
fn cli_parse_missing_subcommand_fails() {
    assert!(Cli::try_parse_from(["savein"]).is_err());
}
