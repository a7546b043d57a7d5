//! End-to-end: config file -> session -> click -> download request.

use chrono::{DateTime, FixedOffset, TimeZone};
use savein_core::config::{load_from_path, ConflictAction};
use savein_core::context::{DownloadContext, DownloadInfo, DownloadType, MediaType, TabInfo};
use savein_core::rewrite::rewrite_filename;
use savein_core::rules::parse_rules;
use savein_core::sanitize::{check_escape, sanitize_filename};
use savein_core::session::Session;
use savein_core::special_dirs::PathTemplate;
use std::io::Write;
use tempfile::NamedTempFile;

const CONFIG: &str = r#"
conflict_action = "overwrite"
paths = '''
.
// per-site folders
images/:sourcedomain:
:separator:
videos/:year:-:month:
../nope
'''
filename_patterns = '''
// normalize jpeg
(\.jpe?g)$ -> .jpg
[page] youtube\.com/watch -> clip.mp4
not a rule
[url] ^https://cdn\.example\.com/u/(\d+)/ -> user-$1/
'''
"#;

fn at() -> DateTime<FixedOffset> {
    FixedOffset::west_opt(5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2023, 12, 31, 23, 0, 0)
        .unwrap()
}

fn session() -> Session {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(CONFIG.as_bytes()).unwrap();
    f.flush().unwrap();
    Session::init(load_from_path(f.path()).unwrap())
}

fn image(src: &str, page: &str) -> DownloadInfo {
    DownloadInfo {
        media_type: Some(MediaType::Image),
        src_url: Some(src.to_string()),
        page_url: Some(page.to_string()),
        ..Default::default()
    }
}

#[test]
fn config_file_drives_menu_and_diagnostics() {
    let s = session();
    let raws: Vec<&str> = s.destinations().destinations().map(|d| d.template.raw()).collect();
    assert_eq!(raws, vec![".", "images/:sourcedomain:", "videos/:year:-:month:"]);
    assert_eq!(s.rules().len(), 3);
    assert_eq!(s.option_errors().paths.len(), 1);
    assert_eq!(s.option_errors().filename_patterns.len(), 1);
    assert!(s.option_errors().filename_patterns[0].message.starts_with("line 4:"));
}

#[test]
fn image_into_domain_folder() {
    let mut s = session();
    let req = s
        .handle_click(
            "save-in-images/:sourcedomain:",
            &image("https://img.example.net/a/b/Sunset.JPEG?w=800", "https://example.net/"),
            at(),
        )
        .unwrap()
        .unwrap();
    // Case-sensitive matcher: upper-case extension is left alone.
    assert_eq!(req.relative_path, "images/img.example.net/Sunset.JPEG");
    assert_eq!(req.conflict_action, ConflictAction::Overwrite);
    assert_eq!(req.matched_rule_line, None);
}

#[test]
fn date_tokens_use_click_offset() {
    let mut s = session();
    let req = s
        .handle_click(
            "save-in-videos/:year:-:month:",
            &image("https://example.com/x.jpeg", "https://example.com/"),
            at(),
        )
        .unwrap()
        .unwrap();
    assert_eq!(req.relative_path, "videos/2023-12/x.jpg");
    assert_eq!(req.matched_rule_line, Some(2));
}

#[test]
fn url_rule_builds_subfolder() {
    let mut s = session();
    s.tab_activated(TabInfo {
        id: 1,
        title: Some("Gallery".to_string()),
    });
    let req = s
        .handle_click(
            "save-in-route-exclusive",
            &image("https://cdn.example.com/u/1234/avatar.png", "https://example.com/"),
            at(),
        )
        .unwrap()
        .unwrap();
    assert_eq!(req.relative_path, "user-1234");
    assert_eq!(req.suggested_filename, None);
    assert_eq!(req.matched_rule_line, Some(5));
}

#[test]
fn page_target_names_links() {
    let mut s = session();
    let info = DownloadInfo {
        link_url: Some("https://dl.example.com/get?id=9".to_string()),
        page_url: Some("https://www.youtube.com/watch?v=abc".to_string()),
        ..Default::default()
    };
    let req = s.handle_click("save-in-.", &info, at()).unwrap().unwrap();
    assert_eq!(req.download_type, DownloadType::Link);
    assert_eq!(req.relative_path, "clip.mp4");
    assert_eq!(s.option_errors().test_last_capture, Some(vec![]));
}

#[test]
fn separator_template_collapses() {
    let ctx = DownloadContext::new("https://example.com/a.png", at());
    let template = PathTemplate::parse("downloads/:separator:/images");
    assert_eq!(
        template.resolve_segments(&ctx.url, Some(&ctx)),
        vec!["downloads", "images"]
    );
}

#[test]
fn rule_scenarios() {
    let parsed = parse_rules("a -> b\n(x -> y\nc -> d\ne -> f");
    assert_eq!(parsed.rules.len(), 3);
    assert_eq!(parsed.errors.len(), 1);
    assert_eq!(parsed.errors[0].line, 2);

    let ctx = DownloadContext::new("https://example.com/photo.jpeg", at()).with_filename("photo.jpeg");
    let result = rewrite_filename(&parse_rules(r"(\.jpe?g)$ -> .jpg").rules, &ctx);
    assert_eq!(result.filename, "photo.jpg");
    assert_eq!(result.captures, Some(vec![Some(".jpeg".to_string())]));
}

#[test]
fn sanitized_names_are_stable_and_safe() {
    for raw in ["..hidden", "a:b*c?.txt", "  spaced  .", "名前/..\\x.png", "...."] {
        let once = sanitize_filename(raw, 20, "_");
        assert_eq!(sanitize_filename(&once, 20, "_"), once, "{raw}");
        assert!(check_escape(&once).is_ok(), "{raw}");
        assert!(once.chars().count() <= 20);
    }
}
