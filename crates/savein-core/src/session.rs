//! Process-wide session state and the click → download-request handler.
//!
//! The host's event source (context-menu clicks, tab events, option changes)
//! calls into an owned [`Session`]. Every value the session keeps is replaced
//! wholesale; the engine functions it calls stay pure.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::assemble::assemble;
use crate::config::{ConflictAction, SaveInConfig};
use crate::context::{DownloadContext, DownloadInfo, DownloadType, TabInfo};
use crate::destinations::{parse_destinations, ParsedDestinations};
use crate::error::{OptionError, PathConfigError};
use crate::rewrite::{get_capture_matches, rewrite_filename, Captures, RewriteResult};
use crate::rules::{parse_rules, ParsedRules, Rule};
use crate::sanitize::{check_escape, sanitize_filename};
use crate::shortcut::{data_url, make_shortcut, suggest_shortcut_filename};
use crate::special_dirs::PathTemplate;
use crate::url_parts::filename_from_url_path;

const SELECTION_SUFFIX: &str = ".selection.txt";
const SELECTION_MIME: &str = "text/plain;charset=utf-8";

/// Diagnostics for the options surface. Rebuilt on every initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionErrors {
    pub paths: Vec<OptionError>,
    pub filename_patterns: Vec<OptionError>,
    /// Rewrite of the most recent download under the current rules.
    pub test_last_result: Option<RewriteResult>,
    /// Groups of the first rule that matches the most recent download.
    pub test_last_capture: Option<Captures>,
}

/// Where a context-menu id routes a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuTarget {
    RouteExclusive,
    LastUsed,
    Path(String),
}

impl MenuTarget {
    /// Parses `save-in-route-exclusive`, `save-in-last-used`, `save-in-<path>`.
    pub fn from_menu_id(menu_id: &str) -> Option<Self> {
        let rest = menu_id.strip_prefix("save-in-")?;
        match rest {
            "route-exclusive" => Some(MenuTarget::RouteExclusive),
            "last-used" => Some(MenuTarget::LastUsed),
            "" => None,
            path => Some(MenuTarget::Path(path.to_string())),
        }
    }
}

/// What a click saves, before routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedClick {
    pub download_type: DownloadType,
    pub url: String,
    pub suggested_filename: Option<String>,
}

/// Decides what a click saves. Media wins over links, links over
/// selections, selections over pages; disabled kinds are skipped.
pub fn classify_click(
    info: &DownloadInfo,
    options: &SaveInConfig,
    tab_title: Option<&str>,
) -> Option<ClassifiedClick> {
    let present = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);
    let tab_title = tab_title.filter(|t| !t.is_empty());

    if info.media_type.is_some() {
        if let Some(url) = present(&info.src_url) {
            return Some(ClassifiedClick {
                download_type: DownloadType::Media,
                url,
                suggested_filename: None,
            });
        }
    }
    if options.links {
        if let Some(url) = present(&info.link_url) {
            return Some(ClassifiedClick {
                download_type: DownloadType::Link,
                url,
                suggested_filename: None,
            });
        }
    }
    if options.selection {
        if let Some(text) = present(&info.selection_text) {
            let name = tab_title.unwrap_or(&text);
            return Some(ClassifiedClick {
                download_type: DownloadType::Selection,
                url: data_url(SELECTION_MIME, &text),
                suggested_filename: Some(format!("{name}{SELECTION_SUFFIX}")),
            });
        }
    }
    if options.page {
        if let Some(url) = present(&info.page_url) {
            return Some(ClassifiedClick {
                download_type: DownloadType::Page,
                suggested_filename: Some(tab_title.map(str::to_string).unwrap_or_else(|| url.clone())),
                url,
            });
        }
    }
    None
}

/// Everything the host needs to start the transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadRequest {
    /// Final path relative to the host's download directory, filename included
    /// when one is known.
    pub relative_path: String,
    /// URL to fetch (a `data:` URL for shortcuts and selections).
    pub source_url: String,
    pub suggested_filename: Option<String>,
    pub conflict_action: ConflictAction,
    pub download_type: DownloadType,
    /// Source line of the rule that rewrote the filename.
    pub matched_rule_line: Option<usize>,
}

pub struct Session {
    options: SaveInConfig,
    rules: ParsedRules,
    destinations: ParsedDestinations,
    option_errors: OptionErrors,
    last_used_path: Option<String>,
    current_tab: Option<TabInfo>,
    last_download: Option<DownloadContext>,
}

impl Session {
    pub fn init(options: SaveInConfig) -> Self {
        let mut session = Self {
            options: SaveInConfig::default(),
            rules: ParsedRules::default(),
            destinations: ParsedDestinations::default(),
            option_errors: OptionErrors::default(),
            last_used_path: None,
            current_tab: None,
            last_download: None,
        };
        session.reinit(options);
        session
    }

    /// Re-parses rules and destinations after an option change. Last used
    /// path, current tab and last download survive.
    pub fn reinit(&mut self, options: SaveInConfig) {
        let options = options.validate();
        self.rules = parse_rules(&options.filename_patterns);
        self.destinations = parse_destinations(&options.paths, &options.replacement_char);
        self.options = options;
        self.refresh_option_errors();
        tracing::info!(
            rules = self.rules.rules.len(),
            rule_errors = self.rules.errors.len(),
            destinations = self.destinations.destinations().count(),
            path_errors = self.destinations.errors.len(),
            "session initialized"
        );
    }

    fn refresh_option_errors(&mut self) {
        let rules = &self.rules.rules;
        let (test_last_result, test_last_capture) = match &self.last_download {
            Some(last) => {
                let result = rewrite_filename(rules, last);
                let capture = rules
                    .iter()
                    .find_map(|r| get_capture_matches(r, &last.info, last.filename_or_url()));
                (Some(result), capture)
            }
            None => (None, None),
        };

        self.option_errors = OptionErrors {
            paths: self.destinations.errors.iter().map(OptionError::from).collect(),
            filename_patterns: self.rules.errors.iter().map(OptionError::from).collect(),
            test_last_result,
            test_last_capture,
        };
    }

    pub fn options(&self) -> &SaveInConfig {
        &self.options
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules.rules
    }

    pub fn destinations(&self) -> &ParsedDestinations {
        &self.destinations
    }

    pub fn option_errors(&self) -> &OptionErrors {
        &self.option_errors
    }

    pub fn last_used_path(&self) -> Option<&str> {
        self.last_used_path.as_deref()
    }

    pub fn current_tab(&self) -> Option<&TabInfo> {
        self.current_tab.as_ref()
    }

    pub fn last_download(&self) -> Option<&DownloadContext> {
        self.last_download.as_ref()
    }

    pub fn tab_activated(&mut self, tab: TabInfo) {
        tracing::debug!(tab_id = tab.id, "current tab activated");
        self.current_tab = Some(tab);
    }

    /// Tracks title changes of the current tab; adopts the tab if none is known.
    pub fn tab_updated(&mut self, tab_id: i64, title: Option<String>) {
        match &mut self.current_tab {
            None => self.current_tab = Some(TabInfo { id: tab_id, title }),
            Some(tab) if tab.id == tab_id && title.is_some() => {
                tracing::debug!(tab_id, "current tab updated");
                tab.title = title;
            }
            Some(_) => {}
        }
    }

    /// Handles a context-menu click.
    ///
    /// Returns `Ok(None)` when the id is not a configured save entry, the click
    /// carries nothing to save, or "last used" is clicked before any save. A
    /// destination that escapes the download directory, or one rejected when
    /// the destination list was parsed, is an error.
    pub fn handle_click(
        &mut self,
        menu_id: &str,
        info: &DownloadInfo,
        now: DateTime<FixedOffset>,
    ) -> Result<Option<DownloadRequest>, PathConfigError> {
        let Some(target) = MenuTarget::from_menu_id(menu_id) else {
            return Ok(None);
        };
        let tab_title = self.current_tab.as_ref().and_then(|t| t.title.clone());
        let Some(click) = classify_click(info, &self.options, tab_title.as_deref()) else {
            tracing::debug!(menu_id, "failed to choose download");
            return Ok(None);
        };

        let save_into = match &target {
            MenuTarget::RouteExclusive => ".".to_string(),
            MenuTarget::LastUsed => match &self.last_used_path {
                Some(path) => path.clone(),
                None => return Ok(None),
            },
            MenuTarget::Path(path) => path.clone(),
        };
        check_escape(&save_into).map_err(|e| {
            tracing::warn!(path = %save_into, "refusing destination: {}", e);
            e
        })?;
        if let MenuTarget::Path(path) = target {
            if self.destinations.find_by_menu_id(menu_id).is_none() {
                // Lines rejected at parse time have no menu entry.
                if let Some(e) = self.destinations.errors.iter().find(|e| e.path() == path) {
                    return Err(e.clone());
                }
                tracing::debug!(menu_id, "not a configured destination");
                return Ok(None);
            }
            self.last_used_path = Some(path);
        }

        let opts = &self.options;
        let filename = click
            .suggested_filename
            .clone()
            .or_else(|| filename_from_url_path(&click.url));
        let mut ctx = DownloadContext {
            filename,
            url: click.url.clone(),
            info: info.clone(),
            tab_title: tab_title.clone(),
            download_type: click.download_type,
            timestamp: now,
        };
        let resolved_dir = PathTemplate::parse(&save_into).resolve(&ctx.url, Some(&ctx));

        let mut source_url = click.url.clone();
        if opts.shortcut_for(click.download_type) {
            source_url = make_shortcut(opts.shortcut_type, &click.url).content_url();
            ctx.filename = Some(suggest_shortcut_filename(
                opts.shortcut_type,
                click.download_type,
                info,
                tab_title.as_deref(),
                click.suggested_filename.as_deref(),
                opts.truncate_length,
                &opts.replacement_char,
            ));
        }
        ctx.filename = ctx
            .filename
            .map(|f| sanitize_filename(&f, opts.truncate_length, &opts.replacement_char))
            .filter(|f| !f.is_empty());

        let rewritten = rewrite_filename(&self.rules.rules, &ctx);
        let relative_path = assemble(
            &resolved_dir,
            &rewritten.filename,
            opts.truncate_length,
            &opts.replacement_char,
        )?;
        let suggested_filename = rewritten
            .filename
            .rsplit(['/', '\\'])
            .next()
            .map(|name| sanitize_filename(name, opts.truncate_length, &opts.replacement_char))
            .filter(|name| !name.is_empty());

        let request = DownloadRequest {
            relative_path,
            source_url,
            suggested_filename,
            conflict_action: opts.conflict_action,
            download_type: click.download_type,
            matched_rule_line: rewritten.matched_rule.as_ref().map(|r| r.line),
        };
        if opts.debug {
            tracing::debug!(?request, "download request");
        }

        self.last_download = Some(ctx);
        self.refresh_option_errors();
        Ok(Some(request))
    }
}
