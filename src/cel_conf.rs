//! Concrete `cel.conf` loader. A hand-rolled line-oriented parser rather
//! than a generic layered-config crate: see DESIGN.md for why — the
//! grammar is one section, two comma lists, a sentinel token, and a
//! skip-list of two foreign section names, which a generic config crate
//! buys nothing for.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::warn;

use crate::constants::{
    EVENTS_ALL_SENTINEL, KEY_APPS, KEY_DATEFORMAT, KEY_ENABLE, KEY_EVENTS, SECTION_GENERAL,
    SKIPPED_SECTIONS,
};
use crate::config::CelConfig;
use crate::error::{CelError, CelResult};
use crate::event::CelEventType;

/// Loads and validates a `CelConfig` from `cel.conf` text.
pub fn load_str(text: &str) -> CelResult<CelConfig> {
    let mut enable = false;
    let mut dateformat: Option<String> = None;
    let mut events_mask: u64 = 0;
    let mut apps: HashSet<String> = HashSet::new();

    let mut section: Option<String> = None;

    for raw_line in text.lines() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        if let Some(name) = parse_section_header(line) {
            section = Some(name);
            continue;
        }
        let in_general = section.as_deref() == Some(SECTION_GENERAL);
        if !in_general {
            if let Some(name) = &section {
                if !SKIPPED_SECTIONS.contains(&name.as_str()) {
                    warn!(section = %name, "ignoring unrecognized cel.conf section");
                }
            }
            continue;
        }

        let Some((key, value)) = split_kv(line) else {
            continue;
        };
        match key {
            KEY_ENABLE => enable = parse_yes_no(value),
            KEY_DATEFORMAT => {
                if !value.is_empty() {
                    dateformat = Some(value.to_string());
                }
            }
            KEY_EVENTS => events_mask = parse_events(value)?,
            KEY_APPS => apps = parse_apps(value),
            other => warn!(key = other, "ignoring unrecognized cel.conf key"),
        }
    }

    let config = CelConfig {
        enable,
        dateformat,
        events_mask,
        apps,
    };
    config.validate()?;
    Ok(config)
}

/// Loads `cel.conf` from disk.
pub fn load_file(path: impl AsRef<Path>) -> CelResult<CelConfig> {
    let text = fs::read_to_string(path)
        .map_err(|e| CelError::config(format!("failed to read cel.conf: {e}")))?;
    load_str(&text)
}

fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn parse_section_header(line: &str) -> Option<String> {
    let line = line.trim();
    if line.starts_with('[') && line.ends_with(']') && line.len() >= 2 {
        Some(line[1..line.len() - 1].trim().to_string())
    } else {
        None
    }
}

fn split_kv(line: &str) -> Option<(&str, &str)> {
    let idx = line.find('=')?;
    let key = line[..idx].trim();
    let value = line[idx + 1..].trim();
    Some((key, value))
}

fn parse_yes_no(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "yes" | "true" | "on" | "1")
}

fn parse_events(value: &str) -> CelResult<u64> {
    let mut mask = 0u64;
    for token in value.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if token == EVENTS_ALL_SENTINEL {
            mask = u64::MAX;
            continue;
        }
        match CelEventType::parse_config_name(token) {
            Some(ev) => mask |= ev.mask_bit(),
            None => {
                return Err(CelError::UnknownEventName {
                    name: token.to_string(),
                })
            }
        }
    }
    Ok(mask)
}

fn parse_apps(value: &str) -> HashSet<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_ascii_lowercase())
        .collect()
}
