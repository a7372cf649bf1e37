// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Variable extraction from raw message text.
//!
//! Seven strategies run in a fixed order and the first one that yields at
//! least one variable wins outright; later strategies never merge into an
//! earlier result. Tagged markup is the most explicit author intent, so it
//! goes first; the bare-text sniffs come last because they misfire most.

use std::collections::HashMap;
use std::sync::OnceLock;

use memchr::memchr;
use regex::Regex;
use serde_json::Value;

use crate::format::{looks_like_json, looks_like_yaml, parse_json, parse_yaml};
use crate::model::Variables;


/// Compiled-pattern cache for per-character custom tag grammars.
///
/// A `None` entry records a pattern this engine cannot run: one that fails
/// to compile (the default grammar's backreference falls in this bucket) or
/// one without the two capture groups extraction needs. Those patterns are
/// handled by the built-in bracket scanner instead, and the miss is cached
/// so the compile error is paid once per pattern.
#[derive(Debug, Default)]
pub struct RegexCache {
    compiled: HashMap<String, Option<Regex>>,
}

impl RegexCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup(&mut self, pattern: &str) -> Option<&Regex> {
        self.compiled
            .entry(pattern.to_owned())
            .or_insert_with(|| {
                Regex::new(pattern)
                    .ok()
                    .filter(|re| re.captures_len() > 2)
            })
            .as_ref()
    }
}

/// Runs the strategy chain over one message body.
///
/// Never fails: text that matches nothing produces an empty map.
pub fn extract_vars(text: &str, custom_regex: Option<&str>, cache: &mut RegexCache) -> Variables {
    if text.is_empty() {
        return Variables::new();
    }

    extract_tagged(text, custom_regex, cache)
        .or_else(|| extract_fenced(text, fenced_json_re(), parse_json))
        .or_else(|| extract_unclosed_markup(text))
        .or_else(|| looks_like_json(text).then(|| parse_json(text)).flatten())
        .or_else(|| extract_fenced(text, fenced_yaml_re(), parse_yaml))
        .or_else(|| looks_like_yaml(text).then(|| parse_yaml(text)).flatten())
        .or_else(|| extract_closed_markup(text))
        .unwrap_or_default()
}

/// Strategy 1: explicit tag pairs, either the character's custom grammar or
/// the built-in `[name]body[/name]` scan. Values are kept as trimmed text.
fn extract_tagged(
    text: &str,
    custom_regex: Option<&str>,
    cache: &mut RegexCache,
) -> Option<Variables> {
    let vars = match custom_regex.and_then(|pattern| cache.lookup(pattern)) {
        Some(re) => {
            let mut vars = Variables::new();
            for caps in re.captures_iter(text) {
                let name = caps.get(1).map_or("", |m| m.as_str()).trim();
                let body = caps.get(2).map_or("", |m| m.as_str()).trim();
                if !name.is_empty() {
                    vars.insert(name.to_owned(), Value::String(body.to_owned()));
                }
            }
            vars
        }
        None => default_bracket_scan(text),
    };
    non_empty(vars)
}

/// Scanner form of the default grammar. The `regex` crate has no
/// backreferences, so the `[/name]` closer is matched by substring search
/// against the exact opener name instead.
fn default_bracket_scan(text: &str) -> Variables {
    let mut vars = Variables::new();
    let bytes = text.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let Some(open_rel) = memchr(b'[', &bytes[pos..]) else {
            break;
        };
        let open = pos + open_rel;
        let Some(name_end_rel) = memchr(b']', &bytes[open + 1..]) else {
            break;
        };
        let name_end = open + 1 + name_end_rel;
        if name_end == open + 1 {
            // "[]" has no name; skip the opener.
            pos = open + 1;
            continue;
        }
        let name = &text[open + 1..name_end];

        let closer = format!("[/{name}]");
        match text[name_end + 1..].find(&closer) {
            Some(body_len) => {
                let body = &text[name_end + 1..name_end + 1 + body_len];
                vars.insert(
                    name.trim().to_owned(),
                    Value::String(body.trim().to_owned()),
                );
                pos = name_end + 1 + body_len + closer.len();
            }
            None => {
                pos = open + 1;
            }
        }
    }

    vars
}

/// Strategies 2 and 5: fenced code blocks. An unterminated fence at end of
/// input still counts; its body runs through the same parser.
fn extract_fenced(
    text: &str,
    fence: &Regex,
    parser: fn(&str) -> Option<Variables>,
) -> Option<Variables> {
    let mut vars = Variables::new();
    for caps in fence.captures_iter(text) {
        if let Some(body) = caps.get(1) {
            if let Some(parsed) = parser(body.as_str().trim()) {
                vars.extend(parsed);
            }
        }
    }
    non_empty(vars)
}

/// Strategy 3: a markup tag opened but never closed, with JSON- or
/// YAML-looking content after it. Typical of a structured block cut off by
/// streaming before its closing tag arrived.
fn extract_unclosed_markup(text: &str) -> Option<Variables> {
    let mut vars = Variables::new();
    for caps in unclosed_markup_re().captures_iter(text) {
        let inner = caps.get(1).map_or("", |m| m.as_str()).trim();
        if inner.is_empty() {
            continue;
        }
        if inner.starts_with('{') {
            if let Some(parsed) = parse_json(inner) {
                vars.extend(parsed);
                continue;
            }
        }
        if looks_like_yaml(inner) {
            if let Some(parsed) = parse_yaml(inner) {
                vars.extend(parsed);
            }
        }
    }
    non_empty(vars)
}

/// Strategy 7: complete `<tag>...</tag>` pairs with structured bodies.
/// Last because angle-bracket markup is common in plain prose output.
fn extract_closed_markup(text: &str) -> Option<Variables> {
    let mut vars = Variables::new();
    for caps in closed_markup_re().captures_iter(text) {
        let inner = caps.get(1).map_or("", |m| m.as_str()).trim();
        if inner.is_empty() {
            continue;
        }
        if inner.starts_with('{') && inner.contains('}') {
            if let Some(parsed) = parse_json(inner) {
                vars.extend(parsed);
                continue;
            }
        }
        if looks_like_yaml(inner) {
            if let Some(parsed) = parse_yaml(inner) {
                vars.extend(parsed);
            }
        }
    }
    non_empty(vars)
}

fn non_empty(vars: Variables) -> Option<Variables> {
    if vars.is_empty() {
        None
    } else {
        Some(vars)
    }
}

fn fenced_json_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?si)```json\s*\n(.*?)(?:\n```|$)").expect("valid pattern")
    })
}

fn fenced_yaml_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?si)```ya?ml\s*\n(.*?)(?:\n```|$)").expect("valid pattern")
    })
}

fn unclosed_markup_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<[^>]+>([^<]*(?:\{.*|\w+\s*:.*))").expect("valid pattern")
    })
}

fn closed_markup_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]+>(.*?)</[^>]+>").expect("valid pattern"))
}
