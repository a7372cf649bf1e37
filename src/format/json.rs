// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::model::Variables;

fn string_pair() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^"([^"]+)"\s*:\s*"([^"]*)",?$"#).expect("valid pattern"))
}

fn int_pair() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^"([^"]+)"\s*:\s*(\d+),?$"#).expect("valid pattern"))
}

fn array_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^"([^"]+)"\s*:\s*\[(.*)$"#).expect("valid pattern"))
}

fn object_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^"([^"]+)"\s*:\s*\{(.*)$"#).expect("valid pattern"))
}

/// Strict-first JSON parse.
///
/// A complete top-level object wins outright. A complete non-object value
/// (array, scalar) is a miss rather than a partial candidate: there are no
/// named variables in it. Anything that fails the strict parse goes through
/// the line salvager, and an empty salvage is also a miss.
pub fn parse_json(text: &str) -> Option<Variables> {
    let trimmed = text.trim();
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(_) => {
            let vars = parse_json_partial(trimmed);
            if vars.is_empty() {
                None
            } else {
                Some(vars)
            }
        }
    }
}

enum Nested {
    None,
    Array { key: String, fragment: String, depth: i64 },
    Object { key: String, fragment: String, depth: i64 },
}

/// Salvages complete key/value pairs out of a truncated JSON object.
///
/// Works line by line, so it assumes the pretty-printed one-pair-per-line
/// shape models emit. Compact single-line JSON that fails the strict parse
/// yields nothing here. Nested arrays get bracket-balance tracking plus a
/// small set of closing repairs for the truncated tail; nested objects that
/// cannot be repaired are kept as their raw text so the variable still
/// renders. Unrecognized lines are skipped silently.
pub fn parse_json_partial(text: &str) -> Variables {
    let mut vars = Variables::new();
    let trimmed = text.trim();
    if !trimmed.starts_with('{') {
        return vars;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return map;
    }

    let mut nested = Nested::None;
    for line in trimmed.lines() {
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() || line_trimmed == "{" || line_trimmed == "}" {
            continue;
        }

        if matches!(nested, Nested::None) {
            if let Some(caps) = string_pair().captures(line_trimmed) {
                vars.insert(caps[1].to_owned(), Value::String(caps[2].to_owned()));
                continue;
            }

            if let Some(caps) = int_pair().captures(line_trimmed) {
                if let Ok(n) = caps[2].parse::<i64>() {
                    vars.insert(caps[1].to_owned(), Value::from(n));
                }
                continue;
            }

            if let Some(caps) = array_start().captures(line_trimmed) {
                let key = caps[1].to_owned();
                let fragment = format!("[{}", &caps[2]);
                let depth = 1 + bracket_balance(&caps[2], b'[', b']');
                if depth == 0 {
                    // Inline close: plain parse only, no repairs.
                    if let Ok(value) = serde_json::from_str::<Value>(&fragment) {
                        vars.insert(key, value);
                    }
                } else {
                    nested = Nested::Array { key, fragment, depth };
                }
                continue;
            }

            if let Some(caps) = object_start().captures(line_trimmed) {
                let key = caps[1].to_owned();
                let fragment = format!("{{{}", &caps[2]);
                let depth = 1 + bracket_balance(&caps[2], b'{', b'}');
                if depth == 0 {
                    if let Ok(value) = serde_json::from_str::<Value>(&fragment) {
                        vars.insert(key, value);
                    }
                } else {
                    nested = Nested::Object { key, fragment, depth };
                }
                continue;
            }
        }

        match &mut nested {
            Nested::Array { key, fragment, depth } => {
                fragment.push('\n');
                fragment.push_str(line);
                *depth += bracket_balance(line_trimmed, b'[', b']');
                if *depth <= 0 {
                    if let Some(value) = parse_array_fragment(fragment) {
                        vars.insert(key.clone(), value);
                    }
                    nested = Nested::None;
                }
            }
            Nested::Object { key, fragment, depth } => {
                fragment.push('\n');
                fragment.push_str(line);
                *depth += bracket_balance(line_trimmed, b'{', b'}');
                if *depth <= 0 {
                    let value = parse_object_fragment(fragment)
                        .unwrap_or_else(|| Value::String(fragment.clone()));
                    vars.insert(key.clone(), value);
                    nested = Nested::None;
                }
            }
            Nested::None => {}
        }
    }

    // Truncated mid-container at end of input: try to close it ourselves.
    match nested {
        Nested::Array { key, fragment, .. } if !fragment.is_empty() => {
            let cleaned = strip_trailing_comma(&fragment);
            let attempts = [
                format!("{fragment}]"),
                format!("{cleaned}]"),
                format!("{fragment}\"]"),
            ];
            if let Some(value) = first_parse(&attempts) {
                vars.insert(key, value);
            }
        }
        Nested::Object { key, fragment, .. } if !fragment.is_empty() => {
            let cleaned = strip_trailing_comma(&fragment);
            let attempts = [format!("{fragment}}}"), format!("{cleaned}}}")];
            if let Some(value) = first_parse(&attempts) {
                vars.insert(key, value);
            }
        }
        _ => {}
    }

    vars
}

fn parse_array_fragment(fragment: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(fragment) {
        return Some(value);
    }
    let cleaned = strip_trailing_comma(fragment);
    let attempts = [
        cleaned.to_string(),
        format!("{cleaned}\"]"),
        format!("{cleaned}]"),
    ];
    first_parse(&attempts)
}

fn parse_object_fragment(fragment: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(fragment) {
        return Some(value);
    }
    serde_json::from_str::<Value>(strip_trailing_comma(fragment)).ok()
}

fn first_parse(attempts: &[String]) -> Option<Value> {
    attempts
        .iter()
        .find_map(|attempt| serde_json::from_str::<Value>(attempt).ok())
}

fn strip_trailing_comma(fragment: &str) -> &str {
    let end = fragment.trim_end();
    end.strip_suffix(',').unwrap_or(end)
}

fn bracket_balance(text: &str, open: u8, close: u8) -> i64 {
    let mut balance = 0;
    for &b in text.as_bytes() {
        if b == open {
            balance += 1;
        } else if b == close {
            balance -= 1;
        }
    }
    balance
}
