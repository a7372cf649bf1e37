// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::Value;

use crate::model::Variables;

/// Indentation-driven YAML subset parser.
///
/// This is not a YAML implementation. It covers exactly what model output
/// uses: `key: value` scalars with optional single quoting, integer and
/// float coercion, nested mappings, `- item` sequences (inline after the
/// colon or on following lines), and `|`/`>` block scalars. Anchors, flow
/// collections, multi-document streams and everything else are out.
///
/// Returns `None` when no variable could be read at all.
pub fn parse_yaml(text: &str) -> Option<Variables> {
    let vars = parse_yaml_partial(text);
    if vars.is_empty() {
        None
    } else {
        Some(vars)
    }
}

/// Same grammar as [`parse_yaml`], tolerant form. Truncated trailing lines
/// simply contribute nothing; the complete pairs before them survive.
pub fn parse_yaml_partial(text: &str) -> Variables {
    let lines: Vec<&str> = text.lines().collect();
    let (vars, _) = parse_mapping(&lines, 0, None);
    vars
}

/// Parses mapping entries from `start` until a line at or above the floor
/// indentation ends the block. `floor` is `None` at the top level.
fn parse_mapping(lines: &[&str], start: usize, floor: Option<usize>) -> (Variables, usize) {
    let mut vars = Variables::new();
    let mut i = start;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            i += 1;
            continue;
        }

        let indent = indent_of(line);
        if let Some(floor) = floor {
            if indent <= floor {
                break;
            }
        }

        let Some(colon) = trimmed.find(':').filter(|&idx| idx > 0) else {
            i += 1;
            continue;
        };
        let key = trimmed[..colon].trim().to_owned();
        let after = trimmed[colon + 1..].trim();

        if after == "|" || after == ">" {
            let (value, next) = parse_block_scalar(lines, i + 1, indent, after == "|");
            vars.insert(key, Value::String(value));
            i = next;
        } else if after.starts_with('-') {
            let (items, next) = parse_sequence(lines, i, indent, Some(after));
            vars.insert(key, Value::Array(items));
            i = next;
        } else if after.is_empty() && next_line_is_dash(lines, i) {
            let (items, next) = parse_sequence(lines, i + 1, indent, None);
            vars.insert(key, Value::Array(items));
            i = next;
        } else if after.is_empty() || after == "{}" {
            let (nested, next) = parse_mapping(lines, i + 1, Some(indent));
            // A bare key with no nested block reads as an empty string at
            // the top level but stays an empty map when already nested.
            if floor.is_none() && nested.is_empty() {
                vars.insert(key, Value::String(String::new()));
            } else {
                vars.insert(key, Value::Object(nested));
            }
            i = next;
        } else {
            vars.insert(key, coerce_scalar(after));
            i += 1;
        }
    }

    (vars, i)
}

fn next_line_is_dash(lines: &[&str], i: usize) -> bool {
    lines
        .get(i + 1)
        .map(|line| line.trim().starts_with('-'))
        .unwrap_or(false)
}

fn parse_sequence(
    lines: &[&str],
    start: usize,
    base_indent: usize,
    inline_first: Option<&str>,
) -> (Vec<Value>, usize) {
    let mut items = Vec::new();
    let mut i = start;

    if let Some(first) = inline_first {
        let item = first.strip_prefix('-').unwrap_or(first).trim();
        if !item.is_empty() {
            items.push(coerce_scalar(item));
        }
        i += 1;
    }

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            i += 1;
            continue;
        }

        let dash = trimmed.starts_with('-');
        if indent_of(line) <= base_indent && !dash {
            break;
        }
        if dash {
            let item = trimmed[1..].trim();
            if !item.is_empty() {
                items.push(coerce_scalar(item));
            }
        }
        i += 1;
    }

    (items, i)
}

/// Collects the body of a `|` or `>` block scalar. Content is expected two
/// columns past the key line; shallower non-blank lines end the block.
fn parse_block_scalar(
    lines: &[&str],
    start: usize,
    base_indent: usize,
    preserve_newlines: bool,
) -> (String, usize) {
    let mut content: Vec<&str> = Vec::new();
    let mut i = start;
    let cut = base_indent + 2;

    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty() {
            content.push("");
            i += 1;
            continue;
        }
        if indent_of(line) <= base_indent {
            break;
        }
        content.push(line.get(cut..).unwrap_or(""));
        i += 1;
    }

    let value = if preserve_newlines {
        content.join("\n")
    } else {
        collapse_whitespace(&content.join(" "))
    };
    (value.trim().to_owned(), i)
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Strips one leading and one trailing quote character, then coerces
/// all-digit values to integers and `digits.digits` to floats. Everything
/// else stays a string, including mixed forms like `12abc`.
fn coerce_scalar(raw: &str) -> Value {
    let mut value = raw;
    if let Some(rest) = value.strip_prefix(['"', '\'']) {
        value = rest;
    }
    if let Some(rest) = value.strip_suffix(['"', '\'']) {
        value = rest;
    }

    let bytes = value.as_bytes();
    if !bytes.is_empty() && bytes.iter().all(u8::is_ascii_digit) {
        if let Ok(n) = value.parse::<i64>() {
            return Value::from(n);
        }
    }
    if is_simple_float(value) {
        if let Ok(f) = value.parse::<f64>() {
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Value::Number(n);
            }
        }
    }
    Value::String(value.to_owned())
}

fn is_simple_float(value: &str) -> bool {
    let Some((whole, frac)) = value.split_once('.') else {
        return false;
    };
    !whole.is_empty()
        && !frac.is_empty()
        && whole.bytes().all(|b| b.is_ascii_digit())
        && frac.bytes().all(|b| b.is_ascii_digit())
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}
