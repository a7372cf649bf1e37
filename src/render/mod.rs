// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Template rendering: `[[name]]` placeholder substitution.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::model::Variables;


/// Marker attribute on substituted spans. The frame-side script targets it
/// for in-place live updates without a full document rewrite.
pub const VAR_ATTR: &str = "data-xiaobaix-var";

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("valid pattern"))
}

/// Substitutes every `[[name]]` in the template.
///
/// Each placeholder becomes a `<bdi>` span tagged with [`VAR_ATTR`] so it
/// stays addressable after the document is live. Unknown names render as an
/// empty span rather than leaking the placeholder. Rendering is total and
/// idempotent; the output contains no `[[name]]` forms the input did not
/// already carry inside variable values.
pub fn render_template(template: &str, vars: &Variables) -> String {
    placeholder_re()
        .replace_all(template, |caps: &Captures<'_>| {
            let name = caps[1].trim();
            let value = vars.get(name).map(stringify_value).unwrap_or_default();
            format!(
                "<bdi {}=\"{}\">{}</bdi>",
                VAR_ATTR,
                escape_attr(name),
                value
            )
        })
        .into_owned()
}

/// Display form of a variable value. Strings pass through unchanged so
/// authors can embed markup; containers fall back to JSON text.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                nested => nested.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        object @ Value::Object(_) => object.to_string(),
    }
}

/// True when rendered output is a standalone document that must go into an
/// isolated frame instead of inline message HTML.
pub fn is_document_like(rendered: &str) -> bool {
    rendered.contains("<html")
        || rendered.contains("<!DOCTYPE")
        || rendered.contains("<script")
}

fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}
