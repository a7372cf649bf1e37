// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use memchr::memchr;

/// A text is JSON-shaped when its first non-whitespace byte opens an object
/// or an array.
pub fn looks_like_json(text: &str) -> bool {
    matches!(text.trim_start().as_bytes().first(), Some(b'{') | Some(b'['))
}

/// Cheap YAML sniff: not JSON-shaped, and at least one non-blank,
/// non-comment line reads `key: ...` with an identifier-like key.
///
/// The colon must not be the first character of the line, so a stray
/// `: value` fragment does not pass.
pub fn looks_like_yaml(text: &str) -> bool {
    if looks_like_json(text) {
        return false;
    }
    text.lines().any(is_yaml_mapping_line)
}

fn is_yaml_mapping_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return false;
    }
    match memchr(b':', trimmed.as_bytes()) {
        Some(0) | None => false,
        Some(idx) => is_identifier(trimmed[..idx].trim()),
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
