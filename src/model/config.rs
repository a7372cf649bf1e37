// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

/// Default tag grammar: `[name]body[/name]`, body may span lines.
pub const DEFAULT_CUSTOM_REGEX: &str = r"\[([^\]]+)\]([\s\S]*?)\[\/\1\]";

/// Per-character template configuration.
///
/// Serialized in camelCase so exported files round-trip with configs written
/// by the original browser extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterTemplateConfig {
    pub enabled: bool,
    pub template: String,
    pub custom_regex: String,
    pub limit_to_recent_messages: bool,
    pub recent_message_count: usize,
    pub skip_first_message: bool,
}

impl Default for CharacterTemplateConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            template: String::new(),
            custom_regex: DEFAULT_CUSTOM_REGEX.to_owned(),
            limit_to_recent_messages: false,
            recent_message_count: 5,
            skip_first_message: false,
        }
    }
}

impl CharacterTemplateConfig {
    /// Effective recent-message window; the count is clamped to at least 1.
    pub fn recent_window(&self) -> usize {
        self.recent_message_count.max(1)
    }
}
