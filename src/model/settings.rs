// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::config::CharacterTemplateConfig;
use super::ids::AvatarId;

/// Extension-wide settings tree, persisted by the host.
///
/// `character_bindings` is the shadow copy of per-character configs keyed by
/// avatar. A config embedded in the character record itself, when present and
/// enabled, takes precedence over the binding for the same avatar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtensionSettings {
    pub enabled: bool,
    pub sandbox_mode: bool,
    pub character_bindings: BTreeMap<AvatarId, CharacterTemplateConfig>,
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sandbox_mode: false,
            character_bindings: BTreeMap::new(),
        }
    }
}
