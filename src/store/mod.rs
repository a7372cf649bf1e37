// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Config resolution, persistence, and import/export.
//!
//! Two storage locations exist for a character's template config: embedded
//! in the character record (travels with card exports) and the binding
//! shadow copy in the extension settings. Resolution prefers an enabled
//! embedded config; saves write both so either survives alone.

use std::fmt;

use serde_json::Value;

use crate::host::Host;
use crate::model::{AvatarId, CharacterTemplateConfig, ExtensionSettings, PipelineState};

#[cfg(test)]
mod tests;

/// Config shown in the editor for the currently selected character.
///
/// Unlike [`char_template`] this ignores the enabled flags: the editor must
/// show a disabled config rather than a blank one.
pub fn current_char_config<H: Host>(host: &H) -> CharacterTemplateConfig {
    let Some(avatar) = host.current_avatar() else {
        return CharacterTemplateConfig::default();
    };
    if let Some(embedded) = host.embedded_config(&avatar) {
        return embedded;
    }
    host.settings()
        .character_bindings
        .get(&avatar)
        .cloned()
        .unwrap_or_default()
}

/// Effective template config for a message's avatar, or `None` when no
/// enabled config applies. Results are cached per avatar in the pipeline
/// state; the cache is dropped on any save or character switch.
pub fn char_template<H: Host>(
    host: &H,
    state: &mut PipelineState,
    avatar: &AvatarId,
) -> Option<CharacterTemplateConfig> {
    if !host.settings().enabled {
        return None;
    }
    if let Some(cached) = state.cached_template(avatar) {
        return cached.clone();
    }

    // Embedded configs only exist for the loaded character.
    let embedded = (host.current_avatar().as_ref() == Some(avatar))
        .then(|| host.embedded_config(avatar))
        .flatten()
        .filter(|config| config.enabled);

    let resolved = embedded.or_else(|| {
        host.settings()
            .character_bindings
            .get(avatar)
            .filter(|config| config.enabled)
            .cloned()
    });

    state.cache_template(avatar.clone(), resolved.clone());
    resolved
}

/// Persists a config for the current character: embedded first, then the
/// binding mirror, then a debounced settings save.
pub fn save_current_char<H: Host>(
    host: &mut H,
    state: &mut PipelineState,
    config: CharacterTemplateConfig,
) -> Result<(), crate::host::HostApiError> {
    let Some(avatar) = host.current_avatar() else {
        return Ok(());
    };
    state.invalidate_templates();
    host.write_embedded_config(&avatar, Some(&config))?;
    host.settings_mut()
        .character_bindings
        .insert(avatar, config);
    host.save_settings_debounced();
    Ok(())
}

#[derive(Debug)]
pub enum ImportError {
    Format(serde_json::Error),
    NotAnObject,
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Format(err) => write!(f, "invalid import file: {err}"),
            ImportError::NotAnObject => write!(f, "import file is not a settings object"),
        }
    }
}

impl std::error::Error for ImportError {}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::Format(err)
    }
}

/// A file ready to hand to the host's download facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub contents: String,
}

/// Exports the current character's config, `None` without a character.
pub fn export_character<H: Host>(host: &H) -> Result<Option<ExportFile>, serde_json::Error> {
    let Some(name) = host.current_character_name() else {
        return Ok(None);
    };
    let config = current_char_config(host);
    Ok(Some(ExportFile {
        filename: format!("xiaobai-template-{name}.json"),
        contents: serde_json::to_string_pretty(&config)?,
    }))
}

pub fn export_global<H: Host>(host: &H) -> Result<ExportFile, serde_json::Error> {
    Ok(ExportFile {
        filename: "xiaobai-template-global-settings.json".to_owned(),
        contents: serde_json::to_string_pretty(host.settings())?,
    })
}

/// Parses a character config export. Missing fields take their defaults,
/// so files from older versions still load.
pub fn parse_character_import(json: &str) -> Result<CharacterTemplateConfig, ImportError> {
    Ok(serde_json::from_str(json)?)
}

/// Merges a global settings export over the live settings. Keys absent from
/// the file keep their current values. Nothing is modified when the file
/// does not parse.
pub fn apply_global_import<H: Host>(
    host: &mut H,
    state: &mut PipelineState,
    json: &str,
) -> Result<(), ImportError> {
    let incoming: Value = serde_json::from_str(json)?;
    let Value::Object(incoming) = incoming else {
        return Err(ImportError::NotAnObject);
    };

    let mut merged = serde_json::to_value(host.settings())?;
    if let Value::Object(map) = &mut merged {
        map.extend(incoming);
    }
    let settings: ExtensionSettings = serde_json::from_value(merged)?;

    *host.settings_mut() = settings;
    state.invalidate_templates();
    host.save_settings_debounced();
    Ok(())
}

/// Editor status line for the current character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateStatus {
    NoCharacter,
    Configured { name: String },
    NotConfigured { name: String },
}

pub fn status<H: Host>(host: &H) -> TemplateStatus {
    let Some(name) = host.current_character_name() else {
        return TemplateStatus::NoCharacter;
    };
    let config = current_char_config(host);
    if config.enabled && !config.template.is_empty() {
        TemplateStatus::Configured { name }
    } else {
        TemplateStatus::NotConfigured { name }
    }
}
