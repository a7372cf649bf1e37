// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::*;
use crate::host::mock::MockHost;
use crate::model::fixtures::enabled_config;
use crate::model::DEFAULT_CUSTOM_REGEX;

fn avatar() -> AvatarId {
    AvatarId::from("alice.png")
}

#[test]
fn disabled_extension_resolves_nothing() {
    let mut host = MockHost::new(Vec::new()).with_config(enabled_config("[[hp]]"));
    host.settings.enabled = false;
    let mut state = PipelineState::new();
    assert_eq!(char_template(&host, &mut state, &avatar()), None);
}

#[test]
fn enabled_binding_resolves() {
    let host = MockHost::new(Vec::new()).with_config(enabled_config("[[hp]]"));
    let mut state = PipelineState::new();
    let config = char_template(&host, &mut state, &avatar()).expect("config");
    assert_eq!(config.template, "[[hp]]");
}

#[test]
fn disabled_binding_resolves_to_none() {
    let mut config = enabled_config("[[hp]]");
    config.enabled = false;
    let host = MockHost::new(Vec::new()).with_config(config);
    let mut state = PipelineState::new();
    assert_eq!(char_template(&host, &mut state, &avatar()), None);
}

#[test]
fn enabled_embedded_config_wins_over_binding() {
    let mut host = MockHost::new(Vec::new()).with_config(enabled_config("from-binding"));
    host.embedded
        .insert(avatar(), enabled_config("from-card"));
    let mut state = PipelineState::new();
    let config = char_template(&host, &mut state, &avatar()).expect("config");
    assert_eq!(config.template, "from-card");
}

#[test]
fn disabled_embedded_config_falls_back_to_binding() {
    let mut host = MockHost::new(Vec::new()).with_config(enabled_config("from-binding"));
    let mut embedded = enabled_config("from-card");
    embedded.enabled = false;
    host.embedded.insert(avatar(), embedded);
    let mut state = PipelineState::new();
    let config = char_template(&host, &mut state, &avatar()).expect("config");
    assert_eq!(config.template, "from-binding");
}

#[test]
fn embedded_config_of_another_character_is_ignored() {
    let mut host = MockHost::new(Vec::new());
    host.embedded
        .insert(AvatarId::from("bob.png"), enabled_config("bobs"));
    let mut state = PipelineState::new();
    assert_eq!(
        char_template(&host, &mut state, &AvatarId::from("bob.png")),
        None
    );
}

#[test]
fn resolution_is_cached_until_invalidated() {
    let mut host = MockHost::new(Vec::new()).with_config(enabled_config("[[hp]]"));
    let mut state = PipelineState::new();
    char_template(&host, &mut state, &avatar()).expect("config");

    // A settings change without invalidation is not observed.
    host.settings.character_bindings.clear();
    assert!(char_template(&host, &mut state, &avatar()).is_some());

    state.invalidate_templates();
    assert_eq!(char_template(&host, &mut state, &avatar()), None);
}

#[test]
fn editor_view_shows_disabled_configs() {
    let mut config = enabled_config("[[hp]]");
    config.enabled = false;
    let host = MockHost::new(Vec::new()).with_config(config);
    assert_eq!(current_char_config(&host).template, "[[hp]]");
}

#[test]
fn save_writes_both_locations_and_drops_the_cache() {
    let mut host = MockHost::new(Vec::new());
    let mut state = PipelineState::new();
    state.cache_template(avatar(), None);

    save_current_char(&mut host, &mut state, enabled_config("[[hp]]")).expect("save");

    assert_eq!(
        host.embedded.get(&avatar()).map(|c| c.template.as_str()),
        Some("[[hp]]")
    );
    assert!(host.settings.character_bindings.contains_key(&avatar()));
    assert_eq!(host.saves, 1);
    assert!(state.cached_template(&avatar()).is_none());
}

#[test]
fn character_export_round_trips() {
    let host = MockHost::new(Vec::new()).with_config(enabled_config("[[hp]]"));
    let export = export_character(&host).expect("serialize").expect("file");
    assert_eq!(export.filename, "xiaobai-template-Alice.json");
    let parsed = parse_character_import(&export.contents).expect("parse");
    assert_eq!(parsed.template, "[[hp]]");
}

#[test]
fn character_import_fills_missing_fields_with_defaults() {
    let parsed = parse_character_import(r#"{"template": "[[hp]]"}"#).expect("parse");
    assert_eq!(parsed.template, "[[hp]]");
    assert_eq!(parsed.custom_regex, DEFAULT_CUSTOM_REGEX);
    assert!(!parsed.enabled);
}

#[test]
fn character_import_rejects_malformed_files() {
    assert!(parse_character_import("not json").is_err());
}

#[test]
fn global_import_merges_over_current_settings() {
    let mut host = MockHost::new(Vec::new()).with_config(enabled_config("[[hp]]"));
    host.settings.sandbox_mode = true;
    let mut state = PipelineState::new();

    apply_global_import(&mut host, &mut state, r#"{"enabled": false}"#).expect("import");

    assert!(!host.settings.enabled);
    // Keys absent from the file survive.
    assert!(host.settings.sandbox_mode);
    assert!(host.settings.character_bindings.contains_key(&avatar()));
    assert_eq!(host.saves, 1);
}

#[test]
fn global_import_leaves_settings_alone_on_bad_input() {
    let mut host = MockHost::new(Vec::new());
    let mut state = PipelineState::new();
    assert!(apply_global_import(&mut host, &mut state, "[1, 2]").is_err());
    assert!(host.settings.enabled);
    assert_eq!(host.saves, 0);
}

#[test]
fn status_reflects_configuration() {
    let mut host = MockHost::new(Vec::new());
    assert_eq!(
        status(&host),
        TemplateStatus::NotConfigured {
            name: "Alice".to_owned()
        }
    );

    host.settings
        .character_bindings
        .insert(avatar(), enabled_config("[[hp]]"));
    assert_eq!(
        status(&host),
        TemplateStatus::Configured {
            name: "Alice".to_owned()
        }
    );

    host.avatar = None;
    host.name = None;
    assert_eq!(status(&host), TemplateStatus::NoCharacter);
}
