// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Shared test fixtures for chat and configuration data.

use serde_json::Value;

use super::config::CharacterTemplateConfig;
use super::message::Message;
use super::vars::Variables;

pub(crate) fn enabled_config(template: &str) -> CharacterTemplateConfig {
    CharacterTemplateConfig {
        enabled: true,
        template: template.to_owned(),
        ..CharacterTemplateConfig::default()
    }
}

pub(crate) fn tagged_message(pairs: &[(&str, &str)]) -> Message {
    let mut body = String::from("Narration before the data block.\n");
    for (name, value) in pairs {
        body.push_str(&format!("[{name}]{value}[/{name}]\n"));
    }
    Message::assistant(&body)
}

/// Short conversation: greeting, user reply, three tagged assistant turns.
pub(crate) fn chat_with_tags() -> Vec<Message> {
    vec![
        Message::assistant("Welcome, traveler."),
        Message::user("Hello there."),
        tagged_message(&[("hp", "100"), ("mood", "calm")]),
        tagged_message(&[("hp", "85"), ("mood", "wary")]),
        tagged_message(&[("hp", "85"), ("mood", "alarmed")]),
    ]
}

pub(crate) fn vars_from(pairs: &[(&str, Value)]) -> Variables {
    let mut vars = Variables::new();
    for (name, value) in pairs {
        vars.insert((*name).to_owned(), value.clone());
    }
    vars
}
