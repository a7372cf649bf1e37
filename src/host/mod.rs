// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The chat host as the engine sees it.
//!
//! Everything the pipeline needs from the surrounding application sits
//! behind [`Host`]: the message list, the active character, persisted
//! settings, and a handful of host services. The engine stays free of any
//! particular UI or storage layer, and tests drive it with an in-memory
//! implementation.

use std::fmt;

use crate::model::{AvatarId, CharacterTemplateConfig, ExtensionSettings, Message, MessageId};

#[cfg(test)]
pub(crate) mod mock;

/// Host-side happenings the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// A message finished rendering or was edited.
    MessageUpdated(MessageId),
    /// The user swiped to an alternate generation of a message.
    MessageSwiped(MessageId),
    /// A streaming token batch landed in a message still being generated.
    StreamTokenReceived(MessageId),
    /// Generation finished, successfully or not.
    GenerationEnded,
    /// A different conversation was loaded.
    ChatChanged,
    /// A different character was selected.
    CharacterSelected,
}

/// How a message edit should be committed back to the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitOptions {
    /// Ask the host to re-render the message block in its UI.
    pub rerender: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A host service the engine asked for was not there. Hosts evolve
/// independently of the extension, so this is an expected condition, not a
/// bug path.
#[derive(Debug)]
pub enum HostApiError {
    Unavailable(&'static str),
}

impl fmt::Display for HostApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostApiError::Unavailable(what) => write!(f, "host api unavailable: {what}"),
        }
    }
}

impl std::error::Error for HostApiError {}

pub trait Host {
    fn chat(&self) -> &[Message];

    fn message(&self, id: MessageId) -> Option<&Message> {
        self.chat().get(id.index())
    }

    fn message_mut(&mut self, id: MessageId) -> Option<&mut Message>;

    /// Persists an edited message and optionally re-renders it.
    fn commit_message(&mut self, id: MessageId, options: CommitOptions);

    /// Avatar of the currently selected character.
    fn current_avatar(&self) -> Option<AvatarId>;

    fn current_character_name(&self) -> Option<String>;

    /// Avatar attribution for one message. Falls back to the current
    /// character when the message itself carries none.
    fn avatar_for_message(&self, id: MessageId) -> Option<AvatarId>;

    /// Template config stored on the character record itself, enabled or
    /// not. Distinct from the binding shadow copy in the settings tree.
    fn embedded_config(&self, avatar: &AvatarId) -> Option<CharacterTemplateConfig>;

    fn write_embedded_config(
        &mut self,
        avatar: &AvatarId,
        config: Option<&CharacterTemplateConfig>,
    ) -> Result<(), HostApiError>;

    fn settings(&self) -> &ExtensionSettings;

    fn settings_mut(&mut self) -> &mut ExtensionSettings;

    /// Schedules a settings save; the host coalesces bursts.
    fn save_settings_debounced(&mut self);

    /// Expands host macros (`{{user}}`, `{{char}}`, ...) in text.
    fn substitute_params(&self, text: &str) -> Result<String, HostApiError>;

    /// User-facing toast.
    fn notify(&mut self, level: NoticeLevel, text: &str);
}
