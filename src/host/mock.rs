// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-memory host and surface used by the unit tests.

use std::collections::HashMap;

use crate::embed::{EmbedError, EmbedSurface, FrameState, PreparedEmbed, WireMessage};
use crate::model::{
    AvatarId, CharacterTemplateConfig, ExtensionSettings, Message, MessageId, Variables,
};

use super::{CommitOptions, Host, HostApiError, NoticeLevel};

pub(crate) struct MockHost {
    pub chat: Vec<Message>,
    pub settings: ExtensionSettings,
    pub avatar: Option<AvatarId>,
    pub name: Option<String>,
    pub embedded: HashMap<AvatarId, CharacterTemplateConfig>,
    pub committed: Vec<(MessageId, bool)>,
    pub saves: usize,
    pub notices: Vec<(NoticeLevel, String)>,
    pub substitution_available: bool,
}

impl MockHost {
    pub fn new(chat: Vec<Message>) -> Self {
        Self {
            chat,
            settings: ExtensionSettings::default(),
            avatar: Some(AvatarId::from("alice.png")),
            name: Some("Alice".to_owned()),
            embedded: HashMap::new(),
            committed: Vec::new(),
            saves: 0,
            notices: Vec::new(),
            substitution_available: true,
        }
    }

    pub fn with_config(mut self, config: CharacterTemplateConfig) -> Self {
        if let Some(avatar) = self.avatar.clone() {
            self.settings.character_bindings.insert(avatar, config);
        }
        self
    }
}

impl Host for MockHost {
    fn chat(&self) -> &[Message] {
        &self.chat
    }

    fn message_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.chat.get_mut(id.index())
    }

    fn commit_message(&mut self, id: MessageId, options: CommitOptions) {
        self.committed.push((id, options.rerender));
    }

    fn current_avatar(&self) -> Option<AvatarId> {
        self.avatar.clone()
    }

    fn current_character_name(&self) -> Option<String> {
        self.name.clone()
    }

    fn avatar_for_message(&self, id: MessageId) -> Option<AvatarId> {
        let message = self.message(id)?;
        message
            .original_avatar
            .as_deref()
            .map(AvatarId::from)
            .or_else(|| self.avatar.clone())
    }

    fn embedded_config(&self, avatar: &AvatarId) -> Option<CharacterTemplateConfig> {
        self.embedded.get(avatar).cloned()
    }

    fn write_embedded_config(
        &mut self,
        avatar: &AvatarId,
        config: Option<&CharacterTemplateConfig>,
    ) -> Result<(), HostApiError> {
        match config {
            Some(config) => {
                self.embedded.insert(avatar.clone(), config.clone());
            }
            None => {
                self.embedded.remove(avatar);
            }
        }
        Ok(())
    }

    fn settings(&self) -> &ExtensionSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut ExtensionSettings {
        &mut self.settings
    }

    fn save_settings_debounced(&mut self) {
        self.saves += 1;
    }

    fn substitute_params(&self, text: &str) -> Result<String, HostApiError> {
        if !self.substitution_available {
            return Err(HostApiError::Unavailable("substitute_params"));
        }
        let name = self.name.as_deref().unwrap_or("");
        Ok(text.replace("{{char}}", name))
    }

    fn notify(&mut self, level: NoticeLevel, text: &str) {
        self.notices.push((level, text.to_owned()));
    }
}

#[derive(Default)]
pub(crate) struct MockSurface {
    pub states: HashMap<MessageId, FrameState>,
    pub posted: Vec<(MessageId, WireMessage)>,
    pub called: Vec<(MessageId, Variables)>,
    pub committed: Vec<(MessageId, PreparedEmbed)>,
    pub heights: HashMap<MessageId, f64>,
    /// State a frame lands in right after `commit_document`.
    pub state_after_commit: Option<FrameState>,
}

impl MockSurface {
    pub fn new() -> Self {
        Self {
            state_after_commit: Some(FrameState::Ready),
            ..Self::default()
        }
    }
}

impl EmbedSurface for MockSurface {
    fn frame_state(&self, id: MessageId) -> FrameState {
        self.states.get(&id).copied().unwrap_or(FrameState::Missing)
    }

    fn commit_document(&mut self, id: MessageId, embed: &PreparedEmbed) -> Result<(), EmbedError> {
        self.committed.push((id, embed.clone()));
        if let Some(state) = self.state_after_commit {
            self.states.insert(id, state);
        }
        Ok(())
    }

    fn post_to_frame(&mut self, id: MessageId, message: &WireMessage) -> Result<(), EmbedError> {
        if self.frame_state(id) == FrameState::Missing {
            return Err(EmbedError::FrameMissing(id));
        }
        self.posted.push((id, message.clone()));
        Ok(())
    }

    fn call_update(&mut self, id: MessageId, vars: &Variables) -> Result<(), EmbedError> {
        if self.frame_state(id) != FrameState::Ready {
            return Err(EmbedError::FrameMissing(id));
        }
        self.called.push((id, vars.clone()));
        Ok(())
    }

    fn set_frame_height(&mut self, id: MessageId, height: f64) {
        self.heights.insert(id, height);
    }
}
