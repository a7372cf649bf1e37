// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, HashMap};

use super::config::CharacterTemplateConfig;
use super::history::VariableHistory;
use super::ids::{AvatarId, MessageId};
use super::vars::Variables;

/// Non-owning reference to a host-owned embedding element.
///
/// The host DOM owns the element; it may be destroyed and recreated by the
/// host's own re-render at any time, so holders must revalidate against the
/// surface before use and treat a stale handle as "not found".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHandle {
    message_id: MessageId,
    frame_id: String,
}

impl FrameHandle {
    pub fn new(message_id: MessageId, frame_id: impl Into<String>) -> Self {
        Self {
            message_id,
            frame_id: frame_id.into(),
        }
    }

    pub fn message_id(&self) -> MessageId {
        self.message_id
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }
}

/// Per-message pipeline state, threaded explicitly through the pipeline.
///
/// Lifecycle follows the conversation: `reset()` on conversation or
/// character transition, `clear_message()` when a single message falls out
/// of the recent window. There is deliberately no module-level singleton.
#[derive(Debug, Default)]
pub struct PipelineState {
    variables: HashMap<MessageId, Variables>,
    history: HashMap<MessageId, BTreeMap<String, VariableHistory>>,
    template_cache: HashMap<AvatarId, Option<CharacterTemplateConfig>>,
    frame_cache: HashMap<MessageId, FrameHandle>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variables(&self, id: MessageId) -> Option<&Variables> {
        self.variables.get(&id)
    }

    /// Replaces the extracted variables for a message. Each extraction pass
    /// supersedes the previous one wholesale; there is no merging.
    pub fn set_variables(&mut self, id: MessageId, vars: Variables) {
        self.variables.insert(id, vars);
    }

    pub fn record_history(&mut self, id: MessageId, vars: &Variables) {
        let per_message = self.history.entry(id).or_default();
        for (name, value) in vars {
            per_message.entry(name.clone()).or_default().record(value);
        }
    }

    pub fn history(&self, id: MessageId, name: &str) -> Option<&VariableHistory> {
        self.history.get(&id).and_then(|h| h.get(name))
    }

    pub fn cached_template(&self, avatar: &AvatarId) -> Option<&Option<CharacterTemplateConfig>> {
        self.template_cache.get(avatar)
    }

    pub fn cache_template(&mut self, avatar: AvatarId, config: Option<CharacterTemplateConfig>) {
        self.template_cache.insert(avatar, config);
    }

    pub fn invalidate_templates(&mut self) {
        self.template_cache.clear();
    }

    pub fn frame(&self, id: MessageId) -> Option<&FrameHandle> {
        self.frame_cache.get(&id)
    }

    pub fn cache_frame(&mut self, handle: FrameHandle) {
        self.frame_cache.insert(handle.message_id(), handle);
    }

    pub fn drop_frame(&mut self, id: MessageId) {
        self.frame_cache.remove(&id);
    }

    /// Drops everything recorded for one message id.
    pub fn clear_message(&mut self, id: MessageId) {
        self.variables.remove(&id);
        self.history.remove(&id);
        self.frame_cache.remove(&id);
    }

    /// Drops per-message data for the whole conversation, keeping the
    /// template cache (configs do not change on a reapply pass).
    pub fn clear_messages(&mut self) {
        self.variables.clear();
        self.history.clear();
        self.frame_cache.clear();
    }

    /// Full reset for a conversation or character transition.
    pub fn reset(&mut self) {
        self.clear_messages();
        self.template_cache.clear();
    }
}
