// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Event-driven pipeline controller.
//!
//! [`Controller`] owns all mutable engine state and reacts to host events.
//! It is single-threaded and cooperative: every entry point borrows the
//! host and surface for the duration of the call, and the short settle
//! delays before processing give the host's own rendering a chance to
//! finish first.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::embed::{self, EmbedOptions, EmbedSurface, FrameState, PreparedEmbed};
use crate::extract::{extract_vars, RegexCache};
use crate::host::{CommitOptions, Host, HostEvent};
use crate::model::{AvatarId, CharacterTemplateConfig, FrameHandle, MessageId, PipelineState};
use crate::render::{is_document_like, render_template};
use crate::store;

pub mod intercept;


pub use intercept::{InterceptOutcome, SetTextAction, TextRegion};

/// Pause before processing an updated message, letting the host's own
/// render of it settle.
pub const SETTLE_DELAY: Duration = Duration::from_millis(150);
/// Longer settle for whole-conversation transitions.
pub const REAPPLY_SETTLE_DELAY: Duration = Duration::from_millis(300);
/// Delay between committing a frame document and pushing variables at it.
pub const EMBED_UPDATE_DELAY: Duration = Duration::from_millis(300);
/// Streaming re-extraction cadence.
pub const STREAM_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Messages re-processed per scheduling slice during a reapply pass.
pub const REAPPLY_CHUNK: usize = 10;

#[derive(Debug, Default)]
pub struct Controller {
    state: PipelineState,
    regex_cache: RegexCache,
    streaming_check_active: bool,
    generating: bool,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Whether [`Controller::streaming_tick`] rounds should be running.
    /// Set by the first stream token of a generation, cleared when it ends.
    pub fn streaming(&self) -> bool {
        self.generating
    }

    /// Reacts to one host event. For `StreamTokenReceived` this only arms
    /// the streaming flag; the caller drives [`Controller::streaming_tick`]
    /// while [`Controller::streaming`] holds.
    pub async fn handle_event<H: Host, S: EmbedSurface>(
        &mut self,
        host: &mut H,
        surface: &mut S,
        event: HostEvent,
    ) {
        match event {
            HostEvent::MessageUpdated(id) => {
                sleep(SETTLE_DELAY).await;
                self.process(host, surface, id).await;
            }
            HostEvent::MessageSwiped(id) => {
                self.stop_streaming();
                sleep(SETTLE_DELAY).await;
                self.process(host, surface, id).await;
                // The swipe re-render may have replaced the frame document;
                // push the freshly extracted variables at it again.
                if let Some(vars) = self.state.variables(id).cloned() {
                    sleep(EMBED_UPDATE_DELAY).await;
                    if let Err(err) = embed::update_variables(surface, id, &vars) {
                        debug!(%err, "post-swipe variable refresh skipped");
                    }
                }
            }
            HostEvent::StreamTokenReceived(_) => {
                if !self.streaming_check_active {
                    self.streaming_check_active = true;
                    self.generating = true;
                }
            }
            HostEvent::GenerationEnded => {
                self.stop_streaming();
                if let Some(last) = host.chat().len().checked_sub(1) {
                    sleep(SETTLE_DELAY).await;
                    self.process(host, surface, MessageId::new(last)).await;
                }
            }
            HostEvent::ChatChanged | HostEvent::CharacterSelected => {
                self.state.reset();
                sleep(REAPPLY_SETTLE_DELAY).await;
                self.reapply_all(host, surface).await;
            }
        }
    }

    /// Full pipeline for one message: eligibility gates, extraction,
    /// rendering, display commit, and frame delivery.
    ///
    /// All engine state is committed before the first await, so a
    /// re-entrant event observing this message mid-flight sees the new
    /// variables rather than the old ones.
    pub async fn process<H: Host, S: EmbedSurface>(
        &mut self,
        host: &mut H,
        surface: &mut S,
        id: MessageId,
    ) {
        if !host.settings().enabled {
            return;
        }
        let Some(message) = host.message(id) else {
            return;
        };
        if message.force_avatar || message.is_user || message.is_system {
            return;
        }
        let mes = message.mes.clone();

        let Some(avatar) = host.avatar_for_message(id) else {
            return;
        };
        let Some(config) = store::char_template(host, &mut self.state, &avatar) else {
            return;
        };

        if config.skip_first_message && id.index() == 0 {
            return;
        }
        if config.limit_to_recent_messages && self.outside_window(host, &config, id) {
            self.clear_message(host, id);
            return;
        }

        let vars = extract_vars(&mes, Some(&config.custom_regex), &mut self.regex_cache);
        self.state.set_variables(id, vars.clone());
        self.state.record_history(id, &vars);

        let mut display_text = render_template(&config.template, &vars);
        let mut prepared: Option<PreparedEmbed> = None;

        if is_document_like(&display_text) {
            let options = EmbedOptions {
                sandbox: host.settings().sandbox_mode,
            };
            let embed = embed::prepare_embed(host, &display_text, options);
            display_text = embed.wrapper_html.clone();

            // Only one live frame per character in windowed mode.
            if config.limit_to_recent_messages {
                self.clear_previous_frame(host, surface, id, &avatar);
            }
            prepared = Some(embed);
        }

        if !display_text.is_empty() {
            if let Some(message) = host.message_mut(id) {
                message.extra.display_text = Some(display_text);
            }
            host.commit_message(id, CommitOptions { rerender: true });
        }

        match prepared {
            Some(embed) => {
                if let Err(err) = surface.commit_document(id, &embed) {
                    warn!(%err, message = %id, "frame document commit failed");
                    return;
                }
                self.state.cache_frame(FrameHandle::new(id, embed.frame_id));
                sleep(EMBED_UPDATE_DELAY).await;
                if let Err(err) = embed::update_variables(surface, id, &vars) {
                    debug!(%err, message = %id, "direct variable update skipped");
                }
                if let Err(err) = embed::send_update(surface, id, &vars).await {
                    warn!(%err, message = %id, "variable push failed");
                }
            }
            None if surface.frame_state(id) != FrameState::Missing => {
                // A frame from a previous render is still up; keep it fed.
                sleep(EMBED_UPDATE_DELAY).await;
                if let Err(err) = embed::send_update(surface, id, &vars).await {
                    warn!(%err, message = %id, "variable push failed");
                }
            }
            None => {}
        }
    }

    /// Re-runs the pipeline over the whole conversation in chunks, yielding
    /// between chunks so a long chat does not starve the caller.
    pub async fn reapply_all<H: Host, S: EmbedSurface>(&mut self, host: &mut H, surface: &mut S) {
        if !host.settings().enabled || host.chat().is_empty() {
            return;
        }
        self.clear_all(host);

        let chat_len = host.chat().len();
        let mut eligible = Vec::new();
        for index in 0..chat_len {
            let id = MessageId::new(index);
            let Some(message) = host.message(id) else {
                continue;
            };
            if message.force_avatar || message.is_user || message.is_system {
                continue;
            }
            let Some(avatar) = host.avatar_for_message(id) else {
                continue;
            };
            let Some(config) = store::char_template(host, &mut self.state, &avatar) else {
                continue;
            };
            if config.template.is_empty() {
                continue;
            }
            if config.limit_to_recent_messages && self.outside_window(host, &config, id) {
                continue;
            }
            eligible.push(id);
        }

        debug!(count = eligible.len(), "reapplying templates");
        for chunk in eligible.chunks(REAPPLY_CHUNK) {
            for &id in chunk {
                self.process(host, surface, id).await;
            }
            tokio::task::yield_now().await;
        }
    }

    /// One streaming re-extraction round: wait out the poll interval, then
    /// re-process the newest message if it still qualifies. The caller
    /// loops on this while [`Controller::streaming`] holds, interleaving
    /// other events between rounds.
    pub async fn streaming_tick<H: Host, S: EmbedSurface>(
        &mut self,
        host: &mut H,
        surface: &mut S,
    ) {
        sleep(STREAM_POLL_INTERVAL).await;
        if !self.generating || !host.settings().enabled {
            return;
        }
        let Some(last) = host.chat().len().checked_sub(1) else {
            return;
        };
        let id = MessageId::new(last);
        let Some(message) = host.message(id) else {
            return;
        };
        if message.is_user || message.is_system {
            return;
        }
        let Some(avatar) = host.avatar_for_message(id) else {
            return;
        };
        if store::char_template(host, &mut self.state, &avatar).is_some() {
            self.process(host, surface, id).await;
        }
    }

    pub fn stop_streaming(&mut self) {
        self.generating = false;
        self.streaming_check_active = false;
    }

    /// Removes one message's display override and engine state.
    pub fn clear_message<H: Host>(&mut self, host: &mut H, id: MessageId) {
        let had_display = host
            .message_mut(id)
            .map(|message| message.extra.display_text.take().is_some())
            .unwrap_or(false);
        if had_display {
            host.commit_message(id, CommitOptions { rerender: true });
        }
        self.state.clear_message(id);
    }

    /// Drops every display override in the conversation. Template caches
    /// survive; configs did not change.
    pub fn clear_all<H: Host>(&mut self, host: &mut H) {
        for index in 0..host.chat().len() {
            let id = MessageId::new(index);
            self.clear_message(host, id);
        }
        self.state.clear_messages();
    }

    /// Full teardown: restore every message and forget everything.
    pub fn shutdown<H: Host>(&mut self, host: &mut H) {
        self.stop_streaming();
        self.clear_all(host);
        self.state.reset();
    }

    fn outside_window<H: Host>(
        &self,
        host: &H,
        config: &CharacterTemplateConfig,
        id: MessageId,
    ) -> bool {
        let min = host.chat().len().saturating_sub(config.recent_window());
        id.index() < min
    }

    /// Walks backwards from `current` and retires the nearest older live
    /// frame belonging to the same character.
    fn clear_previous_frame<H: Host, S: EmbedSurface>(
        &mut self,
        host: &mut H,
        surface: &S,
        current: MessageId,
        avatar: &AvatarId,
    ) {
        for index in (0..current.index()).rev() {
            let id = MessageId::new(index);
            let Some(message) = host.message(id) else {
                continue;
            };
            if message.is_user || message.is_system {
                continue;
            }
            if host.avatar_for_message(id).as_ref() != Some(avatar) {
                continue;
            }
            if surface.frame_state(id) == FrameState::Missing {
                continue;
            }
            debug!(message = %id, "retiring previous frame");
            self.clear_message(host, id);
            break;
        }
    }
}
