// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Synchronous interception of host-initiated message re-renders.
//!
//! The host rewrites message markup on its own schedule. Hooking that
//! write lets the engine substitute its rendered view before the raw text
//! ever hits the screen, with no flicker. Everything here is synchronous;
//! any frame variable delivery the outcome calls for is returned to the
//! caller to run after the write lands.

use tracing::debug;

use crate::embed::{self, EmbedOptions, PreparedEmbed};
use crate::extract::extract_vars;
use crate::host::Host;
use crate::model::{FrameHandle, MessageId, Variables};
use crate::render::{is_document_like, render_template};
use crate::store;

use super::Controller;

/// Which part of the host's UI the intercepted write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRegion {
    /// The rendered body of a chat message.
    MessageText,
    /// Anything else; never intercepted.
    Other,
}

/// What the caller should write instead of the original markup.
#[derive(Debug, PartialEq)]
pub enum SetTextAction {
    /// Proceed with the host's own markup.
    PassThrough,
    /// Write this markup instead.
    Replace(String),
    /// Drop the write entirely.
    Suppress,
}

/// Outcome of intercepting one write.
#[derive(Debug, Default)]
pub struct InterceptOutcome {
    pub action: SetTextAction,
    /// A frame document to commit after the write, when the rendered
    /// template was a standalone document.
    pub embed: Option<PreparedEmbed>,
    /// Variables to deliver to the message's frame once it is up.
    pub deferred_vars: Option<Variables>,
}

impl Default for SetTextAction {
    fn default() -> Self {
        SetTextAction::PassThrough
    }
}

impl InterceptOutcome {
    fn pass() -> Self {
        Self::default()
    }

    fn suppress() -> Self {
        Self {
            action: SetTextAction::Suppress,
            ..Self::default()
        }
    }

    fn replace(markup: String) -> Self {
        Self {
            action: SetTextAction::Replace(markup),
            ..Self::default()
        }
    }
}

impl Controller {
    /// Decides what an intercepted message-body write should do.
    ///
    /// `region_has_embed` reports whether the region currently contains a
    /// live frame wrapper; overwriting one mid-session would tear down a
    /// running document, so those writes are suppressed instead.
    pub fn intercept_set_text<H: Host>(
        &mut self,
        host: &mut H,
        id: MessageId,
        region: TextRegion,
        region_has_embed: bool,
    ) -> InterceptOutcome {
        if region != TextRegion::MessageText || !host.settings().enabled {
            return InterceptOutcome::pass();
        }
        let Some(message) = host.message(id) else {
            return InterceptOutcome::pass();
        };
        if message.is_user || message.is_system {
            return InterceptOutcome::pass();
        }
        let mes = message.mes.clone();

        let Some(avatar) = host.avatar_for_message(id) else {
            return InterceptOutcome::pass();
        };
        let Some(config) = store::char_template(host, &mut self.state, &avatar) else {
            return InterceptOutcome::pass();
        };

        if config.skip_first_message && id.index() == 0 {
            return InterceptOutcome::suppress();
        }

        if config.limit_to_recent_messages && self.outside_window(host, &config, id) {
            if let Some(message) = host.message_mut(id) {
                message.extra.display_text = None;
            }
            return InterceptOutcome::replace(mes);
        }

        if region_has_embed {
            debug!(message = %id, "write over a live frame suppressed");
            return InterceptOutcome::suppress();
        }

        let vars = extract_vars(&mes, Some(&config.custom_regex), &mut self.regex_cache);
        self.state.set_variables(id, vars.clone());
        self.state.record_history(id, &vars);

        let display = render_template(&config.template, &vars);
        if display.trim().is_empty() {
            return InterceptOutcome::pass();
        }

        if is_document_like(&display) {
            let options = EmbedOptions {
                sandbox: host.settings().sandbox_mode,
            };
            let embed = embed::prepare_embed(host, &display, options);
            self.state
                .cache_frame(FrameHandle::new(id, embed.frame_id.clone()));
            return InterceptOutcome {
                action: SetTextAction::Replace(embed.wrapper_html.clone()),
                embed: Some(embed),
                deferred_vars: Some(vars),
            };
        }

        if let Some(message) = host.message_mut(id) {
            message.extra.display_text = Some(display);
        }
        InterceptOutcome::pass()
    }
}
