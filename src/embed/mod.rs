// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Embedded-frame lifecycle: wrapper markup, readiness polling, and
//! variable delivery into live frames.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::host::Host;
use crate::model::{MessageId, Variables};

pub mod bridge;
pub mod protocol;


pub use bridge::{wrap_document, BRIDGE_SCRIPT};
pub use protocol::{
    decode_command_result, normalize_command, now_millis, CommandBridge, CommandError, Payload,
    PendingCommand, Source, WireMessage, COMMAND_TIMEOUT, SOURCE_FRAME, SOURCE_HOST,
};

/// Readiness poll cadence while a freshly committed frame loads.
pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(50);
pub const READY_POLL_ATTEMPTS: u32 = 20;

/// Sandbox attribute applied when sandbox mode is on.
pub const SANDBOX_ATTR: &str = "allow-scripts allow-same-origin allow-popups allow-forms";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// No frame element exists for the message.
    Missing,
    /// The element exists but its document has not finished loading.
    Loading,
    /// The document is live and the bridge script is installed.
    Ready,
}

#[derive(Debug)]
pub enum EmbedError {
    FrameMissing(MessageId),
    Surface(String),
}

impl fmt::Display for EmbedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedError::FrameMissing(id) => write!(f, "no frame for message {id}"),
            EmbedError::Surface(message) => write!(f, "surface error: {message}"),
        }
    }
}

impl std::error::Error for EmbedError {}

/// The host page's DOM, as far as frame management is concerned.
///
/// The engine never touches a real DOM; the embedding application
/// implements this against whatever document model it has.
pub trait EmbedSurface {
    fn frame_state(&self, id: MessageId) -> FrameState;

    /// Writes a prepared document into the frame for a message, creating
    /// the frame element from the wrapper markup if needed.
    fn commit_document(&mut self, id: MessageId, embed: &PreparedEmbed) -> Result<(), EmbedError>;

    /// Posts a wire message into the frame's window.
    fn post_to_frame(&mut self, id: MessageId, message: &WireMessage) -> Result<(), EmbedError>;

    /// Direct `updateTemplateVariables` call, bypassing postMessage. Only
    /// valid on a [`FrameState::Ready`] frame.
    fn call_update(&mut self, id: MessageId, vars: &Variables) -> Result<(), EmbedError>;

    fn set_frame_height(&mut self, id: MessageId, height: f64);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmbedOptions {
    pub sandbox: bool,
}

/// Everything needed to put one rendered document on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedEmbed {
    pub frame_id: String,
    pub wrapper_html: String,
    pub document_html: String,
}

/// Frame element ids are unique for the lifetime of the process.
fn next_frame_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("xiaobaix-{}-{n}", now_millis())
}

fn build_wrapper(frame_id: &str, options: EmbedOptions) -> String {
    let sandbox = if options.sandbox {
        format!(" sandbox=\"{SANDBOX_ATTR}\"")
    } else {
        String::new()
    };
    format!(
        "<div class=\"xiaobaix-iframe-wrapper\" style=\"margin: 10px 0;\">\
         <iframe id=\"{frame_id}\" class=\"xiaobaix-iframe\" \
         style=\"width:100%;border:none;background:transparent;overflow:hidden;height:0;margin:0;padding:0;display:block\" \
         frameborder=\"0\" scrolling=\"no\"{sandbox}></iframe></div>"
    )
}

/// Builds the wrapper markup and bridge-injected document for rendered
/// content. Host macro substitution runs first; when the host cannot
/// provide it the content goes through untouched.
pub fn prepare_embed<H: Host>(host: &H, content: &str, options: EmbedOptions) -> PreparedEmbed {
    let substituted = match host.substitute_params(content) {
        Ok(text) => text,
        Err(err) => {
            warn!(%err, "macro substitution unavailable, embedding raw content");
            content.to_owned()
        }
    };
    let frame_id = next_frame_id();
    PreparedEmbed {
        wrapper_html: build_wrapper(&frame_id, options),
        document_html: wrap_document(&substituted),
        frame_id,
    }
}

/// Polls until the frame for a message is ready, giving up after
/// [`READY_POLL_ATTEMPTS`] rounds. Returns the last observed state.
pub async fn wait_for_frame<S: EmbedSurface>(surface: &S, id: MessageId) -> FrameState {
    let mut state = surface.frame_state(id);
    for _ in 0..READY_POLL_ATTEMPTS {
        if state == FrameState::Ready {
            return state;
        }
        tokio::time::sleep(READY_POLL_INTERVAL).await;
        state = surface.frame_state(id);
    }
    state
}

/// Pushes variables into a frame over postMessage, waiting for it to come
/// up first. Returns whether anything was sent.
pub async fn send_update<S: EmbedSurface>(
    surface: &mut S,
    id: MessageId,
    vars: &Variables,
) -> Result<bool, EmbedError> {
    if wait_for_frame(surface, id).await != FrameState::Ready {
        debug!(message = %id, "frame never became ready, skipping variable update");
        return Ok(false);
    }
    let message = WireMessage::from_host(Payload::VariableUpdate {
        message_id: id,
        timestamp: now_millis(),
        variables: vars.clone(),
    });
    surface.post_to_frame(id, &message)?;
    Ok(true)
}

/// Synchronous update path for frames already known to be live.
pub fn update_variables<S: EmbedSurface>(
    surface: &mut S,
    id: MessageId,
    vars: &Variables,
) -> Result<bool, EmbedError> {
    if surface.frame_state(id) != FrameState::Ready {
        return Ok(false);
    }
    surface.call_update(id, vars)?;
    Ok(true)
}

/// What the embedding application must do with an inbound frame message.
#[derive(Debug, PartialEq)]
pub enum InboundAction {
    None,
    /// Execute the slash command and answer with [`reply_to_frame`].
    RunCommand { id: String, command: String },
}

/// Routes one message received from a frame. Resizes are absorbed here;
/// command requests are handed back to the caller, which owns execution.
pub fn handle_frame_message<S: EmbedSurface>(
    surface: &mut S,
    id: MessageId,
    message: &WireMessage,
) -> InboundAction {
    if message.source != Source::Frame {
        return InboundAction::None;
    }
    match &message.payload {
        Payload::Resize { height } => {
            if *height > 0.0 {
                surface.set_frame_height(id, *height);
            }
            InboundAction::None
        }
        Payload::RunCommand { command, id: command_id } => InboundAction::RunCommand {
            id: command_id.clone(),
            command: command.clone(),
        },
        _ => InboundAction::None,
    }
}

/// Wraps a command outcome into the host's reply envelope.
pub fn reply_to_frame(command_id: &str, outcome: Result<Value, String>) -> WireMessage {
    match outcome {
        Ok(result) => WireMessage::from_host(Payload::CommandResult {
            id: command_id.to_owned(),
            result,
        }),
        Err(error) => WireMessage::from_host(Payload::CommandError {
            id: command_id.to_owned(),
            error,
        }),
    }
}
