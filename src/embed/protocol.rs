// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! postMessage wire protocol between the host page and embedded frames.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::model::{MessageId, Variables};

/// Discriminator carried by frame-originated messages.
pub const SOURCE_FRAME: &str = "xiaobaix-iframe";
/// Discriminator carried by host-originated messages.
pub const SOURCE_HOST: &str = "xiaobaix-host";

/// A command the frame asked the host to run is abandoned after this long.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "xiaobaix-iframe")]
    Frame,
    #[serde(rename = "xiaobaix-host")]
    Host,
}

/// Message body, discriminated by the `type` field on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Payload {
    /// Frame reports its content height after layout.
    #[serde(rename = "resize")]
    Resize { height: f64 },
    /// Frame asks the host to execute a slash command.
    #[serde(rename = "runCommand")]
    RunCommand { command: String, id: String },
    /// Host answers a `runCommand` that succeeded.
    #[serde(rename = "commandResult")]
    CommandResult { id: String, result: Value },
    /// Host answers a `runCommand` that failed.
    #[serde(rename = "commandError")]
    CommandError { id: String, error: String },
    /// Host pushes fresh variables into a live frame.
    #[serde(rename = "VARIABLE_UPDATE", rename_all = "camelCase")]
    VariableUpdate {
        message_id: MessageId,
        timestamp: u64,
        variables: Variables,
    },
}

/// Full wire envelope. Messages whose `source` is not one of ours are
/// dropped before deserialization even starts; the channel is shared with
/// every other script on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub source: Source,
    #[serde(flatten)]
    pub payload: Payload,
}

impl WireMessage {
    pub fn from_host(payload: Payload) -> Self {
        Self {
            source: Source::Host,
            payload,
        }
    }

    pub fn from_frame(payload: Payload) -> Self {
        Self {
            source: Source::Frame,
            payload,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Timeout,
    ChannelClosed,
    Host(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "command is empty"),
            CommandError::Timeout => write!(f, "command timed out"),
            CommandError::ChannelClosed => write!(f, "command reply channel closed"),
            CommandError::Host(message) => write!(f, "host error: {message}"),
        }
    }
}

impl std::error::Error for CommandError {}

/// In-flight command issued by a frame, waiting for the host's reply.
#[derive(Debug)]
pub struct PendingCommand {
    id: String,
    rx: oneshot::Receiver<Result<Value, String>>,
}

impl PendingCommand {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Resolves with the host's reply, or [`CommandError::Timeout`] after
    /// [`COMMAND_TIMEOUT`] without one.
    pub async fn wait(self) -> Result<Value, CommandError> {
        match tokio::time::timeout(COMMAND_TIMEOUT, self.rx).await {
            Err(_) => Err(CommandError::Timeout),
            Ok(Err(_)) => Err(CommandError::ChannelClosed),
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(message))) => Err(CommandError::Host(message)),
        }
    }
}

/// Pairs outbound `runCommand` messages with their eventual replies.
///
/// Ids are sequential per bridge. Unknown or duplicate reply ids are
/// reported back to the caller rather than panicking; a frame reloading
/// mid-command produces exactly that.
#[derive(Debug, Default)]
pub struct CommandBridge {
    pending: HashMap<String, oneshot::Sender<Result<Value, String>>>,
    counter: u64,
}

impl CommandBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new command. Returns the wire message to post and the
    /// handle to await its reply on.
    pub fn begin(&mut self, command: &str) -> Result<(WireMessage, PendingCommand), CommandError> {
        let command = normalize_command(command).ok_or(CommandError::Empty)?;
        self.counter += 1;
        let id = format!("cmd-{}", self.counter);
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id.clone(), tx);
        let message = WireMessage::from_frame(Payload::RunCommand {
            command,
            id: id.clone(),
        });
        Ok((message, PendingCommand { id, rx }))
    }

    /// Delivers a host reply. Returns false when no command with that id is
    /// pending anymore.
    pub fn complete(&mut self, id: &str, reply: Result<Value, String>) -> bool {
        match self.pending.remove(id) {
            Some(tx) => tx.send(reply).is_ok(),
            None => false,
        }
    }

    pub fn abandon(&mut self, id: &str) {
        self.pending.remove(id);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// Commands always reach the host in slash form.
pub fn normalize_command(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('/') {
        Some(trimmed.to_owned())
    } else {
        Some(format!("/{trimmed}"))
    }
}

/// Command output decodes as JSON when it happens to be JSON, otherwise it
/// stays the raw text. Empty output is the empty string, not null.
pub fn decode_command_result(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::String(String::new());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

/// Milliseconds since the epoch, for `VARIABLE_UPDATE` timestamps.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
