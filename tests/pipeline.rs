// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! End-to-end pipeline scenarios over an in-memory host and surface.

use std::collections::HashMap;

use serde_json::json;

use xiaobaix::embed::{
    EmbedError, EmbedSurface, FrameState, Payload, PreparedEmbed, WireMessage,
};
use xiaobaix::host::{CommitOptions, Host, HostApiError, HostEvent, NoticeLevel};
use xiaobaix::lifecycle::Controller;
use xiaobaix::model::{
    AvatarId, CharacterTemplateConfig, ExtensionSettings, Message, MessageId, Variables,
};

struct TestHost {
    chat: Vec<Message>,
    settings: ExtensionSettings,
    avatar: AvatarId,
    embedded: HashMap<AvatarId, CharacterTemplateConfig>,
    commits: usize,
}

impl TestHost {
    fn new(chat: Vec<Message>, config: CharacterTemplateConfig) -> Self {
        let avatar = AvatarId::from("alice.png");
        let mut settings = ExtensionSettings::default();
        settings.character_bindings.insert(avatar.clone(), config);
        Self {
            chat,
            settings,
            avatar,
            embedded: HashMap::new(),
            commits: 0,
        }
    }
}

impl Host for TestHost {
    fn chat(&self) -> &[Message] {
        &self.chat
    }

    fn message_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.chat.get_mut(id.index())
    }

    fn commit_message(&mut self, _id: MessageId, _options: CommitOptions) {
        self.commits += 1;
    }

    fn current_avatar(&self) -> Option<AvatarId> {
        Some(self.avatar.clone())
    }

    fn current_character_name(&self) -> Option<String> {
        Some("Alice".to_owned())
    }

    fn avatar_for_message(&self, id: MessageId) -> Option<AvatarId> {
        self.message(id)?;
        Some(self.avatar.clone())
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

    fn save_settings_debounced(&mut self) {}

    fn substitute_params(&self, text: &str) -> Result<String, HostApiError> {
        Ok(text.replace("{{char}}", "Alice"))
    }

    fn notify(&mut self, _level: NoticeLevel, _text: &str) {}
}

#[derive(Default)]
struct TestSurface {
    states: HashMap<MessageId, FrameState>,
    updates: Vec<(MessageId, Variables)>,
    documents: Vec<(MessageId, String)>,
}

impl EmbedSurface for TestSurface {
    fn frame_state(&self, id: MessageId) -> FrameState {
        self.states.get(&id).copied().unwrap_or(FrameState::Missing)
    }

    fn commit_document(&mut self, id: MessageId, embed: &PreparedEmbed) -> Result<(), EmbedError> {
        self.documents.push((id, embed.document_html.clone()));
        self.states.insert(id, FrameState::Ready);
        Ok(())
    }

    fn post_to_frame(&mut self, id: MessageId, message: &WireMessage) -> Result<(), EmbedError> {
        if let Payload::VariableUpdate { variables, .. } = &message.payload {
            self.updates.push((id, variables.clone()));
        }
        Ok(())
    }

    fn call_update(&mut self, id: MessageId, vars: &Variables) -> Result<(), EmbedError> {
        self.updates.push((id, vars.clone()));
        Ok(())
    }

    fn set_frame_height(&mut self, _id: MessageId, _height: f64) {}
}

fn enabled(template: &str) -> CharacterTemplateConfig {
    CharacterTemplateConfig {
        enabled: true,
        template: template.to_owned(),
        ..CharacterTemplateConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn greeting_template_end_to_end() {
    let chat = vec![Message::assistant("Intro text [name]Seraphina[/name] done.")];
    let mut host = TestHost::new(chat, enabled("Hello [[name]]!"));
    let mut surface = TestSurface::default();
    let mut controller = Controller::new();

    controller
        .handle_event(
            &mut host,
            &mut surface,
            HostEvent::MessageUpdated(MessageId::new(0)),
        )
        .await;

    let display = host.chat[0].extra.display_text.as_deref().expect("display");
    assert_eq!(
        display,
        "Hello <bdi data-xiaobaix-var=\"name\">Seraphina</bdi>!"
    );
    // The raw message is never rewritten.
    assert_eq!(host.chat[0].mes, "Intro text [name]Seraphina[/name] done.");
}

#[tokio::test(start_paused = true)]
async fn streaming_updates_reach_the_live_frame() {
    let chat = vec![Message::assistant("[hp]100[/hp]")];
    let mut host = TestHost::new(
        chat,
        enabled("<html><body>HP: [[hp]]</body></html>"),
    );
    let mut surface = TestSurface::default();
    let mut controller = Controller::new();

    controller
        .handle_event(
            &mut host,
            &mut surface,
            HostEvent::MessageUpdated(MessageId::new(0)),
        )
        .await;
    assert_eq!(surface.documents.len(), 1);
    assert!(surface.documents[0].1.contains("window.STscript"));

    // Tokens keep arriving; the poll re-extracts and pushes new values.
    controller
        .handle_event(
            &mut host,
            &mut surface,
            HostEvent::StreamTokenReceived(MessageId::new(0)),
        )
        .await;
    assert!(controller.streaming());

    host.chat[0].mes = "[hp]85[/hp]".to_owned();
    controller.streaming_tick(&mut host, &mut surface).await;

    let last_update = surface.updates.last().expect("update sent");
    assert_eq!(last_update.1.get("hp"), Some(&json!("85")));

    controller
        .handle_event(&mut host, &mut surface, HostEvent::GenerationEnded)
        .await;
    assert!(!controller.streaming());

    // Tick and generation-end both re-render the document.
    assert_eq!(surface.documents.len(), 3);
    let final_update = surface.updates.last().expect("final update");
    assert_eq!(final_update.1.get("hp"), Some(&json!("85")));
}

#[tokio::test(start_paused = true)]
async fn yaml_code_block_feeds_the_template() {
    let chat = vec![Message::assistant(
        "Status:\n```yaml\nmood: defiant\nhp: 73\n```",
    )];
    let mut host = TestHost::new(chat, enabled("Mood [[mood]] at [[hp]]"));
    let mut surface = TestSurface::default();
    let mut controller = Controller::new();

    controller
        .handle_event(
            &mut host,
            &mut surface,
            HostEvent::MessageUpdated(MessageId::new(0)),
        )
        .await;

    let display = host.chat[0].extra.display_text.as_deref().expect("display");
    assert!(display.contains(">defiant</bdi>"));
    assert!(display.contains(">73</bdi>"));
}

#[tokio::test(start_paused = true)]
async fn chat_change_reapplies_over_the_whole_conversation() {
    let chat = vec![
        Message::assistant("[hp]10[/hp]"),
        Message::user("go on"),
        Message::assistant("[hp]20[/hp]"),
    ];
    let mut host = TestHost::new(chat, enabled("HP [[hp]]"));
    let mut surface = TestSurface::default();
    let mut controller = Controller::new();

    controller
        .handle_event(&mut host, &mut surface, HostEvent::ChatChanged)
        .await;

    assert!(host.chat[0].extra.display_text.is_some());
    assert!(host.chat[1].extra.display_text.is_none());
    let display = host.chat[2].extra.display_text.as_deref().expect("display");
    assert!(display.contains(">20</bdi>"));
}

#[tokio::test(start_paused = true)]
async fn disabling_the_extension_stops_the_pipeline() {
    let chat = vec![Message::assistant("[hp]10[/hp]")];
    let mut host = TestHost::new(chat, enabled("HP [[hp]]"));
    host.settings.enabled = false;
    let mut surface = TestSurface::default();
    let mut controller = Controller::new();

    controller
        .handle_event(
            &mut host,
            &mut surface,
            HostEvent::MessageUpdated(MessageId::new(0)),
        )
        .await;

    assert!(host.chat[0].extra.display_text.is_none());
    assert_eq!(host.commits, 0);
}
