use log::{ debug, error, info, warn };
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::config::prompt::PromptConfig;
use crate::history::ConversationStore;
use crate::llm::GatewayError;
use crate::llm::chat::ChatClient;
use crate::models::chat::{ ChatMessage, Conversation };
use crate::models::quick_action::QuickAction;
use crate::safety::detect_crisis;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unknown quick action '{0}'")]
    UnknownQuickAction(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResponse,
    /// Held only while the fallback message is published, then back to `Idle`.
    Error,
}

/// Snapshot published to subscribers after every append and state change.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub state: SessionState,
    pub conversation: Conversation,
}

pub struct ChatSession {
    id: Uuid,
    chat_client: Arc<dyn ChatClient>,
    store: ConversationStore,
    prompts: Arc<PromptConfig>,
    conversation: Conversation,
    state: SessionState,
    show_quick_actions: bool,
    updates: watch::Sender<SessionView>,
}

impl ChatSession {
    pub fn new(
        chat_client: Arc<dyn ChatClient>,
        store: ConversationStore,
        prompts: Arc<PromptConfig>
    ) -> Self {
        let conversation = store.load();
        let (updates, _) = watch::channel(SessionView {
            state: SessionState::Idle,
            conversation: conversation.clone(),
        });
        let id = Uuid::new_v4();
        info!(
            "[{}] Chat session started with {} message(s), model={}",
            id,
            conversation.len(),
            chat_client.get_model()
        );

        Self {
            id,
            chat_client,
            store,
            prompts,
            conversation,
            state: SessionState::Idle,
            show_quick_actions: true,
            updates,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.updates.subscribe()
    }

    pub fn quick_actions(&self) -> &[QuickAction] {
        &self.prompts.quick_actions
    }

    pub fn quick_actions_visible(&self) -> bool {
        self.show_quick_actions && self.conversation.len() <= 1
    }

    /// Handles one free-text message. Every outcome ends with an assistant
    /// message appended and the session back in `Idle`; blank input is ignored.
    pub async fn submit(&mut self, text: &str) -> &Conversation {
        if text.trim().is_empty() {
            debug!("[{}] Ignoring blank submission", self.id);
            return &self.conversation;
        }

        let history = self.conversation.messages().to_vec();
        self.show_quick_actions = false;
        self.append(ChatMessage::user(text));

        if detect_crisis(text) {
            warn!("[{}] Crisis phrase detected, answering with emergency contacts", self.id);
            let reply = ChatMessage::assistant(self.prompts.crisis_response.as_str());
            self.append(reply);
            return &self.conversation;
        }

        self.set_state(SessionState::AwaitingResponse);
        let result = self.chat_client.respond(text, &history).await;
        let reply = match result {
            Ok(response) => ChatMessage::assistant(response),
            Err(e) => {
                match &e {
                    GatewayError::Configuration(_) => error!("[{}] Chat gateway error: {}", self.id, e),
                    GatewayError::Upstream(_) => warn!("[{}] Chat gateway error: {}", self.id, e),
                }
                self.state = SessionState::Error;
                ChatMessage::assistant(self.prompts.fallback_response.as_str())
            }
        };
        self.append(reply);
        self.set_state(SessionState::Idle);
        &self.conversation
    }

    pub fn quick_action(&mut self, id: &str) -> Result<&Conversation, SessionError> {
        let response = self.prompts
            .quick_action(id)
            .map(|action| action.response.clone())
            .ok_or_else(|| SessionError::UnknownQuickAction(id.to_string()))?;

        debug!("[{}] Quick action '{}'", self.id, id);
        self.show_quick_actions = false;
        self.append(ChatMessage::assistant(response));
        Ok(&self.conversation)
    }

    pub fn clear(&mut self) -> &Conversation {
        info!("[{}] Clearing chat history", self.id);
        self.conversation = self.store.clear();
        self.show_quick_actions = true;
        self.state = SessionState::Idle;
        self.publish();
        &self.conversation
    }

    fn append(&mut self, message: ChatMessage) {
        let conversation = std::mem::take(&mut self.conversation);
        self.conversation = self.store.append(conversation, message);
        self.store.persist(&self.conversation);
        self.publish();
    }

    fn set_state(&mut self, state: SessionState) {
        self.state = state;
        self.publish();
    }

    fn publish(&self) {
        self.updates.send_replace(SessionView {
            state: self.state,
            conversation: self.conversation.clone(),
        });
    }
}
