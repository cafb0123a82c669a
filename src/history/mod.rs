mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use log::{ debug, info, warn };
use std::sync::Arc;
use thiserror::Error;
use crate::cli::Args;
use crate::config::prompt::PromptConfig;
use crate::models::chat::{ ChatMessage, Conversation };

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored chat history is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Key/value persistence with browser local-storage semantics: string values,
/// last write wins, removing an absent key is not an error.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

pub fn create_storage(
    args: &Args
) -> Result<Arc<dyn LocalStorage>, Box<dyn std::error::Error + Send + Sync>> {
    match args.history_type.to_lowercase().as_str() {
        "file" => {
            let storage = FileStorage::new(&args.history_dir);
            Ok(Arc::new(storage))
        }
        "memory" => Ok(Arc::new(MemoryStorage::new())),
        _ =>
            Err(
                Box::new(
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Unsupported history store type: {}", args.history_type)
                    )
                )
            ),
    }
}

/// The persisted chat log of one session, kept under a single namespace key.
///
/// Storage failures never reach the caller: reads fall back to a fresh
/// conversation and writes are logged and dropped, leaving the in-memory
/// conversation authoritative.
pub struct ConversationStore {
    storage: Arc<dyn LocalStorage>,
    key: String,
    welcome: String,
    cleared_welcome: String,
}

impl ConversationStore {
    pub fn new(storage: Arc<dyn LocalStorage>, key: impl Into<String>, prompts: &PromptConfig) -> Self {
        Self {
            storage,
            key: key.into(),
            welcome: prompts.welcome.clone(),
            cleared_welcome: prompts.cleared_welcome.clone(),
        }
    }

    pub fn load(&self) -> Conversation {
        match self.read() {
            Ok(Some(conversation)) if !conversation.is_empty() => {
                info!("Restored {} chat messages from '{}'", conversation.len(), self.key);
                conversation
            }
            Ok(_) => {
                debug!("No stored chat history under '{}', starting fresh", self.key);
                Conversation::seeded(&self.welcome)
            }
            Err(e) => {
                warn!("Discarding unreadable chat history under '{}': {}", self.key, e);
                Conversation::seeded(&self.welcome)
            }
        }
    }

    pub fn append(&self, conversation: Conversation, message: ChatMessage) -> Conversation {
        conversation.with_message(message)
    }

    pub fn persist(&self, conversation: &Conversation) {
        if let Err(e) = self.write(conversation) {
            warn!("Chat history write to '{}' failed: {}", self.key, e);
        }
    }

    pub fn clear(&self) -> Conversation {
        if let Err(e) = self.storage.remove_item(&self.key) {
            warn!("Failed to erase chat history under '{}': {}", self.key, e);
        }
        Conversation::seeded(&self.cleared_welcome)
    }

    fn read(&self) -> Result<Option<Conversation>, StorageError> {
        match self.storage.get_item(&self.key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write(&self, conversation: &Conversation) -> Result<(), StorageError> {
        let json = serde_json::to_string(conversation)?;
        self.storage.set_item(&self.key, &json)
    }
}
