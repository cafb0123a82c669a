use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use log::info;
use thiserror::Error;

use crate::models::quick_action::QuickAction;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt file IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Prompt JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid prompt configuration: {0}")]
    Invalid(String),
}

const SYSTEM_DIRECTIVE: &str = "You are a compassionate mental health support assistant for MindCheck, a mental wellness platform in Sri Lanka. Your role is to:

1. Provide empathetic, non-judgmental support
2. Listen actively and validate feelings
3. Offer coping strategies and wellness tips
4. Guide users to appropriate resources
5. Detect crisis situations and provide emergency contacts

IMPORTANT GUIDELINES:
- You are NOT a therapist or medical professional
- Always recommend professional help for serious issues
- Keep responses concise (2-3 paragraphs max)
- Use simple, clear language
- Respect cultural context (Sri Lankan users)
- Be warm and supportive

CRISIS KEYWORDS: If user mentions suicide, self-harm, \"kill myself\", \"end it all\", or similar:
- Immediately express concern
- Provide emergency contacts:
  * National Mental Health Helpline: 1926 (24/7, Free)
  * CCCline: 1333 (24/7, Toll-free)
  * Emergency Services: 110
- Encourage them to reach out for immediate help

Remember: You're here to support, not diagnose or treat.";

const ACKNOWLEDGEMENT: &str =
    "I understand. I will be a compassionate mental health support assistant, following all the guidelines you provided.";

const WELCOME: &str =
    "Hi! I'm here to support you. How are you feeling today? 💚\n\nRemember: I'm an AI assistant, not a therapist. For professional help, please consult a mental health professional.";

const CLEARED_WELCOME: &str = "Hi! I'm here to support you. How are you feeling today? 💚";

const CRISIS_RESPONSE: &str = "I'm really concerned about you. Please reach out for immediate help:

📞 **National Mental Health Helpline: 1926** (24/7, Free)
📞 **CCCline: 1333** (24/7, Toll-free)
🚨 **Emergency Services: 110**

You don't have to face this alone. These trained professionals are ready to help you right now. Please call them.";

const FALLBACK_RESPONSE: &str =
    "I'm sorry, I'm having trouble connecting right now. Please try again in a moment, or reach out to our emergency contacts if you need immediate help:\n\n📞 1926 (Mental Health Helpline)\n📞 1333 (CCCline)";

fn default_quick_actions() -> Vec<QuickAction> {
    vec![
        QuickAction::new(
            "crisis",
            "I'm in crisis",
            "🆘",
            "I'm really concerned about you. Please reach out for immediate help:

📞 **National Mental Health Helpline: 1926** (24/7, Free)
📞 **CCCline: 1333** (24/7, Toll-free)
🚨 **Emergency Services: 110**

You don't have to face this alone. These trained professionals are ready to help you right now."
        ),
        QuickAction::new(
            "anxious",
            "Feeling anxious",
            "😰",
            "I hear you. Anxiety can be really overwhelming. Let's try a quick breathing exercise:

**4-7-8 Breathing:**
1. Breathe in through your nose for 4 counts
2. Hold for 7 counts
3. Exhale slowly through your mouth for 8 counts
4. Repeat 3-4 times

This can help calm your nervous system. Would you like to talk about what's making you anxious?"
        ),
        QuickAction::new(
            "resources",
            "Need resources",
            "📚",
            "I can help you find resources! MindCheck offers:

🧠 **Mental Health Assessment** - Understand your current state
📊 **Progress Tracker** - Monitor your wellness journey
📚 **Resources** - Professional mental health resources for Sri Lanka

What kind of support are you looking for?"
        ),
        QuickAction::new(
            "assessment",
            "Take assessment",
            "📝",
            "Taking a mental health assessment is a great step! Our quiz can help you understand your current mental wellness.

It takes about 5-10 minutes and covers areas like mood, anxiety, and stress. Your responses are completely private and stored only on your device.

Would you like me to guide you to the assessment?"
        )
    ]
}

/// Fixed texts used by the chat session. Any field missing from an override
/// file keeps its built-in value.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PromptConfig {
    pub system_directive: String,
    pub acknowledgement: String,
    pub welcome: String,
    pub cleared_welcome: String,
    pub crisis_response: String,
    pub fallback_response: String,
    pub quick_actions: Vec<QuickAction>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_directive: SYSTEM_DIRECTIVE.to_string(),
            acknowledgement: ACKNOWLEDGEMENT.to_string(),
            welcome: WELCOME.to_string(),
            cleared_welcome: CLEARED_WELCOME.to_string(),
            crisis_response: CRISIS_RESPONSE.to_string(),
            fallback_response: FALLBACK_RESPONSE.to_string(),
            quick_actions: default_quick_actions(),
        }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        let required = [
            ("system_directive", &self.system_directive),
            ("welcome", &self.welcome),
            ("cleared_welcome", &self.cleared_welcome),
            ("crisis_response", &self.crisis_response),
            ("fallback_response", &self.fallback_response),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(PromptError::Invalid(format!("'{}' must not be empty", name)));
            }
        }

        let mut seen = HashSet::new();
        for action in &self.quick_actions {
            if !seen.insert(action.id.as_str()) {
                return Err(PromptError::Invalid(format!("duplicate quick action id '{}'", action.id)));
            }
        }
        Ok(())
    }

    pub fn quick_action(&self, id: &str) -> Option<&QuickAction> {
        self.quick_actions.iter().find(|action| action.id == id)
    }
}

pub fn load_prompts<P: AsRef<Path>>(path: P) -> Result<Arc<PromptConfig>, PromptError> {
    let path = path.as_ref();
    let file_content = fs::read_to_string(path)?;
    let config: PromptConfig = serde_json::from_str(&file_content)?;
    config.validate()?;
    info!("Loaded prompt overrides from {}", path.display());
    Ok(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_are_valid_and_carry_helplines() {
        let config = PromptConfig::default();
        config.validate().unwrap();
        for text in [&config.crisis_response, &config.fallback_response] {
            assert!(text.contains("1926"));
            assert!(text.contains("1333"));
        }
        let ids: Vec<_> = config.quick_actions.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["crisis", "anxious", "resources", "assessment"]);
    }

    #[test]
    fn partial_override_keeps_remaining_defaults() {
        let file = write_json(r#"{ "welcome": "Hello there" }"#);
        let config = load_prompts(file.path()).unwrap();
        assert_eq!(config.welcome, "Hello there");
        assert_eq!(config.crisis_response, CRISIS_RESPONSE);
        assert_eq!(config.quick_actions.len(), 4);
    }

    #[test]
    fn duplicate_quick_action_ids_are_rejected() {
        let file = write_json(
            r#"{ "quick_actions": [
                { "id": "a", "label": "A", "icon": "", "response": "one" },
                { "id": "a", "label": "B", "icon": "", "response": "two" }
            ] }"#
        );
        let err = load_prompts(file.path()).unwrap_err();
        assert!(matches!(err, PromptError::Invalid(_)), "{err}");
    }

    #[test]
    fn blank_fallback_is_rejected() {
        let file = write_json(r#"{ "fallback_response": "  " }"#);
        assert!(matches!(load_prompts(file.path()), Err(PromptError::Invalid(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_prompts(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PromptError::Io(_)));
    }

    #[test]
    fn quick_action_lookup_by_id() {
        let config = PromptConfig::default();
        assert_eq!(config.quick_action("anxious").map(|a| a.label.as_str()), Some("Feeling anxious"));
        assert!(config.quick_action("missing").is_none());
    }
}
