//! Crisis phrase detection for user-authored chat text.
//!
//! Matching is a plain case-insensitive substring search. A hit short-circuits
//! the model call and answers with emergency contacts instead, so a false
//! positive costs one canned message while a false negative costs much more.

pub const CRISIS_PHRASES: &[&str] = &[
    "suicide",
    "kill myself",
    "end my life",
    "want to die",
    "self harm",
    "hurt myself",
    "end it all",
    "no reason to live",
];

pub fn detect_crisis(text: &str) -> bool {
    let lowered = text.to_lowercase();
    CRISIS_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}
