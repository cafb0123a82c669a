pub mod chat;
pub mod quick_action;
