use chrono::{ DateTime, Local, Utc };
use log::{ info, warn };
use std::error::Error;
use std::io::Write;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt };

use crate::models::chat::{ ChatMessage, Role };
use crate::safety::detect_crisis;
use crate::session::{ ChatSession, SessionState };

const MAX_MESSAGE_LEN: usize = 4000;

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Say(String),
    ListQuickActions,
    QuickAction(String),
    Clear,
    Quit,
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some(("/quick", id)) if !id.trim().is_empty() => Command::QuickAction(id.trim().to_string()),
        _ =>
            match trimmed {
                "/quick" => Command::ListQuickActions,
                "/clear" => Command::Clear,
                "/quit" | "/exit" => Command::Quit,
                _ => Command::Say(line.to_string()),
            }
    }
}

fn format_time(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp)
        .map(|dt| dt.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_default()
}

fn render_message<W: Write>(out: &mut W, message: &ChatMessage) -> std::io::Result<()> {
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => "mindcheck",
    };
    writeln!(out, "[{}] {}:\n{}\n", format_time(message.timestamp), speaker, message.content)
}

fn render_quick_actions<W: Write>(out: &mut W, session: &ChatSession) -> std::io::Result<()> {
    writeln!(out, "Quick actions:")?;
    for action in session.quick_actions() {
        writeln!(out, "  {} {:<12} /quick {}", action.icon, action.label, action.id)?;
    }
    writeln!(out)
}

/// Drives a session from line-oriented input until EOF or `/quit`.
pub async fn run_console<R, W>(
    mut session: ChatSession,
    input: R,
    out: &mut W
) -> Result<(), Box<dyn Error + Send + Sync>>
    where R: AsyncBufRead + Unpin, W: Write
{
    let mut updates = session.subscribe();
    let indicator = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            if updates.borrow().state == SessionState::AwaitingResponse {
                eprintln!("mindcheck is typing...");
            }
        }
    });

    for message in session.conversation().messages() {
        render_message(out, message)?;
    }
    if session.quick_actions_visible() {
        render_quick_actions(out, &session)?;
    }
    writeln!(out, "AI assistant • Not a replacement for professional care. Type /quit to leave.")?;
    out.flush()?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Command::Quit => break,
            Command::Clear => {
                let conversation = session.clear();
                for message in conversation.messages() {
                    render_message(out, message)?;
                }
                render_quick_actions(out, &session)?;
            }
            Command::ListQuickActions => render_quick_actions(out, &session)?,
            Command::QuickAction(id) => {
                match session.quick_action(&id) {
                    Ok(conversation) => {
                        if let Some(message) = conversation.last() {
                            render_message(out, message)?;
                        }
                    }
                    Err(e) => writeln!(out, "{}", e)?,
                }
            }
            Command::Say(text) => {
                let length = text.chars().count();
                // Crisis text always reaches the session, whatever its length.
                if length > MAX_MESSAGE_LEN && !detect_crisis(&text) {
                    warn!("Rejected console message of {} chars", length);
                    writeln!(out, "Message too long (limit {} characters).", MAX_MESSAGE_LEN)?;
                    continue;
                }
                let before = session.conversation().len();
                let conversation = session.submit(&text).await;
                // Skip echoing the user's own line.
                for message in conversation.messages().iter().skip(before + 1) {
                    render_message(out, message)?;
                }
            }
        }
        out.flush()?;
    }

    info!("Console session {} closed", session.id());
    drop(session);
    let _ = indicator.await;
    Ok(())
}
