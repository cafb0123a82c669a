pub mod cli;
pub mod config;
pub mod console;
pub mod history;
pub mod llm;
pub mod models;
pub mod safety;
pub mod session;

use cli::Args;
use config::prompt::{ load_prompts, PromptConfig };
use history::{ create_storage, ConversationStore };
use llm::chat::new_client as new_chat_client;
use log::{ info, warn };
use session::ChatSession;
use std::error::Error;
use std::sync::Arc;
use tokio::io::BufReader;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let llm_config = args.llm_config();

    info!("--- Core Configuration ---");
    info!("Chat API Key: {}", if llm_config.api_key.is_some() { "set" } else { "not set" });
    info!("Temperature: {}", args.temperature);
    info!("Max Output Tokens: {}", args.max_output_tokens);
    info!("Request Timeout: {}s", args.request_timeout_secs);
    info!("History Store Type: {}", args.history_type);
    info!("History Dir: {}", args.history_dir);
    info!("History Key: {}", args.history_key);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("-------------------------");

    if llm_config.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; replies will use the offline support message.");
    }

    let prompts = match &args.prompts_path {
        Some(path) => load_prompts(path)?,
        None => Arc::new(PromptConfig::default()),
    };
    let storage = create_storage(&args)?;
    let store = ConversationStore::new(storage, args.history_key.clone(), &prompts);
    let chat_client = new_chat_client(&llm_config, Arc::clone(&prompts))?;
    info!("Chat Model: {}", chat_client.get_model());
    info!("Chat Base URL: {}", chat_client.get_base_url());
    let session = ChatSession::new(chat_client, store, prompts);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    console::run_console(session, stdin, &mut stdout).await
}
