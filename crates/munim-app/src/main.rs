//! Munim application binary - composition root.
//!
//! Ties together all Munim crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Open the SQLite store and seed demo inventory when empty
//! 3. Settle the model backend (local probe, cloud fallback)
//! 4. Run a stdin REPL over the conversation session
//!
//! The voice loop (capture, debounce, synthesis) lives in the platform
//! shells; this binary drives the same session through the typed path.

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use munim_chat::{ConversationManager, DialogueRouter, PendingAction};
use munim_core::config::MunimConfig;
use munim_core::types::Language;
use munim_intent::strip_control_tokens;
use munim_llm::{LlmEngine, UnsupportedLoader};
use munim_scan::{MockOcrService, ParchiScanner, VisionClient};
use munim_store::{seed_demo_data, RecordStore, SqliteStore};

use cli::CliArgs;

fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

fn parse_language(name: &str) -> Option<Language> {
    match name.to_lowercase().as_str() {
        "english" => Some(Language::English),
        "hindi" => Some(Language::Hindi),
        "hinglish" => Some(Language::Hinglish),
        "tamil" => Some(Language::Tamil),
        "telugu" => Some(Language::Telugu),
        "bengali" => Some(Language::Bengali),
        "marathi" => Some(Language::Marathi),
        "gujarati" => Some(Language::Gujarati),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config first, so the log level can come from it.
    let config_file = args.resolve_config_path();
    let mut config = MunimConfig::load_or_default(&config_file);
    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(config.general.log_level.clone())
            }),
        )
        .init();

    tracing::info!("Starting Munim v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    let language = args
        .language
        .as_deref()
        .and_then(parse_language)
        .unwrap_or(config.general.language);

    // Storage.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join("munim.db");
    let store = Arc::new(SqliteStore::open(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite store opened");

    if !args.no_seed {
        let seeded = seed_demo_data(store.as_ref() as &dyn RecordStore).await?;
        if seeded > 0 {
            tracing::info!(items = seeded, "Demo inventory seeded");
        }
    }

    // Model backend: probe once, settle for the session.
    let api_key = std::env::var("MUNIM_API_KEY").ok();
    let engine = LlmEngine::initialize(UnsupportedLoader, config.llm.clone(), api_key.clone())?;
    tracing::info!(backend = ?engine.backend(), "Model backend settled");

    // Scan pipeline. The vision tier needs an endpoint; the local tier
    // runs through the stub OCR backend.
    // TODO: replace MockOcrService with a tesseract-backed OcrService once
    // the hin+eng traineddata is bundled.
    let vision = if config.scan.vision_endpoint.is_empty() {
        None
    } else {
        Some(VisionClient::new(
            &config.scan,
            &config.llm.model,
            api_key,
        )?)
    };
    let scanner = ParchiScanner::new(vision, MockOcrService::empty(), config.scan.clone());

    let router = DialogueRouter::new(
        store.clone() as Arc<dyn RecordStore>,
        config.store.clone(),
    );
    let mut manager = ConversationManager::new(engine, router, language);

    println!("{}", language.greeting());
    println!("(/scan <image-file>, /clear, /retry, /quit)");

    repl(&mut manager, &scanner).await?;
    Ok(())
}

/// Line-oriented REPL over the conversation session.
async fn repl(
    manager: &mut ConversationManager<UnsupportedLoader>,
    scanner: &ParchiScanner<MockOcrService>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                manager.clear_messages();
                println!("{}", manager.history()[0].content);
                continue;
            }
            "/retry" => {
                match manager.retry_load_model() {
                    Ok(()) => println!("Model backend re-probed."),
                    Err(e) => println!("Retry failed: {}", e),
                }
                continue;
            }
            _ => {}
        }

        if let Some(path) = line.strip_prefix("/scan ") {
            let reply = scan_file(manager, scanner, path.trim()).await;
            println!("{}", reply);
            continue;
        }

        if let Some(outcome) = manager.send_message(line).await {
            println!("{}", strip_control_tokens(&outcome.text));
            if outcome.action == Some(PendingAction::ScanParchi) {
                println!("(use /scan <image-file> to feed a parchi photo)");
            }
        }
    }
    Ok(())
}

async fn scan_file(
    manager: &mut ConversationManager<UnsupportedLoader>,
    scanner: &ParchiScanner<MockOcrService>,
    path: &str,
) -> String {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => return format!("Could not read {}: {}", path, e),
    };
    let mime = if path.ends_with(".png") {
        "image/png"
    } else {
        "image/jpeg"
    };
    let data_url = munim_scan::data_url::encode(&bytes, mime);
    manager.process_scan(scanner, &data_url).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_data_dir_expands_home() {
        std::env::set_var("HOME", "/home/shop");
        assert_eq!(
            resolve_data_dir("~/.munim/data"),
            PathBuf::from("/home/shop/.munim/data")
        );
        assert_eq!(resolve_data_dir("/var/munim"), PathBuf::from("/var/munim"));
    }

    #[test]
    fn test_parse_language() {
        assert_eq!(parse_language("Hinglish"), Some(Language::Hinglish));
        assert_eq!(parse_language("HINDI"), Some(Language::Hindi));
        assert_eq!(parse_language("klingon"), None);
    }
}
