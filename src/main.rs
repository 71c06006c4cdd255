use anyhow::{Context, Result};
use practice_site::clipboard::MemoryClipboard;
use practice_site::config::Config;
use practice_site::dom::{PageSnapshot, PageSpec};
use practice_site::i18n::{Language, TranslationValidator};
use practice_site::storage::FileStore;
use practice_site::Site;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when not present)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("practice_site=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    // Optional language to switch to after start-up
    let requested = std::env::args()
        .nth(1)
        .map(|code| Language::from_code(&code))
        .transpose()?;

    let config = Config::from_env()?;

    info!("Loading page from {}", config.page_file);
    let page = PageSpec::load(&config.page_file)?;
    let document = page.build();

    let report = TranslationValidator::validate_document(&document);
    for warning in &report.warnings {
        warn!("{}", warning);
    }
    for problem in &report.errors {
        error!("{}", problem);
    }

    let store = Arc::new(FileStore::new(&config.preference_file));
    let clipboard = Arc::new(MemoryClipboard::new());
    let site = Site::new(config, document, store, clipboard);

    site.start().settle().await;

    if let Some(lang) = requested {
        match site.switch_control(lang) {
            Some(control) => site.click(control).settle().await,
            None => site.switch_language(lang).settle().await,
        }
    }

    let snapshot = PageSnapshot::capture(&site.document().lock());
    let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize page")?;
    println!("{}", json);

    info!("Rendered page in {}", site.current_language().name());
    Ok(())
}
