//! Startup wiring shared by the server and the console chat.
//!
//! Anything that fails here is a configuration problem and aborts startup:
//! the service never serves sessions with a partially loaded catalog.

use crate::config::Config;
use anyhow::Context;
use async_openai::config::OpenAIConfig;
use std::{collections::HashMap, fs, path::Path, sync::Arc};
use tracing::{info, warn};
use tutor_core::{
    catalog::CourseCatalog,
    completion::OpenAICompatibleClient,
    history::FileChatHistoryWriter,
    tutor::{DEFAULT_SYSTEM_PROMPT, Tutor, TutorSettings},
};

/// File stem of the prompt that overrides the built-in tutor system prompt.
pub const TUTOR_PROMPT_KEY: &str = "module_tutor";

/// Loads every `*.md` file in `prompts_path`, keyed by file stem.
///
/// A missing directory yields no prompts; an unreadable one is an error.
pub fn load_prompts(prompts_path: &Path) -> anyhow::Result<HashMap<String, String>> {
    let mut prompts = HashMap::new();
    if !prompts_path.exists() {
        warn!(path = %prompts_path.display(), "Prompts directory not found, using built-in prompts");
        return Ok(prompts);
    }
    for entry in fs::read_dir(prompts_path)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
            let prompt_key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .context("Could not get file stem")?
                .to_string();
            let content = fs::read_to_string(&path)?;
            prompts.insert(prompt_key, content);
        }
    }
    Ok(prompts)
}

/// Builds the tutor and its collaborators from configuration.
pub fn build_tutor(config: &Config) -> anyhow::Result<Tutor> {
    let catalog = CourseCatalog::from_path(&config.catalog_path)
        .with_context(|| format!("Failed to load course catalog from {}", config.catalog_path.display()))?;
    info!(courses = ?catalog.list_courses(), "Course catalog loaded");

    let prompts = load_prompts(&config.prompts_path)?;
    let system_prompt_template = prompts
        .get(TUTOR_PROMPT_KEY)
        .cloned()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    let api_key = config
        .api_key()
        .context("No API key configured for the completion provider")?;
    let openai_config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(config.provider.api_base());
    let completion = OpenAICompatibleClient::new(openai_config, config.chat_model.clone());

    let history = FileChatHistoryWriter::new(&config.history_dir);

    let settings = TutorSettings {
        system_prompt_template,
        completion_timeout: config.completion_timeout,
        max_retries: config.completion_max_retries,
        ..TutorSettings::default()
    };

    Ok(Tutor::new(
        Arc::new(catalog),
        Arc::new(completion),
        Arc::new(history),
        settings,
    ))
}
