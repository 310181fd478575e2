//! History command handlers.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use paperweave::cache::{Namespace, ResponseStore};
use paperweave::config::Config;
use paperweave::history;
use paperweave::wizard::Draft;

use super::HistoryAction;

/// Characters of entry text shown per listing row.
const PREVIEW_CHARS: usize = 60;

/// Inspect and manage past generations.
pub(crate) async fn cmd_history(action: HistoryAction) -> Result<()> {
    let config = Config::load().with_context(|| "Failed to load configuration")?;
    let store = ResponseStore::new(config.cache_dir());

    match action {
        HistoryAction::List { limit, all, prompts } => {
            let namespace = if prompts {
                Namespace::Prompt
            } else {
                Namespace::Response
            };
            let entries = history::list(&store, namespace)?;
            if entries.is_empty() {
                println!("No history yet.");
                return Ok(());
            }

            let shown = if all { entries.len() } else { entries.len().min(limit) };
            println!("Showing {} of {} generation(s):", shown, entries.len());
            for entry in entries.iter().take(shown) {
                let when: DateTime<Local> = entry.modified_at.into();
                let text = history::load_text(&store, &entry.key, namespace)?
                    .map(|text| history::preview(&text, PREVIEW_CHARS))
                    .unwrap_or_else(|| "<unreadable>".to_string());
                println!(
                    "- {} | {} | {}",
                    entry.key,
                    when.format("%Y-%m-%d %H:%M:%S"),
                    text
                );
            }
        }
        HistoryAction::Show { key, prompt } => {
            let namespace = if prompt {
                Namespace::Prompt
            } else {
                Namespace::Response
            };
            let Some(text) = history::load_text(&store, &key, namespace)? else {
                anyhow::bail!("No entry found for key '{}'", key);
            };
            println!("{text}");
        }
        HistoryAction::Restore { key } => {
            let Some(text) = history::load_text(&store, &key, Namespace::Response)? else {
                anyhow::bail!("No entry found for key '{}'", key);
            };
            let draft_path = Draft::default_path();
            let mut draft =
                Draft::load_from(&draft_path).with_context(|| "Failed to load draft")?;
            draft.article = text;
            draft
                .save_to(&draft_path)
                .with_context(|| "Failed to save draft")?;
            println!("Restored generation {} into the draft.", key);
        }
        HistoryAction::Delete { key } => {
            store
                .delete(&key)
                .with_context(|| format!("Failed to delete entry '{}'", key))?;
            println!("Deleted {}.", key);
        }
    }

    Ok(())
}
