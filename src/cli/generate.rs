//! Generate command handler: the drafting wizard.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use tracing::info;

use paperweave::cache::{enforce_bound, ResponseStore};
use paperweave::client::CachedClient;
use paperweave::config::Config;
use paperweave::history::preview;
use paperweave::providers::build_provider;
use paperweave::wizard::{build_prompt, build_source_text, render_requirements, Draft};

/// Collect inputs, assemble the prompt, and generate the article.
pub(crate) async fn cmd_generate(
    no_cache: bool,
    output: Option<PathBuf>,
    from_draft: bool,
) -> Result<()> {
    let config = Config::load().with_context(|| "Failed to load configuration")?;
    let draft_path = Draft::default_path();
    let mut draft = Draft::load_from(&draft_path).with_context(|| "Failed to load draft")?;

    if !from_draft {
        run_wizard(&mut draft)?;
    }
    if !draft.is_ready() {
        anyhow::bail!("Draft needs a topic and at least one outline point before generating");
    }

    let source = build_source_text(&draft.topic, &draft.outline, &draft.references);
    let requirements = render_requirements(&draft.requirements, &draft.topic);
    let prompt = build_prompt(&source, &requirements);
    draft.prompt = prompt.clone();
    draft
        .save_to(&draft_path)
        .with_context(|| "Failed to save draft")?;

    let store = ResponseStore::new(config.cache_dir());
    let provider = build_provider(&config).with_context(|| "Failed to build LLM provider")?;
    let client = CachedClient::new(provider, store);

    let use_cache = config.cache.enabled && !no_cache;
    println!("Generating article...");
    let (key, article) = client
        .request(&prompt, use_cache)
        .await
        .with_context(|| "Generation failed, please retry")?;

    // Record the originating prompt under the same key stem so the history
    // view can show what produced each article.
    client
        .store()
        .put_prompt(&key, &prompt)
        .with_context(|| "Failed to record prompt for history")?;

    let evicted = enforce_bound(client.store(), config.cache.max_entries)
        .with_context(|| "Cache eviction pass failed")?;
    if evicted > 0 {
        info!(evicted, "Evicted old cache entries");
    }

    draft.article = article.clone();
    draft
        .save_to(&draft_path)
        .with_context(|| "Failed to save draft")?;

    match output {
        Some(path) => {
            std::fs::write(&path, &article)
                .with_context(|| format!("Failed to write article to {}", path.display()))?;
            println!("Article written to {} (key {})", path.display(), key);
        }
        None => {
            println!("--- article ({key}) ---");
            println!("{article}");
        }
    }

    Ok(())
}

/// Interactive collection of topic, outline, and per-point references.
///
/// Existing draft values are offered as defaults; pressing Enter keeps them.
fn run_wizard(draft: &mut Draft) -> Result<()> {
    let mut editor = DefaultEditor::new()?;

    println!("Step 1/3 — topic");
    draft.topic = read_with_default(&mut editor, "topic", &draft.topic)?;

    println!("Step 2/3 — outline (one point per line, empty line to finish)");
    if !draft.outline.is_empty() {
        println!(
            "Current outline has {} point(s); an empty first line keeps it.",
            draft.outline.len()
        );
    }
    let mut lines = Vec::new();
    loop {
        let line = editor.readline("outline> ")?;
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        lines.push(line.to_string());
    }
    if !lines.is_empty() {
        draft.set_outline_from_text(&lines.join("\n"));
    }

    println!("Step 3/3 — reference text per outline point (optional)");
    // A hand-edited draft may carry mismatched arrays.
    draft.references.resize(draft.outline.len(), String::new());
    for i in 0..draft.outline.len() {
        println!("{}", draft.outline[i]);
        let current = draft.references[i].clone();
        draft.references[i] = read_with_default(&mut editor, "reference", &current)?;
    }

    Ok(())
}

fn read_with_default(editor: &mut DefaultEditor, label: &str, current: &str) -> Result<String> {
    let prompt = if current.is_empty() {
        format!("{label}> ")
    } else {
        format!("{label} [{}]> ", preview(current, 40))
    };
    let input = editor.readline(&prompt)?;
    let input = input.trim();
    Ok(if input.is_empty() {
        current.to_string()
    } else {
        input.to_string()
    })
}
