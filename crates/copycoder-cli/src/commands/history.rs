use anyhow::{Result, bail};
use clap::Subcommand;

use copycoder_core::prompt::GeneratedPrompt;
use copycoder_core::state::History;

use crate::context::AppContext;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recent prompts, newest first
    List,
    /// Print a prompt from the list (1 = newest)
    Show { index: usize },
    /// List images used by recent generations
    Files,
    /// Forget all prompts and images
    Clear,
}

/// The prompt at a 1-based position in the newest-first list.
fn nth_prompt(history: &History, index: usize) -> Option<&GeneratedPrompt> {
    index.checked_sub(1).and_then(|i| history.prompts.get(i))
}

pub async fn run(ctx: &AppContext, action: Option<HistoryAction>) -> Result<()> {
    let shell = ctx.shell(None).await?;
    let history = shell.history();

    match action.unwrap_or(HistoryAction::List) {
        HistoryAction::List => {
            if history.prompts.is_empty() {
                println!("No prompts yet.");
            }
            for (i, prompt) in history.prompts.iter().enumerate() {
                let title = prompt.content.lines().next().unwrap_or_default();
                println!(
                    "{:>2}. {}  {} image(s)  {}",
                    i + 1,
                    prompt.created_at.format("%Y-%m-%d %H:%M"),
                    prompt.image_ids.len(),
                    title.trim_start_matches("# ")
                );
            }
        }
        HistoryAction::Show { index } => {
            let Some(prompt) = nth_prompt(&history, index) else {
                bail!("No prompt #{} (have {})", index, history.prompts.len());
            };
            println!("{}", prompt.content);
        }
        HistoryAction::Files => {
            for file in &history.files {
                println!("{}  {}  {}", file.uploaded_at.format("%Y-%m-%d %H:%M"), file.name, file.mime_type);
            }
        }
        HistoryAction::Clear => {
            shell.clear_history().await?;
            println!("History cleared.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(id: &str) -> GeneratedPrompt {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "content": format!("# {}", id),
            "createdAt": "2025-03-14T09:26:53Z",
            "imageIds": [],
        }))
        .unwrap()
    }

    #[test]
    fn test_nth_prompt_counts_from_one() {
        let mut history = History::default();
        history.record(prompt("older"), &[]);
        history.record(prompt("newest"), &[]);

        assert!(nth_prompt(&history, 0).is_none());
        assert_eq!(nth_prompt(&history, 1).unwrap().id, "newest");
        assert_eq!(nth_prompt(&history, 2).unwrap().id, "older");
        assert!(nth_prompt(&history, 3).is_none());
    }
}
