use anyhow::{Context, Result, bail};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use copycoder_application::Clipboard;
use copycoder_core::project::{AnalysisFocus, ProcessingOption, ProjectInfo, SettingsPatch};
use copycoder_core::upload::{ImageStatus, format_file_size};
use copycoder_infrastructure::load_selected_file;

use crate::console::FileClipboard;
use crate::context::AppContext;

#[derive(Args)]
pub struct GenerateArgs {
    /// Mockup images to analyze
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    /// Creativity, 0.0 to 1.0 in steps of 0.1
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Analysis focus: web, mobile, desktop, ui, landing
    #[arg(short, long)]
    pub focus: Option<AnalysisFocus>,

    /// Processing tier: standard, enhanced, expert
    #[arg(short, long)]
    pub processing: Option<ProcessingOption>,

    /// Project name
    #[arg(long)]
    pub name: Option<String>,

    /// Project author
    #[arg(long)]
    pub author: Option<String>,

    /// Project description
    #[arg(long)]
    pub description: Option<String>,

    /// Extra requirements appended to the specification
    #[arg(long)]
    pub custom_prompt: Option<String>,

    /// Write the specification to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Copy the specification to this file
    #[arg(long)]
    pub copy_to: Option<PathBuf>,
}

pub async fn run(ctx: &AppContext, args: GenerateArgs) -> Result<()> {
    let clipboard = args
        .copy_to
        .clone()
        .map(|path| Arc::new(FileClipboard::new(path)) as Arc<dyn Clipboard>);
    let shell = ctx.shell(clipboard).await?;

    let patch = SettingsPatch {
        temperature: args.temperature,
        analysis_focus: args.focus,
        processing_option: args.processing,
    };
    if patch != SettingsPatch::default() {
        shell.update_settings(&patch).await?;
    }

    shell.set_project_info(ProjectInfo {
        name: args.name.unwrap_or_default(),
        author: args.author.unwrap_or_default(),
        description: args.description.unwrap_or_default(),
        custom_prompt: args.custom_prompt.unwrap_or_default(),
    });

    let mut files = Vec::with_capacity(args.images.len());
    for path in &args.images {
        files.push(load_selected_file(path).await?);
    }
    shell.add_files(files)?;
    shell.wait_for_uploads().await;

    for image in shell.images() {
        let status = match image.status {
            ImageStatus::Complete => "ok".to_string(),
            _ => image.error.clone().unwrap_or_else(|| image.status.to_string()),
        };
        eprintln!("  {} ({}) {}", image.name, format_file_size(image.size), status);
    }

    let prompt = shell.generate().await?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, &prompt.content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Specification written to {}", path.display());
        }
        None => println!("{}", prompt.content),
    }

    if args.copy_to.is_some() && !shell.copy_current_prompt().await? {
        bail!("Nothing to copy");
    }
    Ok(())
}
