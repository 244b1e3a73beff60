use anyhow::Result;
use clap::Args;

use copycoder_core::project::{AnalysisFocus, ProcessingOption, SettingsPatch};

use crate::context::AppContext;

#[derive(Args)]
pub struct SettingsArgs {
    /// Creativity, 0.0 to 1.0 in steps of 0.1
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Analysis focus: web, mobile, desktop, ui, landing
    #[arg(short, long)]
    pub focus: Option<AnalysisFocus>,

    /// Processing tier: standard, enhanced, expert
    #[arg(short, long)]
    pub processing: Option<ProcessingOption>,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(ctx: &AppContext, args: SettingsArgs) -> Result<()> {
    let shell = ctx.shell(None).await?;

    let patch = SettingsPatch {
        temperature: args.temperature,
        analysis_focus: args.focus,
        processing_option: args.processing,
    };
    let settings = if patch == SettingsPatch::default() {
        shell.settings()
    } else {
        shell.update_settings(&patch).await?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    } else {
        println!("temperature: {}", settings.temperature);
        println!("focus:       {}", settings.analysis_focus);
        println!("processing:  {}", settings.processing_option);
    }
    Ok(())
}
