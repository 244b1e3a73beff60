use anyhow::Result;
use clap::Subcommand;

use copycoder_core::state::Theme;

use crate::context::AppContext;

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Switch between dark and light
    Toggle,
    /// Set the theme explicitly
    Set { theme: Theme },
}

pub async fn run(ctx: &AppContext, action: Option<ThemeAction>) -> Result<()> {
    let shell = ctx.shell(None).await?;
    let theme = match action {
        None => shell.theme(),
        Some(ThemeAction::Toggle) => shell.toggle_theme().await?,
        Some(ThemeAction::Set { theme }) => shell.set_theme(theme).await?,
    };
    println!("{}", theme);
    Ok(())
}
