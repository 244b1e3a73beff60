use anyhow::{Result, bail};
use clap::Subcommand;
use tokio::io::{AsyncBufReadExt, BufReader};

use copycoder_application::Notification;
use copycoder_application::auth_flow::{LoginLinkService, VerifyLinkHandler, landing_notifications};
use copycoder_core::auth::LoggingMailer;
use std::sync::Arc;

use crate::context::AppContext;

#[derive(Subcommand)]
pub enum LoginMethodCommand {
    /// Email a login link, then paste it back to verify
    Link { email: String },
    /// Email a 6-digit code, then enter it to verify
    Code { email: String },
    /// Username and password
    Credentials {
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Log in without verification (demo)
    Demo { email: String },
}

async fn prompt_line(label: &str) -> Result<String> {
    eprint!("{}: ", label);
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line.trim().to_string())
}

pub async fn login(ctx: &AppContext, method: LoginMethodCommand) -> Result<()> {
    let links = LoginLinkService::new(ctx.auth.clone(), Arc::new(LoggingMailer));

    let user = match method {
        LoginMethodCommand::Link { email } => {
            links.send_login_link(&email).await?;
            eprintln!("Verification email sent! Please check your inbox.");

            let link = prompt_line("Verification link").await?;
            let redirect = VerifyLinkHandler::new(ctx.auth.clone()).handle(&link).await;
            let notifications = landing_notifications(&redirect.location);
            for notification in &notifications {
                ctx.notifier.notify(notification.clone());
            }
            if notifications.iter().any(Notification::is_destructive) {
                bail!("Login failed");
            }
            ctx.auth.current_user().await
        }
        LoginMethodCommand::Code { email } => {
            links.send_login_code(&email).await?;
            eprintln!("Verification email sent! Check your inbox.");

            let code = prompt_line("Verification code").await?;
            Some(ctx.auth.verify(&email, &code).await?)
        }
        LoginMethodCommand::Credentials { username, password } => {
            Some(ctx.auth.login_with_credentials(&username, &password).await?)
        }
        LoginMethodCommand::Demo { email } => Some(ctx.auth.auto_verify(&email).await?),
    };

    match user {
        Some(user) => println!("Logged in as {} ({})", user.email, user.role),
        None => bail!("Login failed"),
    }
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    ctx.auth.logout().await?;
    println!("Logged out.");
    Ok(())
}

pub async fn whoami(ctx: &AppContext) -> Result<()> {
    match ctx.auth.current_user().await {
        Some(user) => println!("{} ({})", user.email, user.role),
        None => println!("Not logged in."),
    }
    Ok(())
}
