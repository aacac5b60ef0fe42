use clap::Subcommand;
use serde_json::json;

use crate::auth::{self, AuthFlow, RegisterRequest};
use crate::cli::context::CliContext;
use crate::cli::utils::{output_data, output_success};
use crate::cli::OutputFormat;
use crate::session::RoleLookup;
use crate::types::UserPatch;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Email a one-time passcode")]
    SendOtp {
        #[arg(help = "Email address")]
        email: String,
    },

    #[command(about = "Log in with email and OTP")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(help = "One-time passcode from the email")]
        otp: String,
        #[arg(long, help = "Page to continue to after login")]
        redirect: Option<String>,
    },

    #[command(about = "Log out and clear the local session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Ask the backend who the current token belongs to")]
    Whoami,

    #[command(about = "Register a new account (run once without --otp to get one)")]
    Register {
        #[arg(help = "Full name")]
        name: String,
        #[arg(help = "Email address")]
        email: String,
        #[arg(help = "Contact number")]
        contact: String,
        #[arg(long, help = "OTP received from the first step")]
        otp: Option<String>,
    },

    #[command(about = "Show or edit the local profile")]
    Profile {
        #[arg(long, help = "New display name")]
        name: Option<String>,
    },
}

pub async fn handle(ctx: &CliContext, cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let flow = AuthFlow::new(ctx.client());

    match cmd {
        AuthCommands::SendOtp { email } => {
            if flow.send_otp(&email).await? {
                output_success(&output_format, &format!("OTP sent to {}", email), Some(json!({ "otp_sent": true })))
            } else {
                Err(anyhow::anyhow!("Backend did not send an OTP to {}", email))
            }
        }
        AuthCommands::Login { email, otp, redirect } => {
            let user = flow.login(&email, &otp).await?;
            let next = auth::destination(&user, redirect.as_deref());
            output_success(
                &output_format,
                &format!("Logged in as {} ({}); continue to {}", user.email, user.role, next),
                Some(json!({ "user": user, "redirect_to": next })),
            )
        }
        AuthCommands::Logout => {
            flow.logout().await;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            ctx.initialize().await;
            let session = ctx.store().session();
            let message = match (&session.user, session.is_authenticated) {
                (Some(user), true) => format!("Logged in as {} ({})", user.email, user.role),
                _ => "Not logged in".to_string(),
            };
            output_success(
                &output_format,
                &message,
                Some(json!({
                    "authenticated": session.is_authenticated,
                    "user": session.user,
                })),
            )
        }
        AuthCommands::Whoami => {
            let token = ctx
                .store()
                .bearer_token()
                .ok_or_else(|| anyhow::anyhow!("Not logged in"))?;
            let identity = ctx.client().lookup_role(&token).await?;
            output_data(&output_format, "Backend identity", serde_json::to_value(identity)?)
        }
        AuthCommands::Register { name, email, contact, otp } => {
            let action = if otp.is_some() { "register" } else { "send_otp" };
            let request = RegisterRequest {
                name,
                email,
                contact,
                action: action.to_string(),
                otp,
            };
            let body = flow.register(&request).await?;
            let message = if action == "register" {
                "Registration complete; log in with `hanuman auth login`"
            } else {
                "OTP sent; rerun with --otp to finish registering"
            };
            output_data(&output_format, message, body)
        }
        AuthCommands::Profile { name } => {
            ctx.guarded("/profile", move || async move {
                if let Some(name) = name {
                    ctx.store().update_user(UserPatch {
                        name: Some(name),
                        ..UserPatch::default()
                    });
                }
                Ok(ctx.store().user())
            })
            .await
            .and_then(|user| output_data(&output_format, "Profile", serde_json::to_value(user)?))
        }
    }
}
