pub mod commands;
pub mod config;
pub mod context;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "hanuman")]
#[command(about = "Hanuman CLI - car rental marketplace from the terminal")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "OTP login, logout and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Check whether the current session may open a page")]
    Open {
        #[arg(help = "Page path, e.g. /owner/blocks/12")]
        path: String,
    },

    #[command(about = "Browse cars")]
    Cars {
        #[command(subcommand)]
        cmd: commands::cars::CarsCommands,
    },

    #[command(about = "Your bookings")]
    Bookings {
        #[command(subcommand)]
        cmd: commands::bookings::BookingsCommands,
    },

    #[command(about = "Show the dashboard for your role")]
    Dashboard,

    #[command(about = "Owner earnings and car blocks")]
    Owner {
        #[command(subcommand)]
        cmd: commands::owner::OwnerCommands,
    },

    #[command(about = "Admin approvals and live rides")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },

    #[command(about = "Booking documents")]
    Documents {
        #[command(subcommand)]
        cmd: commands::documents::DocumentsCommands,
    },

    #[command(about = "Payments")]
    Pay {
        #[command(subcommand)]
        cmd: commands::pay::PayCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let ctx = context::CliContext::load()?;

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(&ctx, cmd, output_format).await,
        Commands::Open { path } => commands::open::handle(&ctx, &path, output_format).await,
        Commands::Cars { cmd } => commands::cars::handle(&ctx, cmd, output_format).await,
        Commands::Bookings { cmd } => commands::bookings::handle(&ctx, cmd, output_format).await,
        Commands::Dashboard => commands::dashboard::handle(&ctx, output_format).await,
        Commands::Owner { cmd } => commands::owner::handle(&ctx, cmd, output_format).await,
        Commands::Admin { cmd } => commands::admin::handle(&ctx, cmd, output_format).await,
        Commands::Documents { cmd } => commands::documents::handle(&ctx, cmd, output_format).await,
        Commands::Pay { cmd } => commands::pay::handle(&ctx, cmd, output_format).await,
    }
}
