use std::path::PathBuf;

use clap::Subcommand;

use crate::cli::context::CliContext;
use crate::cli::utils::output_data;
use crate::cli::OutputFormat;
use crate::client::DocumentUpload;

#[derive(Subcommand)]
pub enum DocumentsCommands {
    #[command(about = "Documents already on file for a booking")]
    List {
        #[arg(help = "Booking ID")]
        booking_id: u64,
    },

    #[command(about = "Upload renter details and document scans")]
    Upload {
        #[arg(help = "Booking ID")]
        booking_id: u64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        contact: String,
        #[arg(long, help = "Aadhaar card scan")]
        aadhar: Option<PathBuf>,
        #[arg(long, help = "Driving license scan")]
        driving_license: Option<PathBuf>,
        #[arg(long, help = "Selfie photo")]
        selfie: Option<PathBuf>,
    },
}

pub async fn handle(ctx: &CliContext, cmd: DocumentsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DocumentsCommands::List { booking_id } => {
            let path = format!("/documents/{}", booking_id);
            let data = ctx
                .guarded(&path, move || async move { Ok(ctx.client().documents().list(booking_id).await?) })
                .await?;
            output_data(&output_format, &format!("Documents for booking {}", booking_id), data)
        }
        DocumentsCommands::Upload {
            booking_id,
            name,
            address,
            contact,
            aadhar,
            driving_license,
            selfie,
        } => {
            let upload = DocumentUpload {
                name,
                address,
                contact,
                aadhar,
                driving_license,
                selfie,
            };
            let path = format!("/documents/{}", booking_id);
            let data = ctx
                .guarded(&path, move || async move { Ok(ctx.client().documents().upload(booking_id, upload).await?) })
                .await?;
            output_data(&output_format, &format!("Documents uploaded for booking {}", booking_id), data)
        }
    }
}
