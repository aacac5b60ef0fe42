use clap::Subcommand;

use crate::cli::context::CliContext;
use crate::cli::utils::output_data;
use crate::cli::OutputFormat;
use crate::client::{BlockWindow, RideAction};

#[derive(Subcommand)]
pub enum OwnerCommands {
    #[command(about = "Earnings, optionally for one year or month")]
    Earnings {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },

    #[command(about = "List a car's blocked slots, or add one with --start/--end")]
    Blocks {
        #[arg(help = "Car ID")]
        car_id: u64,
        #[arg(long, requires = "end", help = "Block start, e.g. 2024-06-01T10:00")]
        start: Option<String>,
        #[arg(long, requires = "start", help = "Block end")]
        end: Option<String>,
    },

    #[command(about = "Show a booking's ride, or start/end it with the renter's OTP")]
    Ride {
        #[arg(help = "Booking ID")]
        booking_id: u64,
        #[arg(help = "start or end")]
        action: Option<RideAction>,
        #[arg(long, requires = "action", help = "OTP the renter received")]
        otp: Option<String>,
    },
}

pub async fn handle(ctx: &CliContext, cmd: OwnerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        OwnerCommands::Earnings { year, month } => {
            let data = ctx
                .guarded("/owner", move || async move { Ok(ctx.client().owner().earnings(year, month).await?) })
                .await?;
            output_data(&output_format, "Owner earnings", data)
        }
        OwnerCommands::Blocks { car_id, start, end } => {
            let path = format!("/owner/blocks/{}", car_id);
            let data = ctx
                .guarded(&path, move || async move {
                    let owner = ctx.client().owner();
                    if let (Some(start_block), Some(end_block)) = (start, end) {
                        owner.block(car_id, &BlockWindow { start_block, end_block }).await?;
                    }
                    Ok(owner.blocks(car_id).await?)
                })
                .await?;
            output_data(&output_format, &format!("Blocks for car {}", car_id), data)
        }
        OwnerCommands::Ride { booking_id, action, otp } => {
            let path = format!("/owner/ride_action/{}", booking_id);
            let data = ctx
                .guarded(&path, move || async move {
                    let owner = ctx.client().owner();
                    match action {
                        Some(action) => {
                            let otp = otp.ok_or_else(|| anyhow::anyhow!("--otp is required to {} a ride", action.as_str()))?;
                            Ok(owner.ride(booking_id, action, &otp).await?)
                        }
                        None => Ok(owner.ride_action(booking_id).await?),
                    }
                })
                .await?;
            output_data(&output_format, &format!("Ride for booking {}", booking_id), data)
        }
    }
}
