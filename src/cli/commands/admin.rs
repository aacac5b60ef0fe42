use clap::Subcommand;

use crate::cli::context::CliContext;
use crate::cli::utils::output_data;
use crate::cli::OutputFormat;
use crate::client::BlockWindow;

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Bookings waiting for approval")]
    Approvals,

    #[command(about = "Approve a booking")]
    Approve {
        #[arg(help = "Booking ID")]
        booking_id: u64,
    },

    #[command(about = "Reject a booking")]
    Reject {
        #[arg(help = "Booking ID")]
        booking_id: u64,
    },

    #[command(about = "Rides currently on the road")]
    LiveRides,

    #[command(about = "End a ride on the owner's behalf")]
    ForceEnd {
        #[arg(help = "Booking ID")]
        booking_id: u64,
    },

    #[command(about = "All bookings")]
    Bookings,

    #[command(about = "Cancel a booking")]
    CancelBooking {
        #[arg(help = "Booking ID")]
        booking_id: u64,
    },

    #[command(about = "Platform earnings, optionally for one year or month")]
    Earnings {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },

    #[command(about = "Remove a car listing")]
    DeleteCar {
        #[arg(help = "Car ID")]
        car_id: u64,
    },

    #[command(about = "Blocked slots of every car, or of one car")]
    Blocks {
        #[arg(help = "Car ID")]
        car_id: Option<u64>,
    },

    #[command(about = "Block a car for a time window")]
    Block {
        #[arg(help = "Car ID")]
        car_id: u64,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },

    #[command(about = "Remove one of a car's blocks by position")]
    Unblock {
        #[arg(help = "Car ID")]
        car_id: u64,
        #[arg(help = "Block index as listed by `admin blocks <car_id>`")]
        index: usize,
    },
}

pub async fn handle(ctx: &CliContext, cmd: AdminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (message, data) = ctx
        .guarded("/admin", move || async move {
            let admin = ctx.client().admin();
            let result = match cmd {
                AdminCommands::Approvals => ("Pending approvals".to_string(), admin.approvals().await?),
                AdminCommands::Approve { booking_id } => {
                    (format!("Booking {} approved", booking_id), admin.approve(booking_id).await?)
                }
                AdminCommands::Reject { booking_id } => {
                    (format!("Booking {} rejected", booking_id), admin.reject(booking_id).await?)
                }
                AdminCommands::LiveRides => ("Live rides".to_string(), admin.live_rides().await?),
                AdminCommands::ForceEnd { booking_id } => {
                    (format!("Ride {} ended", booking_id), admin.force_end(booking_id).await?)
                }
                AdminCommands::Bookings => ("All bookings".to_string(), admin.bookings().await?),
                AdminCommands::CancelBooking { booking_id } => {
                    (format!("Booking {} cancelled", booking_id), admin.cancel_booking(booking_id).await?)
                }
                AdminCommands::Earnings { year, month } => {
                    ("Platform earnings".to_string(), admin.earnings(year, month).await?)
                }
                AdminCommands::DeleteCar { car_id } => {
                    (format!("Car {} deleted", car_id), admin.delete_car(car_id).await?)
                }
                AdminCommands::Blocks { car_id: None } => ("Blocks by car".to_string(), admin.block_manager().await?),
                AdminCommands::Blocks { car_id: Some(car_id) } => {
                    (format!("Blocks for car {}", car_id), admin.car_blocks(car_id).await?)
                }
                AdminCommands::Block { car_id, start, end } => {
                    let window = BlockWindow {
                        start_block: start,
                        end_block: end,
                    };
                    (format!("Car {} blocked", car_id), admin.block_car(car_id, &window).await?)
                }
                AdminCommands::Unblock { car_id, index } => {
                    (format!("Block {} removed from car {}", index, car_id), admin.unblock_car(car_id, index).await?)
                }
            };
            Ok(result)
        })
        .await?;

    output_data(&output_format, &message, data)
}
