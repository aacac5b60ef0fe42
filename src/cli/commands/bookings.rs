use clap::Subcommand;

use crate::cli::context::CliContext;
use crate::cli::utils::output_data;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum BookingsCommands {
    #[command(about = "Bookings in progress or upcoming")]
    Live,

    #[command(about = "Completed bookings")]
    Past,

    #[command(about = "Cancelled bookings")]
    Cancelled,

    #[command(about = "Status of a single ride")]
    RideStatus {
        #[arg(help = "Booking ID")]
        booking_id: u64,
    },
}

pub async fn handle(ctx: &CliContext, cmd: BookingsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (path, kind) = match &cmd {
        BookingsCommands::Live => ("/bookings".to_string(), "live"),
        BookingsCommands::Past => ("/bookings".to_string(), "past"),
        BookingsCommands::Cancelled => ("/bookings".to_string(), "cancelled"),
        BookingsCommands::RideStatus { booking_id } => (format!("/user/ride_status/{}", booking_id), "ride"),
    };

    let data = ctx
        .guarded(&path, move || async move {
            let users = ctx.client().users();
            let data = match cmd {
                BookingsCommands::RideStatus { booking_id } => users.ride_status(booking_id).await?,
                _ => users.bookings(kind).await?,
            };
            Ok(data)
        })
        .await?;

    output_data(&output_format, &format!("Bookings ({})", kind), data)
}
