use clap::{Subcommand, ValueEnum};

use crate::cli::context::CliContext;
use crate::cli::utils::output_data;
use crate::cli::OutputFormat;
use crate::client::BookingWindow;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BookingMode {
    /// Request the booking; pay at approval
    Request,
    /// Hold the car with a partial payment
    Reserve,
    /// Pay the full amount now
    Full,
}

#[derive(Subcommand)]
pub enum CarsCommands {
    #[command(about = "List cars available right now")]
    List,

    #[command(about = "Show one car with its booked slots")]
    Show {
        #[arg(help = "Car ID")]
        car_id: u64,
    },

    #[command(about = "Book a car for a time window")]
    Book {
        #[arg(help = "Car ID")]
        car_id: u64,
        #[arg(long, help = "Start, e.g. 2024-06-01T10:00")]
        start: String,
        #[arg(long, help = "End, e.g. 2024-06-02T10:00")]
        end: String,
        #[arg(long, value_enum, default_value = "request")]
        mode: BookingMode,
    },
}

// Listing and detail pages are public; the backend decides what an anonymous
// caller sees. Booking sits behind the /booking guard.
pub async fn handle(ctx: &CliContext, cmd: CarsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        CarsCommands::List => {
            let cars = ctx.client().cars().live().await?;
            output_data(&output_format, "Live cars", cars)
        }
        CarsCommands::Show { car_id } => {
            let car = ctx.client().cars().details(car_id).await?;
            output_data(&output_format, &format!("Car {}", car_id), car)
        }
        CarsCommands::Book { car_id, start, end, mode } => {
            let window = BookingWindow {
                start_time: start,
                end_time: end,
            };
            let path = format!("/booking/{}", car_id);
            let data = ctx
                .guarded(&path, move || async move {
                    let cars = ctx.client().cars();
                    let data = match mode {
                        BookingMode::Request => cars.book(car_id, &window).await?,
                        BookingMode::Reserve => cars.reserve(car_id, &window).await?,
                        BookingMode::Full => cars.pay_full(car_id, &window).await?,
                    };
                    Ok(data)
                })
                .await?;
            output_data(&output_format, &format!("Booked car {}", car_id), data)
        }
    }
}
