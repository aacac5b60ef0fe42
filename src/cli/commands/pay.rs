use clap::Subcommand;

use crate::cli::context::CliContext;
use crate::cli::utils::output_data;
use crate::cli::OutputFormat;
use crate::client::PaymentConfirmation;

#[derive(Subcommand)]
pub enum PayCommands {
    #[command(about = "Start paying the balance due on a booking")]
    Due {
        #[arg(help = "Booking ID")]
        booking_id: u64,
    },

    #[command(about = "Show the order created for a balance payment")]
    DueNow {
        #[arg(help = "Payment order ID")]
        order_id: String,
    },

    #[command(about = "Show a payment order")]
    Details {
        #[arg(help = "Payment order ID")]
        order_id: String,
    },

    #[command(about = "Confirm a completed gateway payment")]
    Confirm {
        #[arg(long)]
        payment_id: String,
        #[arg(long)]
        order_id: String,
        #[arg(long)]
        signature: String,
    },
}

pub async fn handle(ctx: &CliContext, cmd: PayCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        PayCommands::Due { booking_id } => {
            let path = format!("/pay_due/{}", booking_id);
            let data = ctx
                .guarded(&path, move || async move { Ok(ctx.client().payments().pay_due(booking_id).await?) })
                .await?;
            output_data(&output_format, &format!("Balance due for booking {}", booking_id), data)
        }
        PayCommands::DueNow { order_id } => {
            let data = ctx
                .guarded("/due_payment", move || async move {
                    Ok(ctx.client().payments().pay_due_now(&order_id).await?)
                })
                .await?;
            output_data(&output_format, "Balance payment order", data)
        }
        PayCommands::Details { order_id } => {
            let data = ctx
                .guarded("/payment", move || async move { Ok(ctx.client().payments().details(&order_id).await?) })
                .await?;
            output_data(&output_format, "Payment details", data)
        }
        PayCommands::Confirm {
            payment_id,
            order_id,
            signature,
        } => {
            let confirmation = PaymentConfirmation {
                razorpay_payment_id: payment_id,
                razorpay_order_id: order_id,
                razorpay_signature: signature,
            };
            let data = ctx
                .guarded("/payment", move || async move {
                    Ok(ctx.client().payments().confirm(&confirmation).await?)
                })
                .await?;
            output_data(&output_format, "Payment confirmed", data)
        }
    }
}
