// Backend resource endpoints. Payloads are passed through untouched.

use std::path::PathBuf;
use std::str::FromStr;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ApiClient, ClientError};

#[derive(Debug, Clone, Serialize)]
pub struct BookingWindow {
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockWindow {
    pub start_block: String,
    pub end_block: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentConfirmation {
    pub razorpay_payment_id: String,
    pub razorpay_order_id: String,
    pub razorpay_signature: String,
}

/// Owner-side transition of a booked ride, confirmed by the renter's OTP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideAction {
    Start,
    End,
}

impl RideAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideAction::Start => "start",
            RideAction::End => "end",
        }
    }

    /// Backend endpoint for this action
    pub fn path(&self, booking_id: &str) -> String {
        format!("/owner/{}_ride/{}", self.as_str(), booking_id)
    }
}

impl FromStr for RideAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(RideAction::Start),
            "end" => Ok(RideAction::End),
            other => Err(format!("unknown ride action '{}'", other)),
        }
    }
}

/// Renter details and document scans for a booking
#[derive(Debug, Clone, Default)]
pub struct DocumentUpload {
    pub name: String,
    pub address: String,
    pub contact: String,
    pub aadhar: Option<PathBuf>,
    pub driving_license: Option<PathBuf>,
    pub selfie: Option<PathBuf>,
}

impl DocumentUpload {
    async fn into_form(self) -> Result<Form, std::io::Error> {
        let mut form = Form::new()
            .text("name", self.name)
            .text("address", self.address)
            .text("contact", self.contact);

        for (field, path) in [
            ("aadhar", self.aadhar),
            ("driving_license", self.driving_license),
            ("selfie", self.selfie),
        ] {
            let Some(path) = path else { continue };
            let bytes = tokio::fs::read(&path).await?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| field.to_string());
            form = form.part(field, Part::bytes(bytes).file_name(file_name));
        }
        Ok(form)
    }
}

fn period_query(year: Option<i32>, month: Option<u32>) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(year) = year {
        query.push(("year", year.to_string()));
    }
    if let Some(month) = month {
        query.push(("month", month.to_string()));
    }
    query
}

impl ApiClient {
    pub fn cars(&self) -> Cars<'_> {
        Cars(self)
    }

    pub fn payments(&self) -> Payments<'_> {
        Payments(self)
    }

    pub fn documents(&self) -> Documents<'_> {
        Documents(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users(self)
    }

    pub fn owner(&self) -> Owner<'_> {
        Owner(self)
    }

    pub fn admin(&self) -> Admin<'_> {
        Admin(self)
    }
}

pub struct Cars<'a>(&'a ApiClient);

impl Cars<'_> {
    pub async fn live(&self) -> Result<Value, ClientError> {
        self.0.get("/home").await
    }

    pub async fn details(&self, car_id: u64) -> Result<Value, ClientError> {
        self.0.get(&format!("/booking/{}", car_id)).await
    }

    pub async fn book(&self, car_id: u64, window: &BookingWindow) -> Result<Value, ClientError> {
        self.0.post(&format!("/booking/{}", car_id), window).await
    }

    pub async fn reserve(&self, car_id: u64, window: &BookingWindow) -> Result<Value, ClientError> {
        self.0.post(&format!("/reserve/{}", car_id), window).await
    }

    pub async fn pay_full(&self, car_id: u64, window: &BookingWindow) -> Result<Value, ClientError> {
        self.0.post(&format!("/pay_full/{}", car_id), window).await
    }
}

pub struct Payments<'a>(&'a ApiClient);

impl Payments<'_> {
    pub async fn details(&self, order_id: &str) -> Result<Value, ClientError> {
        self.0.get_query("/pay", &[("order_id", order_id)]).await
    }

    pub async fn confirm(&self, confirmation: &PaymentConfirmation) -> Result<Value, ClientError> {
        self.0.post("/payment_success", confirmation).await
    }

    pub async fn pay_due(&self, booking_id: u64) -> Result<Value, ClientError> {
        self.0.post_empty(&format!("/pay_due/{}", booking_id)).await
    }

    pub async fn pay_due_now(&self, order_id: &str) -> Result<Value, ClientError> {
        self.0.get_query("/pay_due_now", &[("order_id", order_id)]).await
    }
}

pub struct Documents<'a>(&'a ApiClient);

impl Documents<'_> {
    pub async fn list(&self, booking_id: u64) -> Result<Value, ClientError> {
        self.0.get(&format!("/upload_documents/{}", booking_id)).await
    }

    pub async fn upload(&self, booking_id: u64, upload: DocumentUpload) -> Result<Value, ClientError> {
        let form = upload.into_form().await?;
        self.0.post_multipart(&format!("/upload_documents/{}", booking_id), form).await
    }
}

pub struct Users<'a>(&'a ApiClient);

impl Users<'_> {
    pub async fn dashboard(&self) -> Result<Value, ClientError> {
        self.0.get("/user_dashboard").await
    }

    /// `kind` is one of `live`, `past`, `cancelled`
    pub async fn bookings(&self, kind: &str) -> Result<Value, ClientError> {
        self.0.get(&format!("/user/bookings/{}", kind)).await
    }

    pub async fn ride_status(&self, booking_id: u64) -> Result<Value, ClientError> {
        self.0.get(&format!("/user/ride_status/{}", booking_id)).await
    }
}

pub struct Owner<'a>(&'a ApiClient);

impl Owner<'_> {
    pub async fn dashboard(&self) -> Result<Value, ClientError> {
        self.0.get("/owner/dashboard").await
    }

    pub async fn earnings(&self, year: Option<i32>, month: Option<u32>) -> Result<Value, ClientError> {
        self.0.get_query("/owner/earnings", &period_query(year, month)).await
    }

    pub async fn blocks(&self, car_id: u64) -> Result<Value, ClientError> {
        self.0.get(&format!("/owner/block/{}", car_id)).await
    }

    pub async fn block(&self, car_id: u64, window: &BlockWindow) -> Result<Value, ClientError> {
        self.0.post(&format!("/owner/block/{}", car_id), window).await
    }

    pub async fn ride_action(&self, booking_id: u64) -> Result<Value, ClientError> {
        self.0.get(&format!("/owner/ride_action/{}", booking_id)).await
    }

    pub async fn ride(&self, booking_id: u64, action: RideAction, otp: &str) -> Result<Value, ClientError> {
        self.0.post(&action.path(&booking_id.to_string()), &json!({ "otp": otp })).await
    }
}

pub struct Admin<'a>(&'a ApiClient);

impl Admin<'_> {
    pub async fn approvals(&self) -> Result<Value, ClientError> {
        self.0.get("/admin/approvals").await
    }

    pub async fn approve(&self, booking_id: u64) -> Result<Value, ClientError> {
        self.0.post_empty(&format!("/admin/approve/{}", booking_id)).await
    }

    pub async fn reject(&self, booking_id: u64) -> Result<Value, ClientError> {
        self.0.post_empty(&format!("/admin/reject/{}", booking_id)).await
    }

    pub async fn dashboard(&self) -> Result<Value, ClientError> {
        self.0.get("/admin/dashboard").await
    }

    pub async fn bookings(&self) -> Result<Value, ClientError> {
        self.0.get("/admin/bookings").await
    }

    pub async fn earnings(&self, year: Option<i32>, month: Option<u32>) -> Result<Value, ClientError> {
        self.0.get_query("/admin/earnings", &period_query(year, month)).await
    }

    pub async fn delete_car(&self, car_id: u64) -> Result<Value, ClientError> {
        self.0.post_empty(&format!("/admin/delete/{}", car_id)).await
    }

    pub async fn cancel_booking(&self, booking_id: u64) -> Result<Value, ClientError> {
        self.0.post_empty(&format!("/admin/cancel_booking/{}", booking_id)).await
    }

    pub async fn live_rides(&self) -> Result<Value, ClientError> {
        self.0.get("/admin/live_rides").await
    }

    pub async fn force_end(&self, booking_id: u64) -> Result<Value, ClientError> {
        self.0.post_empty(&format!("/admin/force_end/{}", booking_id)).await
    }

    pub async fn block_manager(&self) -> Result<Value, ClientError> {
        self.0.get("/admin/block_manager").await
    }

    pub async fn car_blocks(&self, car_id: u64) -> Result<Value, ClientError> {
        self.0.get(&format!("/admin/block/{}", car_id)).await
    }

    pub async fn block_car(&self, car_id: u64, window: &BlockWindow) -> Result<Value, ClientError> {
        self.0.post(&format!("/admin/block/{}", car_id), window).await
    }

    pub async fn unblock_car(&self, car_id: u64, block_index: usize) -> Result<Value, ClientError> {
        self.0.post_empty(&format!("/admin/unblock/{}/{}", car_id, block_index)).await
    }
}
