use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{AddOn, Address, PaymentMethod, PaymentStatus, Service, TimeSlot};
use crate::services::pricing::PriceBreakdown;

/// Everything the booking backend needs to accept a confirmed draft.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub customer_id: String,
    pub service: Service,
    pub add_ons: Vec<AddOn>,
    pub address: Address,
    pub scheduled_date: NaiveDate,
    pub slot: TimeSlot,
    pub payment_method: PaymentMethod,
    pub pricing: PriceBreakdown,
}

#[derive(Debug, Clone)]
pub struct Receipt {
    pub reference: String,
    pub payment_status: PaymentStatus,
}

#[async_trait]
pub trait BookingGateway: Send + Sync {
    async fn submit(&self, request: &BookingRequest) -> anyhow::Result<Receipt>;
}

/// Stand-in backend: accepts every booking after a fixed delay.
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

pub fn booking_reference() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("BK{}", id[..8].to_uppercase())
}

#[async_trait]
impl BookingGateway for SimulatedGateway {
    async fn submit(&self, request: &BookingRequest) -> anyhow::Result<Receipt> {
        tokio::time::sleep(self.delay).await;

        let payment_status = if request.payment_method.is_prepaid() {
            PaymentStatus::Completed
        } else {
            PaymentStatus::Pending
        };

        Ok(Receipt {
            reference: booking_reference(),
            payment_status,
        })
    }
}
