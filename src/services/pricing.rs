use serde::Serialize;

use crate::models::BookingDraft;

pub const TAX_RATE_PERCENT: i64 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub subtotal: i64,
    pub tax: i64,
    pub grand_total: i64,
}

/// 18% of `subtotal`, rounded half up to a whole rupee.
pub fn tax_for(subtotal: i64) -> i64 {
    let scaled = subtotal * TAX_RATE_PERCENT;
    if scaled >= 0 {
        (scaled + 50) / 100
    } else {
        -((-scaled + 49) / 100)
    }
}

pub fn breakdown_for(subtotal: i64) -> PriceBreakdown {
    let tax = tax_for(subtotal);
    PriceBreakdown {
        subtotal,
        tax,
        grand_total: subtotal + tax,
    }
}

/// Always recomputed from the draft's current service and add-ons.
pub fn breakdown(draft: &BookingDraft) -> PriceBreakdown {
    breakdown_for(draft.total())
}
