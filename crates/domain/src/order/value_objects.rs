//! Value objects for the order domain.

use chrono::{DateTime, Utc};
use common::{GeoPoint, Money, ScrapTypeId};
use serde::{Deserialize, Serialize};

use super::OrderError;

/// Where the scrap is picked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupLocation {
    pub formatted_address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl PickupLocation {
    pub fn new(formatted_address: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            formatted_address: formatted_address.into(),
            latitude,
            longitude,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub(crate) fn validate(&self) -> Result<(), OrderError> {
        if self.formatted_address.trim().is_empty() {
            return Err(OrderError::missing("pickup_location.formatted_address"));
        }
        if !self.point().is_valid() {
            return Err(OrderError::InvalidCoordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }
        Ok(())
    }
}

/// One scrap-type entry on an order.
///
/// The same shape carries the requester's estimate at creation and the
/// collector's weighed actuals at completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub scrap_type_id: ScrapTypeId,

    /// Weight in kilograms.
    pub weight_kg: f64,

    /// Amount in major currency units.
    pub amount: f64,
}

impl LineItem {
    pub fn new(scrap_type_id: ScrapTypeId, weight_kg: f64, amount: f64) -> Self {
        Self {
            scrap_type_id,
            weight_kg,
            amount,
        }
    }

    fn validate(&self, index: usize) -> Result<(), OrderError> {
        let ok = |v: f64| v.is_finite() && v >= 0.0;
        if !ok(self.weight_kg) || !ok(self.amount) {
            return Err(OrderError::InvalidLineItem {
                index,
                reason: "weight and amount must be finite and not negative",
            });
        }
        if self.amount > Money::MAX_MAJOR {
            return Err(OrderError::InvalidLineItem {
                index,
                reason: "amount exceeds the maximum",
            });
        }
        Ok(())
    }
}

/// Checks a non-empty set of line items.
pub(crate) fn validate_line_items(items: &[LineItem]) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::NoLineItems);
    }
    items
        .iter()
        .enumerate()
        .try_for_each(|(index, item)| item.validate(index))
}

/// A contact number must be exactly ten ASCII digits.
pub(crate) fn validate_contact_number(number: &str) -> Result<(), OrderError> {
    if number.len() == 10 && number.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(OrderError::InvalidContactNumber)
    }
}

/// Kind of an audit timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimelineKind {
    OrderCreated,
    OrderAccepted,
    OrderRecycled,
    OrderCancelled,
    OrderRescheduled,
}

/// One entry of an order's append-only audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: TimelineKind,
    pub message: String,
}
