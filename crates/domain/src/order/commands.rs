//! Order commands.
//!
//! Commands carry caller-supplied input. Identity comes from the typed
//! caller, never from the payload.

use chrono::NaiveDate;
use common::Money;
use serde::{Deserialize, Serialize};

use super::{
    LineItem, OrderError, PickupLocation,
    value_objects::{validate_contact_number, validate_line_items},
};

/// Command to place a new pickup order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrder {
    pub pickup_location: PickupLocation,
    pub pickup_date: NaiveDate,
    pub pickup_time: String,
    pub contact_number: String,

    /// Requester's estimate of what will be collected.
    pub line_items: Vec<LineItem>,

    pub estimated_amount: Money,

    /// Image references. Local files before upload, stored URLs after.
    pub images: Vec<String>,
}

impl CreateOrder {
    /// Checks every field without touching any collaborator.
    pub fn validate(&self) -> Result<(), OrderError> {
        self.pickup_location.validate()?;
        if self.pickup_time.trim().is_empty() {
            return Err(OrderError::missing("pickup_time"));
        }
        validate_contact_number(&self.contact_number)?;
        validate_line_items(&self.line_items)?;
        if self.estimated_amount.is_negative() {
            return Err(OrderError::NegativeEstimate);
        }
        if self.estimated_amount > Money::from_major(Money::MAX_MAJOR) {
            return Err(OrderError::AmountTooLarge {
                max: Money::MAX_MAJOR,
            });
        }
        if self.images.is_empty() || self.images.iter().any(|i| i.trim().is_empty()) {
            return Err(OrderError::NoImages);
        }
        Ok(())
    }

    /// Returns the command with its image references replaced.
    pub fn with_images(self, images: Vec<String>) -> Self {
        Self { images, ..self }
    }
}

/// Command to complete an accepted order with weighed actuals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteOrder {
    pub line_items: Vec<LineItem>,
}

impl CompleteOrder {
    pub fn new(line_items: Vec<LineItem>) -> Self {
        Self { line_items }
    }
}

/// Command to move the pickup slot.
///
/// Both fields are optional on the wire so that an absent value surfaces as
/// a validation error instead of a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RescheduleOrder {
    pub pickup_date: Option<NaiveDate>,
    pub pickup_time: Option<String>,
}

impl RescheduleOrder {
    pub fn new(pickup_date: NaiveDate, pickup_time: impl Into<String>) -> Self {
        Self {
            pickup_date: Some(pickup_date),
            pickup_time: Some(pickup_time.into()),
        }
    }

    /// Returns the new slot, or a validation error if either part is absent.
    pub fn validate(&self) -> Result<(NaiveDate, String), OrderError> {
        let date = self
            .pickup_date
            .ok_or_else(|| OrderError::missing("pickup_date"))?;
        let time = self
            .pickup_time
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| OrderError::missing("pickup_time"))?;
        Ok((date, time.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ScrapTypeId;

    fn valid_create() -> CreateOrder {
        CreateOrder {
            pickup_location: PickupLocation::new("Baneshwor, Kathmandu", 27.69, 85.34),
            pickup_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            pickup_time: "09:00-11:00".to_string(),
            contact_number: "9800000000".to_string(),
            line_items: vec![LineItem::new(ScrapTypeId::new(), 10.0, 250.0)],
            estimated_amount: Money::from_major(250.0),
            images: vec!["/tmp/a.jpg".to_string()],
        }
    }

    #[test]
    fn valid_create_passes() {
        assert!(valid_create().validate().is_ok());
    }

    #[test]
    fn create_rejects_bad_fields() {
        let mut cmd = valid_create();
        cmd.contact_number = "12345".into();
        assert!(matches!(
            cmd.validate(),
            Err(OrderError::InvalidContactNumber)
        ));

        let mut cmd = valid_create();
        cmd.images.clear();
        assert!(matches!(cmd.validate(), Err(OrderError::NoImages)));

        let mut cmd = valid_create();
        cmd.line_items.clear();
        assert!(matches!(cmd.validate(), Err(OrderError::NoLineItems)));

        let mut cmd = valid_create();
        cmd.pickup_time = " ".into();
        assert!(matches!(
            cmd.validate(),
            Err(OrderError::MissingField { field: "pickup_time" })
        ));

        let mut cmd = valid_create();
        cmd.estimated_amount = Money::from_minor(-1);
        assert!(matches!(cmd.validate(), Err(OrderError::NegativeEstimate)));
    }

    #[test]
    fn create_rejects_estimate_above_maximum() {
        let mut cmd = valid_create();
        cmd.estimated_amount = Money::from_major(Money::MAX_MAJOR);
        assert!(cmd.validate().is_ok());

        cmd.estimated_amount = Money::from_minor(i64::MAX);
        let err = cmd.validate().unwrap_err();
        assert!(matches!(err, OrderError::AmountTooLarge { .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn reschedule_requires_both_fields() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert!(RescheduleOrder::new(date, "14:00").validate().is_ok());

        let missing_time = RescheduleOrder {
            pickup_date: Some(date),
            pickup_time: Some("  ".into()),
        };
        assert!(matches!(
            missing_time.validate(),
            Err(OrderError::MissingField { field: "pickup_time" })
        ));

        assert!(matches!(
            RescheduleOrder::default().validate(),
            Err(OrderError::MissingField { field: "pickup_date" })
        ));
    }
}
