//! Feedback left on an order by its requester and its collector.

use chrono::{DateTime, Utc};
use common::{FeedbackId, OrderId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedbackError {
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Feedback update is empty")]
    EmptyUpdate,
}

/// A star rating from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = FeedbackError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(FeedbackError::InvalidRating(value))
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// Which party of the order is writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackSide {
    Requester,
    Collector,
}

/// One side's partial update. Absent fields keep the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackUpdate {
    pub rating: Option<u8>,
    pub review: Option<String>,
}

impl FeedbackUpdate {
    pub fn new(rating: Option<u8>, review: Option<impl Into<String>>) -> Self {
        Self {
            rating,
            review: review.map(Into::into),
        }
    }

    fn is_empty(&self) -> bool {
        self.rating.is_none() && self.review.is_none()
    }
}

/// Optional one-to-one companion of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub order_id: OrderId,
    pub requester_rating: Option<Rating>,
    pub requester_review: Option<String>,
    pub collector_rating: Option<Rating>,
    pub collector_review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feedback {
    pub fn new(order_id: OrderId, at: DateTime<Utc>) -> Self {
        Self {
            id: FeedbackId::new(),
            order_id,
            requester_rating: None,
            requester_review: None,
            collector_rating: None,
            collector_review: None,
            created_at: at,
            updated_at: at,
        }
    }

    /// Merges one side's update into the record.
    ///
    /// The rating is checked before anything changes, so a rejected update
    /// leaves the record untouched. Reviews are trimmed; a review that is
    /// blank after trimming keeps the stored value.
    pub fn apply_update(
        &mut self,
        side: FeedbackSide,
        update: FeedbackUpdate,
        at: DateTime<Utc>,
    ) -> Result<(), FeedbackError> {
        if update.is_empty() {
            return Err(FeedbackError::EmptyUpdate);
        }
        let rating = update.rating.map(Rating::try_from).transpose()?;
        let review = update
            .review
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let (stored_rating, stored_review) = match side {
            FeedbackSide::Requester => (&mut self.requester_rating, &mut self.requester_review),
            FeedbackSide::Collector => (&mut self.collector_rating, &mut self.collector_review),
        };
        if rating.is_some() {
            *stored_rating = rating;
        }
        if review.is_some() {
            *stored_review = review;
        }
        self.updated_at = at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        assert!(Rating::try_from(1).is_ok());
        assert!(Rating::try_from(5).is_ok());
        assert_eq!(Rating::try_from(0), Err(FeedbackError::InvalidRating(0)));
        assert_eq!(Rating::try_from(6), Err(FeedbackError::InvalidRating(6)));
    }

    #[test]
    fn rating_deserialization_is_checked() {
        assert!(serde_json::from_str::<Rating>("4").is_ok());
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }

    #[test]
    fn update_writes_only_its_side() {
        let mut feedback = Feedback::new(OrderId::new(), Utc::now());
        feedback
            .apply_update(
                FeedbackSide::Requester,
                FeedbackUpdate::new(Some(5), Some("  quick pickup  ")),
                Utc::now(),
            )
            .unwrap();

        assert_eq!(feedback.requester_rating.map(|r| r.get()), Some(5));
        assert_eq!(feedback.requester_review.as_deref(), Some("quick pickup"));
        assert!(feedback.collector_rating.is_none());
        assert!(feedback.collector_review.is_none());
    }

    #[test]
    fn missing_fields_keep_stored_values() {
        let mut feedback = Feedback::new(OrderId::new(), Utc::now());
        feedback
            .apply_update(
                FeedbackSide::Collector,
                FeedbackUpdate::new(Some(3), Some("sorted well")),
                Utc::now(),
            )
            .unwrap();
        feedback
            .apply_update(
                FeedbackSide::Collector,
                FeedbackUpdate::new(Some(4), None::<String>),
                Utc::now(),
            )
            .unwrap();

        assert_eq!(feedback.collector_rating.map(|r| r.get()), Some(4));
        assert_eq!(feedback.collector_review.as_deref(), Some("sorted well"));
    }

    #[test]
    fn invalid_rating_changes_nothing() {
        let mut feedback = Feedback::new(OrderId::new(), Utc::now());
        let before = feedback.clone();
        let err = feedback
            .apply_update(
                FeedbackSide::Requester,
                FeedbackUpdate::new(Some(7), Some("great")),
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err, FeedbackError::InvalidRating(7));
        assert_eq!(feedback, before);
    }

    #[test]
    fn empty_update_is_rejected() {
        let mut feedback = Feedback::new(OrderId::new(), Utc::now());
        assert_eq!(
            feedback.apply_update(FeedbackSide::Requester, FeedbackUpdate::default(), Utc::now()),
            Err(FeedbackError::EmptyUpdate)
        );
    }
}
