use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use common::{CollectorId, Money, RequesterId};
use domain::{Order, OrderStatus};

/// Result ordering for [`OrderQuery`].
///
/// Every ordering falls back to natural (insertion) order for ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSort {
    /// Insertion order.
    #[default]
    Natural,
    /// Most recently created first.
    NewestFirst,
    /// Earliest pickup date first.
    PickupDate,
    /// Highest estimated amount first.
    EstimatedAmountDesc,
}

/// Builder for constructing order queries.
///
/// Unset filters match everything. Date-time ranges are half-open
/// (`from` inclusive, `to` exclusive); pickup-date ranges are inclusive.
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    pub requester_id: Option<RequesterId>,
    pub collector_id: Option<CollectorId>,

    /// Any of these statuses.
    pub statuses: Option<Vec<OrderStatus>>,

    /// Only orders with no collector assigned.
    pub unassigned_only: bool,

    pub pickup_date_from: Option<NaiveDate>,
    pub pickup_date_to: Option<NaiveDate>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub updated_from: Option<DateTime<Utc>>,
    pub updated_to: Option<DateTime<Utc>>,
    pub min_estimated_amount: Option<Money>,

    pub sort: OrderSort,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl OrderQuery {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for one requester's orders.
    pub fn for_requester(requester_id: RequesterId) -> Self {
        Self {
            requester_id: Some(requester_id),
            ..Default::default()
        }
    }

    /// Creates a query for orders assigned to one collector.
    pub fn for_collector(collector_id: CollectorId) -> Self {
        Self {
            collector_id: Some(collector_id),
            ..Default::default()
        }
    }

    pub fn requester(mut self, id: RequesterId) -> Self {
        self.requester_id = Some(id);
        self
    }

    pub fn collector(mut self, id: CollectorId) -> Self {
        self.collector_id = Some(id);
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.statuses = Some(vec![status]);
        self
    }

    pub fn statuses(mut self, statuses: Vec<OrderStatus>) -> Self {
        self.statuses = Some(statuses);
        self
    }

    pub fn unassigned(mut self) -> Self {
        self.unassigned_only = true;
        self
    }

    /// Filters to pickups on or between the two dates.
    pub fn pickup_between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.pickup_date_from = Some(from);
        self.pickup_date_to = Some(to);
        self
    }

    /// Filters to pickups on one date.
    pub fn pickup_on(self, date: NaiveDate) -> Self {
        self.pickup_between(date, date)
    }

    pub fn created_between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.created_from = Some(from);
        self.created_to = Some(to);
        self
    }

    pub fn updated_between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.updated_from = Some(from);
        self.updated_to = Some(to);
        self
    }

    pub fn min_estimated_amount(mut self, amount: Money) -> Self {
        self.min_estimated_amount = Some(amount);
        self
    }

    pub fn sort(mut self, sort: OrderSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if the order passes every filter.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(id) = self.requester_id
            && order.requester_id() != id
        {
            return false;
        }
        if let Some(id) = self.collector_id
            && order.collector_id() != Some(id)
        {
            return false;
        }
        if let Some(ref statuses) = self.statuses
            && !statuses.contains(&order.status())
        {
            return false;
        }
        if self.unassigned_only && order.collector_id().is_some() {
            return false;
        }
        if let Some(from) = self.pickup_date_from
            && order.pickup_date() < from
        {
            return false;
        }
        if let Some(to) = self.pickup_date_to
            && order.pickup_date() > to
        {
            return false;
        }
        if let Some(from) = self.created_from
            && order.created_at() < from
        {
            return false;
        }
        if let Some(to) = self.created_to
            && order.created_at() >= to
        {
            return false;
        }
        if let Some(from) = self.updated_from
            && order.updated_at() < from
        {
            return false;
        }
        if let Some(to) = self.updated_to
            && order.updated_at() >= to
        {
            return false;
        }
        if let Some(min) = self.min_estimated_amount
            && order.estimated_amount() < min
        {
            return false;
        }
        true
    }

    /// Compares two orders under this query's sort. Callers must use a
    /// stable sort so ties keep insertion order.
    pub fn compare(&self, a: &Order, b: &Order) -> Ordering {
        match self.sort {
            OrderSort::Natural => Ordering::Equal,
            OrderSort::NewestFirst => b.created_at().cmp(&a.created_at()),
            OrderSort::PickupDate => a.pickup_date().cmp(&b.pickup_date()),
            OrderSort::EstimatedAmountDesc => b.estimated_amount().cmp(&a.estimated_amount()),
        }
    }
}
