//! Top requesters and collectors by recycled volume.

use std::collections::HashMap;
use std::hash::Hash;

use collaborators::Profile;
use common::{CollectorId, Money, RequesterId};
use domain::{Order, OrderStatus};
use serde::Serialize;

/// Entries kept on each leaderboard.
pub const LEADERBOARD_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequesterRanking {
    pub requester_id: RequesterId,
    pub profile: Option<Profile>,
    pub total_amount: Money,
    pub order_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectorRanking {
    pub collector_id: CollectorId,
    pub profile: Option<Profile>,
    pub total_weight_kg: f64,
    pub order_count: u64,
}

/// Groups recycled orders by `key`, keeping groups in order of first
/// appearance.
fn group_recycled<K, V>(
    orders: &[Order],
    key: impl Fn(&Order) -> Option<K>,
    value: impl Fn(&Order) -> V,
) -> Vec<(K, V, u64)>
where
    K: Eq + Hash + Copy,
    V: std::ops::AddAssign + Copy,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, V, u64)> = Vec::new();

    for order in orders.iter().filter(|o| o.status() == OrderStatus::Recycled) {
        let Some(k) = key(order) else {
            continue;
        };
        let v = value(order);
        match positions.get(&k) {
            Some(&index) => {
                groups[index].1 += v;
                groups[index].2 += 1;
            }
            None => {
                positions.insert(k, groups.len());
                groups.push((k, v, 1));
            }
        }
    }
    groups
}

/// Requesters ranked by summed total amount, highest first.
///
/// Ties keep the order in which the requesters first appear.
pub fn top_requesters(orders: &[Order]) -> Vec<(RequesterId, Money, u64)> {
    let mut groups = group_recycled(
        orders,
        |o| Some(o.requester_id()),
        |o| o.total_amount().unwrap_or_default(),
    );
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups.truncate(LEADERBOARD_SIZE);
    groups
}

/// Collectors ranked by summed line-item weight, heaviest first.
///
/// Ties keep the order in which the collectors first appear.
pub fn top_collectors(orders: &[Order]) -> Vec<(CollectorId, f64, u64)> {
    let mut groups = group_recycled(orders, Order::collector_id, Order::total_weight_kg);
    groups.sort_by(|a, b| b.1.total_cmp(&a.1));
    groups.truncate(LEADERBOARD_SIZE);
    groups
}
