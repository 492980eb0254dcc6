//! Per-requester and per-collector totals.

use collaborators::Profile;
use common::Money;
use domain::Order;
use serde::Serialize;

/// Kilowatt-hours of energy saved per kilogram recycled.
pub const ENERGY_KWH_PER_KG: f64 = 2.3;
/// Litres of water saved per kilogram recycled.
pub const WATER_LITRES_PER_KG: f64 = 18.23;
/// Trees spared per kilogram recycled.
pub const TREES_PER_KG: f64 = 0.36;
/// Kilograms of ore saved per kilogram recycled.
pub const ORE_KG_PER_KG: f64 = 0.18;
/// Kilograms of CO2 avoided per kilogram recycled.
pub const CO2_KG_PER_KG: f64 = 1.5;

/// Environmental savings, each rounded to a whole unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EnvironmentalImpact {
    pub energy_saved_kwh: i64,
    pub water_saved_litres: i64,
    pub trees_saved: i64,
    pub ore_saved_kg: i64,
    pub co2_reduced_kg: i64,
}

impl EnvironmentalImpact {
    pub fn from_weight(weight_kg: f64) -> Self {
        Self {
            energy_saved_kwh: round_half_up(weight_kg * ENERGY_KWH_PER_KG),
            water_saved_litres: round_half_up(weight_kg * WATER_LITRES_PER_KG),
            trees_saved: round_half_up(weight_kg * TREES_PER_KG),
            ore_saved_kg: round_half_up(weight_kg * ORE_KG_PER_KG),
            co2_reduced_kg: round_half_up(weight_kg * CO2_KG_PER_KG),
        }
    }
}

/// Halves round towards positive infinity.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Totals over the recycled orders one identity took part in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantStats {
    pub profile: Option<Profile>,
    pub total_completed_orders: u64,
    pub total_weight_kg: f64,
    pub total_earnings: Money,
    pub environmental_impact: EnvironmentalImpact,
}

impl ParticipantStats {
    /// Sums `orders`, which must already be narrowed to the identity's
    /// recycled orders. Each order's total counts once however many line
    /// items it has.
    pub fn from_orders(orders: &[Order], profile: Option<Profile>) -> Self {
        let total_weight_kg: f64 = orders.iter().map(Order::total_weight_kg).sum();
        let total_earnings: Money = orders.iter().filter_map(Order::total_amount).sum();

        Self {
            profile,
            total_completed_orders: orders.len() as u64,
            total_weight_kg,
            total_earnings,
            environmental_impact: EnvironmentalImpact::from_weight(total_weight_kg),
        }
    }
}
