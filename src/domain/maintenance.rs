use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::product::Product;

pub const BASE_SERVICE_FEE: i64 = 500;

/// Restock urgency for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestockStatus {
    Ok,
    Watch,
    Urgent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotAnalysis {
    pub id: String,
    pub name: String,
    pub stock: i64,
    pub priority: f64,
    pub status: RestockStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryAnalysis {
    pub slots: Vec<SlotAnalysis>,
    pub urgent_count: usize,
    pub estimated_service_cost: i64,
}

/// Scores every slot for restock urgency and estimates the cost of a
/// service visit. Read-only; run on maintenance re-entry.
pub fn analyze(catalog: &BTreeMap<String, Product>, balance: i64, restock_level: i64) -> InventoryAnalysis {
    let slots: Vec<SlotAnalysis> = catalog
        .values()
        .map(|product| {
            let priority = restock_priority(product, restock_level);
            SlotAnalysis {
                id: product.id.clone(),
                name: product.name.clone(),
                stock: product.stock,
                priority,
                status: if priority > 100.0 {
                    RestockStatus::Urgent
                } else if priority > 50.0 {
                    RestockStatus::Watch
                } else {
                    RestockStatus::Ok
                },
            }
        })
        .collect();

    let urgent_count = slots
        .iter()
        .filter(|s| s.status == RestockStatus::Urgent)
        .count();
    let empty_slots = catalog.values().filter(|p| p.stock == 0).count();

    let mut cost = BASE_SERVICE_FEE;
    if empty_slots > 3 {
        cost += 300;
    } else if empty_slots > 0 {
        cost += 100;
    }
    if balance < 100 {
        cost += 200;
    }

    InventoryAnalysis {
        slots,
        urgent_count,
        estimated_service_cost: cost,
    }
}

fn restock_priority(product: &Product, restock_level: i64) -> f64 {
    let missing = (restock_level - product.stock).max(0);
    let mut score = missing as f64 * 10.0;

    if product.unit_price >= 30 {
        score *= 1.5;
    }
    if product.heated {
        score += 20.0;
    }
    if product.stock == 0 {
        score += 50.0;
    }
    score
}
