use crate::domain::product::Product;

/// Product class inferred from the display name. Drives the category
/// pricing rule; `Unknown` prices like `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Coffee,
    Tea,
    Soda,
    Water,
    General,
    Unknown,
}

pub const MEMBER_COFFEE_RATE: f64 = 0.85;
pub const TEA_BALANCE_GATE: i64 = 50;
pub const SODA_PRICE_GATE: i64 = 25;
pub const OVERSTOCK_LEVEL: i64 = 15;
pub const SCARCE_LEVEL: i64 = 3;
pub const SCARCITY_FLOOR_RATE: f64 = 0.9;
pub const GUARD_BALANCE_GATE: i64 = 100;
pub const GUARD_PRICE_GATE: i64 = 40;

/// Classifies a product by case-insensitive keyword match on its name.
pub fn classify(name: &str) -> Category {
    if name.is_empty() {
        return Category::Unknown;
    }
    let n = name.to_uppercase();
    if n.contains("COFFEE") || n.contains("LATTE") || n.contains("ESPRESSO") {
        Category::Coffee
    } else if n.contains("TEA") || n.contains("OOLONG") {
        Category::Tea
    } else if n.contains("COKE") || n.contains("COLA") || n.contains("SODA") {
        Category::Soda
    } else if n.contains("WATER") {
        Category::Water
    } else {
        Category::General
    }
}

/// Final charge for one unit, given the funds already inserted and the
/// caller's membership. Pure and deterministic; the result is always in
/// `[0, unit_price]`.
///
/// The high-balance/high-value rebate interacts with the final floor:
/// when that rebate fires, the result is reconciled so it never drops
/// below `unit_price - 2`, capping the rebate's effect. That cap is an
/// inherited quirk and is pinned by the tests below.
pub fn quote(product: &Product, balance: i64, member: bool) -> i64 {
    let original = product.unit_price.max(0) as f64;
    let mut price = original;

    match classify(&product.name) {
        Category::Coffee if member => price *= MEMBER_COFFEE_RATE,
        Category::Tea if balance > TEA_BALANCE_GATE => price -= 5.0,
        Category::Soda if product.unit_price >= SODA_PRICE_GATE => price -= 2.0,
        _ => {}
    }

    if product.stock > OVERSTOCK_LEVEL {
        // Clear overstock faster on expensive items.
        price -= if product.unit_price > 30 { 5.0 } else { 2.0 };
    } else if product.stock > 0 && product.stock <= SCARCE_LEVEL {
        let floor = original * SCARCITY_FLOOR_RATE;
        if price < floor {
            price = floor;
        }
    }

    let mut rebate_fired = false;
    if balance > GUARD_BALANCE_GATE || product.unit_price > GUARD_PRICE_GATE {
        if member {
            price -= 10.0;
            rebate_fired = true;
        } else if price >= original - 2.0 {
            price -= 5.0;
            rebate_fired = true;
        }
    }
    if rebate_fired && price < original - 2.0 {
        price = original - 2.0;
    }

    if price < 0.0 {
        price = 0.0;
    }
    price as i64
}

/// Display copy for a product. Carries no transactional meaning.
pub fn tagline(product: &Product) -> String {
    let mut parts: Vec<&str> = Vec::new();

    if product.unit_price >= 40 {
        parts.push("indulgent pick");
    } else if product.unit_price <= 15 {
        parts.push("smart value");
    }

    parts.push(if product.heated { "served warm" } else { "ice cold" });

    parts.push(match classify(&product.name) {
        Category::Coffee => "wake-up shot",
        Category::Tea => "smooth brew",
        Category::Soda => "fizzy rush",
        Category::Water | Category::General | Category::Unknown => "classic flavor",
    });

    parts.join(", ")
}
