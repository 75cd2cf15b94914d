use serde::{Deserialize, Serialize};

/// A catalog slot: one product with its list price and stock on hand.
///
/// `unit_price` is in the smallest currency unit. Negative prices and
/// stocks can arrive from configuration; the machine's startup
/// self-check heals them to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub unit_price: i64,
    pub stock: i64,
    pub heated: bool,
}

impl Product {
    pub fn new(id: &str, name: &str, unit_price: i64, stock: i64, heated: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            unit_price,
            stock,
            heated,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_stock() {
        let mut product = Product::new("A1", "Cola", 25, 1, false);
        assert!(product.in_stock());
        product.stock = 0;
        assert!(!product.in_stock());
    }
}
