use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::change::{ChangeAllocator, ChangeBreakdown, STANDARD_FLOAT};
use crate::domain::coins::Denomination;
use crate::domain::maintenance::{self, InventoryAnalysis};
use crate::domain::ports::CoinVault;
use crate::domain::pricing;
use crate::domain::product::Product;
use crate::infrastructure::in_memory::InMemoryVault;

/// Stock level a maintenance restock resets a slot to.
pub const RESTOCK_LEVEL: i64 = 10;

/// Balances above this are implausible for a coin-fed machine and are
/// flagged (not corrected) by the self-check.
pub const MAX_PLAUSIBLE_BALANCE: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineState {
    Idle,
    HasFunds,
    Dispensing,
    SoldOut,
    Maintenance,
}

/// Record of one completed sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub product_id: String,
    pub charged: i64,
    pub change: ChangeBreakdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Vended(Receipt),
    InsufficientFunds,
    OutOfStock,
    UnknownProduct,
    Restocked { id: String, level: i64 },
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispenseOutcome {
    Vended(Receipt),
    ReturnedToFunds,
    DiagnosticsRequested,
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaintenanceOutcome {
    Entered,
    Analysis(InventoryAnalysis),
    Ignored,
}

/// Seed state for a machine: catalog, coin float, membership flag and
/// the maintenance shared secret. Loadable from JSON; the defaults
/// mirror a freshly serviced three-slot machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineConfig {
    pub products: Vec<Product>,
    pub coins: Vec<CoinLoad>,
    #[serde(default)]
    pub member: bool,
    pub maintenance_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinLoad {
    pub denomination: Denomination,
    pub count: u32,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            products: vec![
                Product::new("A1", "Cola", 25, 10, false),
                Product::new("A2", "Green Tea", 20, 5, false),
                Product::new("B1", "Coffee", 35, 2, true),
            ],
            coins: STANDARD_FLOAT
                .iter()
                .map(|&(denomination, count)| CoinLoad { denomination, count })
                .collect(),
            member: false,
            maintenance_code: "admin123".to_string(),
        }
    }
}

impl MachineConfig {
    /// Loads a machine configuration from JSON. Unknown coin
    /// denominations are rejected at parse time, so a constructed
    /// machine only ever tracks the closed set.
    pub fn from_json(source: impl std::io::Read) -> crate::error::Result<Self> {
        Ok(serde_json::from_reader(source)?)
    }

    fn seed_vault(&self) -> InMemoryVault {
        let counts: Vec<(Denomination, u32)> = self
            .coins
            .iter()
            .map(|load| (load.denomination, load.count))
            .collect();
        InMemoryVault::with_counts(&counts)
    }
}

/// Outcome of the startup integrity pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelfCheckReport {
    pub corrections: usize,
}

impl SelfCheckReport {
    pub fn is_clean(&self) -> bool {
        self.corrections == 0
    }
}

/// Coin level snapshot for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoinLevel {
    pub denomination: i64,
    pub count: u32,
}

/// Observable machine snapshot, written out at the end of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineReport {
    pub state: MachineState,
    pub balance: i64,
    pub products: Vec<Product>,
    pub reserve: Vec<CoinLevel>,
}

/// The transaction state machine.
///
/// Owns the balance, the catalog, the active state and the change
/// allocator, and routes the five external operations to state-specific
/// handlers. Finalization is the only place money and inventory move
/// together, and it applies its mutations as one block.
pub struct VendingMachine<V: CoinVault = InMemoryVault> {
    state: MachineState,
    balance: i64,
    selected: Option<String>,
    catalog: BTreeMap<String, Product>,
    allocator: ChangeAllocator<V>,
    member: bool,
    maintenance_code: String,
}

impl Default for VendingMachine {
    fn default() -> Self {
        Self::new(MachineConfig::default())
    }
}

impl VendingMachine {
    pub fn new(config: MachineConfig) -> Self {
        let vault = config.seed_vault();
        Self::with_vault(config, vault)
    }
}

impl<V: CoinVault> VendingMachine<V> {
    pub fn with_vault(config: MachineConfig, vault: V) -> Self {
        let mut catalog = BTreeMap::new();
        for product in config.products {
            catalog.insert(product.id.clone(), product);
        }
        let mut machine = Self {
            state: MachineState::Idle,
            balance: 0,
            selected: None,
            catalog,
            allocator: ChangeAllocator::with_vault(vault),
            member: config.member,
            maintenance_code: config.maintenance_code,
        };
        machine.self_check();
        machine
    }

    /// One-time integrity pass over the seeded state. Bad values are
    /// healed in place (clamped to zero, keys repaired) and counted;
    /// nothing here is fatal.
    pub fn self_check(&mut self) -> SelfCheckReport {
        let mut report = SelfCheckReport::default();

        if self.catalog.is_empty() {
            warn!("catalog is empty");
            report.corrections += 1;
        }
        for (key, product) in self.catalog.iter_mut() {
            if product.id != *key {
                warn!(%key, id = %product.id, "slot key and product id disagree, repairing");
                product.id = key.clone();
                report.corrections += 1;
            }
            if product.unit_price < 0 {
                warn!(id = %product.id, price = product.unit_price, "negative price, clamping");
                product.unit_price = 0;
                report.corrections += 1;
            } else if product.unit_price == 0 {
                warn!(id = %product.id, "zero-priced product");
            }
            if product.stock < 0 {
                warn!(id = %product.id, stock = product.stock, "negative stock, clamping");
                product.stock = 0;
                report.corrections += 1;
            }
        }

        if self.balance < 0 {
            warn!(balance = self.balance, "negative balance, clamping");
            self.balance = 0;
            report.corrections += 1;
        } else if self.balance > MAX_PLAUSIBLE_BALANCE {
            warn!(balance = self.balance, "implausibly large balance");
        }

        report
    }

    /// Accepts a coin. Only coins from the accepted denomination set add
    /// to the balance in Idle/HasFunds; anything else is dropped without
    /// comment. A sold-out machine still swallows coins so the caller
    /// must cancel to get them back.
    pub fn insert_funds(&mut self, amount: i64) {
        if amount <= 0 {
            return;
        }
        match self.state {
            MachineState::Idle => {
                if Denomination::try_from(amount).is_ok() {
                    self.balance += amount;
                    self.state = MachineState::HasFunds;
                    info!(amount, balance = self.balance, "coin accepted");
                }
            }
            MachineState::HasFunds => {
                if Denomination::try_from(amount).is_ok() {
                    self.balance += amount;
                    info!(amount, balance = self.balance, "coin accepted");
                }
            }
            MachineState::Dispensing => {
                info!(amount, "busy dispensing, coin rejected");
            }
            MachineState::SoldOut => {
                self.balance += amount;
                warn!(
                    amount,
                    balance = self.balance,
                    "sold out, cancel to get a refund"
                );
            }
            MachineState::Maintenance => {
                info!(amount, "in maintenance, coin returned");
            }
        }
    }

    pub fn select_product(&mut self, id: &str) -> SelectOutcome {
        match self.state {
            MachineState::Idle => {
                info!("insert funds first");
                SelectOutcome::Ignored
            }
            MachineState::HasFunds => self.select_with_funds(id),
            MachineState::Dispensing => SelectOutcome::Ignored,
            MachineState::SoldOut => {
                info!("no stock");
                SelectOutcome::Ignored
            }
            MachineState::Maintenance => self.restock(id),
        }
    }

    pub fn dispense(&mut self) -> DispenseOutcome {
        match self.state {
            MachineState::Dispensing => match self.finalize() {
                SelectOutcome::Vended(receipt) => DispenseOutcome::Vended(receipt),
                SelectOutcome::InsufficientFunds => DispenseOutcome::ReturnedToFunds,
                _ => DispenseOutcome::Ignored,
            },
            MachineState::Maintenance => DispenseOutcome::DiagnosticsRequested,
            _ => DispenseOutcome::Ignored,
        }
    }

    /// Refunds the current balance and returns the refunded amount.
    /// From Maintenance this exits to Idle without touching money.
    pub fn cancel(&mut self) -> i64 {
        match self.state {
            MachineState::HasFunds | MachineState::SoldOut => {
                let refund = self.balance;
                self.balance = 0;
                self.state = MachineState::Idle;
                info!(refund, "transaction cancelled");
                refund
            }
            MachineState::Maintenance => {
                info!("leaving maintenance");
                self.state = MachineState::Idle;
                0
            }
            MachineState::Idle | MachineState::Dispensing => 0,
        }
    }

    /// Enters maintenance mode when the code matches the shared secret;
    /// a wrong code is a silent no-op. Re-entering while already in
    /// maintenance runs the inventory and cost analysis instead.
    pub fn enter_maintenance(&mut self, code: &str) -> MaintenanceOutcome {
        match self.state {
            MachineState::Idle | MachineState::SoldOut if code == self.maintenance_code => {
                info!("entering maintenance");
                self.state = MachineState::Maintenance;
                MaintenanceOutcome::Entered
            }
            MachineState::Maintenance => MaintenanceOutcome::Analysis(maintenance::analyze(
                &self.catalog,
                self.balance,
                RESTOCK_LEVEL,
            )),
            _ => MaintenanceOutcome::Ignored,
        }
    }

    fn select_with_funds(&mut self, id: &str) -> SelectOutcome {
        let Some(product) = self.catalog.get(id) else {
            info!(id, "unknown product");
            return SelectOutcome::UnknownProduct;
        };
        if !product.in_stock() {
            self.state = MachineState::SoldOut;
            return SelectOutcome::OutOfStock;
        }
        if self.balance < product.unit_price {
            info!(
                id,
                balance = self.balance,
                price = product.unit_price,
                "insufficient funds"
            );
            return SelectOutcome::InsufficientFunds;
        }
        self.selected = Some(id.to_string());
        self.state = MachineState::Dispensing;
        self.finalize()
    }

    /// Converts the pending selection into a sale. The quote is computed
    /// once against the balance at this moment; on success the balance
    /// deduction, stock decrement and change allocation happen together.
    /// The selection is cleared whatever happens.
    fn finalize(&mut self) -> SelectOutcome {
        let Some(id) = self.selected.take() else {
            return SelectOutcome::Ignored;
        };
        let Some(product) = self.catalog.get_mut(&id) else {
            return SelectOutcome::Ignored;
        };

        let charged = pricing::quote(product, self.balance, self.member);
        if self.balance < charged {
            self.state = MachineState::HasFunds;
            return SelectOutcome::InsufficientFunds;
        }

        self.balance -= charged;
        product.stock -= 1;
        let change = self.allocator.make_change(self.balance);
        self.balance = 0;
        self.state = MachineState::Idle;
        info!(%id, charged, change = change.total(), "sale completed");

        SelectOutcome::Vended(Receipt {
            product_id: id,
            charged,
            change,
        })
    }

    fn restock(&mut self, id: &str) -> SelectOutcome {
        if let Some(product) = self.catalog.get_mut(id) {
            info!(id, from = product.stock, to = RESTOCK_LEVEL, "slot restocked");
            product.stock = RESTOCK_LEVEL;
            SelectOutcome::Restocked {
                id: id.to_string(),
                level: RESTOCK_LEVEL,
            }
        } else {
            info!(id, "unknown product");
            SelectOutcome::UnknownProduct
        }
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn member(&self) -> bool {
        self.member
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.catalog.get(id)
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.catalog.values()
    }

    pub fn allocator(&self) -> &ChangeAllocator<V> {
        &self.allocator
    }

    pub fn report(&self) -> MachineReport {
        MachineReport {
            state: self.state,
            balance: self.balance,
            products: self.catalog.values().cloned().collect(),
            reserve: Denomination::DESCENDING
                .iter()
                .map(|&d| CoinLevel {
                    denomination: d.value(),
                    count: self.allocator.vault().count(d),
                })
                .collect(),
        }
    }
}
