use serde::Deserialize;
use tracing::info;

use crate::application::diagnostics;
use crate::domain::machine::{
    DispenseOutcome, MachineReport, MaintenanceOutcome, SelectOutcome, VendingMachine,
};
use crate::domain::ports::CoinVault;
use crate::domain::pricing;
use crate::error::{Result, VendError};
use crate::infrastructure::in_memory::InMemoryVault;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Insert,
    Select,
    Dispense,
    Cancel,
    Maintenance,
}

/// One operation row from a session script.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
pub struct Op {
    pub op: OpKind,
    pub amount: Option<i64>,
    pub product: Option<String>,
    pub code: Option<String>,
}

/// Drives a script of operations into one machine, validating that each
/// row carries the field its operation needs and logging what happened.
///
/// Domain-level rejections (bad coin, unknown product, wrong code) are
/// not errors here: the machine swallows them by design. Only a row
/// missing its required field comes back as `Err`.
pub struct Session<V: CoinVault = InMemoryVault> {
    machine: VendingMachine<V>,
    refunded_total: i64,
    vend_count: u32,
}

impl<V: CoinVault> Session<V> {
    pub fn new(machine: VendingMachine<V>) -> Self {
        Self {
            machine,
            refunded_total: 0,
            vend_count: 0,
        }
    }

    pub fn apply(&mut self, op: Op) -> Result<()> {
        match op.op {
            OpKind::Insert => {
                let amount = op.amount.ok_or_else(|| {
                    VendError::Validation("insert missing amount".to_string())
                })?;
                self.machine.insert_funds(amount);
            }
            OpKind::Select => {
                let id = op.product.ok_or_else(|| {
                    VendError::Validation("select missing product id".to_string())
                })?;
                match self.machine.select_product(&id) {
                    SelectOutcome::Vended(receipt) => {
                        self.vend_count += 1;
                        if let Some(product) = self.machine.product(&receipt.product_id) {
                            info!(%id, tagline = %pricing::tagline(product), "enjoy");
                        }
                        if !receipt.change.is_exact() {
                            info!(
                                shortfall = receipt.change.shortfall,
                                "customer was short-changed, reserve needs service"
                            );
                        }
                    }
                    outcome => info!(?outcome, %id, "selection did not vend"),
                }
            }
            OpKind::Dispense => {
                if let DispenseOutcome::DiagnosticsRequested = self.machine.dispense() {
                    let report = diagnostics::run(&self.machine);
                    for check in &report.subsystems {
                        info!(subsystem = check.subsystem, status = %check.status, "diagnostic");
                    }
                    for test in &report.slot_tests {
                        info!(id = %test.id, passed = test.passed, "slot test");
                    }
                }
            }
            OpKind::Cancel => {
                self.refunded_total += self.machine.cancel();
            }
            OpKind::Maintenance => {
                let code = op.code.ok_or_else(|| {
                    VendError::Validation("maintenance missing code".to_string())
                })?;
                if let MaintenanceOutcome::Analysis(analysis) =
                    self.machine.enter_maintenance(&code)
                {
                    info!(
                        urgent = analysis.urgent_count,
                        cost = analysis.estimated_service_cost,
                        "inventory analysis"
                    );
                }
            }
        }
        Ok(())
    }

    pub fn machine(&self) -> &VendingMachine<V> {
        &self.machine
    }

    /// Total handed back to the caller over the whole session.
    pub fn refunded_total(&self) -> i64 {
        self.refunded_total
    }

    pub fn vend_count(&self) -> u32 {
        self.vend_count
    }

    /// Consumes the session and returns the final machine snapshot.
    pub fn into_report(self) -> MachineReport {
        self.machine.report()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::machine::MachineState;

    fn insert(amount: i64) -> Op {
        Op {
            op: OpKind::Insert,
            amount: Some(amount),
            product: None,
            code: None,
        }
    }

    fn select(id: &str) -> Op {
        Op {
            op: OpKind::Select,
            amount: None,
            product: Some(id.to_string()),
            code: None,
        }
    }

    fn cancel() -> Op {
        Op {
            op: OpKind::Cancel,
            amount: None,
            product: None,
            code: None,
        }
    }

    #[test]
    fn test_purchase_script() {
        let mut session = Session::new(VendingMachine::default());
        for op in [insert(10), insert(10), insert(10), select("A1")] {
            session.apply(op).unwrap();
        }

        assert_eq!(session.vend_count(), 1);
        let report = session.into_report();
        assert_eq!(report.state, MachineState::Idle);
        assert_eq!(report.balance, 0);
        let cola = report.products.iter().find(|p| p.id == "A1").unwrap();
        assert_eq!(cola.stock, 9);
    }

    #[test]
    fn test_refunds_are_tallied() {
        let mut session = Session::new(VendingMachine::default());
        for op in [insert(50), cancel(), insert(10), insert(5), cancel()] {
            session.apply(op).unwrap();
        }

        assert_eq!(session.refunded_total(), 65);
        assert_eq!(session.vend_count(), 0);
        assert_eq!(session.machine().balance(), 0);
    }

    #[test]
    fn test_missing_required_field_is_an_error() {
        let mut session = Session::new(VendingMachine::default());

        let bad_insert = Op {
            op: OpKind::Insert,
            amount: None,
            product: None,
            code: None,
        };
        assert!(matches!(
            session.apply(bad_insert),
            Err(VendError::Validation(_))
        ));

        let bad_select = Op {
            op: OpKind::Select,
            amount: None,
            product: None,
            code: None,
        };
        assert!(matches!(
            session.apply(bad_select),
            Err(VendError::Validation(_))
        ));

        // The machine itself is untouched by rejected rows.
        assert_eq!(session.machine().state(), MachineState::Idle);
        assert_eq!(session.machine().balance(), 0);
    }

    #[test]
    fn test_op_csv_deserialization() {
        let data = "op,amount,product,code\ninsert,10,,\nselect,,A1,\nmaintenance,,,admin123";
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes());
        let ops: Vec<Op> = reader.deserialize().map(|r| r.unwrap()).collect();

        assert_eq!(ops[0].op, OpKind::Insert);
        assert_eq!(ops[0].amount, Some(10));
        assert_eq!(ops[1].op, OpKind::Select);
        assert_eq!(ops[1].product.as_deref(), Some("A1"));
        assert_eq!(ops[2].op, OpKind::Maintenance);
        assert_eq!(ops[2].code.as_deref(), Some("admin123"));
    }
}
