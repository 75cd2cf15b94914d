use crate::domain::machine::VendingMachine;
use crate::domain::ports::CoinVault;

/// One simulated subsystem probe. All readings are fixed constants:
/// there is no hardware behind this, it exists for the operator channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsystemReport {
    pub subsystem: &'static str,
    pub status: String,
}

/// One slot exercised by the dispenser test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTest {
    pub id: String,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticsReport {
    pub subsystems: Vec<SubsystemReport>,
    pub slot_tests: Vec<SlotTest>,
}

/// Runs the deep hardware scan requested by `dispense` in maintenance
/// mode. Stateless and read-only with respect to the machine.
pub fn run<V: CoinVault>(machine: &VendingMachine<V>) -> DiagnosticsReport {
    let subsystems = vec![
        SubsystemReport {
            subsystem: "power_unit",
            status: "voltage stable (110V)".to_string(),
        },
        SubsystemReport {
            subsystem: "cooling_system",
            status: "chiller nominal (4C)".to_string(),
        },
        SubsystemReport {
            subsystem: "coin_mech",
            status: "sorter clean, anti-fishing gate ok".to_string(),
        },
        SubsystemReport {
            subsystem: "dispenser_motor",
            status: "x/y motors ok, drop sensor nominal".to_string(),
        },
        SubsystemReport {
            subsystem: "connectivity",
            status: "dual uplink available".to_string(),
        },
    ];

    let slot_tests = machine
        .products()
        .map(|product| SlotTest {
            id: product.id.clone(),
            passed: product.in_stock(),
        })
        .collect();

    DiagnosticsReport {
        subsystems,
        slot_tests,
    }
}
