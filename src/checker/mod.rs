mod permissions;

pub use permissions::{classify, RiskTable, RiskTableError};

/// Returns the embedded reference risk table.
pub fn default_risk_table() -> RiskTable {
    RiskTable::builtin()
}
