// 🏪 Merchant - where the money went, with a categorical risk level

use serde::{Deserialize, Serialize};

/// Risk level that flags an expense regardless of its amount
pub const HIGH_RISK_LEVEL: &str = "High";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    pub merchant_id: i64,
    pub merchant_name: String,

    /// Categorical: "High", "Medium", "Low" (free text, not validated)
    pub merchant_risk_level: String,
}

impl Merchant {
    /// Exact, case-sensitive match on "High" (same as the report query)
    pub fn is_high_risk(&self) -> bool {
        self.merchant_risk_level == HIGH_RISK_LEVEL
    }
}
