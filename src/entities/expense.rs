// 🧾 Expenses and the per-category compliance limits they are checked against

use serde::{Deserialize, Serialize};

use super::merchant::Merchant;

/// ComplianceRule - maximum allowed amount for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceRule {
    pub category: String,
    pub max_amount: f64,
}

/// Expense - one submitted expense line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub employee_id: i64,
    pub merchant_id: i64,

    /// References ComplianceRule.category
    pub category: String,

    /// Kept as text; the report orders by it lexically (ISO dates sort correctly)
    pub submission_date: String,

    pub amount: f64,
}

impl Expense {
    /// Non-compliant: strictly above the category maximum
    pub fn exceeds(&self, rule: &ComplianceRule) -> bool {
        self.amount > rule.max_amount
    }

    /// The report predicate: non-compliant OR paid to a high-risk merchant
    pub fn is_flagged(&self, rule: &ComplianceRule, merchant: &Merchant) -> bool {
        self.exceeds(rule) || merchant.is_high_risk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn travel_rule() -> ComplianceRule {
        ComplianceRule {
            category: "Travel".to_string(),
            max_amount: 100.0,
        }
    }

    fn expense(amount: f64) -> Expense {
        Expense {
            employee_id: 1,
            merchant_id: 1,
            category: "Travel".to_string(),
            submission_date: "2024-01-01".to_string(),
            amount,
        }
    }

    fn merchant(risk: &str) -> Merchant {
        Merchant {
            merchant_id: 1,
            merchant_name: "Acme".to_string(),
            merchant_risk_level: risk.to_string(),
        }
    }

    #[test]
    fn test_exceeds_is_strict() {
        let rule = travel_rule();
        assert!(expense(150.0).exceeds(&rule));
        assert!(expense(100.01).exceeds(&rule));
        assert!(!expense(100.0).exceeds(&rule));
        assert!(!expense(50.0).exceeds(&rule));
    }

    #[test]
    fn test_flag_clauses_are_independent() {
        let rule = travel_rule();

        assert!(expense(150.0).is_flagged(&rule, &merchant("Low")));
        assert!(expense(50.0).is_flagged(&rule, &merchant("High")));
        assert!(expense(150.0).is_flagged(&rule, &merchant("High")));
        assert!(!expense(50.0).is_flagged(&rule, &merchant("Low")));
        assert!(!expense(50.0).is_flagged(&rule, &merchant("Medium")));
    }
}
