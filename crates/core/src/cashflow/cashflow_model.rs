use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CONTRIBUTION_AMOUNT;
use crate::errors::{Error, Result, ValidationError};

/// A dated, signed cash flow. Negative = invested, positive = redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: Decimal,
}

impl CashFlow {
    pub fn new(date: NaiveDate, amount: Decimal) -> Self {
        Self { date, amount }
    }
}

/// Spacing of regular-plan contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ContributionInterval {
    Monthly,
    Quarterly,
    #[default]
    Yearly,
}

impl ContributionInterval {
    pub fn months(&self) -> u32 {
        match self {
            ContributionInterval::Monthly => 1,
            ContributionInterval::Quarterly => 3,
            ContributionInterval::Yearly => 12,
        }
    }
}

/// A regular-saving (dollar-cost-averaging) plan.
///
/// `anchor` fixes the first scheduled period start; when absent each
/// instrument anchors the schedule at its own first trading date. Scheduled
/// periods that end before the instrument's listing, or that contain no
/// trading date, are skipped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionPlan {
    pub amount: Decimal,
    pub interval: ContributionInterval,
    pub anchor: Option<NaiveDate>,
}

impl Default for ContributionPlan {
    fn default() -> Self {
        Self {
            amount: DEFAULT_CONTRIBUTION_AMOUNT,
            interval: ContributionInterval::Yearly,
            anchor: None,
        }
    }
}

impl ContributionPlan {
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "contribution amount must be positive, got {}",
                self.amount
            ))));
        }
        Ok(())
    }
}
