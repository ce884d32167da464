// Vendor payout (withdrawal) endpoints

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use tracing::info;
use validator::Validate;

use super::{get_page, Page, Ref};
use crate::api::vendors::Vendor;
use crate::error::ApiError;
use crate::http::HttpClient;
use crate::ids::{deserialize_id, path_segment};
use crate::validation::{validate_not_blank, validate_positive_amount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Approved => "approved",
            WithdrawalStatus::Rejected => "rejected",
            WithdrawalStatus::Completed => "completed",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, WithdrawalStatus::Rejected | WithdrawalStatus::Completed)
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Admin decision on a pending withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalDecision {
    Approved,
    Rejected,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    #[validate(custom = "validate_not_blank")]
    pub account_holder: String,
    #[validate(length(min = 6, max = 34, message = "Account number must be between 6 and 34 characters"))]
    pub account_number: String,
    #[validate(custom = "validate_not_blank")]
    pub bank_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub vendor: Option<Ref<Vendor>>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    pub status: WithdrawalStatus,
    #[serde(default)]
    pub bank_details: Option<BankDetails>,
    #[serde(default, alias = "adminRemarks")]
    pub remarks: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub requested_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
}

/// Vendor payout request DTO
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[validate(custom = "validate_positive_amount")]
    pub amount: Decimal,
    #[validate]
    pub bank_details: BankDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Note must be at most 500 characters"))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct ProcessWithdrawalRequest {
    pub status: WithdrawalDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Remarks must be at most 500 characters"))]
    pub remarks: Option<String>,
}

#[derive(Clone)]
pub struct WithdrawalApi {
    client: HttpClient,
}

impl WithdrawalApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub async fn request(&self, request: &WithdrawalRequest) -> Result<Withdrawal, ApiError> {
        request.validate()?;
        let withdrawal: Withdrawal = self.client.post("/vendor/withdrawals", request).await?;
        info!("Requested withdrawal {} of {}", withdrawal.id, withdrawal.amount);
        Ok(withdrawal)
    }

    /// Withdrawals of the signed-in vendor
    pub async fn mine(&self) -> Result<Page<Withdrawal>, ApiError> {
        get_page::<Withdrawal, ()>(&self.client, "/vendor/withdrawals", "withdrawals", None)
            .await
    }

    /// Admin only; `status` narrows the list
    pub async fn list(&self, status: Option<WithdrawalStatus>) -> Result<Page<Withdrawal>, ApiError> {
        let query = json!({ "status": status });
        get_page(&self.client, "/admin/withdrawals", "withdrawals", Some(&query)).await
    }

    /// Admin only
    pub async fn process(
        &self,
        id: &str,
        request: &ProcessWithdrawalRequest,
    ) -> Result<Withdrawal, ApiError> {
        request.validate()?;
        let id = path_segment(id)?;
        let withdrawal: Withdrawal = self
            .client
            .patch(&format!("/admin/withdrawals/{}", id), request)
            .await?;
        info!("Withdrawal {} is now {}", withdrawal.id, withdrawal.status);
        Ok(withdrawal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bank() -> BankDetails {
        BankDetails {
            account_holder: "Himal Treks Pvt Ltd".to_string(),
            account_number: "0012345678".to_string(),
            bank_name: "Everest Bank".to_string(),
        }
    }

    #[test]
    fn test_withdrawal_request_validation() {
        let request = WithdrawalRequest {
            amount: dec!(2500),
            bank_details: bank(),
            note: None,
        };
        assert!(request.validate().is_ok());

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["amount"], json!(2500.0));
        assert_eq!(value["bankDetails"]["accountNumber"], "0012345678");

        let zero = WithdrawalRequest {
            amount: Decimal::ZERO,
            ..request.clone()
        };
        assert!(zero.validate().is_err());

        let bad_bank = WithdrawalRequest {
            bank_details: BankDetails {
                account_number: "12".to_string(),
                ..bank()
            },
            ..request
        };
        let errors = bad_bank.validate().unwrap_err();
        assert!(errors.errors().contains_key("bank_details"));
    }

    #[test]
    fn test_withdrawal_decodes_admin_view() {
        let withdrawal: Withdrawal = serde_json::from_value(json!({
            "_id": "w1",
            "vendor": {"_id": "v1", "businessName": "Himal Treks", "status": "approved"},
            "amount": "1200.00",
            "status": "completed",
            "createdAt": "2024-03-01T09:30:00Z"
        }))
        .unwrap();

        assert_eq!(withdrawal.amount, dec!(1200.00));
        assert!(withdrawal.status.is_final());
        let vendor = withdrawal.vendor.as_ref().and_then(Ref::populated).unwrap();
        assert_eq!(vendor.business_name, "Himal Treks");
        assert!(withdrawal.requested_at.is_some());
    }
}
