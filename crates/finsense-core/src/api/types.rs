//! Wire types for the FinSense backend.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Bearer token grant returned by the login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: String,
}

/// Backend user record, also cached in the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

/// Assistant answer to one chat question.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// One classified transaction row from the uploaded statements.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifiedTransaction {
    pub text: String,
    pub category: String,
    pub confidence: String,
}

/// Result of a budget forecast submission.
///
/// All fields are optional; the backend omits sections it could not produce.
/// Displayed once per submission, never persisted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetReport {
    /// Base64-encoded PNG of the forecast chart
    pub image_data: Option<String>,
    /// Allocated amount per spending category
    pub budget: Option<BTreeMap<String, f64>>,
    /// Forecast figures for the coming month
    pub forecast: Option<BTreeMap<String, Value>>,
    /// Free-form summary produced by the forecasting model
    pub summary: Option<BTreeMap<String, Value>>,
    /// Per-transaction classification rows
    pub results: Option<Vec<ClassifiedTransaction>>,
}
