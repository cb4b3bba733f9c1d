//! Backend routing contract.
//!
//! These paths and storage key names are the compatibility contract with the
//! FinSense backend; they must not drift.

/// Sign in with username/password, returns a bearer token. POST, no auth.
pub const LOGIN: &str = "/auth/login";
/// Create an account. POST, no auth.
pub const REGISTER: &str = "/auth/register";
/// Fetch the signed-in user record. GET, bearer auth.
pub const PROFILE: &str = "/auth/profile";
/// Ask the assistant a question. POST, auth optional.
pub const CHAT: &str = "/chat";
/// Upload statements and generate a forecast. POST multipart, bearer auth.
pub const PREDICT_BUDGET: &str = "/predict_budget";
/// Spreadsheet of the last classification run. POST, bearer auth.
pub const DOWNLOAD_CLASSIFICATION: &str = "/download/classification";
/// Spreadsheet of the last budget forecast. POST, bearer auth.
pub const DOWNLOAD_BUDGET: &str = "/download/budget";

/// Storage key under which the bearer token is persisted.
pub const TOKEN_KEY: &str = "finsense_token";
/// Storage key under which the cached profile is persisted.
pub const USER_KEY: &str = "finsense_user";
