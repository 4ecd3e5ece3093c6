//! Request and response schemas for the Autolook API.
//!
//! Every RPC is described by one request record, one response record, and an
//! [`Endpoint`] constant binding the two to a wire path. Field declaration
//! order is wire order; authenticated requests carry the account token as a
//! transport-injected field that no constructor exposes.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::codec::{ApiRequest, ApiResponse};

/// Binds one RPC name to its request and response types.
///
/// The client serializes `Req`, POSTs it to `api/{path}`, and decodes the
/// reply as `Resp`. Endpoints are defined once as constants and never looked
/// up by name at this layer.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint<Req, Resp> {
    /// Path segment under `/api/`.
    pub path: &'static str,
    marker: PhantomData<fn() -> (Req, Resp)>,
}

impl<Req: ApiRequest, Resp: ApiResponse> Endpoint<Req, Resp> {
    pub const fn new(path: &'static str) -> Self {
        Self { path, marker: PhantomData }
    }
}

/// Uniform error reply, returned for any RPC whose `ok` discriminant is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    /// Stable error code, e.g. `"E02"` or `"INSUFFICIENT_BALANCE"`.
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Minimal response for callers that only need the discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub ok: bool,
}

impl ApiResponse for CheckResponse {}

// MARK: getApiSettings

/// Request for [`GET_API_SETTINGS`]. The one unauthenticated RPC.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetApiSettingsRequest {}

impl GetApiSettingsRequest {
    pub fn new() -> Self {
        Self {}
    }
}

impl ApiRequest for GetApiSettingsRequest {}

/// Server-advertised polling interval and default page limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetApiSettingsResponse {
    pub ok: bool,
    /// Seconds between inbox polls.
    pub default_get_emails_interval: f64,
    pub default_get_emails_limit: u32,
    pub default_get_mails_limit: u32,
}

impl ApiResponse for GetApiSettingsResponse {}

pub const GET_API_SETTINGS: Endpoint<GetApiSettingsRequest, GetApiSettingsResponse> =
    Endpoint::new("getApiSettings");

// MARK: getApiInfo

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetApiInfoRequest {
    #[serde(default)]
    alacctoken: Option<String>,
}

impl GetApiInfoRequest {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApiRequest for GetApiInfoRequest {
    fn set_account_token(&mut self, token: &str) {
        self.alacctoken = Some(token.to_owned());
    }
}

/// Domains currently in stock and their per-address prices.
///
/// Both maps are keyed by domain; stock values are remaining counts and price
/// values are decimal amounts, each as the server formats them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetApiInfoResponse {
    pub ok: bool,
    pub stock_domains: HashMap<String, String>,
    pub price_domains: HashMap<String, String>,
}

impl ApiResponse for GetApiInfoResponse {}

pub const GET_API_INFO: Endpoint<GetApiInfoRequest, GetApiInfoResponse> =
    Endpoint::new("getApiInfo");

// MARK: getBalance

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetBalanceRequest {
    #[serde(default)]
    alacctoken: Option<String>,
}

impl GetBalanceRequest {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApiRequest for GetBalanceRequest {
    fn set_account_token(&mut self, token: &str) {
        self.alacctoken = Some(token.to_owned());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetBalanceResponse {
    pub ok: bool,
    pub balance: f64,
}

impl ApiResponse for GetBalanceResponse {}

pub const GET_BALANCE: Endpoint<GetBalanceRequest, GetBalanceResponse> =
    Endpoint::new("getBalance");

// MARK: buyEmails

/// One purchased address and the microsecond timestamp of the purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoughtEmail {
    pub email: String,
    pub ts_micros: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyEmailsRequest {
    #[serde(default)]
    alacctoken: Option<String>,
    pub amount: u32,
    pub domain: String,
    /// Total price the caller expects to pay; the server rejects the purchase
    /// when the quote no longer matches.
    #[serde(default)]
    pub expected_price: Option<f64>,
}

impl BuyEmailsRequest {
    pub fn new(amount: u32, domain: impl Into<String>) -> Self {
        Self {
            alacctoken: None,
            amount,
            domain: domain.into(),
            expected_price: None,
        }
    }
}

impl ApiRequest for BuyEmailsRequest {
    fn set_account_token(&mut self, token: &str) {
        self.alacctoken = Some(token.to_owned());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyEmailsResponse {
    pub ok: bool,
    pub actual_cost: f64,
    pub new_balance: f64,
    pub bought_emails: Vec<BoughtEmail>,
}

impl ApiResponse for BuyEmailsResponse {}

pub const BUY_EMAILS: Endpoint<BuyEmailsRequest, BuyEmailsResponse> = Endpoint::new("buyEmails");

// MARK: getEmails

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetEmailsRequest {
    #[serde(default)]
    alacctoken: Option<String>,
    pub limit: u32,
    /// Resume listing after this address.
    #[serde(default)]
    pub email_offset: Option<String>,
}

impl GetEmailsRequest {
    pub fn new(limit: u32) -> Self {
        Self { alacctoken: None, limit, email_offset: None }
    }
}

impl ApiRequest for GetEmailsRequest {
    fn set_account_token(&mut self, token: &str) {
        self.alacctoken = Some(token.to_owned());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetEmailsResponse {
    pub ok: bool,
    pub emails: Vec<BoughtEmail>,
}

impl ApiResponse for GetEmailsResponse {}

pub const GET_EMAILS: Endpoint<GetEmailsRequest, GetEmailsResponse> = Endpoint::new("getEmails");

// MARK: GetMails

/// Which mails to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MailFilter {
    #[default]
    None,
    OnlyNew,
    OnlyUnlocked,
}

/// Whether the server should refresh the inbox before listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RefreshMails {
    #[default]
    NoRefresh,
    Refresh,
    RefreshOptional,
}

/// One mail in an inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mail {
    pub almailid: String,
    pub alconvid: String,
    pub ts_micros: i64,
    pub sent: bool,
    pub read: bool,
    /// Locked mails expose only preview fields until unlocked.
    pub unlocked: bool,
    pub refreshed: bool,
    pub sender_name: String,
    pub sender_email: String,
    pub subject: String,
    pub body_preview: String,
    pub body_type: String,
    #[serde(default)]
    pub body_raw: Option<String>,
    #[serde(default)]
    pub body_text: Option<String>,
    #[serde(default)]
    pub body_is_partial: bool,
}

impl fmt::Display for Mail {
    /// Multi-line, human-readable summary of the mail.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.ts_micros.div_euclid(1_000_000);
        let micros = self.ts_micros.rem_euclid(1_000_000);
        writeln!(f, "# Mail: {secs}.{micros:06} {}", self.subject)?;
        writeln!(
            f,
            "- Flags: Read: {}, Sent: {}, Unlocked: {}, Refreshed: {}",
            self.read, self.sent, self.unlocked, self.refreshed
        )?;
        writeln!(f, "- Id: {}, ConvId: {}", self.almailid, self.alconvid)?;
        writeln!(f, "- Sender: {} <{}>", self.sender_name, self.sender_email)?;
        writeln!(f, "- Body Preview: {}", self.body_preview)?;
        writeln!(f, "- Body Type: {}", self.body_type)?;
        let partial = if self.body_is_partial { " (partial)" } else { "" };
        if let Some(text) = &self.body_text {
            writeln!(f, "- Body: {} chars{partial}", text.len())?;
            write!(f, "{text}")
        } else if let Some(raw) = &self.body_raw {
            writeln!(f, "- Body (raw): {} chars{partial}", raw.len())?;
            write!(f, "{raw}")
        } else {
            write!(f, "- Body: (no body content available)")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetMailsRequest {
    #[serde(default)]
    alacctoken: Option<String>,
    pub email: String,
    pub limit: u32,
    /// Resume listing after this mail id.
    #[serde(default)]
    pub almailid_offset: Option<String>,
    #[serde(default)]
    pub filter: MailFilter,
    #[serde(default)]
    pub refresh_mails: RefreshMails,
    /// Buy access to locked mails as part of the listing.
    #[serde(default)]
    pub autobuy_locked: bool,
    /// Only return plain-text bodies.
    #[serde(default)]
    pub only_text: bool,
}

impl GetMailsRequest {
    pub fn new(email: impl Into<String>, limit: u32) -> Self {
        Self {
            alacctoken: None,
            email: email.into(),
            limit,
            almailid_offset: None,
            filter: MailFilter::default(),
            refresh_mails: RefreshMails::default(),
            autobuy_locked: false,
            only_text: false,
        }
    }
}

impl ApiRequest for GetMailsRequest {
    fn set_account_token(&mut self, token: &str) {
        self.alacctoken = Some(token.to_owned());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetMailsResponse {
    pub ok: bool,
    pub mails: Vec<Mail>,
}

impl ApiResponse for GetMailsResponse {}

// The server routes this one with a leading capital.
pub const GET_MAILS: Endpoint<GetMailsRequest, GetMailsResponse> = Endpoint::new("GetMails");

// MARK: unlockMails

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockMailsRequest {
    #[serde(default)]
    alacctoken: Option<String>,
    pub email: String,
    pub almailids: Vec<String>,
    #[serde(default)]
    pub expected_price: Option<f64>,
    #[serde(default)]
    pub only_text: bool,
}

impl UnlockMailsRequest {
    pub fn new(email: impl Into<String>, almailids: Vec<String>) -> Self {
        Self {
            alacctoken: None,
            email: email.into(),
            almailids,
            expected_price: None,
            only_text: false,
        }
    }
}

impl ApiRequest for UnlockMailsRequest {
    fn set_account_token(&mut self, token: &str) {
        self.alacctoken = Some(token.to_owned());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockMailsResponse {
    pub ok: bool,
    pub actual_cost: f64,
    pub new_balance: f64,
    pub unlocked_mails: Vec<Mail>,
}

impl ApiResponse for UnlockMailsResponse {}

pub const UNLOCK_MAILS: Endpoint<UnlockMailsRequest, UnlockMailsResponse> =
    Endpoint::new("unlockMails");
