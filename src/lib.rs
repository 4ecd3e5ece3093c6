//! # Autolook Client
//! Asynchronous client for the Autolook email provisioning API, providing typed request/response schemas and simple methods to buy disposable addresses, poll inboxes, and unlock paid mail using [`Client`] and [`ClientBuilder`].
//!
//! ## Audience and uses
//! For Rust developers who need real inboxes in integration tests, signup flows, or automation scripts: configure with [`ClientBuilder`], buy an address on a stocked domain, wait for mail ([`Mail`]), and unlock locked messages when needed.
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest`, so ensure the chosen Tokio features (`rt-multi-thread` or `current_thread`) are available in your application.
//!
//! ## Out of scope
//! Not a mail client or SMTP sender. It only proxies the Autolook service and inherits its pricing, stock, and retention limits; an account token with balance is required for everything except the public settings endpoint.
//!
//! ## Errors
//! Transport failures surface as [`Error::Request`], [`Error::Connection`], or [`Error::RetriesExceeded`]; malformed replies become [`Error::Validation`] or [`Error::Internal`]. Replies the server itself rejects arrive as typed errors ([`Error::Unauthorized`], [`Error::OnCooldown`], ...) or [`Error::Api`] with the raw [`ErrorResponse`]. The crate-wide [`Result`] alias wraps these errors.
//!
//! ## Example
//! ```no_run
//! use autolook_client::{Client, MailQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), autolook_client::Error> {
//!     let client = Client::new("alaccauthXXXXXXXXXXXXXXXXXXXXXXXXXX").await?;
//!     println!("Balance: {}", client.get_balance().await?);
//!
//!     let email = client.buy_email("outlook.com").await?;
//!     let mails = client.wait_for_new_mails(&email, MailQuery::default(), None).await?;
//!     for mail in mails {
//!         println!("{mail}");
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod codec;
mod error;
mod models;

pub use client::{ApiSettings, Client, ClientBuilder, MailQuery};
pub use codec::{ApiRequest, ApiResponse, ApiResult, from_wire, to_wire};
pub use error::{Error, ValidationError};
pub use models::{
    BUY_EMAILS, BoughtEmail, BuyEmailsRequest, BuyEmailsResponse, CheckResponse, Endpoint,
    ErrorResponse, GET_API_INFO, GET_API_SETTINGS, GET_BALANCE, GET_EMAILS, GET_MAILS,
    GetApiInfoRequest, GetApiInfoResponse, GetApiSettingsRequest, GetApiSettingsResponse,
    GetBalanceRequest, GetBalanceResponse, GetEmailsRequest, GetEmailsResponse, GetMailsRequest,
    GetMailsResponse, Mail, MailFilter, RefreshMails, UNLOCK_MAILS, UnlockMailsRequest,
    UnlockMailsResponse,
};

/// Result type alias for Autolook operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
