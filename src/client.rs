//! Autolook async client implementation.

use std::sync::LazyLock;
use std::time::Duration;

use rand::Rng;
use regex::Regex;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use crate::codec::{self, ApiRequest, ApiResponse};
use crate::models::{
    BUY_EMAILS, BuyEmailsRequest, Endpoint, ErrorResponse, GET_API_INFO, GET_API_SETTINGS,
    GET_BALANCE, GET_EMAILS, GET_MAILS, GetApiInfoRequest, GetApiInfoResponse,
    GetApiSettingsRequest, GetBalanceRequest, GetEmailsRequest, GetMailsRequest, Mail, MailFilter,
    RefreshMails, UNLOCK_MAILS, UnlockMailsRequest,
};
use crate::{Error, Result};

const BASE_URL: &str = "https://autolook.al";

// E03 messages end in "..., retry in: 12.5s".
static COOLDOWN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"retry in: ([0-9]+(?:\.[0-9]+)?)s").unwrap());

/// Server-advertised defaults fetched once when the client is built.
#[derive(Debug, Clone, Default)]
pub struct ApiSettings {
    /// Pause between polls in [`Client::wait_for_new_mails`].
    pub get_emails_interval: Duration,
    pub get_emails_limit: u32,
    pub get_mails_limit: u32,
}

/// Options for listing an inbox.
///
/// `limit: None` uses the server's default page size.
#[derive(Debug, Clone, Default)]
pub struct MailQuery {
    pub limit: Option<u32>,
    pub filter: MailFilter,
    pub refresh_mails: RefreshMails,
    pub almailid_offset: Option<String>,
    pub autobuy_locked: bool,
    pub only_text: bool,
}

/// Async client for the Autolook email provisioning service.
///
/// Use [`Client::new`] for defaults or [`Client::builder`] for custom
/// settings like a proxy, request timeout, or an alternate base URL.
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    account_token: String,
    max_retries: u32,
    proxy: Option<String>,
    settings: ApiSettings,
    info: GetApiInfoResponse,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder(account_token: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(account_token)
    }

    /// Create a new Autolook client with default settings.
    ///
    /// Connects to the API and retrieves the server settings and domain
    /// catalog before returning.
    ///
    /// # Examples
    /// ```no_run
    /// # use autolook_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), autolook_client::Error> {
    /// let client = Client::new("alaccauthXXXXXXXXXXXXXXXXXXXXXXXXXX").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(account_token: impl Into<String>) -> Result<Self> {
        ClientBuilder::new(account_token).build().await
    }

    /// Get the proxy URL if one was configured.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Server settings fetched when the client was built.
    pub fn api_settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Domain stock and prices fetched when the client was built.
    ///
    /// See [`Client::fetch_api_info`] for a fresh copy.
    pub fn api_info(&self) -> &GetApiInfoResponse {
        &self.info
    }

    /// Call one API endpoint with an already-constructed request.
    ///
    /// The account token is injected before serialization. Replies whose `ok`
    /// discriminant is false are mapped to typed errors ([`Error::Unauthorized`],
    /// [`Error::OnCooldown`], ...), falling back to [`Error::Api`] for codes
    /// the client does not know.
    ///
    /// # Examples
    /// ```no_run
    /// # use autolook_client::{Client, GET_BALANCE, GetBalanceRequest};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), autolook_client::Error> {
    /// # let client = Client::new("token").await?;
    /// let balance = client.call(&GET_BALANCE, GetBalanceRequest::new()).await?;
    /// println!("{}", balance.balance);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call<Req, Resp>(&self, endpoint: &Endpoint<Req, Resp>, mut request: Req) -> Result<Resp>
    where
        Req: ApiRequest,
        Resp: ApiResponse,
    {
        request.set_account_token(&self.account_token);
        let wire = codec::to_wire(&request)?;
        let payload = Value::Object(wire).to_string();
        debug!("SEND api/{}: {}", endpoint.path, payload);

        let reply = self.post(endpoint.path, payload).await?;
        match codec::from_wire(reply)? {
            Ok(response) => Ok(response),
            Err(error) => Err(self.classify(endpoint.path, error)),
        }
    }

    /// Get the account balance.
    pub async fn get_balance(&self) -> Result<f64> {
        let res = self.call(&GET_BALANCE, GetBalanceRequest::new()).await?;
        Ok(res.balance)
    }

    /// Fetch a fresh domain stock and price catalog from the server.
    pub async fn fetch_api_info(&self) -> Result<GetApiInfoResponse> {
        self.call(&GET_API_INFO, GetApiInfoRequest::new()).await
    }

    /// List addresses owned by the account.
    ///
    /// `limit: None` uses the server default; `email_offset` resumes a
    /// previous listing.
    pub async fn get_emails(&self, limit: Option<u32>, email_offset: Option<&str>) -> Result<Vec<String>> {
        let mut request = GetEmailsRequest::new(limit.unwrap_or(self.settings.get_emails_limit));
        request.email_offset = email_offset.map(str::to_owned);
        let res = self.call(&GET_EMAILS, request).await?;
        Ok(res.emails.into_iter().map(|e| e.email).collect())
    }

    /// Buy `amount` addresses on `domain` and return them.
    ///
    /// The domain is checked against the price catalog first; an unknown
    /// domain fails with [`Error::InvalidDomain`] without a server round trip.
    /// When the quoted price parses, the total is sent as `expected_price` so
    /// the server rejects the purchase if the quote changed.
    pub async fn buy_emails(&self, amount: u32, domain: &str) -> Result<Vec<String>> {
        let quote = self
            .info
            .price_domains
            .get(domain)
            .ok_or_else(|| Error::InvalidDomain(domain.to_owned()))?;

        let mut request = BuyEmailsRequest::new(amount, domain);
        request.expected_price = quote.parse::<f64>().ok().map(|price| price * f64::from(amount));

        let res = self.call(&BUY_EMAILS, request).await?;
        Ok(res.bought_emails.into_iter().map(|e| e.email).collect())
    }

    /// Buy a single address on `domain`.
    pub async fn buy_email(&self, domain: &str) -> Result<String> {
        let mut emails = self.buy_emails(1, domain).await?;
        emails
            .pop()
            .ok_or_else(|| Error::Internal("buyEmails returned an empty list".to_owned()))
    }

    /// List mails in the inbox of `email`.
    pub async fn get_mails(&self, email: &str, query: MailQuery) -> Result<Vec<Mail>> {
        let mut request =
            GetMailsRequest::new(email, query.limit.unwrap_or(self.settings.get_mails_limit));
        request.almailid_offset = query.almailid_offset;
        request.filter = query.filter;
        request.refresh_mails = query.refresh_mails;
        request.autobuy_locked = query.autobuy_locked;
        request.only_text = query.only_text;
        let res = self.call(&GET_MAILS, request).await?;
        Ok(res.mails)
    }

    /// Poll the inbox of `email` until a never-seen-before mail arrives.
    ///
    /// Polls with `OnlyNew` + `Refresh` at the server-advertised interval;
    /// `query.filter` and `query.refresh_mails` are ignored. With a `timeout`,
    /// gives up with [`Error::TimedOut`] carrying the seconds waited. A poll
    /// already in flight when the deadline passes is allowed to finish.
    pub async fn wait_for_new_mails(
        &self,
        email: &str,
        query: MailQuery,
        timeout: Option<Duration>,
    ) -> Result<Vec<Mail>> {
        let started = Instant::now();
        loop {
            if let Some(timeout) = timeout {
                let elapsed = started.elapsed();
                if elapsed > timeout {
                    return Err(Error::TimedOut(elapsed.as_secs_f64()));
                }
            }

            let mails = self
                .get_mails(
                    email,
                    MailQuery {
                        filter: MailFilter::OnlyNew,
                        refresh_mails: RefreshMails::Refresh,
                        almailid_offset: None,
                        ..query.clone()
                    },
                )
                .await?;
            if !mails.is_empty() {
                return Ok(mails);
            }
            tokio::time::sleep(self.settings.get_emails_interval).await;
        }
    }

    /// Unlock the given mails in the inbox of `email` and return them with
    /// their full bodies.
    pub async fn unlock_mails(
        &self,
        email: &str,
        almailids: Vec<String>,
        only_text: bool,
    ) -> Result<Vec<Mail>> {
        let mut request = UnlockMailsRequest::new(email, almailids);
        request.only_text = only_text;
        let res = self.call(&UNLOCK_MAILS, request).await?;
        Ok(res.unlocked_mails)
    }

    /// POST one payload, retrying transient transport failures, and return
    /// the reply as a JSON object.
    async fn post(&self, path: &str, payload: String) -> Result<serde_json::Map<String, Value>> {
        let url = format!("{}/api/{}", self.base_url, path);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let sent = self.http.post(&url).body(payload.clone()).send().await;
            let response = match sent {
                Ok(response) => response,
                Err(e) if e.is_connect() => {
                    return Err(Error::Connection { url, source: e });
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(Error::RetriesExceeded { attempts: attempt, source: e });
                    }
                    tokio::time::sleep(backoff(attempt)).await;
                    continue;
                }
            };

            let status = response.status();
            let text = response.text().await?;
            if status.is_server_error() {
                return Err(Error::Internal(format!("status is {status}, err: {text}")));
            }
            debug!("RECV api/{}: {}", path, text);

            let value: Value = serde_json::from_str(&text).map_err(|_| {
                Error::Internal(format!("response is not valid json, status: {status}, text: {text}"))
            })?;
            return match value {
                Value::Object(map) => Ok(map),
                _ => Err(Error::Internal(format!(
                    "response is not a json object, status: {status}, text: {text}"
                ))),
            };
        }
    }

    /// Map a server error reply to a typed error.
    fn classify(&self, path: &str, error: ErrorResponse) -> Error {
        match error.code.as_str() {
            "E01" => Error::InvalidRoute(path.to_owned()),
            "E02" => Error::Unauthorized,
            "E03" => match cooldown_seconds(error.message.as_deref()) {
                Some(seconds) => Error::OnCooldown(seconds),
                None => Error::Api(error),
            },
            "E04" => Error::TempLocked,
            _ => Error::Api(error),
        }
    }
}

/// Exponential backoff with a little jitter to avoid polling in lockstep.
fn backoff(attempt: u32) -> Duration {
    let base = 2u64.saturating_pow(attempt.saturating_sub(1));
    let jitter: f64 = rand::rng().random_range(0.0..0.5);
    Duration::from_secs_f64(base as f64 + jitter)
}

fn cooldown_seconds(message: Option<&str>) -> Option<f64> {
    let captures = COOLDOWN_RE.captures(message?)?;
    captures.get(1)?.as_str().parse().ok()
}

/// Builder for configuring an Autolook client.
///
/// Start with [`Client::builder`] to override defaults.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    account_token: String,
    base_url: String,
    proxy: Option<String>,
    timeout: Duration,
    max_retries: u32,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - Production base URL
    /// - No proxy
    /// - 30 second request timeout
    /// - 3 attempts per request
    pub fn new(account_token: impl Into<String>) -> Self {
        Self {
            account_token: account_token.into(),
            base_url: BASE_URL.to_string(),
            proxy: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }

    /// Override the API base URL.
    ///
    /// Useful for testing against a local mock server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set a proxy URL (e.g., "socks5://127.0.0.1:9050").
    ///
    /// This uses reqwest's proxy support for all requests.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Override the per-request timeout (default: 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override how many attempts each request gets (default: 3).
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Build the client and fetch the server settings and domain catalog.
    ///
    /// This performs two API requests to bootstrap the session.
    ///
    /// # Examples
    /// ```no_run
    /// # use autolook_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), autolook_client::Error> {
    /// let client = Client::builder("alaccauthXXXXXXXXXXXXXXXXXXXXXXXXXX")
    ///     .timeout(std::time::Duration::from_secs(10))
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout);
        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        let mut client = Client {
            http: builder.build()?,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            account_token: self.account_token,
            max_retries: self.max_retries,
            proxy: self.proxy,
            settings: ApiSettings::default(),
            info: GetApiInfoResponse {
                ok: true,
                stock_domains: Default::default(),
                price_domains: Default::default(),
            },
        };

        let settings = client.call(&GET_API_SETTINGS, GetApiSettingsRequest::new()).await?;
        client.settings = ApiSettings {
            get_emails_interval: Duration::from_secs_f64(
                settings.default_get_emails_interval.max(0.0),
            ),
            get_emails_limit: settings.default_get_emails_limit,
            get_mails_limit: settings.default_get_mails_limit,
        };
        client.info = client.fetch_api_info().await?;

        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_seconds_parses_server_message() {
        let msg = "the action is on cooldown, retry in: 12.5s";
        assert_eq!(cooldown_seconds(Some(msg)), Some(12.5));
        assert_eq!(cooldown_seconds(Some("retry in: 3s please")), Some(3.0));
        assert_eq!(cooldown_seconds(Some("no numbers here")), None);
        assert_eq!(cooldown_seconds(None), None);
    }

    #[test]
    fn backoff_grows_with_attempts() {
        assert!(backoff(1) >= Duration::from_secs(1));
        assert!(backoff(2) >= Duration::from_secs(2));
        assert!(backoff(3) >= Duration::from_secs(4));
        assert!(backoff(3) < Duration::from_secs(5));
    }
}
