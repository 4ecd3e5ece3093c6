//! Wire codec between typed API records and the JSON object representation.
//!
//! Every Autolook RPC exchanges flat JSON objects. Requests serialize with
//! [`to_wire`]; replies come back through [`from_wire`], which reads the `ok`
//! discriminant before attempting to build the expected response type and
//! yields an [`ApiResult`] so error replies surface as values, not panics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::models::ErrorResponse;

/// Outcome of decoding a response-shaped object: the expected response when
/// the server said `ok`, or the uniform [`ErrorResponse`] when it did not.
pub type ApiResult<T> = std::result::Result<T, ErrorResponse>;

/// Marker for request records.
///
/// Authenticated requests override [`set_account_token`] to accept the token
/// the client injects right before sending; the token is never part of a
/// request constructor.
///
/// [`set_account_token`]: ApiRequest::set_account_token
pub trait ApiRequest: Serialize {
    fn set_account_token(&mut self, _token: &str) {}
}

/// Marker for response records, all of which start with the `ok` discriminant.
pub trait ApiResponse: DeserializeOwned {}

/// Serialize a record into an ordered JSON object.
///
/// Key order follows declared field order, enumeration variants emit their
/// wire strings, nested records and lists recurse, and unset optional fields
/// serialize as `null`. This never fails for the record types declared in
/// this crate.
pub fn to_wire<T: Serialize>(record: &T) -> Result<Map<String, Value>, ValidationError> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        _ => Err(ValidationError::NotAnObject),
    }
}

/// Deserialize a response-shaped object into the expected response type.
///
/// The `ok` discriminant is inspected first: a reply without a boolean `ok`
/// is malformed, and a reply with `ok: false` is built as [`ErrorResponse`]
/// no matter which type the caller expected. Only when the server reported
/// success is `T` constructed, so error-shaped data never hits the nominal
/// schema. Unknown keys are ignored; missing required fields, mismatched
/// shapes, and unrecognized enumeration strings fail validation.
pub fn from_wire<T: ApiResponse>(wire: Map<String, Value>) -> Result<ApiResult<T>, ValidationError> {
    let ok = wire
        .get("ok")
        .and_then(Value::as_bool)
        .ok_or(ValidationError::MissingDiscriminant)?;

    let value = Value::Object(wire);
    if ok {
        Ok(Ok(serde_json::from_value(value)?))
    } else {
        Ok(Err(serde_json::from_value(value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BoughtEmail, BuyEmailsRequest, BuyEmailsResponse, CheckResponse, GetBalanceResponse,
        GetMailsRequest, GetMailsResponse, Mail, MailFilter, RefreshMails,
    };
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn request_serializes_in_declared_order() {
        let mut request = BuyEmailsRequest::new(2, "outlook.com");
        request.set_account_token("alaccauthXXXX");

        let wire = to_wire(&request).unwrap();
        let keys: Vec<&str> = wire.keys().map(String::as_str).collect();
        assert_eq!(keys, ["alacctoken", "amount", "domain", "expected_price"]);
        assert_eq!(wire["alacctoken"], json!("alaccauthXXXX"));
        assert_eq!(wire["expected_price"], Value::Null);
    }

    #[test]
    fn optional_fields_default_on_construction() {
        let request = BuyEmailsRequest::new(1, "outlook.com");
        assert_eq!(request.expected_price, None);

        let request = GetMailsRequest::new("a@outlook.com", 20);
        assert_eq!(request.filter, MailFilter::None);
        assert_eq!(request.refresh_mails, RefreshMails::NoRefresh);
        assert!(!request.autobuy_locked);
    }

    #[test]
    fn request_round_trips() {
        let mut request = GetMailsRequest::new("a@x.com", 10);
        request.only_text = true;
        request.set_account_token("alaccauthXXXX");

        let wire = to_wire(&request).unwrap();
        let decoded: GetMailsRequest = serde_json::from_value(Value::Object(wire)).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn check_response_only_needs_the_discriminant() {
        let wire = object(json!({"ok": true, "whatever": 1}));
        let decoded: CheckResponse = from_wire(wire).unwrap().unwrap();
        assert!(decoded.ok);
    }

    #[test]
    fn enumeration_round_trips_wire_strings() {
        assert_eq!(serde_json::to_value(MailFilter::OnlyNew).unwrap(), json!("OnlyNew"));
        assert_eq!(
            serde_json::from_value::<MailFilter>(json!("OnlyUnlocked")).unwrap(),
            MailFilter::OnlyUnlocked
        );
        assert!(serde_json::from_value::<MailFilter>(json!("onlynew")).is_err());
    }

    #[test]
    fn response_round_trips() {
        let response = BuyEmailsResponse {
            ok: true,
            actual_cost: 3.0,
            new_balance: 7.5,
            bought_emails: vec![
                BoughtEmail { email: "a@x.com".into(), ts_micros: 100 },
                BoughtEmail { email: "b@x.com".into(), ts_micros: 200 },
            ],
        };

        let wire = to_wire(&response).unwrap();
        let decoded: BuyEmailsResponse = from_wire(wire).unwrap().unwrap();
        assert_eq!(decoded, response);
    }

    #[test]
    fn nested_list_preserves_input_order() {
        let wire = object(json!({
            "ok": true,
            "actual_cost": 1.0,
            "new_balance": 2.0,
            "bought_emails": [
                {"email": "a@x.com", "ts_micros": 100},
                {"email": "b@x.com", "ts_micros": 200},
            ],
        }));

        let decoded: BuyEmailsResponse = from_wire(wire).unwrap().unwrap();
        assert_eq!(decoded.bought_emails.len(), 2);
        assert_eq!(decoded.bought_emails[0].email, "a@x.com");
        assert_eq!(decoded.bought_emails[1].ts_micros, 200);
    }

    #[test]
    fn error_reply_substitutes_error_response() {
        let wire = object(json!({
            "ok": false,
            "code": "INSUFFICIENT_BALANCE",
            "message": "balance is 0.0",
        }));

        let result: ApiResult<GetBalanceResponse> = from_wire(wire).unwrap();
        let err = result.unwrap_err();
        assert_eq!(err.code, "INSUFFICIENT_BALANCE");
        assert_eq!(err.message.as_deref(), Some("balance is 0.0"));
    }

    #[test]
    fn error_reply_message_is_optional() {
        let wire = object(json!({"ok": false, "code": "E99"}));
        let result: ApiResult<GetBalanceResponse> = from_wire(wire).unwrap();
        assert_eq!(result.unwrap_err().message, None);
    }

    #[test]
    fn missing_discriminant_is_rejected() {
        let wire = object(json!({"balance": 1.0}));
        let err = from_wire::<GetBalanceResponse>(wire).unwrap_err();
        assert!(matches!(err, ValidationError::MissingDiscriminant));

        let wire = object(json!({"ok": "yes", "balance": 1.0}));
        let err = from_wire::<GetBalanceResponse>(wire).unwrap_err();
        assert!(matches!(err, ValidationError::MissingDiscriminant));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let wire = object(json!({"ok": true}));
        let err = from_wire::<GetBalanceResponse>(wire).unwrap_err();
        assert!(matches!(err, ValidationError::Construct(_)));
    }

    #[test]
    fn scalar_where_list_expected_is_rejected() {
        let wire = object(json!({"ok": true, "mails": "not-a-list"}));
        let err = from_wire::<GetMailsResponse>(wire).unwrap_err();
        assert!(matches!(err, ValidationError::Construct(_)));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let wire = object(json!({
            "ok": true,
            "balance": 42.5,
            "server_build": "2026-08-01",
        }));

        let decoded: GetBalanceResponse = from_wire(wire).unwrap().unwrap();
        assert_eq!(decoded.balance, 42.5);
    }

    #[test]
    fn mail_optional_bodies_default() {
        let wire = object(json!({
            "ok": true,
            "mails": [{
                "almailid": "m1",
                "alconvid": "c1",
                "ts_micros": 1_700_000_000_000_000i64,
                "sent": false,
                "read": false,
                "unlocked": false,
                "refreshed": true,
                "sender_name": "Acme",
                "sender_email": "noreply@acme.example",
                "subject": "Your code",
                "body_preview": "123456 is your code",
                "body_type": "text/html",
            }],
        }));

        let decoded: GetMailsResponse = from_wire(wire).unwrap().unwrap();
        let mail: &Mail = &decoded.mails[0];
        assert_eq!(mail.body_raw, None);
        assert_eq!(mail.body_text, None);
        assert!(!mail.body_is_partial);
    }
}
