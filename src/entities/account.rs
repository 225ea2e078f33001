// Account Entity - the contact record served by the REST API
//
// Identity: integer id assigned by the store (never changes)
// Values: name, email, address, phone number, join date (overwritten by PUT)

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Wire format for `date_joined`
const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// ACCOUNT ENTITY
// ============================================================================

/// A stored account, serialized as-is in every response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Server-assigned identity
    pub id: i64,

    pub name: String,
    pub email: String,
    pub address: String,

    /// Optional contact number (`null` on the wire when unset)
    pub phone_number: Option<String>,

    /// Day the account was opened, `YYYY-MM-DD` on the wire
    pub date_joined: NaiveDate,
}

impl Account {
    /// Overwrite every field present in the patch, leave the rest untouched
    pub fn apply(&mut self, patch: AccountPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(phone_number) = patch.phone_number {
            self.phone_number = phone_number;
        }
        if let Some(date_joined) = patch.date_joined {
            self.date_joined = date_joined;
        }
    }
}

// ============================================================================
// CREATE PAYLOAD
// ============================================================================

/// Body of `POST /accounts`; any `id` sent by the client is ignored
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub address: String,

    #[serde(default)]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub date_joined: Option<NaiveDate>,
}

impl NewAccount {
    /// Parse a raw request body
    pub fn from_json(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| {
            Error::validation(format!("body of request contained bad or no data - {e}"))
        })
    }

    /// Join date to persist; today when the client sent none
    pub fn joined_on(&self) -> NaiveDate {
        self.date_joined
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

// ============================================================================
// UPDATE PATCH
// ============================================================================

/// Body of `PUT /accounts/{id}`
///
/// Each field is `None` when the key was absent from the body, so an omitted
/// field and a field set to `""` stay distinguishable. `phone_number` is
/// nullable, hence the nested option: `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<Option<String>>,
    pub date_joined: Option<NaiveDate>,
}

impl AccountPatch {
    /// Collect the recognized keys of a JSON object; unknown keys are ignored
    pub fn from_json(body: &Value) -> Result<Self> {
        let fields = body
            .as_object()
            .ok_or_else(|| Error::validation("body of request contained bad or no data"))?;

        let mut patch = AccountPatch::default();

        if let Some(value) = fields.get("name") {
            patch.name = Some(text_field("name", value)?);
        }
        if let Some(value) = fields.get("email") {
            patch.email = Some(text_field("email", value)?);
        }
        if let Some(value) = fields.get("address") {
            patch.address = Some(text_field("address", value)?);
        }
        if let Some(value) = fields.get("phone_number") {
            patch.phone_number = Some(match value {
                Value::Null => None,
                other => Some(text_field("phone_number", other)?),
            });
        }
        if let Some(value) = fields.get("date_joined") {
            let raw = text_field("date_joined", value)?;
            let date = NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| {
                Error::validation(format!("date_joined [{raw}] is not a valid date: {e}"))
            })?;
            patch.date_joined = Some(date);
        }

        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        *self == AccountPatch::default()
    }
}

fn text_field(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::validation(format!("{key} must be a string")))
}

/// Render a join date the way it is stored and sent
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored join date
pub fn parse_date(raw: &str) -> std::result::Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_account() -> Account {
        Account {
            id: 1,
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            address: "1 Main St".to_string(),
            phone_number: Some("555-0100".to_string()),
            date_joined: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_account_serializes_with_iso_date() {
        let value = serde_json::to_value(create_test_account()).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 1,
                "name": "Alice",
                "email": "a@x.com",
                "address": "1 Main St",
                "phone_number": "555-0100",
                "date_joined": "2024-01-01"
            })
        );
    }

    #[test]
    fn test_new_account_from_full_body() {
        let body = br#"{"name":"Alice","email":"a@x.com","address":"1 Main St","phone_number":"555-0100","date_joined":"2024-01-01","id":99}"#;
        let new_account = NewAccount::from_json(body).unwrap();

        assert_eq!(new_account.name, "Alice");
        assert_eq!(new_account.phone_number.as_deref(), Some("555-0100"));
        assert_eq!(
            new_account.joined_on(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_new_account_defaults_optional_fields() {
        let body = br#"{"name":"Bob","email":"b@x.com","address":"2 Side St"}"#;
        let new_account = NewAccount::from_json(body).unwrap();

        assert_eq!(new_account.phone_number, None);
        assert_eq!(new_account.date_joined, None);
        assert_eq!(new_account.joined_on(), Local::now().date_naive());
    }

    #[test]
    fn test_new_account_missing_field_is_validation_error() {
        let err = NewAccount::from_json(br#"{"email":"b@x.com","address":"x"}"#).unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_new_account_malformed_json_is_validation_error() {
        let err = NewAccount::from_json(b"{not json").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = NewAccount::from_json(b"").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut account = create_test_account();
        let patch = AccountPatch::from_json(&json!({"name": "X"})).unwrap();

        account.apply(patch);

        let expected = Account {
            name: "X".to_string(),
            ..create_test_account()
        };
        assert_eq!(account, expected);
    }

    #[test]
    fn test_patch_distinguishes_empty_string_from_absent() {
        let patch = AccountPatch::from_json(&json!({"email": ""})).unwrap();
        assert_eq!(patch.email.as_deref(), Some(""));
        assert_eq!(patch.name, None);

        let mut account = create_test_account();
        account.apply(patch);
        assert_eq!(account.email, "");
        assert_eq!(account.name, "Alice");
    }

    #[test]
    fn test_patch_null_phone_clears_it() {
        let patch = AccountPatch::from_json(&json!({"phone_number": null})).unwrap();
        assert_eq!(patch.phone_number, Some(None));

        let mut account = create_test_account();
        account.apply(patch);
        assert_eq!(account.phone_number, None);
    }

    #[test]
    fn test_patch_parses_date() {
        let patch = AccountPatch::from_json(&json!({"date_joined": "2023-06-15"})).unwrap();
        assert_eq!(
            patch.date_joined,
            Some(NaiveDate::from_ymd_opt(2023, 6, 15).unwrap())
        );
    }

    #[test]
    fn test_patch_rejects_bad_values() {
        let err = AccountPatch::from_json(&json!({"name": 5})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid Account: name must be a string");

        let err = AccountPatch::from_json(&json!({"address": null})).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = AccountPatch::from_json(&json!({"date_joined": "yesterday"})).unwrap_err();
        assert!(err.to_string().contains("yesterday"));

        let err = AccountPatch::from_json(&json!(["name"])).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_patch_ignores_unknown_keys() {
        let patch = AccountPatch::from_json(&json!({"id": 7, "nickname": "al"})).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_date_round_trip_through_storage_format() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(format_date(date), "2024-02-29");
        assert_eq!(parse_date("2024-02-29").unwrap(), date);
        assert!(parse_date("2024-13-01").is_err());
    }
}
