use crate::domain::models::money::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone_number: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username")]
    pub identifier: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Deserialize)]
pub struct CreatePropertyRequest {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub description: String,
    /// Only honored for admins; everyone else owns what they create.
    pub owner_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePropertyRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateUnitRequest {
    pub property_id: String,
    pub unit_number: String,
    pub unit_type: String,
    pub monthly_rent: Money,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct UpdateUnitRequest {
    pub property_id: Option<String>,
    pub unit_number: Option<String>,
    pub unit_type: Option<String>,
    pub monthly_rent: Option<Money>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateTenantRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone_number: Option<String>,
    pub unit_id: Option<String>,
    pub lease_start_date: Option<NaiveDate>,
    pub lease_end_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct UpdateTenantRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub unit_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub lease_start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub lease_end_date: Option<Option<NaiveDate>>,
}

#[derive(Deserialize)]
pub struct CreatePaymentRequest {
    /// Tenants may omit this to pay for themselves.
    pub tenant_id: Option<String>,
    /// Defaults to the tenant's current unit.
    pub unit_id: Option<String>,
    pub amount_due: Money,
    pub amount_paid: Option<Money>,
    #[serde(alias = "payment_method")]
    pub method: Option<String>,
    pub status: Option<String>,
    pub transaction_id: Option<String>,
    pub billing_period: String,
}

#[derive(Deserialize)]
pub struct UpdatePaymentRequest {
    pub tenant_id: Option<String>,
    pub unit_id: Option<String>,
    pub amount_due: Option<Money>,
    pub amount_paid: Option<Money>,
    #[serde(alias = "payment_method")]
    pub method: Option<String>,
    pub status: Option<String>,
    pub transaction_id: Option<String>,
    pub billing_period: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateVisitorRequest {
    pub tenant_id: Option<String>,
    pub unit_id: Option<String>,
    pub visitor_name: String,
    pub email: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum RecipientsField {
    Keyword(String),
    Principals(Vec<String>),
}

#[derive(Deserialize)]
pub struct CreateNotificationRequest {
    pub message: String,
    pub recipients: RecipientsField,
}

#[derive(Deserialize, Default)]
pub struct PageParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_null_unit_differs_from_absent() {
        let absent: UpdateTenantRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.unit_id, None);

        let cleared: UpdateTenantRequest = serde_json::from_str(r#"{"unit_id": null}"#).unwrap();
        assert_eq!(cleared.unit_id, Some(None));

        let moved: UpdateTenantRequest = serde_json::from_str(r#"{"unit_id": "u2"}"#).unwrap();
        assert_eq!(moved.unit_id, Some(Some("u2".to_string())));
    }

    #[test]
    fn recipients_accept_keyword_or_list() {
        let all: CreateNotificationRequest =
            serde_json::from_str(r#"{"message": "hi", "recipients": "all_tenants"}"#).unwrap();
        assert!(matches!(all.recipients, RecipientsField::Keyword(k) if k == "all_tenants"));

        let some: CreateNotificationRequest =
            serde_json::from_str(r#"{"message": "hi", "recipients": ["a", "b"]}"#).unwrap();
        assert!(matches!(some.recipients, RecipientsField::Principals(ids) if ids.len() == 2));
    }

    #[test]
    fn login_accepts_username_alias() {
        let req: LoginRequest = serde_json::from_str(r#"{"username": "bob", "password": "x"}"#).unwrap();
        assert_eq!(req.identifier, "bob");
    }
}
