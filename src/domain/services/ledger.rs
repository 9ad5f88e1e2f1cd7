use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::info;
use crate::domain::models::{
    auth::Identity,
    money::Money,
    payment::{Payment, PaymentDraft, PaymentMethod, PaymentStatus},
    principal::Role,
    tenant::TenantDetails,
};
use crate::domain::ports::{PaymentRepository, UnitRepository};
use crate::domain::services::access::{self, AccessResolver, Action, Resource, ResourceKind};
use crate::error::AppError;

/// Accepts `YYYY-MM` with a month in 1..=12.
pub fn parse_billing_period(value: &str) -> Result<(i32, u32), AppError> {
    let format_error = || AppError::invalid("billing_period", "Billing period must be in YYYY-MM format");
    let bytes = value.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return Err(format_error());
    }
    let (year, month) = (&value[..4], &value[5..]);
    if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(format_error());
    }
    let year: i32 = year.parse().map_err(|_| format_error())?;
    let month: u32 = month.parse().map_err(|_| format_error())?;
    if !(1..=12).contains(&month) {
        return Err(AppError::invalid("billing_period", "Invalid month in billing period"));
    }
    Ok((year, month))
}

pub fn validate_amounts(amount_due: Money, amount_paid: Money) -> Result<(), AppError> {
    if amount_due.is_negative() {
        return Err(AppError::invalid("amount_due", "Amount due cannot be negative"));
    }
    if amount_paid.is_negative() {
        return Err(AppError::invalid("amount_paid", "Amount paid cannot be negative"));
    }
    Ok(())
}

pub fn ensure_matches_rent(amount_due: Money, monthly_rent: Money) -> Result<(), AppError> {
    if amount_due != monthly_rent {
        return Err(AppError::invalid(
            "amount_due",
            format!("Amount due must match the unit's monthly rent: {}", monthly_rent),
        ));
    }
    Ok(())
}

/// A payment must land on the books of the tenant it is charged to. Tenants pay for their
/// current unit only; managers may book only when tenant and unit hang from the same owner.
pub fn ensure_payment_target(
    identity: &Identity,
    tenant: &TenantDetails,
    unit_id: &str,
    unit_owner_id: &str,
) -> Result<(), AppError> {
    match identity.role {
        Role::Tenant if tenant.tenant.unit_id.as_deref() != Some(unit_id) => {
            Err(AppError::invalid("unit_id", "Unit is not assigned to this tenant"))
        }
        Role::Landlord | Role::PropertyManager if tenant.owner_id.as_deref() != Some(unit_owner_id) => {
            Err(AppError::forbidden())
        }
        _ => Ok(()),
    }
}

/// `payment_date` follows the status: kept or stamped while completed, cleared otherwise.
pub fn settle_payment_date(
    status: PaymentStatus,
    previous: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match status {
        PaymentStatus::Completed => Some(previous.unwrap_or(now)),
        PaymentStatus::Pending | PaymentStatus::Failed => None,
    }
}

/// Partial update of a payment. Absent fields keep their stored value.
#[derive(Debug, Default, Clone)]
pub struct PaymentChanges {
    pub tenant_id: Option<String>,
    pub unit_id: Option<String>,
    pub amount_due: Option<Money>,
    pub amount_paid: Option<Money>,
    pub method: Option<PaymentMethod>,
    pub status: Option<PaymentStatus>,
    pub transaction_id: Option<String>,
    pub billing_period: Option<String>,
}

pub struct LedgerService {
    units: Arc<dyn UnitRepository>,
    payments: Arc<dyn PaymentRepository>,
    resolver: AccessResolver,
}

impl LedgerService {
    pub fn new(units: Arc<dyn UnitRepository>, payments: Arc<dyn PaymentRepository>, resolver: AccessResolver) -> Self {
        Self { units, payments, resolver }
    }

    pub async fn record_payment(&self, identity: &Identity, draft: PaymentDraft) -> Result<Payment, AppError> {
        access::ensure_listable(identity, ResourceKind::Payment, Action::Create)?;
        parse_billing_period(&draft.billing_period)?;
        validate_amounts(draft.amount_due, draft.amount_paid)?;

        let resource = self.payment_resource(identity, &draft.tenant_id, &draft.unit_id).await?;
        access::ensure(identity, Action::Create, &resource)?;

        let rent = self.current_rent(&draft.unit_id).await?;
        ensure_matches_rent(draft.amount_due, rent)?;

        let payment_date = settle_payment_date(draft.status, None, Utc::now());
        let payment = Payment::from_draft(draft, payment_date);
        let created = self.payments.create(&payment).await?;

        info!(payment_id = %created.id, unit_id = %created.unit_id, "Recorded payment");
        Ok(created)
    }

    pub async fn update_payment(&self, identity: &Identity, id: &str, changes: PaymentChanges) -> Result<Payment, AppError> {
        access::ensure_listable(identity, ResourceKind::Payment, Action::Update)?;
        let existing = self.get_payment(identity, id, Action::Update).await?;

        let mut updated = existing.clone();
        if let Some(tenant_id) = changes.tenant_id { updated.tenant_id = tenant_id; }
        if let Some(unit_id) = changes.unit_id { updated.unit_id = unit_id; }
        if let Some(amount_due) = changes.amount_due { updated.amount_due = amount_due; }
        if let Some(amount_paid) = changes.amount_paid { updated.amount_paid = amount_paid; }
        if let Some(method) = changes.method { updated.method = method; }
        if let Some(status) = changes.status { updated.status = status; }
        if let Some(transaction_id) = changes.transaction_id { updated.transaction_id = Some(transaction_id); }
        if let Some(billing_period) = changes.billing_period { updated.billing_period = billing_period; }

        parse_billing_period(&updated.billing_period)?;
        validate_amounts(updated.amount_due, updated.amount_paid)?;

        if updated.tenant_id != existing.tenant_id || updated.unit_id != existing.unit_id {
            let target = self.payment_resource(identity, &updated.tenant_id, &updated.unit_id).await?;
            access::ensure(identity, Action::Update, &target)?;
        }

        let rent = self.current_rent(&updated.unit_id).await?;
        ensure_matches_rent(updated.amount_due, rent)?;

        let now = Utc::now();
        updated.payment_date = settle_payment_date(updated.status, existing.payment_date, now);
        updated.updated_at = now;

        let saved = self.payments.update(&updated).await?;
        info!(payment_id = %saved.id, status = saved.status.as_str(), "Updated payment");
        Ok(saved)
    }

    /// Fetches a payment the caller may perform `action` on.
    pub async fn get_payment(&self, identity: &Identity, id: &str, action: Action) -> Result<Payment, AppError> {
        let payment = self.payments.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Payment not found".into()))?;
        let resource = self.resolver.existing_payment(&payment).await?;
        access::ensure(identity, action, &resource)?;
        Ok(payment)
    }

    pub async fn delete_payment(&self, identity: &Identity, id: &str) -> Result<(), AppError> {
        access::ensure_listable(identity, ResourceKind::Payment, Action::Delete)?;
        let payment = self.get_payment(identity, id, Action::Delete).await?;
        self.payments.delete(&payment.id).await?;
        info!(payment_id = %id, "Deleted payment");
        Ok(())
    }

    async fn payment_resource(&self, identity: &Identity, tenant_id: &str, unit_id: &str) -> Result<Resource, AppError> {
        let tenant = self.resolver.tenant(tenant_id).await?
            .ok_or_else(|| AppError::invalid("tenant_id", "Invalid tenant ID"))?;
        let owner_id = self.resolver.unit_owner(unit_id).await?
            .ok_or_else(|| AppError::invalid("unit_id", "Invalid unit ID"))?;
        ensure_payment_target(identity, &tenant, unit_id, &owner_id)?;
        Ok(Resource::Payment {
            tenant_principal_id: tenant.tenant.principal_id,
            owner_id,
        })
    }

    async fn current_rent(&self, unit_id: &str) -> Result<Money, AppError> {
        let unit = self.units.find_by_id(unit_id).await?
            .ok_or_else(|| AppError::invalid("unit_id", "Invalid unit ID"))?;
        Ok(unit.unit.monthly_rent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::domain::models::tenant::{LeaseTerms, Tenant};

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn billing_period_requires_year_dash_month() {
        assert_eq!(parse_billing_period("2025-01").unwrap(), (2025, 1));
        assert_eq!(parse_billing_period("2025-12").unwrap(), (2025, 12));
        for bad in ["2025-1", "202501", "25-01", "2025/01", "abcd-ef", "2025-001", "２０２５-01"] {
            assert!(parse_billing_period(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn billing_period_month_must_exist() {
        let err = parse_billing_period("2025-13").unwrap_err();
        assert!(matches!(err, AppError::InvalidField { field: "billing_period", .. }));
        assert!(parse_billing_period("2025-00").is_err());
    }

    #[test]
    fn negative_amounts_are_rejected_per_field() {
        let err = validate_amounts(money("-1"), money("0")).unwrap_err();
        assert!(matches!(err, AppError::InvalidField { field: "amount_due", .. }));
        let err = validate_amounts(money("0"), money("-0.01")).unwrap_err();
        assert!(matches!(err, AppError::InvalidField { field: "amount_paid", .. }));
        assert!(validate_amounts(money("0"), money("0")).is_ok());
    }

    #[test]
    fn amount_due_must_equal_rent() {
        let err = ensure_matches_rent(money("15000.00"), money("12000.00")).unwrap_err();
        match err {
            AppError::InvalidField { field, message } => {
                assert_eq!(field, "amount_due");
                assert!(message.contains("12000.00"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(ensure_matches_rent(money("12000"), money("12000.00")).is_ok());
    }

    #[test]
    fn payment_date_follows_status() {
        let earlier = Utc.with_ymd_and_hms(2025, 1, 5, 10, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap();

        assert_eq!(settle_payment_date(PaymentStatus::Completed, None, now), Some(now));
        assert_eq!(settle_payment_date(PaymentStatus::Completed, Some(earlier), now), Some(earlier));
        assert_eq!(settle_payment_date(PaymentStatus::Pending, Some(earlier), now), None);
        assert_eq!(settle_payment_date(PaymentStatus::Failed, None, now), None);
    }

    fn tenancy(principal_id: &str, unit_id: Option<&str>, owner_id: Option<&str>) -> TenantDetails {
        TenantDetails {
            tenant: Tenant::new(principal_id.into(), unit_id.map(str::to_owned), LeaseTerms::default()),
            username: principal_id.into(),
            email: format!("{principal_id}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            phone_number: None,
            unit_number: None,
            property_id: None,
            property_name: None,
            owner_id: owner_id.map(str::to_owned),
        }
    }

    fn who(id: &str, role: Role) -> Identity {
        Identity { id: id.into(), username: id.into(), role }
    }

    #[test]
    fn tenants_pay_only_for_their_current_unit() {
        let me = who("t1", Role::Tenant);
        let mine = tenancy("t1", Some("u1"), Some("l1"));

        assert!(ensure_payment_target(&me, &mine, "u1", "l1").is_ok());
        let err = ensure_payment_target(&me, &mine, "u9", "l2").unwrap_err();
        assert!(matches!(err, AppError::InvalidField { field: "unit_id", .. }));
        let unhoused = tenancy("t1", None, None);
        assert!(ensure_payment_target(&me, &unhoused, "u1", "l1").is_err());
    }

    #[test]
    fn managers_book_within_one_owner_chain() {
        let landlord = who("l1", Role::Landlord);
        let housed_elsewhere = tenancy("t2", Some("u7"), Some("l2"));
        let housed_here = tenancy("t1", Some("u1"), Some("l1"));

        assert!(matches!(
            ensure_payment_target(&landlord, &housed_elsewhere, "u1", "l1"),
            Err(AppError::Forbidden(_))
        ));
        assert!(ensure_payment_target(&landlord, &housed_here, "u2", "l1").is_ok());
        assert!(ensure_payment_target(&who("a", Role::Admin), &housed_elsewhere, "u1", "l1").is_ok());
    }
}
