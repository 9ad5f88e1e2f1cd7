use crate::domain::models::tenant::LeaseTerms;
use crate::error::AppError;

/// Occupancy changes needed to move a tenancy from one unit to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentPlan {
    Unchanged,
    Move { release: Option<String>, occupy: Option<String> },
}

pub fn plan_assignment(current: Option<&str>, requested: Option<&str>) -> AssignmentPlan {
    if current == requested {
        return AssignmentPlan::Unchanged;
    }
    AssignmentPlan::Move {
        release: current.map(str::to_owned),
        occupy: requested.map(str::to_owned),
    }
}

pub fn validate_lease_window(lease: &LeaseTerms) -> Result<(), AppError> {
    if let (Some(start), Some(end)) = (lease.start, lease.end)
        && end < start
    {
        return Err(AppError::invalid("lease_end_date", "Lease end date cannot be before the start date."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn same_unit_is_a_no_op() {
        assert_eq!(plan_assignment(Some("u1"), Some("u1")), AssignmentPlan::Unchanged);
        assert_eq!(plan_assignment(None, None), AssignmentPlan::Unchanged);
    }

    #[test]
    fn moving_releases_the_old_unit() {
        assert_eq!(
            plan_assignment(Some("u1"), Some("u2")),
            AssignmentPlan::Move { release: Some("u1".into()), occupy: Some("u2".into()) }
        );
        assert_eq!(
            plan_assignment(Some("u1"), None),
            AssignmentPlan::Move { release: Some("u1".into()), occupy: None }
        );
        assert_eq!(
            plan_assignment(None, Some("u2")),
            AssignmentPlan::Move { release: None, occupy: Some("u2".into()) }
        );
    }

    #[test]
    fn lease_must_not_end_before_it_starts() {
        let day = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap();
        assert!(validate_lease_window(&LeaseTerms { start: Some(day(10)), end: Some(day(9)) }).is_err());
        assert!(validate_lease_window(&LeaseTerms { start: Some(day(10)), end: Some(day(10)) }).is_ok());
        assert!(validate_lease_window(&LeaseTerms { start: None, end: Some(day(1)) }).is_ok());
    }
}
