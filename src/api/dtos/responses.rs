use crate::api::dtos::requests::PageParams;
use crate::domain::models::{
    property::{Unit, UnitDetails},
    tenant::TenantDetails,
};
use crate::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Page envelope used by every list endpoint.
#[derive(Serialize, Debug)]
pub struct Paginated<T> {
    pub count: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Slices `items` to the requested page. An empty list still has a page 1.
    pub fn paginate(items: Vec<T>, params: &PageParams) -> Result<Self, AppError> {
        let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let page = params.page.unwrap_or(1);
        let count = items.len();
        let total_pages = count.div_ceil(page_size).max(1);

        if page == 0 || page > total_pages {
            return Err(AppError::NotFound("Invalid page.".into()));
        }

        let results: Vec<T> = items.into_iter().skip((page - 1) * page_size).take(page_size).collect();

        Ok(Self {
            count,
            total_pages,
            current_page: page,
            page_size,
            has_next: page < total_pages,
            has_previous: page > 1,
            results,
        })
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        let Paginated { count, total_pages, current_page, page_size, has_next, has_previous, results } = self;
        Paginated {
            count,
            total_pages,
            current_page,
            page_size,
            has_next,
            has_previous,
            results: results.into_iter().map(f).collect(),
        }
    }

    /// Keeps the page metadata around results built elsewhere.
    pub fn with_results<U>(self, results: Vec<U>) -> Paginated<U> {
        Paginated {
            count: self.count,
            total_pages: self.total_pages,
            current_page: self.current_page,
            page_size: self.page_size,
            has_next: self.has_next,
            has_previous: self.has_previous,
            results,
        }
    }
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Serialize, Debug)]
pub struct PropertyRef {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Debug)]
pub struct UnitResponse {
    #[serde(flatten)]
    pub unit: Unit,
    pub unit_type_display: &'static str,
    pub property: PropertyRef,
}

impl From<UnitDetails> for UnitResponse {
    fn from(details: UnitDetails) -> Self {
        let property = PropertyRef {
            id: details.unit.property_id.clone(),
            name: details.property_name,
        };
        Self {
            unit_type_display: details.unit.unit_type.label(),
            unit: details.unit,
            property,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct TenantUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct TenantUnit {
    pub id: String,
    pub unit_number: String,
    pub property: PropertyRef,
}

#[derive(Serialize, Debug)]
pub struct TenantResponse {
    pub id: String,
    pub user: TenantUser,
    pub unit: Option<TenantUnit>,
    pub lease_start_date: Option<NaiveDate>,
    pub lease_end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TenantDetails> for TenantResponse {
    fn from(details: TenantDetails) -> Self {
        let tenant = details.tenant;

        let unit = match (tenant.unit_id, details.unit_number, details.property_id, details.property_name) {
            (Some(id), Some(unit_number), Some(property_id), Some(property_name)) => Some(TenantUnit {
                id,
                unit_number,
                property: PropertyRef { id: property_id, name: property_name },
            }),
            _ => None,
        };

        Self {
            id: tenant.id,
            user: TenantUser {
                id: tenant.principal_id,
                email: details.email,
                username: details.username,
                first_name: details.first_name,
                last_name: details.last_name,
                phone_number: details.phone_number,
            },
            unit,
            lease_start_date: tenant.lease_start_date,
            lease_end_date: tenant.lease_end_date,
            created_at: tenant.created_at,
            updated_at: tenant.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<usize>, page_size: Option<usize>) -> PageParams {
        PageParams { page, page_size }
    }

    #[test]
    fn first_page_uses_default_size() {
        let page = Paginated::paginate((0..25).collect::<Vec<_>>(), &PageParams::default()).unwrap();
        assert_eq!(page.count, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.results, (0..10).collect::<Vec<_>>());
        assert!(page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn last_page_is_partial() {
        let page = Paginated::paginate((0..25).collect::<Vec<_>>(), &params(Some(3), None)).unwrap();
        assert_eq!(page.results, vec![20, 21, 22, 23, 24]);
        assert!(!page.has_next);
        assert!(page.has_previous);
    }

    #[test]
    fn page_size_is_capped() {
        let page = Paginated::paginate((0..250).collect::<Vec<_>>(), &params(None, Some(1000))).unwrap();
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
        assert_eq!(page.results.len(), MAX_PAGE_SIZE);
    }

    #[test]
    fn empty_list_has_one_page() {
        let page = Paginated::paginate(Vec::<u8>::new(), &PageParams::default()).unwrap();
        assert_eq!(page.total_pages, 1);
        assert!(page.results.is_empty());
    }

    #[test]
    fn out_of_range_page_is_not_found() {
        assert!(matches!(
            Paginated::paginate(vec![1, 2, 3], &params(Some(2), None)),
            Err(AppError::NotFound(_))
        ));
        assert!(Paginated::paginate(vec![1], &params(Some(0), None)).is_err());
    }
}
