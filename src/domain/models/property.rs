use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use super::{money::Money, UnknownVariant};

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Property {
    pub id: String,
    pub name: String,
    pub address: String,
    pub description: String,
    pub owner_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn new(owner_id: String, name: String, address: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            address,
            description,
            owner_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitType {
    #[serde(rename = "1B")]
    OneBedroom,
    #[serde(rename = "2B")]
    TwoBedroom,
    #[serde(rename = "3B")]
    ThreeBedroom,
    #[serde(rename = "ST")]
    Studio,
    #[serde(rename = "OT")]
    Other,
}

impl UnitType {
    pub fn code(&self) -> &'static str {
        match self {
            UnitType::OneBedroom => "1B",
            UnitType::TwoBedroom => "2B",
            UnitType::ThreeBedroom => "3B",
            UnitType::Studio => "ST",
            UnitType::Other => "OT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UnitType::OneBedroom => "1 Bedroom",
            UnitType::TwoBedroom => "2 Bedroom",
            UnitType::ThreeBedroom => "3 Bedroom",
            UnitType::Studio => "Studio",
            UnitType::Other => "Other",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for UnitType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1B" => Ok(UnitType::OneBedroom),
            "2B" => Ok(UnitType::TwoBedroom),
            "3B" => Ok(UnitType::ThreeBedroom),
            "ST" => Ok(UnitType::Studio),
            "OT" => Ok(UnitType::Other),
            other => Err(UnknownVariant::new("unit_type", other)),
        }
    }
}

impl TryFrom<String> for UnitType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A rentable unit. `is_occupied` is owned by the tenancy engine and never written directly.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct Unit {
    pub id: String,
    pub property_id: String,
    pub unit_number: String,
    #[sqlx(try_from = "String")]
    pub unit_type: UnitType,
    #[sqlx(try_from = "String")]
    pub monthly_rent: Money,
    pub description: String,
    pub is_occupied: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewUnitParams {
    pub property_id: String,
    pub unit_number: String,
    pub unit_type: UnitType,
    pub monthly_rent: Money,
    pub description: String,
}

impl Unit {
    pub fn new(params: NewUnitParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            property_id: params.property_id,
            unit_number: params.unit_number,
            unit_type: params.unit_type,
            monthly_rent: params.monthly_rent,
            description: params.description,
            is_occupied: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A unit joined with its property's name and owner.
#[derive(Debug, FromRow, Clone)]
pub struct UnitDetails {
    #[sqlx(flatten)]
    pub unit: Unit,
    pub property_name: String,
    pub owner_id: String,
}
