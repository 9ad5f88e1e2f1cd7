use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_properties: i64,
    pub total_units: i64,
    pub occupied_units: i64,
    pub non_occupied_units: i64,
    pub occupancy_percentage: f64,
    pub total_payments: i64,
    pub total_amount_due: f64,
    pub total_amount_paid: f64,
    pub total_balance: f64,
    pub collection_percentage: f64,
}
