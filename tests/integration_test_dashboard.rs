mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_empty_portfolio_reports_zero() {
    let app = TestApp::new().await;
    let landlord = app.register("landlord_empty", "landlord").await;

    let (status, stats) = app.get("/api/v1/dashboard-stats", &landlord.access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_units"], 0);
    assert_eq!(stats["occupancy_percentage"], 0.0);
    assert_eq!(stats["collection_percentage"], 0.0);
}

#[tokio::test]
async fn test_occupancy_and_collection_are_scoped_to_owner() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let landlord = app.register("landlord_dash", "landlord").await;
    let rival = app.register("rival_dash", "landlord").await;

    let property_id = app.create_property(&landlord.access, "Harbour View").await;
    let mut units = Vec::new();
    for n in 0..10 {
        units.push(app.create_unit(&landlord.access, &property_id, &format!("H{}", n), "1000").await);
    }
    let mut tenants = Vec::new();
    for (n, unit_id) in units.iter().take(4).enumerate() {
        let tenant = app.create_tenant(&landlord.access, &format!("occupant{}", n), Some(unit_id.as_str())).await;
        tenants.push(tenant["id"].as_str().unwrap().to_string());
    }

    for (n, paid) in ["1000", "500", "0"].into_iter().enumerate() {
        let (tenant_id, unit_id) = (&tenants[n], &units[n]);
        let (status, body) = app.post("/api/v1/payments", &landlord.access, json!({
            "tenant_id": tenant_id, "unit_id": unit_id,
            "amount_due": "1000", "amount_paid": paid, "method": "cash", "billing_period": "2025-01",
        })).await;
        assert_eq!(status, StatusCode::CREATED, "{:?}", body);
    }

    let rival_property = app.create_property(&rival.access, "Rival Place").await;
    app.create_unit(&rival.access, &rival_property, "R1", "1000").await;

    let (status, stats) = app.get("/api/v1/dashboard-stats", &landlord.access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_properties"], 1);
    assert_eq!(stats["total_units"], 10);
    assert_eq!(stats["occupied_units"], 4);
    assert_eq!(stats["non_occupied_units"], 6);
    assert_eq!(stats["occupancy_percentage"], 40.0);
    assert_eq!(stats["total_payments"], 3);
    assert_eq!(stats["total_amount_due"], 3000.0);
    assert_eq!(stats["total_amount_paid"], 1500.0);
    assert_eq!(stats["total_balance"], 1500.0);
    assert_eq!(stats["collection_percentage"], 50.0);

    let (_, stats) = app.get("/api/v1/dashboard-stats", &admin.access).await;
    assert_eq!(stats["total_properties"], 2);
    assert_eq!(stats["total_units"], 11);
    assert_eq!(stats["occupancy_percentage"], 36.4);
}

#[tokio::test]
async fn test_inactive_properties_are_not_counted() {
    let app = TestApp::new().await;
    let landlord = app.register("landlord_inactive", "landlord").await;
    let property_id = app.create_property(&landlord.access, "Closing Down").await;

    let (status, _) = app.put(&format!("/api/v1/properties/{}", property_id), &landlord.access, json!({ "is_active": false })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, stats) = app.get("/api/v1/dashboard-stats", &landlord.access).await;
    assert_eq!(stats["total_properties"], 0);
}

#[tokio::test]
async fn test_dashboard_is_for_managers_only() {
    let app = TestApp::new().await;
    let tenant = app.register("tenant_dash", "tenant").await;
    let agent = app.register("agent_dash", "agent").await;

    for token in [&tenant.access, &agent.access] {
        let (status, _) = app.get("/api/v1/dashboard-stats", token).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
