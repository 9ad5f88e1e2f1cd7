mod common;

use axum::http::StatusCode;
use common::{TestApp, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn test_assignment_occupies_the_unit() {
    let app = TestApp::new().await;
    let manager = app.register("manager_t", "property_manager").await;
    let property_id = app.create_property(&manager.access, "Acacia Flats").await;
    let unit_id = app.create_unit(&manager.access, &property_id, "A1", "12000").await;

    let tenant = app.create_tenant(&manager.access, "tenant_a", Some(unit_id.as_str())).await;
    assert_eq!(tenant["unit"]["id"], unit_id.as_str());
    assert_eq!(tenant["unit"]["unit_number"], "A1");
    assert_eq!(tenant["unit"]["property"]["name"], "Acacia Flats");
    assert_eq!(tenant["user"]["username"], "tenant_a");
    assert!(app.unit_is_occupied(&manager.access, &unit_id).await);

    // The new principal can log in and see its own tenancy.
    let session = app.login("tenant_a", PASSWORD).await;
    let (status, me) = app.get("/api/v1/tenants/me", &session.access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], tenant["id"]);

    // Tenants do not get the management endpoints.
    let (status, _) = app.get(&format!("/api/v1/tenants/{}", tenant["id"].as_str().unwrap()), &session.access).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_conflicting_assignment_leaves_holder_intact() {
    let app = TestApp::new().await;
    let manager = app.register("manager_c", "property_manager").await;
    let property_id = app.create_property(&manager.access, "Baobab House").await;
    let unit_id = app.create_unit(&manager.access, &property_id, "B1", "8000").await;
    let other_unit = app.create_unit(&manager.access, &property_id, "B2", "8000").await;

    let holder = app.create_tenant(&manager.access, "holder", Some(unit_id.as_str())).await;

    let (status, body) = app.post("/api/v1/tenants", &manager.access, json!({
        "username": "intruder",
        "email": "intruder@example.com",
        "password": PASSWORD,
        "unit_id": unit_id,
    })).await;
    assert_eq!(status, StatusCode::CONFLICT, "{:?}", body);

    // Nothing of the rejected tenant survives.
    let (status, _) = app.send("POST", "/api/v1/auth/login", None, Some(json!({
        "identifier": "intruder", "password": PASSWORD,
    }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mover = app.create_tenant(&manager.access, "mover", Some(other_unit.as_str())).await;
    let (status, _) = app.put(
        &format!("/api/v1/tenants/{}", mover["id"].as_str().unwrap()),
        &manager.access,
        json!({ "unit_id": unit_id }),
    ).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, holder_now) = app.get(&format!("/api/v1/tenants/{}", holder["id"].as_str().unwrap()), &manager.access).await;
    assert_eq!(holder_now["unit"]["id"], unit_id.as_str());
    assert!(app.unit_is_occupied(&manager.access, &unit_id).await);
    assert!(app.unit_is_occupied(&manager.access, &other_unit).await);
}

#[tokio::test]
async fn test_reassignment_flips_both_flags() {
    let app = TestApp::new().await;
    let manager = app.register("manager_r", "landlord").await;
    let property_id = app.create_property(&manager.access, "Cedar Court").await;
    let first = app.create_unit(&manager.access, &property_id, "C1", "10000").await;
    let second = app.create_unit(&manager.access, &property_id, "C2", "11000").await;

    let tenant = app.create_tenant(&manager.access, "tenant_r", Some(first.as_str())).await;
    let tenant_uri = format!("/api/v1/tenants/{}", tenant["id"].as_str().unwrap());

    let (status, moved) = app.put(&tenant_uri, &manager.access, json!({ "unit_id": second })).await;
    assert_eq!(status, StatusCode::OK, "{:?}", moved);
    assert_eq!(moved["unit"]["id"], second.as_str());
    assert!(!app.unit_is_occupied(&manager.access, &first).await);
    assert!(app.unit_is_occupied(&manager.access, &second).await);

    // Re-assigning the same unit is a no-op.
    let (status, _) = app.put(&tenant_uri, &manager.access, json!({ "unit_id": second })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.unit_is_occupied(&manager.access, &second).await);

    // An unknown unit is reported as missing and changes nothing.
    let (status, _) = app.put(&tenant_uri, &manager.access, json!({ "unit_id": "no-such-unit" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.unit_is_occupied(&manager.access, &second).await);
}

#[tokio::test]
async fn test_releasing_and_deleting_clear_occupancy() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let landlord = app.register("landlord_x", "landlord").await;
    let property_id = app.create_property(&landlord.access, "Delta Lofts").await;
    let unit_a = app.create_unit(&landlord.access, &property_id, "D1", "9000").await;
    let unit_b = app.create_unit(&landlord.access, &property_id, "D2", "9000").await;

    // Releasing through an explicit null leaves a tenant only the admin can manage.
    let released = app.create_tenant(&landlord.access, "released", Some(unit_a.as_str())).await;
    let released_uri = format!("/api/v1/tenants/{}", released["id"].as_str().unwrap());
    let (status, body) = app.put(&released_uri, &landlord.access, json!({ "unit_id": null })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["unit"].is_null());
    assert!(!app.unit_is_occupied(&landlord.access, &unit_a).await);

    let (status, _) = app.get(&released_uri, &landlord.access).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&released_uri, &admin.access).await;
    assert_eq!(status, StatusCode::OK);

    let deleted = app.create_tenant(&landlord.access, "deleted", Some(unit_b.as_str())).await;
    let deleted_uri = format!("/api/v1/tenants/{}", deleted["id"].as_str().unwrap());
    let (status, _) = app.delete(&deleted_uri, &landlord.access).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!app.unit_is_occupied(&landlord.access, &unit_b).await);

    let (status, _) = app.get(&deleted_uri, &admin.access).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The freed unit can be taken again.
    app.create_tenant(&landlord.access, "next", Some(unit_b.as_str())).await;
    assert!(app.unit_is_occupied(&landlord.access, &unit_b).await);
}

#[tokio::test]
async fn test_lease_window_is_validated() {
    let app = TestApp::new().await;
    let landlord = app.register("landlord_l", "landlord").await;
    let property_id = app.create_property(&landlord.access, "Elm Terrace").await;
    let unit_id = app.create_unit(&landlord.access, &property_id, "E1", "9000").await;
    let tenant = app.create_tenant(&landlord.access, "leaser", Some(unit_id.as_str())).await;
    let uri = format!("/api/v1/tenants/{}", tenant["id"].as_str().unwrap());

    let (status, body) = app.put(&uri, &landlord.access, json!({
        "lease_start_date": "2025-06-01",
        "lease_end_date": "2025-05-31",
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "lease_end_date");

    let (status, body) = app.put(&uri, &landlord.access, json!({
        "lease_start_date": "2025-06-01",
        "lease_end_date": "2026-05-31",
    })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lease_start_date"], "2025-06-01");
    assert_eq!(body["lease_end_date"], "2026-05-31");
    assert_eq!(body["unit"]["id"], unit_id.as_str());
}

#[tokio::test]
async fn test_manager_cannot_place_tenant_in_foreign_unit() {
    let app = TestApp::new().await;
    let owner = app.register("owner_f", "landlord").await;
    let foreign = app.register("foreign_f", "landlord").await;
    let property_id = app.create_property(&owner.access, "Fig Gardens").await;
    let unit_id = app.create_unit(&owner.access, &property_id, "F1", "9000").await;

    let (status, _) = app.post("/api/v1/tenants", &foreign.access, json!({
        "username": "sneaky",
        "email": "sneaky@example.com",
        "password": PASSWORD,
        "unit_id": unit_id,
    })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!app.unit_is_occupied(&owner.access, &unit_id).await);
}

#[tokio::test]
async fn test_deleting_unhoused_tenant_leaves_occupancy_alone() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let landlord = app.register("landlord_u", "landlord").await;
    let property_id = app.create_property(&landlord.access, "Grove Park").await;
    let taken = app.create_unit(&landlord.access, &property_id, "G1", "9000").await;
    let free = app.create_unit(&landlord.access, &property_id, "G2", "9000").await;
    app.create_tenant(&landlord.access, "settled", Some(taken.as_str())).await;

    let drifter = app.create_tenant(&admin.access, "drifter", None).await;
    assert!(drifter["unit"].is_null());

    let (status, _) = app.delete(&format!("/api/v1/tenants/{}", drifter["id"].as_str().unwrap()), &admin.access).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert!(app.unit_is_occupied(&landlord.access, &taken).await);
    assert!(!app.unit_is_occupied(&landlord.access, &free).await);
}

#[tokio::test]
async fn test_move_and_lease_edit_apply_together() {
    let app = TestApp::new().await;
    let landlord = app.register("landlord_ml", "landlord").await;
    let property_id = app.create_property(&landlord.access, "Hazel Yard").await;
    let home = app.create_unit(&landlord.access, &property_id, "H1", "9000").await;
    let taken = app.create_unit(&landlord.access, &property_id, "H2", "9000").await;
    let spare = app.create_unit(&landlord.access, &property_id, "H3", "9000").await;
    app.create_tenant(&landlord.access, "neighbour_ml", Some(taken.as_str())).await;
    let tenant = app.create_tenant(&landlord.access, "mover_ml", Some(home.as_str())).await;
    let uri = format!("/api/v1/tenants/{}", tenant["id"].as_str().unwrap());

    // A refused move rolls back the lease edit sent with it.
    let (status, _) = app.put(&uri, &landlord.access, json!({
        "unit_id": taken, "lease_start_date": "2025-01-01",
    })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, unchanged) = app.get(&uri, &landlord.access).await;
    assert!(unchanged["lease_start_date"].is_null());
    assert_eq!(unchanged["unit"]["id"], home.as_str());

    let (status, moved) = app.put(&uri, &landlord.access, json!({
        "unit_id": spare, "lease_start_date": "2025-01-01",
    })).await;
    assert_eq!(status, StatusCode::OK, "{:?}", moved);
    assert_eq!(moved["unit"]["id"], spare.as_str());
    assert_eq!(moved["lease_start_date"], "2025-01-01");
    assert!(!app.unit_is_occupied(&landlord.access, &home).await);
    assert!(app.unit_is_occupied(&landlord.access, &spare).await);
}
