mod common;

use axum::http::StatusCode;
use common::{get, json_request, send_json, send_text, test_app};
use leadform::domain::presets::{DEFAULT_FORM_ID, PHONE_LEAD, PROPERTY_ESTIMATOR};
use serde_json::json;

const LOCATION_ID: &str = "fed0efd8-347d-40ad-bdfa-e9f72ce8f908";
const PROPERTY_TYPE_ID: &str = "16319d4c-1a94-471b-84be-f2ffeea27085";

#[tokio::test]
async fn test_builder_flow_from_draft_to_embed() {
    let (app, _state) = test_app().await;

    // Open a fresh draft
    let (status, body) = send_json(&app, json_request("POST", "/api/drafts", json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["fields"].as_array().unwrap().len(), 3);

    // Add an email field, then make it required and move it to the top
    let (status, body) = send_json(
        &app,
        json_request("POST", &format!("/api/drafts/{}/fields", id), json!({ "type": "email" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let field_id = body["data"]["fieldId"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["draft"]["fields"][3]["label"], "New email field");

    let (status, _) = send_json(
        &app,
        json_request(
            "PATCH",
            &format!("/api/drafts/{}/fields/{}", id, field_id),
            json!({ "label": "Work Email", "required": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        &app,
        json_request(
            "POST",
            &format!("/api/drafts/{}/fields/{}/move", id, field_id),
            json!({ "index": 0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fields"][0]["id"], field_id.as_str());

    // Form-level settings
    let (status, _) = send_json(
        &app,
        json_request(
            "PATCH",
            &format!("/api/drafts/{}", id),
            json!({ "title": "Contact us", "webhookUrl": "" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Save and read back
    let (status, body) = send_json(
        &app,
        json_request("POST", &format!("/api/drafts/{}/save", id), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["createdAt"].is_string());
    assert!(body["data"].get("webhookUrl").is_none());

    let (status, body) = send_json(&app, get(&format!("/api/forms/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Contact us");
    assert_eq!(body["data"]["fields"][0]["label"], "Work Email");

    // Compiled schema follows field order
    let (status, body) = send_json(&app, get(&format!("/api/forms/{}/schema", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rules"][0]["kind"], "email");
    assert_eq!(body["data"]["rules"][0]["required"], true);

    // Embed code points at the dynamic form with this id
    let (status, body) = send_json(&app, get(&format!("/api/forms/{}/embed", id))).await;
    assert_eq!(status, StatusCode::OK);
    let iframe = body["data"]["iframe"].as_str().unwrap();
    assert!(iframe.contains(&format!("src=\"http://localhost:3000/embed/dynamic-form?id={}\"", id)));
    assert_eq!(
        body["data"]["shortcode"],
        format!("[dynamic-form id=\"{}\" width=\"100%\" height=\"600\"]", id)
    );
}

#[tokio::test]
async fn test_draft_from_stored_form_keeps_created_at() {
    let (app, _state) = test_app().await;

    let (status, body) = send_json(
        &app,
        json_request("POST", "/api/drafts", json!({ "from": DEFAULT_FORM_ID })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], DEFAULT_FORM_ID);
    let created_at = body["data"]["createdAt"].clone();

    let (status, body) = send_json(
        &app,
        json_request("POST", &format!("/api/drafts/{}/save", DEFAULT_FORM_ID), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["createdAt"], created_at);
    assert_ne!(body["data"]["updatedAt"], created_at);
}

#[tokio::test]
async fn test_invalid_draft_is_not_saved() {
    let (app, state) = test_app().await;

    let (_, body) = send_json(&app, json_request("POST", "/api/drafts", json!({}))).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    send_json(
        &app,
        json_request("PATCH", &format!("/api/drafts/{}", id), json!({ "title": "" })),
    )
    .await;
    let (status, body) = send_json(
        &app,
        json_request("POST", &format!("/api/drafts/{}/save", id), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("title"));
    assert!(state.store.load(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_draft_and_field() {
    let (app, _state) = test_app().await;

    let (status, _) = send_json(&app, get("/api/drafts/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send_json(&app, json_request("POST", "/api/drafts", json!({}))).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let request = axum::http::Request::builder()
        .method("DELETE")
        .uri(format!("/api/drafts/{}/fields/unknown", id))
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Field not found");
}

#[tokio::test]
async fn test_put_form_rejects_mismatched_id() {
    let (app, _state) = test_app().await;

    let (_, body) = send_json(&app, get(&format!("/api/forms/{}", DEFAULT_FORM_ID))).await;
    let mut config = body["data"].clone();
    config["id"] = json!("someone-else");

    let (status, _) = send_json(
        &app,
        json_request("PUT", &format!("/api/forms/{}", DEFAULT_FORM_ID), config),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_form_assigns_id_and_keeps_unknown_types() {
    let (app, _state) = test_app().await;

    let (status, body) = send_json(
        &app,
        json_request(
            "POST",
            "/api/forms",
            json!({
                "title": "Viewing request",
                "submitButtonText": "Book",
                "successMessage": "See you soon",
                "fields": [
                    { "id": "when", "type": "date", "label": "Preferred date", "required": true }
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap();
    assert!(!id.is_empty());
    assert_eq!(body["data"]["fields"][0]["type"], "date");

    let (_, body) = send_json(&app, get(&format!("/api/forms/{}/schema", id))).await;
    assert_eq!(body["data"]["rules"][0]["kind"], "text");
}

#[tokio::test]
async fn test_json_submission_rejected_then_accepted() {
    let (app, _state) = test_app().await;
    let uri = format!("/api/forms/{}/submissions", DEFAULT_FORM_ID);

    let (status, body) = send_json(&app, json_request("POST", &uri, json!({ "values": {} }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["state"], "editing");
    assert_eq!(body["data"]["errors"][LOCATION_ID], "Location is required");
    assert_eq!(body["data"]["errors"][PROPERTY_TYPE_ID], "Property Type is required");

    let (status, body) = send_json(
        &app,
        json_request(
            "POST",
            &uri,
            json!({ "values": { LOCATION_ID: "Gulberg", PROPERTY_TYPE_ID: "Castle" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["data"]["errors"][PROPERTY_TYPE_ID], "Please select a valid option");
    assert!(body["data"]["errors"].get(LOCATION_ID).is_none());

    let (status, body) = send_json(
        &app,
        json_request(
            "POST",
            &uri,
            json!({ "values": { LOCATION_ID: "Gulberg", PROPERTY_TYPE_ID: "Plot" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "submitted");
    assert_eq!(body["data"]["successMessage"], "Thank you! We'll get back to you soon.");
    assert_eq!(body["data"]["webhookDispatched"], false);
}

#[tokio::test]
async fn test_presets_are_served_through_the_api() {
    let (app, _state) = test_app().await;

    let (status, body) = send_json(&app, get(&format!("/api/forms/{}/embed", PHONE_LEAD))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["shortcode"], "[phone-lead width=\"100%\" height=\"600\"]");

    let (status, body) = send_json(
        &app,
        json_request(
            "POST",
            &format!("/api/forms/{}/submissions", PHONE_LEAD),
            json!({ "values": { "phone": "12345" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["data"]["errors"]["phone"], "Invalid format");
}

#[tokio::test]
async fn test_json_numbers_are_validated_as_numeric_strings() {
    let (app, _state) = test_app().await;
    let uri = format!("/api/forms/{}/submissions", PROPERTY_ESTIMATOR);

    let (status, body) = send_json(
        &app,
        json_request(
            "POST",
            &uri,
            json!({ "values": {
                "location": "DHA Phase 6",
                "propertyType": "House",
                "area": 0,
                "bedrooms": 3,
                "bathrooms": 2.5,
                "condition": "Good"
            } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    let errors = body["data"]["errors"].as_object().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_key("area"));

    let (status, body) = send_json(
        &app,
        json_request(
            "POST",
            &uri,
            json!({ "values": {
                "location": "DHA Phase 6",
                "propertyType": "House",
                "area": 1200,
                "bedrooms": 3,
                "bathrooms": 2,
                "condition": "Good"
            } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "submitted");
}

#[tokio::test]
async fn test_undecodable_submission_uses_envelope() {
    let (app, _state) = test_app().await;

    let (status, body) = send_json(
        &app,
        json_request(
            "POST",
            &format!("/api/forms/{}/submissions", PROPERTY_ESTIMATOR),
            json!({ "values": { "area": { "sq_ft": 1200 } } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("values"));
}

#[tokio::test]
async fn test_unknown_form_is_not_found() {
    let (app, _state) = test_app().await;

    for uri in ["/api/forms/missing", "/api/forms/missing/schema", "/api/forms/missing/embed"] {
        let (status, body) = send_json(&app, get(uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_health_and_metrics() {
    let (app, _state) = test_app().await;

    let (status, body) = send_json(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["store"], "ok");

    let (status, _) = send_json(&app, get("/health/ready")).await;
    assert_eq!(status, StatusCode::OK);

    send_json(
        &app,
        json_request(
            "POST",
            &format!("/api/forms/{}/submissions", DEFAULT_FORM_ID),
            json!({ "values": {} }),
        ),
    )
    .await;

    let (status, metrics) = send_text(&app, get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(metrics.contains("leadform_submissions_total{outcome=\"rejected\"} 1"));
}
