//! REST integration test macro for storage backends.
//!
//! The `rest_api_tests!` macro builds the real server (JWT auth, the clinic
//! module) on top of a store and drives it over HTTP with `axum-test`.

/// Generate the HTTP-level suite for a storage backend.
///
/// `$factory` must produce a fresh, empty `impl DocumentStore + 'static`.
#[macro_export]
macro_rules! rest_api_tests {
    ($factory:expr) => {
        mod rest_api_tests {
            use super::*;
            use axum::http::header::AUTHORIZATION;
            use axum::http::{HeaderValue, StatusCode};
            use axum_test::TestServer;
            use chrono::{Local, TimeZone, Utc};
            use clinic::core::store::DocumentStore;
            use clinic::core::timestamp;
            use clinic::entities::ClinicModule;
            use clinic::server::ServerBuilder;
            use clinic::core::token::JwtAuthProvider;
            use serde_json::{Value, json};
            use std::sync::Arc;

            async fn make_server() -> (TestServer, Arc<dyn DocumentStore>) {
                let store: Arc<dyn DocumentStore> = Arc::new($factory);
                let app = ServerBuilder::new()
                    .with_shared_store(store.clone())
                    .with_auth_provider(JwtAuthProvider::new(JWT_SECRET))
                    .register_module(ClinicModule)
                    .build()
                    .unwrap();
                (TestServer::try_new(app).unwrap(), store)
            }

            async fn seeded_server() -> TestServer {
                let (server, store) = make_server().await;
                seed_doctors(store.as_ref()).await;
                server
            }

            fn auth(permissions: &[&str]) -> HeaderValue {
                HeaderValue::from_str(&bearer(permissions)).unwrap()
            }

            fn local_instant(day: u32, hour: u32, minute: u32) -> String {
                let local = Local
                    .with_ymd_and_hms(2024, 3, day, hour, minute, 0)
                    .earliest()
                    .unwrap();
                timestamp::format(&local.with_timezone(&Utc))
            }

            fn data_names(body: &Value) -> Vec<String> {
                names(body["data"].as_array().unwrap())
            }

            // ==============================================================
            // Health and identity
            // ==============================================================

            #[tokio::test]
            async fn test_health_is_public() {
                let (server, _) = make_server().await;

                let response = server.get("/health").await;
                response.assert_status_ok();
                assert_eq!(response.json::<Value>()["status"], "ok");
            }

            #[tokio::test]
            async fn test_auth_me_reports_caller() {
                let (server, _) = make_server().await;

                let response = server
                    .get("/auth/me")
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(body["data"]["id"], "user-1");
                assert_eq!(body["data"]["email"], "staff@clinic.test");
                assert_eq!(body["data"]["permissions"], json!(["READ_DOCTOR"]));

                let anonymous = server.get("/auth/me").await;
                anonymous.assert_status(StatusCode::UNAUTHORIZED);
            }

            // ==============================================================
            // Permissions
            // ==============================================================

            #[tokio::test]
            async fn test_missing_token_is_unauthenticated() {
                let server = seeded_server().await;

                let response = server.get("/doctors").await;
                response.assert_status(StatusCode::UNAUTHORIZED);

                let body: Value = response.json();
                assert_eq!(body["success"], false);
                assert_eq!(body["code"], "UNAUTHENTICATED");
            }

            #[tokio::test]
            async fn test_token_without_permission_is_forbidden() {
                let server = seeded_server().await;

                let response = server
                    .get("/doctors")
                    .add_header(AUTHORIZATION, auth(&["READ_PATIENT"]))
                    .await;
                response.assert_status(StatusCode::FORBIDDEN);

                let body: Value = response.json();
                assert_eq!(body["code"], "FORBIDDEN");
                assert_eq!(body["details"]["required"], "READ_DOCTOR");
            }

            #[tokio::test]
            async fn test_admin_passes_every_gate() {
                let server = seeded_server().await;

                let response = server
                    .get("/doctors")
                    .add_header(AUTHORIZATION, auth(&["ADMIN"]))
                    .await;
                response.assert_status_ok();
                assert_eq!(response.json::<Value>()["data"].as_array().unwrap().len(), 3);
            }

            #[tokio::test]
            async fn test_invalid_token_is_unauthenticated() {
                let server = seeded_server().await;

                let response = server
                    .get("/doctors")
                    .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer not-a-jwt"))
                    .await;
                response.assert_status(StatusCode::UNAUTHORIZED);

                let foreign = JwtAuthProvider::new("someone-else")
                    .issue(&clinic::core::token::Claims::new("x", "x@y.test", None, vec!["ADMIN".into()]))
                    .unwrap();
                let response = server
                    .get("/doctors")
                    .add_header(
                        AUTHORIZATION,
                        HeaderValue::from_str(&format!("Bearer {}", foreign)).unwrap(),
                    )
                    .await;
                response.assert_status(StatusCode::UNAUTHORIZED);
            }

            #[tokio::test]
            async fn test_permission_checked_before_payload() {
                let (server, _) = make_server().await;

                let response = server
                    .post("/doctors")
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .text("{ definitely not json")
                    .await;
                response.assert_status(StatusCode::FORBIDDEN);
            }

            // ==============================================================
            // List: pagination, sorting, filters
            // ==============================================================

            #[tokio::test]
            async fn test_list_envelope_and_default_sort() {
                let server = seeded_server().await;

                let response = server
                    .get("/doctors")
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(body["success"], true);
                assert!(body["message"].is_string());
                assert_eq!(data_names(&body), vec!["Cara Diaz", "Bob Stone", "Ali Hassan"]);
                assert_eq!(
                    body["pagination"],
                    json!({
                        "current_page": 1,
                        "total_pages": 1,
                        "total_items": 3,
                        "items_per_page": 10,
                        "has_next_page": false,
                        "has_previous_page": false,
                    })
                );
            }

            #[tokio::test]
            async fn test_list_second_page_sorted_by_name() {
                let server = seeded_server().await;

                let response = server
                    .get("/doctors?page=2&limit=2&sortBy=name&order=asc")
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .await;
                let body: Value = response.json();

                assert_eq!(data_names(&body), vec!["Cara Diaz"]);
                assert_eq!(body["pagination"]["current_page"], 2);
                assert_eq!(body["pagination"]["total_pages"], 2);
                assert_eq!(body["pagination"]["has_next_page"], false);
                assert_eq!(body["pagination"]["has_previous_page"], true);
            }

            #[tokio::test]
            async fn test_list_malformed_window_falls_back() {
                let server = seeded_server().await;

                let response = server
                    .get("/doctors?page=-4&limit=0&order=sideways")
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(data_names(&body), vec!["Cara Diaz"]);
                assert_eq!(body["pagination"]["current_page"], 1);
                assert_eq!(body["pagination"]["items_per_page"], 1);
                assert_eq!(body["pagination"]["total_pages"], 3);
            }

            #[tokio::test]
            async fn test_list_all_data_has_no_pagination() {
                let server = seeded_server().await;

                let response = server
                    .get("/doctors?allData=true&limit=1")
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .await;
                let body: Value = response.json();

                assert_eq!(body["data"].as_array().unwrap().len(), 3);
                assert!(body["pagination"].is_null());
            }

            #[tokio::test]
            async fn test_list_populates_relations() {
                let server = seeded_server().await;

                let response = server
                    .get("/doctors?limit=1")
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .await;
                let body: Value = response.json();

                assert_eq!(body["data"][0]["clinic"]["name"], "Downtown");
            }

            #[tokio::test]
            async fn test_list_range_and_boolean_filters() {
                let server = seeded_server().await;

                let response = server
                    .get("/doctors?consultationFee_gt=100&isActive=true&sortBy=name&order=asc")
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .await;
                let body: Value = response.json();

                assert_eq!(data_names(&body), vec!["Ali Hassan", "Cara Diaz"]);
                assert_eq!(body["pagination"]["total_items"], 2);
            }

            #[tokio::test]
            async fn test_list_membership_and_not_equal() {
                let server = seeded_server().await;

                let response = server
                    .get("/doctors?name_in=Ali%20Hassan,Bob%20Stone&email_ne=bob@clinic.test")
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .await;
                let body: Value = response.json();

                assert_eq!(data_names(&body), vec!["Ali Hassan"]);
            }

            #[tokio::test]
            async fn test_list_digit_text_operands_keep_leading_zeros() {
                let (server, store) = make_server().await;
                let patients = store.collection("patients");
                for (id, name, phone, created) in [
                    (ALI, "Ali Hassan", "0501234567", "2024-01-01T09:00:00.000Z"),
                    (BOB, "Bob Stone", "0509999999", "2024-01-02T09:00:00.000Z"),
                ] {
                    patients
                        .insert(json!({
                            "id": id, "createdAt": created, "updatedAt": created,
                            "name": name, "phone": phone,
                        }))
                        .await
                        .unwrap();
                }

                let member = server
                    .get("/patients?phone_in=0501234567")
                    .add_header(AUTHORIZATION, auth(&["READ_PATIENT"]))
                    .await;
                assert_eq!(data_names(&member.json()), vec!["Ali Hassan"]);

                let excluded = server
                    .get("/patients?phone_ne=0501234567")
                    .add_header(AUTHORIZATION, auth(&["READ_PATIENT"]))
                    .await;
                assert_eq!(data_names(&excluded.json()), vec!["Bob Stone"]);
            }

            #[tokio::test]
            async fn test_list_page_far_past_the_end_is_empty() {
                let server = seeded_server().await;

                let response = server
                    .get("/doctors?page=9223372036854775807&limit=10")
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert!(body["data"].as_array().unwrap().is_empty());
                assert_eq!(body["pagination"]["total_items"], 3);
                assert_eq!(body["pagination"]["has_next_page"], false);
            }

            #[tokio::test]
            async fn test_list_substring_and_search() {
                let server = seeded_server().await;

                let by_field = server
                    .get("/doctors?name=STON")
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .await;
                assert_eq!(data_names(&by_field.json()), vec!["Bob Stone"]);

                let searched = server
                    .get("/doctors?search=mail.test")
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .await;
                assert_eq!(data_names(&searched.json()), vec!["Cara Diaz"]);

                let literal = server
                    .get("/doctors?search=.%2A")
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .await;
                assert!(data_names(&literal.json()).is_empty());
            }

            #[tokio::test]
            async fn test_list_reference_filter_is_exact() {
                let server = seeded_server().await;

                let response = server
                    .get(&format!("/doctors?clinic={}", DOWNTOWN.to_uppercase()))
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .await;
                assert_eq!(response.json::<Value>()["pagination"]["total_items"], 3);
            }

            #[tokio::test]
            async fn test_date_range_covers_whole_end_day() {
                let (server, store) = make_server().await;
                let appointments = store.collection("appointments");

                for (day, hour, minute, notes) in [
                    (1, 8, 0, "morning"),
                    (1, 23, 30, "late evening"),
                    (2, 0, 30, "next day"),
                ] {
                    let at = local_instant(day, hour, minute);
                    appointments
                        .insert(json!({
                            "id": uuid::Uuid::new_v4(),
                            "createdAt": at,
                            "updatedAt": at,
                            "patient": uuid::Uuid::new_v4(),
                            "doctor": ALI,
                            "clinic": DOWNTOWN,
                            "service": null,
                            "appointmentDate": at,
                            "status": "scheduled",
                            "notes": notes,
                        }))
                        .await
                        .unwrap();
                }

                let response = server
                    .get("/appointments?startDate=2024-03-01&endDate=2024-03-01&sortBy=appointmentDate&order=asc")
                    .add_header(AUTHORIZATION, auth(&["READ_APPOINTMENT"]))
                    .await;
                response.assert_status_ok();

                let body: Value = response.json();
                let notes: Vec<&str> = body["data"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|a| a["notes"].as_str().unwrap())
                    .collect();
                assert_eq!(notes, vec!["morning", "late evening"]);
            }

            // ==============================================================
            // Get one
            // ==============================================================

            #[tokio::test]
            async fn test_get_one_is_populated() {
                let server = seeded_server().await;

                let response = server
                    .get(&format!("/doctors/{}", ALI))
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(body["data"]["id"], ALI);
                assert_eq!(body["data"]["clinic"]["id"], DOWNTOWN);
                assert!(body.get("pagination").is_none() || body["pagination"].is_null());
            }

            #[tokio::test]
            async fn test_get_one_errors() {
                let server = seeded_server().await;

                let malformed = server
                    .get("/doctors/not-a-uuid")
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .await;
                malformed.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(malformed.json::<Value>()["code"], "INVALID_ID");

                let missing = server
                    .get(&format!("/doctors/{}", uuid::Uuid::new_v4()))
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .await;
                missing.assert_status(StatusCode::NOT_FOUND);
                assert_eq!(missing.json::<Value>()["code"], "ENTITY_NOT_FOUND");
            }

            // ==============================================================
            // Create / update / delete
            // ==============================================================

            #[tokio::test]
            async fn test_create_assigns_id_and_timestamps() {
                let (server, _) = make_server().await;
                let forged = uuid::Uuid::new_v4();

                let response = server
                    .post("/specializations")
                    .add_header(AUTHORIZATION, auth(&["CREATE_SPECIALIZATION"]))
                    .json(&json!({
                        "id": forged,
                        "createdAt": "1999-01-01T00:00:00.000Z",
                        "name": "Cardiology",
                    }))
                    .await;
                response.assert_status(StatusCode::CREATED);

                let body: Value = response.json();
                let data = &body["data"];
                assert_eq!(data["name"], "Cardiology");
                assert_ne!(data["id"], json!(forged));
                assert_ne!(data["createdAt"], "1999-01-01T00:00:00.000Z");
                assert_eq!(data["createdAt"], data["updatedAt"]);

                let id = data["id"].as_str().unwrap();
                let fetched = server
                    .get(&format!("/specializations/{}", id))
                    .add_header(AUTHORIZATION, auth(&["READ_SPECIALIZATION"]))
                    .await;
                fetched.assert_status_ok();
                assert_eq!(fetched.json::<Value>()["data"]["name"], "Cardiology");
            }

            #[tokio::test]
            async fn test_create_validation_errors() {
                let (server, _) = make_server().await;

                let invalid = server
                    .post("/companies")
                    .add_header(AUTHORIZATION, auth(&["CREATE_COMPANY"]))
                    .json(&json!({ "name": "", "email": "nope" }))
                    .await;
                invalid.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = invalid.json();
                assert_eq!(body["code"], "VALIDATION_ERROR");
                assert!(body["details"]["fields"]["name"].is_array());
                assert!(body["details"]["fields"]["email"].is_array());

                let missing_field = server
                    .post("/departments")
                    .add_header(AUTHORIZATION, auth(&["CREATE_DEPARTMENT"]))
                    .json(&json!({ "name": "Radiology" }))
                    .await;
                missing_field.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(missing_field.json::<Value>()["code"], "VALIDATION_ERROR");

                let not_json = server
                    .post("/companies")
                    .add_header(AUTHORIZATION, auth(&["CREATE_COMPANY"]))
                    .text("[1, 2")
                    .await;
                not_json.assert_status(StatusCode::BAD_REQUEST);
            }

            #[tokio::test]
            async fn test_patch_merges_fields() {
                let server = seeded_server().await;

                let response = server
                    .patch(&format!("/doctors/{}", BOB))
                    .add_header(AUTHORIZATION, auth(&["UPDATE_DOCTOR"]))
                    .json(&json!({ "name": "Robert Stone", "createdAt": "1999-01-01T00:00:00.000Z" }))
                    .await;
                response.assert_status_ok();

                let data = response.json::<Value>()["data"].clone();
                assert_eq!(data["name"], "Robert Stone");
                assert_eq!(data["email"], "bob@clinic.test");
                assert_eq!(data["createdAt"], "2024-01-02T09:00:00.000Z");
                assert_ne!(data["updatedAt"], "2024-01-02T09:00:00.000Z");

                let rejected = server
                    .put(&format!("/doctors/{}", BOB))
                    .add_header(AUTHORIZATION, auth(&["UPDATE_DOCTOR"]))
                    .json(&json!({ "consultationFee": -10 }))
                    .await;
                rejected.assert_status(StatusCode::BAD_REQUEST);

                let missing = server
                    .patch(&format!("/doctors/{}", uuid::Uuid::new_v4()))
                    .add_header(AUTHORIZATION, auth(&["UPDATE_DOCTOR"]))
                    .json(&json!({ "name": "Ghost" }))
                    .await;
                missing.assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_delete_then_not_found() {
                let server = seeded_server().await;

                let response = server
                    .delete(&format!("/doctors/{}", CARA))
                    .add_header(AUTHORIZATION, auth(&["DELETE_DOCTOR"]))
                    .await;
                response.assert_status_ok();
                assert_eq!(response.json::<Value>()["data"]["id"], CARA);

                let again = server
                    .delete(&format!("/doctors/{}", CARA))
                    .add_header(AUTHORIZATION, auth(&["DELETE_DOCTOR"]))
                    .await;
                again.assert_status(StatusCode::NOT_FOUND);

                let remaining = server
                    .get("/doctors")
                    .add_header(AUTHORIZATION, auth(&["READ_DOCTOR"]))
                    .await;
                assert_eq!(remaining.json::<Value>()["pagination"]["total_items"], 2);
            }

            #[tokio::test]
            async fn test_hyphenated_routes() {
                let (server, _) = make_server().await;

                let response = server
                    .get("/medical-records")
                    .add_header(AUTHORIZATION, auth(&["READ_MEDICAL_RECORD"]))
                    .await;
                response.assert_status_ok();
                assert_eq!(response.json::<Value>()["pagination"]["total_items"], 0);
            }
        }
    };
}
