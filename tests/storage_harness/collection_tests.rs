//! Macro-generated conformance suite for `DocumentStore` backends.
//!
//! Every backend must evaluate the same `FilterSpec` the same way, keep the
//! id as a deterministic secondary sort key and expand relations in place.

/// Generate the `Collection` contract suite.
///
/// `$factory` must evaluate to a fresh, empty store implementing
/// `DocumentStore`. It is re-evaluated for every test.
#[macro_export]
macro_rules! collection_tests {
    ($factory:expr) => {
        mod collection_contract_tests {
            use super::*;
            use clinic::core::filter::{
                Comparison, Condition, FilterSpec, QueryFilterBuilder, RawFilters, RawValue,
            };
            use clinic::core::paginate::Paginator;
            use clinic::core::query::{PageRequest, SortSpec};
            use clinic::core::store::{DocumentStore, FindOptions, Relation};
            use serde_json::{Value, json};

            const CLINIC: Relation = Relation::new("clinic", "clinics");

            fn by_created() -> FindOptions {
                FindOptions::sorted(SortSpec::asc("createdAt"))
            }

            // ==================================================================
            // CRUD
            // ==================================================================

            #[tokio::test]
            async fn test_insert_and_find_by_id() {
                let store = $factory;
                let doctors = seed_doctors(&store).await;

                let found = doctors.find_by_id(&fixture_id(BOB), &[]).await.unwrap().unwrap();
                assert_eq!(found["id"], BOB);
                assert_eq!(found["name"], "Bob Stone");
                assert_eq!(found["clinic"], DOWNTOWN);
            }

            #[tokio::test]
            async fn test_find_by_id_missing() {
                let store = $factory;
                let doctors = seed_doctors(&store).await;

                let missing = doctors.find_by_id(&uuid::Uuid::new_v4(), &[]).await.unwrap();
                assert!(missing.is_none());
            }

            #[tokio::test]
            async fn test_insert_duplicate_id_fails() {
                let store = $factory;
                let doctors = seed_doctors(&store).await;

                let again = doctor(ALI, "Ali Again", "a@b.test", 1.0, true, "2024-02-01T00:00:00.000Z");
                assert!(doctors.insert(again).await.is_err());
                assert_eq!(doctors.count(&FilterSpec::new()).await.unwrap(), 3);
            }

            #[tokio::test]
            async fn test_replace_existing_and_missing() {
                let store = $factory;
                let doctors = seed_doctors(&store).await;

                let mut renamed = doctor_fixtures().remove(1);
                renamed["name"] = json!("Robert Stone");
                let replaced = doctors.replace(&fixture_id(BOB), renamed).await.unwrap();
                assert!(replaced.is_some());

                let stored = doctors.find_by_id(&fixture_id(BOB), &[]).await.unwrap().unwrap();
                assert_eq!(stored["name"], "Robert Stone");

                let ghost = uuid::Uuid::new_v4();
                let missing = doctors
                    .replace(&ghost, json!({"id": ghost, "name": "Nobody"}))
                    .await
                    .unwrap();
                assert!(missing.is_none());
                assert_eq!(doctors.count(&FilterSpec::new()).await.unwrap(), 3);
            }

            #[tokio::test]
            async fn test_delete_existing_then_again() {
                let store = $factory;
                let doctors = seed_doctors(&store).await;

                assert!(doctors.delete(&fixture_id(CARA)).await.unwrap());
                assert!(!doctors.delete(&fixture_id(CARA)).await.unwrap());
                assert!(doctors.find_by_id(&fixture_id(CARA), &[]).await.unwrap().is_none());
            }

            // ==================================================================
            // Filters
            // ==================================================================

            #[tokio::test]
            async fn test_numeric_range_bounds_are_anded() {
                let store = $factory;
                let doctors = seed_doctors(&store).await;

                let filter = FilterSpec::new()
                    .with_comparison("consultationFee", Comparison::gt(json!(90)))
                    .with_comparison("consultationFee", Comparison::lt(json!(150)));

                let found = doctors.find(&filter, &by_created()).await.unwrap();
                assert_eq!(names(&found), vec!["Ali Hassan"]);
            }

            #[tokio::test]
            async fn test_boolean_equality() {
                let store = $factory;
                let doctors = seed_doctors(&store).await;

                let filter =
                    FilterSpec::new().with_clause("isActive", Condition::Equals(json!(false)));
                assert_eq!(doctors.count(&filter).await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_contains_is_case_insensitive() {
                let store = $factory;
                let doctors = seed_doctors(&store).await;

                let filter =
                    FilterSpec::new().with_clause("name", Condition::Contains("STONE".into()));
                let found = doctors.find(&filter, &by_created()).await.unwrap();
                assert_eq!(names(&found), vec!["Bob Stone"]);
            }

            #[tokio::test]
            async fn test_contains_treats_metacharacters_literally() {
                let store = $factory;
                let doctors = seed_doctors(&store).await;

                let dotted =
                    FilterSpec::new().with_clause("name", Condition::Contains("a.i".into()));
                assert_eq!(doctors.count(&dotted).await.unwrap(), 0);

                let bracket =
                    FilterSpec::new().with_clause("name", Condition::Contains("(".into()));
                assert_eq!(doctors.count(&bracket).await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_not_equal_and_membership() {
                let store = $factory;
                let doctors = seed_doctors(&store).await;

                let not_bob = FilterSpec::new()
                    .with_comparison("name", Comparison::ne(json!("Bob Stone")));
                assert_eq!(doctors.count(&not_bob).await.unwrap(), 2);

                let members = FilterSpec::new().with_comparison(
                    "email",
                    Comparison::one_of(vec![json!("ali@clinic.test"), json!("cara@mail.test")]),
                );
                let found = doctors.find(&members, &by_created()).await.unwrap();
                assert_eq!(names(&found), vec!["Ali Hassan", "Cara Diaz"]);
            }

            #[tokio::test]
            async fn test_search_group_is_or_across_fields() {
                let store = $factory;
                let doctors = seed_doctors(&store).await;

                let mut raw = RawFilters::new();
                raw.insert("isActive".to_string(), RawValue::Bool(true));
                let filter = QueryFilterBuilder::build(&raw, Some("clinic.test"), &["name", "email"]);

                let found = doctors.find(&filter, &by_created()).await.unwrap();
                assert_eq!(names(&found), vec!["Ali Hassan"]);
            }

            #[tokio::test]
            async fn test_timestamp_range_is_chronological() {
                let store = $factory;
                let doctors = seed_doctors(&store).await;

                let filter = FilterSpec::new().with_comparison(
                    "createdAt",
                    Comparison {
                        gte: Some(json!("2024-01-02T00:00:00.000Z")),
                        lte: Some(json!("2024-01-02T23:59:59.999Z")),
                        ..Comparison::default()
                    },
                );
                let found = doctors.find(&filter, &by_created()).await.unwrap();
                assert_eq!(names(&found), vec!["Bob Stone"]);
            }

            #[tokio::test]
            async fn test_filter_on_id() {
                let store = $factory;
                let doctors = seed_doctors(&store).await;

                let filter = FilterSpec::new().with_clause("id", Condition::Equals(json!(CARA)));
                let found = doctors.find(&filter, &by_created()).await.unwrap();
                assert_eq!(names(&found), vec!["Cara Diaz"]);
            }

            // ==================================================================
            // Sorting, windows and relations
            // ==================================================================

            #[tokio::test]
            async fn test_sort_desc_with_window() {
                let store = $factory;
                let doctors = seed_doctors(&store).await;

                let options = FindOptions::sorted(SortSpec::desc("createdAt")).window(1, 1);
                let found = doctors.find(&FilterSpec::new(), &options).await.unwrap();
                assert_eq!(names(&found), vec!["Bob Stone"]);
            }

            #[tokio::test]
            async fn test_ties_are_broken_by_id() {
                let store = $factory;
                let doctors = store.collection("doctors");
                let same = "2024-05-05T05:05:05.000Z";
                for (id, name) in [(CARA, "Cara"), (ALI, "Ali"), (BOB, "Bob")] {
                    doctors
                        .insert(doctor(id, name, "x@y.test", 50.0, true, same))
                        .await
                        .unwrap();
                }

                for sort in [SortSpec::asc("createdAt"), SortSpec::desc("createdAt")] {
                    let found = doctors
                        .find(&FilterSpec::new(), &FindOptions::sorted(sort))
                        .await
                        .unwrap();
                    assert_eq!(names(&found), vec!["Ali", "Bob", "Cara"]);
                }
            }

            #[tokio::test]
            async fn test_populate_embeds_referenced_document() {
                let store = $factory;
                let doctors = seed_doctors(&store).await;

                let found = doctors.find_by_id(&fixture_id(ALI), &[CLINIC]).await.unwrap().unwrap();
                assert_eq!(found["clinic"]["id"], DOWNTOWN);
                assert_eq!(found["clinic"]["name"], "Downtown");

                let listed = doctors
                    .find(&FilterSpec::new(), &by_created().populate(&[CLINIC]))
                    .await
                    .unwrap();
                assert!(listed.iter().all(|d| d["clinic"]["name"] == "Downtown"));
            }

            #[tokio::test]
            async fn test_populate_missing_target_is_null() {
                let store = $factory;
                let doctors = store.collection("doctors");
                doctors
                    .insert(doctor(ALI, "Ali", "a@b.test", 10.0, true, "2024-01-01T00:00:00.000Z"))
                    .await
                    .unwrap();

                let found = doctors.find_by_id(&fixture_id(ALI), &[CLINIC]).await.unwrap().unwrap();
                assert_eq!(found.get("clinic"), Some(&Value::Null));
                assert_eq!(found["name"], "Ali");
            }

            // ==================================================================
            // Pagination on top of the collection
            // ==================================================================

            #[tokio::test]
            async fn test_paginate_second_page() {
                let store = $factory;
                let doctors = seed_doctors(&store).await;

                let page = Paginator::paginate::<Value>(
                    doctors.as_ref(),
                    &FilterSpec::new(),
                    &SortSpec::asc("name"),
                    PageRequest::new(2, 2, false),
                    &[],
                )
                .await
                .unwrap();

                assert_eq!(names(&page.data), vec!["Cara Diaz"]);
                assert_eq!(page.total, 3);
                let meta = page.pagination.unwrap();
                assert_eq!(meta.total_pages, 2);
                assert!(!meta.has_next_page);
                assert!(meta.has_previous_page);
            }

            #[tokio::test]
            async fn test_paginate_all_data_skips_window() {
                let store = $factory;
                let doctors = seed_doctors(&store).await;

                let page = Paginator::paginate::<Value>(
                    doctors.as_ref(),
                    &FilterSpec::new(),
                    &SortSpec::desc("createdAt"),
                    PageRequest::new(5, 1, true),
                    &[CLINIC],
                )
                .await
                .unwrap();

                assert_eq!(names(&page.data), vec!["Cara Diaz", "Bob Stone", "Ali Hassan"]);
                assert!(page.pagination.is_none());
                assert_eq!(page.data[0]["clinic"]["name"], "Downtown");
            }

            #[tokio::test]
            async fn test_paginate_empty_collection() {
                let store = $factory;
                let empty = store.collection("patients");

                let page = Paginator::paginate::<Value>(
                    empty.as_ref(),
                    &FilterSpec::new(),
                    &SortSpec::desc("createdAt"),
                    PageRequest::default(),
                    &[],
                )
                .await
                .unwrap();

                assert!(page.data.is_empty());
                let meta = page.pagination.unwrap();
                assert_eq!(meta.total_pages, 0);
                assert!(!meta.has_next_page);
            }
        }
    };
}
