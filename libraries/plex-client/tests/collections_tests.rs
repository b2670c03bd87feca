//! Tests for the collection operations of the Plex client.
//!
//! These tests use mock servers to verify client behavior without
//! requiring a real Plex server.

use plex_client::{
    CancellationToken, CollectionMode, CollectionSort, CollectionVisibility, MembershipOutcome,
    PlexClient, PlexClientError, PlexConfig, ServerCapabilities,
};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::init_tracing;

fn test_config(mock_server: &MockServer) -> PlexConfig {
    PlexConfig::new(mock_server.uri())
        .with_token("test-token")
        .with_machine_identifier("machine-1")
        .with_settle_delay(Duration::ZERO)
}

fn test_client(mock_server: &MockServer) -> PlexClient {
    init_tracing();
    PlexClient::new(test_config(mock_server)).unwrap()
}

fn container(metadata: Vec<Value>) -> Value {
    json!({
        "MediaContainer": {
            "size": metadata.len(),
            "totalSize": metadata.len(),
            "allowSync": true,
            "identifier": "com.plexapp.plugins.library",
            "Metadata": metadata
        }
    })
}

fn collection(id: &str, title: &str, smart: Value) -> Value {
    json!({
        "ratingKey": id,
        "key": format!("/library/collections/{}/children", id),
        "title": title,
        "smart": smart,
        "childCount": "2",
        "librarySectionID": 1,
        "librarySectionTitle": "Movies",
        "type": "collection",
        "subtype": "movie"
    })
}

fn item(id: &str) -> Value {
    json!({ "ratingKey": id, "title": format!("Movie {}", id), "type": "movie", "year": 2020 })
}

async fn mount_detail(mock_server: &MockServer, id: &str, smart: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/library/collections/{}", id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(container(vec![collection(id, "Test Collection", smart)])),
        )
        .mount(mock_server)
        .await;
}

async fn mount_children(mock_server: &MockServer, id: &str, items: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/library/collections/{}/children", id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(container(items.iter().map(|i| item(i)).collect())),
        )
        .mount(mock_server)
        .await;
}

async fn request_count(mock_server: &MockServer) -> usize {
    mock_server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or_default()
}

// =============================================================================
// Listing and Detail Tests
// =============================================================================

mod listing {
    use super::*;

    #[tokio::test]
    async fn test_list_collections() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/library/sections/1/collections"))
            .and(header("X-Plex-Token", "test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(container(vec![
                collection("1", "Test Collection 1", json!(false)),
                collection("2", "Test Collection 2", json!("1")),
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let collections = client.collections().list(1).await.unwrap();

        assert_eq!(collections.len(), 2);
        assert_eq!(collections[0].title, "Test Collection 1");
        assert!(!collections[0].is_smart());
        assert_eq!(collections[1].title, "Test Collection 2");
        assert!(collections[1].is_smart());
        assert_eq!(collections[1].child_count, Some(2));
    }

    #[tokio::test]
    async fn test_list_empty_section() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/library/sections/4/collections"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "MediaContainer": { "size": 0 } })),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let collections = client.collections().list(4).await.unwrap();
        assert!(collections.is_empty());
    }

    #[tokio::test]
    async fn test_get_collection() {
        let mock_server = MockServer::start().await;
        mount_detail(&mock_server, "3", json!(0)).await;

        let client = test_client(&mock_server);
        let collection = client.collections().get("3").await.unwrap();

        assert_eq!(collection.rating_key, "3");
        assert_eq!(collection.section_id, Some(1));
        assert!(!collection.is_smart());
    }

    #[tokio::test]
    async fn test_get_lifts_container_content() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/library/collections/9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "MediaContainer": {
                    "size": 1,
                    "content": "/library/sections/1/all?genre=action",
                    "Metadata": [collection("9", "Action", json!(true))]
                }
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let collection = client.collections().get("9").await.unwrap();

        assert_eq!(
            collection.content.as_deref(),
            Some("/library/sections/1/all?genre=action")
        );
        assert_eq!(plex_client::extract_filter(&collection).unwrap(), "?genre=action");
    }

    #[tokio::test]
    async fn test_get_empty_result_is_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/library/collections/404"))
            .respond_with(ResponseTemplate::new(200).set_body_json(container(vec![])))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        match client.collections().get("404").await.unwrap_err() {
            PlexClientError::NotFound { entity, id } => {
                assert_eq!(entity, "collection");
                assert_eq!(id, "404");
            }
            e => panic!("Expected NotFound, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_ids_are_escaped_as_one_path_segment() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/library/collections/7%2Fchildren"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(container(vec![collection("7/children", "Odd", json!(0))])),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/library/collections/7/children"))
            .respond_with(ResponseTemplate::new(200).set_body_json(container(vec![])))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let collection = client.collections().get("7/children").await.unwrap();
        assert_eq!(collection.rating_key, "7/children");
    }

    #[tokio::test]
    async fn test_get_missing_rating_key_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/library/collections/5"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(container(vec![json!({ "title": "Broken" })])),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let result = client.collections().get("5").await;
        assert!(matches!(result, Err(PlexClientError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_server_error_carries_status_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/library/sections/1/collections"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        match client.collections().list(1).await.unwrap_err() {
            PlexClientError::ServerError { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("Unauthorized"));
            }
            e => panic!("Expected ServerError, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        init_tracing();
        let config = PlexConfig::new("http://127.0.0.1:9").with_settle_delay(Duration::ZERO);
        let client = PlexClient::new(config).unwrap();

        let err = client.collections().list(1).await.unwrap_err();
        match &err {
            PlexClientError::ServerUnreachable(_) | PlexClientError::Request(_) => {}
            e => panic!("Expected ServerUnreachable or Request error, got: {:?}", e),
        }
        assert!(err.is_transient());
    }
}

// =============================================================================
// Membership Tests
// =============================================================================

mod membership {
    use super::*;

    #[tokio::test]
    async fn test_items_of_regular_collection() {
        let mock_server = MockServer::start().await;
        mount_detail(&mock_server, "10", json!(false)).await;
        mount_children(&mock_server, "10", &["101", "102"]).await;

        let client = test_client(&mock_server);
        let keys = client.collections().item_keys("10").await.unwrap();
        assert_eq!(keys, vec!["101", "102"]);
    }

    #[tokio::test]
    async fn test_items_of_smart_collection_use_filter() {
        let mock_server = MockServer::start().await;

        let mut smart = collection("11", "Action", json!(true));
        smart["content"] = json!("/library/sections/1/all?genre=action");
        Mock::given(method("GET"))
            .and(path("/library/collections/11"))
            .respond_with(ResponseTemplate::new(200).set_body_json(container(vec![smart])))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/library/sections/1/all"))
            .and(query_param("genre", "action"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(container(vec![item("201"), item("202")])),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/library/collections/11/children"))
            .respond_with(ResponseTemplate::new(200).set_body_json(container(vec![])))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let keys = client.collections().item_keys("11").await.unwrap();
        assert_eq!(keys, vec!["201", "202"]);
    }

    #[tokio::test]
    async fn test_items_of_smart_collection_fall_back_to_children() {
        let mock_server = MockServer::start().await;
        mount_detail(&mock_server, "12", json!("1")).await;
        mount_children(&mock_server, "12", &["301"]).await;

        let client = test_client(&mock_server);
        let keys = client.collections().item_keys("12").await.unwrap();
        assert_eq!(keys, vec!["301"]);
    }

    #[tokio::test]
    async fn test_add_items_native() {
        let mock_server = MockServer::start().await;
        mount_detail(&mock_server, "13", json!(false)).await;
        mount_children(&mock_server, "13", &["101"]).await;

        Mock::given(method("PUT"))
            .and(path("/library/collections/13/items"))
            .and(query_param(
                "uri",
                "server://machine-1/com.plexapp.plugins.library/library/metadata/101,102,103",
            ))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let outcome = client
            .collections()
            .add_items("13", &["102", "101", "103"])
            .await
            .unwrap();

        match outcome {
            MembershipOutcome::Updated { changed } => assert_eq!(changed, vec!["102", "103"]),
            other => panic!("Expected Updated, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_add_present_item_is_noop() {
        let mock_server = MockServer::start().await;
        mount_detail(&mock_server, "14", json!(false)).await;
        mount_children(&mock_server, "14", &["101", "102"]).await;

        Mock::given(method("PUT"))
            .and(path("/library/collections/14/items"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let outcome = client.collections().add_items("14", &["101"]).await.unwrap();
        assert!(outcome.is_unchanged());
        assert_eq!(request_count(&mock_server).await, 2);
    }

    #[tokio::test]
    async fn test_add_nothing_skips_membership_read() {
        let mock_server = MockServer::start().await;
        mount_detail(&mock_server, "15", json!(false)).await;

        let client = test_client(&mock_server);
        let empty: [&str; 0] = [];
        let outcome = client.collections().add_items("15", &empty).await.unwrap();
        assert!(outcome.is_unchanged());
        assert_eq!(request_count(&mock_server).await, 1);
    }

    #[tokio::test]
    async fn test_remove_absent_item_is_noop() {
        let mock_server = MockServer::start().await;
        mount_detail(&mock_server, "16", json!(false)).await;
        mount_children(&mock_server, "16", &["101"]).await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let outcome = client
            .collections()
            .remove_items("16", &["999"])
            .await
            .unwrap();
        assert!(outcome.is_unchanged());
    }

    #[tokio::test]
    async fn test_remove_items_native_one_call_per_item() {
        let mock_server = MockServer::start().await;
        mount_detail(&mock_server, "17", json!(false)).await;
        mount_children(&mock_server, "17", &["101", "102", "103"]).await;

        for id in ["101", "103"] {
            Mock::given(method("DELETE"))
                .and(path(format!("/library/collections/17/items/{}", id)))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(&mock_server)
                .await;
        }

        let client = test_client(&mock_server);
        let outcome = client
            .collections()
            .remove_items("17", &["103", "101", "555"])
            .await
            .unwrap();

        match outcome {
            MembershipOutcome::Updated { changed } => assert_eq!(changed, vec!["101", "103"]),
            other => panic!("Expected Updated, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_smart_collection_rejects_membership_edits() {
        let mock_server = MockServer::start().await;
        mount_detail(&mock_server, "18", json!(1)).await;

        let client = test_client(&mock_server);
        let collections = client.collections();

        let add = collections.add_items("18", &["1"]).await.unwrap_err();
        assert!(matches!(add, PlexClientError::Capability { .. }));
        assert!(add.is_user_error());

        let remove = collections.remove_items("18", &["1"]).await.unwrap_err();
        assert!(matches!(remove, PlexClientError::Capability { .. }));

        let moved = collections.move_item("18", "1", None).await.unwrap_err();
        assert!(matches!(moved, PlexClientError::Capability { .. }));

        // One detail fetch per call, nothing else
        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
        assert!(requests
            .iter()
            .all(|r| r.method.to_string() == "GET" && r.url.path() == "/library/collections/18"));
    }

    #[tokio::test]
    async fn test_loaded_smart_collection_rejected_without_requests() {
        let mock_server = MockServer::start().await;
        let client = test_client(&mock_server);

        let smart: plex_client::Collection =
            serde_json::from_value(collection("19", "Smart", json!("true"))).unwrap();
        let result = client.collections().add_items(&smart, &["1"]).await;

        assert!(matches!(result, Err(PlexClientError::Capability { .. })));
        assert_eq!(request_count(&mock_server).await, 0);
    }

    #[tokio::test]
    async fn test_move_item_after_anchor() {
        let mock_server = MockServer::start().await;
        mount_detail(&mock_server, "20", json!(false)).await;

        Mock::given(method("PUT"))
            .and(path("/library/collections/20/items/102/move"))
            .and(query_param("after", "101"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        client
            .collections()
            .move_item("20", "102", Some("101"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_move_item_to_head_omits_anchor() {
        let mock_server = MockServer::start().await;
        mount_detail(&mock_server, "21", json!(false)).await;

        Mock::given(method("PUT"))
            .and(path("/library/collections/21/items/102/move"))
            .respond_with(ResponseTemplate::new(204))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let collections = client.collections();
        collections.move_item("21", "102", None).await.unwrap();
        collections.move_item("21", "102", Some("")).await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        let moves: Vec<_> = requests.iter().filter(|r| r.method.to_string() == "PUT").collect();
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(|r| r.url.query().is_none()));
    }

    #[tokio::test]
    async fn test_add_items_recreates_without_native_endpoint() {
        let mock_server = MockServer::start().await;
        mount_detail(&mock_server, "22", json!(false)).await;
        mount_children(&mock_server, "22", &["101"]).await;

        Mock::given(method("POST"))
            .and(path("/library/collections"))
            .and(query_param("title", "Test Collection"))
            .and(query_param("smart", "0"))
            .and(query_param("type", "1"))
            .and(query_param("sectionId", "1"))
            .and(query_param(
                "uri",
                "server://machine-1/com.plexapp.plugins.library/library/metadata/101,102",
            ))
            .respond_with(
                ResponseTemplate::new(201).insert_header("Location", "/library/collections/23"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        mount_detail(&mock_server, "23", json!(false)).await;

        Mock::given(method("DELETE"))
            .and(path("/library/collections/22"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        init_tracing();
        let config =
            test_config(&mock_server).with_capabilities(ServerCapabilities::recreate_only());
        let client = PlexClient::new(config).unwrap();

        let outcome = client.collections().add_items("22", &["102"]).await.unwrap();
        match outcome {
            MembershipOutcome::Recreated {
                collection,
                changed,
            } => {
                assert_eq!(collection.rating_key, "23");
                assert_eq!(changed, vec!["102"]);
            }
            other => panic!("Expected Recreated, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_remove_items_recreates_without_native_endpoint() {
        let mock_server = MockServer::start().await;
        mount_detail(&mock_server, "24", json!(false)).await;
        mount_children(&mock_server, "24", &["101", "102"]).await;

        Mock::given(method("POST"))
            .and(path("/library/collections"))
            .and(query_param(
                "uri",
                "server://machine-1/com.plexapp.plugins.library/library/metadata/102",
            ))
            .respond_with(
                ResponseTemplate::new(201).insert_header("Location", "/library/collections/25"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        mount_detail(&mock_server, "25", json!(false)).await;

        Mock::given(method("DELETE"))
            .and(path("/library/collections/24"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        init_tracing();
        let config = test_config(&mock_server).with_capabilities(ServerCapabilities {
            native_item_add: true,
            native_item_remove: false,
        });
        let client = PlexClient::new(config).unwrap();

        let outcome = client
            .collections()
            .remove_items("24", &["101"])
            .await
            .unwrap();
        assert!(matches!(outcome, MembershipOutcome::Recreated { .. }));
    }
}

// =============================================================================
// Presentation Tests
// =============================================================================

mod presentation {
    use super::*;

    #[tokio::test]
    async fn test_update_mode_sends_wire_code() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/library/collections/30/prefs"))
            .and(query_param("collectionMode", "2"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        client
            .collections()
            .update_mode("30", CollectionMode::ShowItems)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_mode_unknown_label_uses_default() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/library/collections/31/prefs"))
            .and(query_param("collectionMode", "-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        client
            .collections()
            .update_mode("31", "sideways")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_sort() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/library/collections/32/prefs"))
            .and(query_param("collectionSort", "1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/library/collections/32/prefs"))
            .and(query_param("collectionSort", "0"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let collections = client.collections();
        collections.update_sort("32", "alpha").await.unwrap();
        collections.update_sort("32", "unknown").await.unwrap();
        assert_eq!(CollectionSort::from("custom").code(), 2);
    }

    #[tokio::test]
    async fn test_get_visibility_uses_section_manage_resource() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/hubs/sections/1/manage"))
            .and(query_param("metadataItemId", "33"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "MediaContainer": {
                    "size": 1,
                    "Directory": [{
                        "promotedToRecommended": "1",
                        "promotedToOwnHome": "0",
                        "promotedToSharedHome": "1"
                    }]
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let visibility = client.collections().get_visibility(1, "33").await.unwrap();
        assert_eq!(
            visibility,
            CollectionVisibility {
                library: true,
                home: false,
                shared: true
            }
        );
    }

    #[tokio::test]
    async fn test_get_visibility_without_entries_is_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/hubs/sections/1/manage"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "MediaContainer": { "size": 0 } })),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let result = client.collections().get_visibility(1, "34").await;
        assert!(matches!(
            result,
            Err(PlexClientError::NotFound {
                entity: "visibility",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_set_visibility_flags() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/hubs/sections/2/manage"))
            .and(query_param("metadataItemId", "35"))
            .and(query_param("promotedToRecommended", "1"))
            .and(query_param("promotedToOwnHome", "1"))
            .and(query_param("promotedToSharedHome", "0"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        client
            .collections()
            .set_visibility(
                2,
                "35",
                CollectionVisibility {
                    library: true,
                    home: true,
                    shared: false,
                },
            )
            .await
            .unwrap();
    }
}

// =============================================================================
// Cancellation and Deadline Tests
// =============================================================================

mod cancellation {
    use super::*;

    #[tokio::test]
    async fn test_cancelled_handle_sends_nothing() {
        let mock_server = MockServer::start().await;
        let client = test_client(&mock_server);

        let token = CancellationToken::new();
        token.cancel();

        let result = client
            .collections()
            .with_cancellation(token)
            .add_items("40", &["1"])
            .await;

        assert!(matches!(result, Err(PlexClientError::Cancelled)));
        assert_eq!(request_count(&mock_server).await, 0);
    }

    #[tokio::test]
    async fn test_deadline_exceeded_during_round_trip() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/library/collections/41"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(container(vec![collection("41", "Slow", json!(false))]))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let result = client
            .collections()
            .with_timeout(Duration::from_millis(50))
            .get("41")
            .await;

        match result {
            Err(e @ PlexClientError::DeadlineExceeded) => assert!(e.is_transient()),
            other => panic!("Expected DeadlineExceeded, got: {:?}", other),
        }
    }
}
