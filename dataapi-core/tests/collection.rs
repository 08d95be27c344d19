mod common;

use chrono::{DateTime, Utc};
use rstest::rstest;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use common::{RecordingTransport, config, routed};
use dataapi_core::{
    action::Action,
    client::DataApiClient,
    document::Document,
    error::DataApiError,
    operation::SortDirection,
};

fn client() -> DataApiClient<RecordingTransport> {
    DataApiClient::new(config(), RecordingTransport::new())
}

fn body_of(request: &dataapi_core::transport::ActionRequest) -> Value {
    Value::Object(request.body.clone())
}

#[tokio::test]
async fn update_one_sends_exactly_filter_and_update() {
    let client = client();
    client
        .transport()
        .respond_with(json!({"matchedCount": 1, "modifiedCount": 1}))
        .await;

    let result = client
        .collection("orders")
        .update_one(json!({"status": "open"}), json!({"$set": {"status": "closed"}}))
        .await
        .unwrap();

    let request = client.transport().last_request().await;
    assert_eq!(request.action, Action::UpdateOne);
    assert_eq!(request.url, "https://data.example.com/v1/action/updateOne");
    assert_eq!(request.api_key, "test-key");
    assert_eq!(
        body_of(&request),
        routed(
            "orders",
            json!({"filter": {"status": "open"}, "update": {"$set": {"status": "closed"}}})
        )
    );
    assert_eq!(result, json!({"matchedCount": 1, "modifiedCount": 1}));
}

#[rstest]
#[case(Action::UpdateOne)]
#[case(Action::UpdateMany)]
#[case(Action::DeleteOne)]
#[case(Action::DeleteMany)]
#[tokio::test]
async fn unfiltered_mutations_fail_without_sending(#[case] action: Action) {
    let client = client();
    let orders = client.collection("orders");
    let update = json!({"$set": {"v": 1}});

    let result = match action {
        Action::UpdateOne => orders.update_one(json!({}), update).await,
        Action::UpdateMany => orders.update_many(json!({}), update).await,
        Action::DeleteOne => orders.delete_one(json!({})).await,
        Action::DeleteMany => orders.delete_many(json!({})).await,
        other => unreachable!("{other} is not a filtered mutation"),
    };

    assert!(matches!(result, Err(DataApiError::InvalidOperation(_))));
    assert!(client.transport().requests().await.is_empty());
}

#[rstest]
#[case(json!([]))]
#[case(json!(null))]
#[case(json!("status"))]
#[tokio::test]
async fn filters_without_fields_are_refused(#[case] filter: Value) {
    let client = client();
    let orders = client.collection("orders");

    let deleted = orders.delete_many(filter.clone()).await;
    let updated = orders.update_one(filter, json!({"$set": {"v": 1}})).await;

    assert!(deleted.unwrap_err().is_invalid_operation());
    assert!(updated.unwrap_err().is_invalid_operation());
    assert!(client.transport().requests().await.is_empty());
}

#[tokio::test]
async fn delete_many_sends_only_the_filter() {
    let client = client();
    client.transport().respond_with(json!({"deletedCount": 3})).await;

    let result = client
        .collection("orders")
        .delete_many(json!({"status": "cancelled"}))
        .await
        .unwrap();

    let request = client.transport().last_request().await;
    assert_eq!(request.action, Action::DeleteMany);
    assert_eq!(
        body_of(&request),
        routed("orders", json!({"filter": {"status": "cancelled"}}))
    );
    assert_eq!(result, json!({"deletedCount": 3}));
}

#[tokio::test]
async fn string_and_mapping_selects_send_identical_projections() {
    let client = client();
    let orders = client.collection("orders");

    orders.find(json!({})).select("a b c").exec().await.unwrap();
    orders
        .find(json!({}))
        .select(json!({"a": 1, "b": 1, "c": 1}))
        .exec()
        .await
        .unwrap();

    orders
        .find(json!({}))
        .select(json!(["a", "b", "c"]))
        .exec()
        .await
        .unwrap();

    let requests = client.transport().requests().await;
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].body, requests[1].body);
    assert_eq!(requests[0].body, requests[2].body);
    assert_eq!(requests[0].body["projection"], json!({"a": 1, "b": 1, "c": 1}));
}

#[tokio::test]
async fn find_sends_every_refinement() {
    let client = client();
    client
        .transport()
        .respond_with(json!({"documents": [{"_id": "1", "status": "open"}]}))
        .await;

    let documents = client
        .collection("orders")
        .find(json!({"status": "open"}))
        .sort_by("createdAt", SortDirection::Desc)
        .limit(10)
        .select("status")
        .await
        .unwrap();

    let request = client.transport().last_request().await;
    assert_eq!(request.url, "https://data.example.com/v1/action/find");
    assert_eq!(
        body_of(&request),
        routed(
            "orders",
            json!({
                "filter": {"status": "open"},
                "sort": {"createdAt": -1},
                "limit": 10,
                "projection": {"status": 1},
            })
        )
    );
    assert_eq!(documents, vec![json!({"_id": "1", "status": "open"})]);
}

#[tokio::test]
async fn find_without_documents_returns_an_empty_list() {
    let client = client();
    client.transport().respond_with(json!({})).await;

    let documents = client
        .collection("orders")
        .find(json!({"status": "open"}))
        .exec()
        .await
        .unwrap();

    assert!(documents.is_empty());
}

#[tokio::test]
async fn next_chain_starts_fresh_after_a_failed_execution() {
    let client = client();
    let orders = client.collection("orders");
    client.transport().fail_next("connection reset").await;

    let err = orders
        .find(json!({"status": "open"}))
        .sort(json!({"total": -1}))
        .limit(5)
        .select("status")
        .exec()
        .await
        .unwrap_err();
    assert!(matches!(err, DataApiError::Transport(_)));

    orders.find(json!({})).exec().await.unwrap();

    let request = client.transport().last_request().await;
    assert_eq!(
        body_of(&request),
        routed("orders", json!({"filter": {}, "sort": {}, "projection": {}}))
    );
}

#[tokio::test]
async fn next_chain_starts_fresh_after_a_successful_execution() {
    let client = client();
    let orders = client.collection("orders");

    orders
        .find(json!({"status": "open"}))
        .limit(5)
        .select("status")
        .exec()
        .await
        .unwrap();
    orders.find(json!({})).exec().await.unwrap();

    let request = client.transport().last_request().await;
    assert_eq!(
        body_of(&request),
        routed("orders", json!({"filter": {}, "sort": {}, "projection": {}}))
    );
}

#[tokio::test]
async fn concurrent_chains_on_one_handle_do_not_interfere() {
    let client = client();
    let orders = client.collection("orders");

    let first = orders.find(json!({"a": 1})).limit(1);
    let second = orders.find(json!({"b": 2})).select("b");
    let (first, second) = tokio::join!(first.exec(), second.exec());
    first.unwrap();
    second.unwrap();

    let bodies: Vec<Value> = client
        .transport()
        .requests()
        .await
        .iter()
        .map(body_of)
        .collect();
    assert!(bodies.contains(&routed(
        "orders",
        json!({"filter": {"a": 1}, "sort": {}, "limit": 1, "projection": {}})
    )));
    assert!(bodies.contains(&routed(
        "orders",
        json!({"filter": {"b": 2}, "sort": {}, "projection": {"b": 1}})
    )));
}

#[tokio::test]
async fn insert_one_stamps_both_timestamps_at_call_time() {
    let client = client();
    client.transport().respond_with(json!({"insertedId": "new"})).await;

    let before = Utc::now();
    let result = client
        .collection("orders")
        .insert_one(json!({"name": "x", "createdAt": "caller", "updatedAt": "caller"}))
        .await
        .unwrap();
    let after = Utc::now();

    let request = client.transport().last_request().await;
    assert_eq!(request.action, Action::InsertOne);
    let document = request.body["document"].as_object().unwrap();
    assert_eq!(document["name"], json!("x"));

    let created = document["createdAt"]["$date"].as_str().unwrap();
    let updated = document["updatedAt"]["$date"].as_str().unwrap();
    assert_eq!(created, updated);

    let stamped = DateTime::parse_from_rfc3339(created).unwrap().with_timezone(&Utc);
    assert!(stamped >= before - chrono::Duration::milliseconds(1));
    assert!(stamped <= after);
    assert_eq!(result, json!({"insertedId": "new"}));
}

#[tokio::test]
async fn create_behaves_like_insert_one() {
    let client = client();

    client.collection("orders").create(json!({"name": "y"})).await.unwrap();

    let request = client.transport().last_request().await;
    assert_eq!(request.action, Action::InsertOne);
    assert_eq!(request.body["document"]["name"], json!("y"));
}

#[tokio::test]
async fn insert_one_rejects_non_objects() {
    let client = client();

    let err = client.collection("orders").insert_one(vec![1, 2]).await.unwrap_err();

    assert!(matches!(err, DataApiError::InvalidDocument(_)));
    assert!(client.transport().requests().await.is_empty());
}

#[tokio::test]
async fn find_one_returns_the_unwrapped_document() {
    let client = client();
    client
        .transport()
        .respond_with(json!({"document": {"_id": "abc", "v": 1}}))
        .await;

    let found = client
        .collection("orders")
        .find_one(json!({"_id": "abc"}))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found, json!({"_id": "abc", "v": 1}));
    assert_eq!(found.id(), Some(&json!("abc")));

    let request = client.transport().last_request().await;
    assert_eq!(
        body_of(&request),
        routed("orders", json!({"filter": {"_id": "abc"}, "projection": {}}))
    );
}

#[tokio::test]
async fn find_one_without_document_is_none() {
    let client = client();
    client.transport().respond_with(json!({"document": null})).await;

    let found = client
        .collection("orders")
        .find_one(json!({"_id": "missing"}))
        .select("v")
        .await
        .unwrap();

    assert!(found.is_none());
    assert_eq!(
        client.transport().last_request().await.body["projection"],
        json!({"v": 1})
    );
}

#[tokio::test]
async fn saving_a_found_document_updates_it_by_identity() {
    let client = client();
    let orders = client.collection("orders");
    client
        .transport()
        .respond_with(json!({"document": {
            "_id": "abc",
            "v": 1,
            "createdAt": {"$date": "2024-01-01T00:00:00.000Z"},
            "updatedAt": {"$date": "2024-01-01T00:00:00.000Z"},
        }}))
        .await;

    let mut found = orders.find_one(json!({"_id": "abc"})).await.unwrap().unwrap();
    found.insert("v".into(), json!(2));
    found.save().await.unwrap();

    let request = client.transport().last_request().await;
    assert_eq!(request.action, Action::UpdateOne);
    assert_eq!(
        body_of(&request),
        routed(
            "orders",
            json!({
                "filter": {"_id": {"$oid": "abc"}},
                "update": {
                    "$currentDate": {"updatedAt": true},
                    "$set": {"_id": {"$oid": "abc"}, "v": 2},
                },
            })
        )
    );
}

#[tokio::test]
async fn saving_a_document_without_identity_inserts_it() {
    let client = client();
    client.transport().respond_with(json!({"document": {"v": 1}})).await;

    let found = client
        .collection("orders")
        .find_one(json!({"v": 1}))
        .await
        .unwrap()
        .unwrap();
    found.save().await.unwrap();

    let request = client.transport().last_request().await;
    assert_eq!(request.action, Action::InsertOne);
    assert_eq!(request.body["document"]["v"], json!(1));
    assert!(request.body["document"]["createdAt"]["$date"].is_string());
}

#[tokio::test]
async fn documents_found_through_a_temporary_handle_can_be_saved() {
    let client = client();
    client
        .transport()
        .respond_with(json!({"document": {"_id": "abc", "v": 1}}))
        .await;

    let mut found = client
        .collection("orders")
        .find_one(json!({"v": 1}))
        .await
        .unwrap()
        .unwrap();
    found.insert("v".into(), json!(2));
    found.save().await.unwrap();

    let request = client.transport().last_request().await;
    assert_eq!(request.action, Action::UpdateOne);
    assert_eq!(request.collection(), Some("orders"));
    assert_eq!(request.body["filter"], json!({"_id": {"$oid": "abc"}}));
    assert_eq!(request.body["update"]["$set"]["v"], json!(2));
}

#[tokio::test]
async fn saving_a_document_with_an_empty_identity_inserts_it() {
    let client = client();
    client
        .transport()
        .respond_with(json!({"document": {"_id": "", "v": 1}}))
        .await;

    let found = client
        .collection("orders")
        .find_one(json!({"v": 1}))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id(), None);
    found.save().await.unwrap();

    let request = client.transport().last_request().await;
    assert_eq!(request.action, Action::InsertOne);
    assert_eq!(request.body["document"]["v"], json!(1));
}

#[tokio::test]
async fn found_documents_decode_into_typed_values() {
    let client = client();
    client
        .transport()
        .respond_with(json!({"document": {"_id": "abc", "status": "open", "total": 2.5}}))
        .await;

    let found = client
        .collection("orders")
        .find_by_id("abc")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        found.decode::<Order>().unwrap(),
        Order { status: "open".into(), total: 2.5 }
    );
}

#[tokio::test]
async fn id_helpers_use_wire_identity() {
    let client = client();
    let orders = client.collection("orders");

    orders.find_by_id("abc").await.unwrap();
    orders
        .find_by_id_and_update("abc", json!({"$set": {"v": 3}}))
        .await
        .unwrap();

    let requests = client.transport().requests().await;
    assert_eq!(requests[0].action, Action::FindOne);
    assert_eq!(requests[0].body["filter"], json!({"_id": {"$oid": "abc"}}));
    assert_eq!(requests[1].action, Action::UpdateOne);
    assert_eq!(
        body_of(&requests[1]),
        routed(
            "orders",
            json!({"filter": {"_id": {"$oid": "abc"}}, "update": {"$set": {"v": 3}}})
        )
    );
}

#[tokio::test]
async fn per_collection_api_key_reaches_the_transport() {
    let client = client();

    client
        .collection_with_api_key("audit", "audit-key")
        .find(json!({}))
        .exec()
        .await
        .unwrap();

    let request = client.transport().last_request().await;
    assert_eq!(request.api_key, "audit-key");
    assert_eq!(request.collection(), Some("audit"));
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Order {
    status: String,
    total: f64,
}

impl Document for Order {
    fn collection_name() -> &'static str {
        "orders"
    }
}

#[tokio::test]
async fn typed_collections_decode_results() {
    let client = client();
    client
        .transport()
        .respond_with(json!({"documents": [{"_id": "1", "status": "open", "total": 3.5}]}))
        .await;
    client
        .transport()
        .respond_with(json!({"document": {"status": "paid", "total": 9.0}}))
        .await;

    let orders = client.typed_collection::<Order>();
    let open = orders.find(json!({"status": "open"})).limit(1).await.unwrap();
    let paid = orders.find_by_id("2").await.unwrap();

    assert_eq!(orders.name(), "orders");
    assert_eq!(open, vec![Order { status: "open".into(), total: 3.5 }]);
    assert_eq!(paid, Some(Order { status: "paid".into(), total: 9.0 }));
}

#[tokio::test]
async fn typed_inserts_encode_the_document() {
    let client = client();
    let orders = client.typed_collection::<Order>();

    orders
        .insert_one(&Order { status: "open".into(), total: 1.0 })
        .await
        .unwrap();

    let request = client.transport().last_request().await;
    assert_eq!(request.body["document"]["status"], json!("open"));
    assert_eq!(request.body["document"]["total"], json!(1.0));
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Invoice {
    total: f64,
}

impl Document for Invoice {
    fn collection_name() -> &'static str {
        "invoices"
    }
}

#[tokio::test]
async fn typed_collections_switch_types_on_the_same_collection() {
    let client = client();
    client
        .transport()
        .respond_with(json!({"documents": [{"total": 4.0}]}))
        .await;

    let orders = client.typed_collection::<Order>();
    let totals = orders.with_type::<Invoice>();
    let found = totals.find(json!({"status": "open"})).await.unwrap();

    assert_eq!(found, vec![Invoice { total: 4.0 }]);
    assert_eq!(totals.name(), "orders");
    assert_eq!(orders.untyped().name(), "orders");
    assert_eq!(client.transport().last_request().await.collection(), Some("orders"));
}
