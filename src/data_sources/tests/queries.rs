//! Filtered queries reported under a synthetic identifier.

use rstest::rstest;
use serde_json::json;

use super::fixtures::{invoice_json, transaction_json, transport};
use crate::data_sources::events::{EventState, EventsState};
use crate::data_sources::invoices::InvoicesState;
use crate::data_sources::locations::LocationsState;
use crate::data_sources::products::ProductsState;
use crate::data_sources::transactions::TransactionsState;
use crate::data_sources::{
    EventsDataSource, InvoicesDataSource, LocationsDataSource, ProductsDataSource,
    TransactionsDataSource,
};
use crate::provider::{DataSourceHandler, Provider, ProviderError, ProviderSettings};
use crate::test_support::ScriptedTransport;

fn query_pairs(transport: &ScriptedTransport) -> Vec<(String, String)> {
    transport
        .requests()
        .first()
        .map(|request| request.query.clone())
        .unwrap_or_default()
}

fn pair(key: &str, value: &str) -> (String, String) {
    (key.to_owned(), value.to_owned())
}

#[rstest]
#[tokio::test]
async fn events_filter_by_configured_name(transport: ScriptedTransport) {
    transport.push_json(&json!([
        {
            "name": "BMC Server Created",
            "timestamp": "2024-03-01T10:00:00Z",
            "userInfo": { "accountId": "acc-1", "username": "ops" }
        },
        {
            "name": "BMC Server Deleted",
            "timestamp": "2024-03-02T10:00:00Z",
            "userInfo": { "accountId": "acc-1", "username": "ops" }
        }
    ]));
    let config = EventsState {
        limit: 10,
        verb: String::from("POST"),
        events: vec![EventState {
            name: String::from("BMC Server Deleted"),
            ..EventState::default()
        }],
        ..EventsState::default()
    };

    let state = EventsDataSource
        .read(&transport.client(), config)
        .await
        .expect("query succeeds");

    assert!(!state.id.is_empty());
    assert_eq!(state.events.len(), 1);
    let event = state.events.first().expect("one event");
    assert_eq!(event.timestamp, "2024-03-02T10:00:00Z");
    assert_eq!(
        event.user_info.as_ref().map(|info| info.username.as_str()),
        Some("ops")
    );
    assert_eq!(
        query_pairs(&transport),
        vec![pair("limit", "10"), pair("verb", "POST")]
    );
}

#[rstest]
#[tokio::test]
async fn events_reject_several_filters_before_calling(transport: ScriptedTransport) {
    let config = EventsState {
        events: vec![EventState::default(), EventState::default()],
        ..EventsState::default()
    };

    let err = EventsDataSource
        .read(&transport.client(), config)
        .await
        .expect_err("only one filter entry is supported");

    assert!(matches!(err, ProviderError::UnsupportedAction));
    assert!(transport.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn events_reject_malformed_timestamps(transport: ScriptedTransport) {
    let config = EventsState {
        from: String::from("yesterday"),
        ..EventsState::default()
    };

    let err = EventsDataSource
        .read(&transport.client(), config)
        .await
        .expect_err("from is not RFC 3339");

    assert!(err.to_string().starts_with("from 'yesterday' is not an RFC 3339 timestamp"));
    assert!(transport.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn locations_reject_unknown_codes(transport: ScriptedTransport) {
    let config = LocationsState {
        location: String::from("XYZ"),
        ..LocationsState::default()
    };

    let err = LocationsDataSource
        .read(&transport.client(), config)
        .await
        .expect_err("unknown location");

    assert_eq!(err.to_string(), "'XYZ' is not a valid value for LocationEnum");
    assert!(transport.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn locations_forward_known_filters(transport: ScriptedTransport) {
    transport.push_json(&json!([{
        "location": "PHX",
        "locationDescription": "Phoenix",
        "productCategories": [{
            "productCategory": "SERVER",
            "productCategoryDescription": "Bare Metal Servers"
        }]
    }]));
    let config = LocationsState {
        location: String::from("PHX"),
        product_category: String::from("SERVER"),
        ..LocationsState::default()
    };

    let state = LocationsDataSource
        .read(&transport.client(), config)
        .await
        .expect("query succeeds");

    let location = state.locations.first().expect("one location");
    assert_eq!(location.location_description, "Phoenix");
    assert_eq!(
        query_pairs(&transport),
        vec![pair("location", "PHX"), pair("productCategory", "SERVER")]
    );
}

#[rstest]
#[tokio::test]
async fn products_round_prices(transport: ScriptedTransport) {
    transport.push_json(&json!([{
        "productCode": "s1.c1.small",
        "productCategory": "SERVER",
        "plans": [{
            "sku": "XXX-1",
            "location": "PHX",
            "pricingModel": "HOURLY",
            "price": 0.2249,
            "priceUnit": "HOUR"
        }],
        "metadata": {
            "ramInGb": 32,
            "cpu": "E-2276G",
            "cpuCount": 1,
            "coresPerCpu": 6,
            "cpuFrequency": 3.799,
            "network": "1Gbps",
            "storage": "1x960GB NVMe"
        }
    }]));
    let config = ProductsState {
        product_category: String::from("SERVER"),
        ..ProductsState::default()
    };

    let state = ProductsDataSource
        .read(&transport.client(), config)
        .await
        .expect("query succeeds");

    let product = state.products.first().expect("one product");
    let plan = product.plans.first().expect("one plan");
    assert_eq!(plan.price.to_string(), "0.22");
    assert_eq!(
        product.metadata.as_ref().map(|metadata| metadata.cpu_frequency.to_string()),
        Some(String::from("3.8"))
    );
    assert_eq!(query_pairs(&transport), vec![pair("productCategory", "SERVER")]);
}

#[rstest]
#[tokio::test]
async fn availability_defaults_reach_the_query(transport: ScriptedTransport) {
    transport.push_json(&json!([]));
    let provider = Provider::with_client(transport.client(), ProviderSettings::default());

    let state = provider
        .read_data_source(
            "pnap_product_availability",
            json!({ "location": ["PHX"] }),
        )
        .await
        .expect("query succeeds");

    assert_eq!(state.get("show_only_min_quantity_available"), Some(&json!(true)));
    assert_eq!(
        query_pairs(&transport),
        vec![
            pair("showOnlyMinQuantityAvailable", "true"),
            pair("location", "PHX"),
            pair("minQuantity", "1"),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn invoices_report_the_whole_page(transport: ScriptedTransport) {
    transport.push_json(&json!({
        "limit": 10,
        "offset": 0,
        "total": 2,
        "results": [invoice_json("inv-1", "1001"), invoice_json("inv-2", "1002")]
    }));
    let config = InvoicesState {
        status: String::from("PAID"),
        sent_on_from: String::from("2024-03-01T00:00:00Z"),
        ..InvoicesState::default()
    };

    let state = InvoicesDataSource
        .read(&transport.client(), config)
        .await
        .expect("query succeeds");

    assert!(!state.id.is_empty());
    let page = state.paginated_invoices.expect("page reported");
    assert_eq!((page.total, page.results.len()), (2, 2));
    let first = page.results.first().expect("first invoice");
    assert_eq!(first.amount.to_string(), "120.46");
    assert_eq!(first.outstanding_amount.to_string(), "0");
    assert_eq!(
        query_pairs(&transport),
        vec![
            pair("status", "PAID"),
            pair("sentOnFrom", "2024-03-01T00:00:00Z"),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn invoice_by_id_saves_its_pdf(transport: ScriptedTransport) {
    let dir = tempfile::tempdir().expect("tempdir");
    let folder = format!("{}/", dir.path().to_str().expect("utf-8 path"));
    transport.push_json(&json!({
        "limit": 10,
        "offset": 0,
        "total": 2,
        "results": [invoice_json("inv-1", "1001"), invoice_json("inv-2", "1002")]
    }));
    transport.push_status(200, b"%PDF-1.7".to_vec());
    let config = InvoicesState {
        id: String::from("inv-2"),
        pdf_folder_path: folder,
        ..InvoicesState::default()
    };

    let state = InvoicesDataSource
        .read(&transport.client(), config)
        .await
        .expect("query succeeds");

    assert_eq!(state.id, "inv-2");
    let page = state.paginated_invoices.expect("page reported");
    assert_eq!(page.total, 1);
    let written = std::fs::read(dir.path().join("1002.pdf")).expect("pdf written");
    assert_eq!(written, b"%PDF-1.7");
    let calls = transport.calls();
    let generate = calls.get(1).expect("pdf requested");
    assert_eq!(generate.1, "invoicing/v1/invoices/inv-2/actions/generate-pdf");
}

#[rstest]
#[tokio::test]
async fn invoice_pdf_into_missing_folder_fails(transport: ScriptedTransport) {
    let dir = tempfile::tempdir().expect("tempdir");
    let folder = format!("{}/absent/", dir.path().to_str().expect("utf-8 path"));
    transport.push_json(&json!({
        "limit": 10,
        "offset": 0,
        "total": 1,
        "results": [invoice_json("inv-1", "1001")]
    }));
    transport.push_status(200, b"%PDF-1.7".to_vec());
    let config = InvoicesState {
        pdf_folder_path: folder,
        ..InvoicesState::default()
    };

    let err = InvoicesDataSource
        .read(&transport.client(), config)
        .await
        .expect_err("folder does not exist");

    assert!(matches!(err, ProviderError::Io { .. }));
}

#[rstest]
#[tokio::test]
async fn transaction_by_id_keeps_nested_blocks(transport: ScriptedTransport) {
    transport.push_json(&json!({
        "limit": 100,
        "offset": 0,
        "total": 2,
        "results": [transaction_json("tx-1"), transaction_json("tx-2")]
    }));
    let config = TransactionsState {
        id: String::from("tx-1"),
        ..TransactionsState::default()
    };

    let state = TransactionsDataSource
        .read(&transport.client(), config)
        .await
        .expect("query succeeds");

    assert_eq!(state.id, "tx-1");
    let page = state.paginated_transactions.expect("page reported");
    assert_eq!((page.limit, page.total), (100, 1));
    let transaction = page.results.first().expect("one transaction");
    assert_eq!(transaction.amount.to_string(), "100");
    let metadata = transaction.metadata.as_ref().expect("metadata");
    assert!(metadata.is_auto_charge);
    assert_eq!(metadata.invoice_number, "26378192");
    let card = transaction
        .card_payment_method_details
        .as_ref()
        .expect("card details");
    assert_eq!(card.last_four_digits, "4242");
}

#[rstest]
#[tokio::test]
async fn transaction_unknown_id_leaves_id_unset(transport: ScriptedTransport) {
    transport.push_json(&json!({
        "limit": 100,
        "offset": 0,
        "total": 1,
        "results": [transaction_json("tx-1")]
    }));
    let config = TransactionsState {
        id: String::from("tx-9"),
        ..TransactionsState::default()
    };

    let state = TransactionsDataSource
        .read(&transport.client(), config)
        .await
        .expect("query succeeds");

    assert!(state.id.is_empty());
    assert!(state.paginated_transactions.is_none());
}

#[rstest]
#[tokio::test]
async fn transactions_with_duplicate_ids_are_ambiguous(transport: ScriptedTransport) {
    transport.push_json(&json!({
        "limit": 100,
        "offset": 0,
        "total": 2,
        "results": [transaction_json("tx-1"), transaction_json("tx-1")]
    }));
    let config = TransactionsState {
        id: String::from("tx-1"),
        ..TransactionsState::default()
    };

    let err = TransactionsDataSource
        .read(&transport.client(), config)
        .await
        .expect_err("duplicate ids");

    assert_eq!(
        err.to_string(),
        "too many transactions with id tx-1 (found 2, expected 1)"
    );
}
