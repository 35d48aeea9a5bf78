//! Unit tests for request building, error decoding and typed endpoints.

use rstest::{fixture, rstest};
use serde_json::json;

use super::bmc::ServerAction;
use super::billing::ProductAvailabilityQuery;
use super::locations::{LocationCode, ProductCategoryCode};
use super::*;
use crate::test_support::ScriptedTransport;

#[fixture]
fn transport() -> ScriptedTransport {
    ScriptedTransport::new()
}

#[rstest]
fn error_payload_renders_code_message_and_validation_errors() {
    let body = br#"{"message":"bad request","validationErrors":["hostname is invalid"]}"#;
    let err = ApiError::from_status(400, body);

    assert_eq!(
        err.to_string(),
        "API Returned Code: 400, Message: bad request, Validation Errors: [\"hostname is invalid\"]"
    );
}

#[rstest]
fn non_json_error_body_is_kept_verbatim() {
    let err = ApiError::from_status(502, b"  upstream unavailable \n");

    assert!(matches!(
        err,
        ApiError::Status { status: 502, ref message, ref validation_errors }
            if message == "upstream unavailable" && validation_errors.is_empty()
    ));
}

#[rstest]
fn not_found_status_maps_to_not_found() {
    let err = ApiError::from_status(404, br#"{"message":"Server not found"}"#);

    assert!(err.is_not_found());
}

#[rstest]
#[case(Service::Bmc, "servers", "bmc/v1/servers")]
#[case(Service::Rancher, "clusters/c1", "solutions/rancher/v1beta/clusters/c1")]
#[case(Service::Locations, "", "location-api/v1")]
fn full_path_prefixes_service_base(
    #[case] service: Service,
    #[case] path: &str,
    #[case] expected: &str,
) {
    assert_eq!(ApiRequest::new(service, Method::Get, path).full_path(), expected);
}

#[rstest]
fn optional_query_parameters_are_skipped() {
    let request = ApiRequest::new(Service::Billing, Method::Get, "products")
        .query_opt("productCode", Some("SERVER"))
        .query_opt("location", None::<&str>)
        .query_all("solution", &[String::from("SERVER_RANCHER"), String::from("X")]);

    assert_eq!(
        request.query,
        vec![
            (String::from("productCode"), String::from("SERVER")),
            (String::from("solution"), String::from("SERVER_RANCHER")),
            (String::from("solution"), String::from("X")),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn typed_call_decodes_response(transport: ScriptedTransport) {
    transport.push_json(&json!({
        "id": "srv-1",
        "status": "powered-on",
        "hostname": "web-1",
        "type": "s1.c1.medium",
        "cpuCount": 1,
        "tags": [{"id": "t1", "name": "env", "value": "prod", "isBillingTag": false}]
    }));

    let server = transport
        .client()
        .get_server("srv-1")
        .await
        .unwrap_or_else(|err| panic!("get server: {err}"));

    assert_eq!(server.server_type, "s1.c1.medium");
    assert_eq!(server.cpu_count, 1);
    assert_eq!(server.tags.first().map(|tag| tag.name.as_str()), Some("env"));
    assert_eq!(transport.calls(), vec![(Method::Get, String::from("bmc/v1/servers/srv-1"))]);
}

#[rstest]
#[tokio::test]
async fn error_status_surfaces_api_error(transport: ScriptedTransport) {
    transport.push_status(409, r#"{"message":"conflict"}"#);

    let err = transport
        .client()
        .server_action("srv-1", ServerAction::PowerOff)
        .await
        .expect_err("conflict should fail");

    assert!(matches!(err, ApiError::Status { status: 409, .. }));
    assert_eq!(
        transport.calls(),
        vec![(Method::Post, String::from("bmc/v1/servers/srv-1/actions/power-off"))]
    );
}

#[rstest]
#[tokio::test]
async fn ssh_key_delete_tolerates_missing_key(transport: ScriptedTransport) {
    transport.push_status(404, r#"{"message":"missing"}"#);

    transport
        .client()
        .delete_ssh_key("key-1")
        .await
        .unwrap_or_else(|err| panic!("missing key should be ignored: {err}"));
}

#[rstest]
#[tokio::test]
async fn exhausted_script_reports_transport_error(transport: ScriptedTransport) {
    let err = transport
        .client()
        .list_servers()
        .await
        .expect_err("no response queued");

    assert!(matches!(err, ApiError::Transport { .. }));
}

#[rstest]
#[tokio::test]
async fn availability_query_repeats_keys(transport: ScriptedTransport) {
    transport.push_json(&json!([]));
    let query = ProductAvailabilityQuery {
        product_category: vec![String::from("SERVER")],
        location: vec![String::from("PHX"), String::from("ASH")],
        show_only_min_quantity_available: true,
        min_quantity: Some(1.0),
        ..ProductAvailabilityQuery::default()
    };

    transport
        .client()
        .list_product_availability(&query)
        .await
        .unwrap_or_else(|err| panic!("availability: {err}"));

    let requests = transport.requests();
    let request = requests.first().unwrap_or_else(|| panic!("request recorded"));
    let locations: Vec<_> = request
        .query
        .iter()
        .filter(|(key, _)| key == "location")
        .map(|(_, value)| value.as_str())
        .collect();
    assert_eq!(locations, vec!["PHX", "ASH"]);
    assert!(request.query.contains(&(
        String::from("showOnlyMinQuantityAvailable"),
        String::from("true")
    )));
}

#[rstest]
#[case("PHX", Some(LocationCode::Phx))]
#[case("GLOBAL", Some(LocationCode::Global))]
#[case("phx", None)]
fn location_codes_parse_exact_values(#[case] raw: &str, #[case] expected: Option<LocationCode>) {
    assert_eq!(raw.parse::<LocationCode>().ok(), expected);
}

#[rstest]
fn unknown_product_category_is_rejected() {
    let err = "NETWORK"
        .parse::<ProductCategoryCode>()
        .expect_err("NETWORK is not a category");

    assert_eq!(
        err.to_string(),
        "'NETWORK' is not a valid value for ProductCategoryEnum"
    );
}
