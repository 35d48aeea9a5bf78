//! Reservation purchase, conversion and renewal toggles.

use rstest::rstest;
use serde_json::{Value, json};

use super::fixtures::transport;
use crate::api::Method;
use crate::provider::{ProviderError, ResourceHandler};
use crate::resources::ReservationResource;
use crate::resources::reservation::ReservationState;
use crate::test_support::ScriptedTransport;

fn reservation_json(id: &str, sku: &str, auto_renew: bool) -> Value {
    json!({
        "id": id,
        "productCode": "s1.c1.small",
        "productCategory": "SERVER",
        "location": "PHX",
        "reservationModel": "ONE_MONTH_RESERVATION",
        "initialInvoiceModel": "CALENDAR_MONTH",
        "startDateTime": "2024-03-01T10:00:00Z",
        "endDateTime": "2024-04-01T10:00:00Z",
        "autoRenew": auto_renew,
        "sku": sku,
        "price": 149.123_456_789,
        "priceUnit": "MONTH"
    })
}

fn held() -> ReservationState {
    ReservationState {
        id: String::from("res-1"),
        sku: String::from("XXX-1M"),
        auto_renew: true,
        ..ReservationState::default()
    }
}

#[rstest]
#[tokio::test]
async fn create_rounds_price(transport: ScriptedTransport) {
    transport.push_json(&reservation_json("res-1", "XXX-1M", true));
    transport.push_json(&reservation_json("res-1", "XXX-1M", true));
    let plan = ReservationState {
        sku: String::from("XXX-1M"),
        ..ReservationState::default()
    };

    let state = ReservationResource
        .create(&transport.client(), plan)
        .await
        .expect("create succeeds");

    assert_eq!(state.id, "res-1");
    assert!((149.123_455..149.123_465).contains(&state.price));
    assert_eq!(state.end_date_time, "2024-04-01T10:00:00Z");
    assert_eq!(state.assigned_resource_id, "");
    let requests = transport.requests();
    let create = requests.first().expect("create recorded");
    assert_eq!(create.full_path(), "billing/v1/reservations");
    assert_eq!(create.body, Some(json!({ "sku": "XXX-1M" })));
}

#[rstest]
#[tokio::test]
async fn sku_change_converts_to_new_reservation(transport: ScriptedTransport) {
    transport.push_json(&reservation_json("res-2", "XXX-1Y", true));
    transport.push_json(&reservation_json("res-2", "XXX-1Y", true));
    let plan = ReservationState {
        sku: String::from("XXX-1Y"),
        auto_renew: false,
        ..held()
    };

    let state = ReservationResource
        .update(&transport.client(), held(), plan)
        .await
        .expect("conversion succeeds");

    assert_eq!(state.id, "res-2");
    assert_eq!(
        transport.calls(),
        vec![
            (Method::Post, String::from("billing/v1/reservations/res-1/actions/convert")),
            (Method::Get, String::from("billing/v1/reservations/res-2")),
        ]
    );
}

#[rstest]
#[case(true, "auto-renew/enable", None)]
#[case(false, "auto-renew/disable", Some(json!({ "autoRenewDisableReason": "moving" })))]
#[tokio::test]
async fn auto_renew_toggle_calls_action(
    transport: ScriptedTransport,
    #[case] auto_renew: bool,
    #[case] action: &str,
    #[case] body: Option<Value>,
) {
    transport.push_json(&reservation_json("res-1", "XXX-1M", auto_renew));
    transport.push_json(&reservation_json("res-1", "XXX-1M", auto_renew));
    let prior = ReservationState {
        auto_renew: !auto_renew,
        ..held()
    };
    let plan = ReservationState {
        auto_renew,
        auto_renew_disable_reason: String::from("moving"),
        ..held()
    };

    let state = ReservationResource
        .update(&transport.client(), prior, plan)
        .await
        .expect("toggle succeeds");

    assert_eq!(state.auto_renew, auto_renew);
    assert_eq!(state.auto_renew_disable_reason, "moving");
    let requests = transport.requests();
    let toggle = requests.first().expect("action recorded");
    assert_eq!(
        toggle.full_path(),
        format!("billing/v1/reservations/res-1/actions/{action}")
    );
    assert_eq!(toggle.body, body);
}

#[rstest]
#[tokio::test]
async fn reason_only_change_is_unsupported(transport: ScriptedTransport) {
    let plan = ReservationState {
        auto_renew_disable_reason: String::from("later"),
        ..held()
    };

    let err = ReservationResource
        .update(&transport.client(), held(), plan)
        .await
        .expect_err("nothing to send");

    assert!(matches!(err, ProviderError::UnsupportedAction));
    assert!(transport.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn reservations_cannot_be_deleted(transport: ScriptedTransport) {
    let err = ReservationResource
        .delete(&transport.client(), held())
        .await
        .expect_err("reservations are permanent");

    assert!(matches!(err, ProviderError::UnsupportedAction));
    assert!(transport.calls().is_empty());
}
