//! Shared fixtures for resource tests.

use std::time::Duration;

use rstest::fixture;
use serde_json::{Value, json};

use crate::test_support::ScriptedTransport;
use crate::wait::WaitSettings;

#[fixture]
pub fn transport() -> ScriptedTransport {
    ScriptedTransport::new()
}

/// Polls every millisecond and gives up quickly.
#[fixture]
pub fn fast() -> WaitSettings {
    WaitSettings::immediate(Duration::from_millis(1), Duration::from_millis(200))
}

pub fn ip_block_json(status: &str, description: &str) -> Value {
    json!({
        "id": "ipb-1",
        "location": "PHX",
        "cidrBlockSize": "/31",
        "cidr": "10.1.1.0/31",
        "status": status,
        "description": description,
        "isBringYourOwn": false,
        "createdOn": "2024-03-01T10:00:00Z",
        "tags": []
    })
}

pub fn server_json(status: &str) -> Value {
    json!({
        "id": "srv-1",
        "status": status,
        "hostname": "web-01",
        "description": "frontend",
        "os": "ubuntu/jammy",
        "type": "s1.c1.small",
        "location": "PHX",
        "cpu": "E-2276G",
        "cpuCount": 1,
        "coresPerCpu": 6,
        "cpuFrequency": 3.8,
        "ram": "32GB",
        "storage": "1x960GB NVMe",
        "privateIpAddresses": ["10.0.0.11"],
        "publicIpAddresses": ["198.51.100.7"],
        "pricingModel": "HOURLY",
        "networkType": "PUBLIC_AND_PRIVATE",
        "provisionedOn": "2024-03-01T10:00:00Z",
        "tags": [{
            "id": "tag-1",
            "name": "env",
            "value": "prod",
            "isBillingTag": false,
            "createdBy": "USER"
        }],
        "networkConfiguration": {
            "gatewayAddress": "198.51.100.1",
            "privateNetworkConfiguration": {
                "configurationType": "USER_DEFINED",
                "privateNetworks": [{
                    "id": "pn-1",
                    "ips": ["10.0.0.11"],
                    "dhcp": false,
                    "statusDescription": "assigned"
                }]
            },
            "ipBlocksConfiguration": {
                "configurationType": "PURCHASE_NEW",
                "ipBlocks": [{ "id": "ipb-9", "vlanId": 11 }]
            }
        }
    })
}
