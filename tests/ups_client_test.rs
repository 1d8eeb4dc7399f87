use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine};
use httpmock::prelude::*;
use label_validator::config::CarrierConfig;
use label_validator::core::{RequestContext, TrackingProvider};
use label_validator::domain::model::AddressRole;
use label_validator::utils::error::ErrorCategory;
use label_validator::{LabelError, UpsClient};
use serde_json::json;

fn carrier_config(server: &MockServer) -> CarrierConfig {
    CarrierConfig {
        client_id: "ups-id".to_string(),
        client_secret: "ups-secret".to_string(),
        token_url: server.url("/security/v1/oauth/token"),
        tracking_url: server.url("/api/track/v1/details"),
        transaction_src: "label-validator-test".to_string(),
        ..CarrierConfig::default()
    }
}

fn tracking_body() -> serde_json::Value {
    json!({
        "trackResponse": {
            "shipment": [{
                "inquiryNumber": "1Z999AA10123456784",
                "package": [{
                    "trackingNumber": "1Z999AA10123456784",
                    "packageAddress": [
                        {
                            "type": "ORIGIN",
                            "name": "WAREHOUSE",
                            "address": { "addressLine1": "1 Dock Rd", "city": "Chicago" }
                        },
                        {
                            "type": "DESTINATION",
                            "name": "JANE DOE",
                            "attentionName": "JANE",
                            "address": {
                                "addressLine1": "123 Main St",
                                "city": "Springfield",
                                "stateProvince": "IL",
                                "postalCode": "62704",
                                "countryCode": "US"
                            }
                        }
                    ]
                }]
            }]
        }
    })
}

/// token 交換：form body 與 basic auth
#[tokio::test]
async fn test_connect_exchanges_client_credentials() -> Result<()> {
    let server = MockServer::start();
    let basic = format!("Basic {}", STANDARD.encode("ups-id:ups-secret"));

    let token_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/security/v1/oauth/token")
            .header("Authorization", basic.as_str())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials&scope=public");
        then.status(200).json_body(json!({
            "token_type": "Bearer",
            "issued_at": "1718000000000",
            "client_id": "ups-id",
            "access_token": "token-abc",
            "expires_in": "14399",
            "status": "approved"
        }));
    });

    let tracking_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/track/v1/details/1Z999AA10123456784")
            .header("Authorization", "Bearer token-abc")
            .header("transactionSrc", "label-validator-test")
            .header_exists("transId");
        then.status(200).json_body(tracking_body());
    });

    let client = UpsClient::connect(&carrier_config(&server)).await?;
    let details = client
        .get_tracking_details(&RequestContext::background(), "1Z999AA10123456784")
        .await?;

    token_mock.assert();
    tracking_mock.assert();

    let destination = details.destination_address().expect("destination address");
    assert_eq!(destination.name, "JANE DOE");
    assert_eq!(destination.address.postal_code, "62704");
    let origin = details.package_address(&AddressRole::Origin).expect("origin address");
    assert_eq!(origin.address.address_line1, "1 Dock Rd");
    Ok(())
}

#[tokio::test]
async fn test_token_rejection_surfaces_body() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/security/v1/oauth/token");
        then.status(401)
            .body(r#"{"response":{"errors":[{"code":"10401","message":"ClientId is Invalid"}]}}"#);
    });

    let err = UpsClient::connect(&carrier_config(&server)).await.unwrap_err();
    match err {
        LabelError::StatusError { status, ref body } => {
            assert_eq!(status, 401);
            assert!(body.contains("ClientId is Invalid"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_tracking_non_success_carries_raw_body() -> Result<()> {
    let server = MockServer::start();
    let raw = r#"{"response":{"errors":[{"code":"151018","message":"Invalid tracking number"}]}}"#;
    server.mock(|when, then| {
        when.method(GET).path("/api/track/v1/details/BOGUS");
        then.status(400).body(raw);
    });

    let client = UpsClient::with_token(&carrier_config(&server), "token-abc")?;
    let err = client
        .get_tracking_details(&RequestContext::background(), "BOGUS")
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Transport);
    assert_eq!(err.to_string(), raw);
    Ok(())
}

#[tokio::test]
async fn test_tracking_undecodable_json_is_malformed() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/track/v1/details/1Z999AA10123456784");
        then.status(200).body("<html>maintenance</html>");
    });

    let client = UpsClient::with_token(&carrier_config(&server), "token-abc")?;
    let err = client
        .get_tracking_details(&RequestContext::background(), "1Z999AA10123456784")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LabelError::MalformedResponse { ref source_name, .. } if source_name == "ups"
    ));
    Ok(())
}

#[tokio::test]
async fn test_tracking_without_destination_decodes_to_absence() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/track/v1/details/1Z999AA10123456784");
        then.status(200).json_body(json!({
            "trackResponse": { "shipment": [{ "package": [{ "trackingNumber": "1Z999AA10123456784" }] }] }
        }));
    });

    let client = UpsClient::with_token(&carrier_config(&server), "token-abc")?;
    let details = client
        .get_tracking_details(&RequestContext::background(), "1Z999AA10123456784")
        .await?;

    assert!(details.destination_address().is_none());
    Ok(())
}

/// 從標籤讀出的追蹤號碼不能把已授權的請求導向其他路徑
#[tokio::test]
async fn test_tracking_number_cannot_escape_tracking_path() -> Result<()> {
    let server = MockServer::start();
    let secret_mock = server.mock(|when, then| {
        when.method(GET).path("/api/secret");
        then.status(200).json_body(tracking_body());
    });
    let details_mock = server.mock(|when, then| {
        when.method(GET)
            .path_contains("/api/track/v1/details/")
            .header("Authorization", "Bearer token-abc");
        then.status(404).body(r#"{"response":{"errors":[{"code":"151044"}]}}"#);
    });

    let client = UpsClient::with_token(&carrier_config(&server), "token-abc")?;
    let err = client
        .get_tracking_details(&RequestContext::background(), "../../../secret")
        .await
        .unwrap_err();

    secret_mock.assert_hits(0);
    details_mock.assert_hits(1);
    assert!(matches!(err, LabelError::StatusError { status: 404, .. }));
    Ok(())
}
