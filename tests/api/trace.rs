use std::collections::HashMap;

use uuid::Uuid;

use crate::helpers::TestApp;

#[tokio::test]
async fn every_response_carries_a_trace_id_header() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app
        .post_subscription(HashMap::from([("email", "frank@test.com")]))
        .await;

    let trace_id = response
        .headers()
        .get("x-trace-id")
        .expect("Missing x-trace-id response header.")
        .to_str()
        .expect("x-trace-id header is not valid text.");

    // A generated trace id is a UUID v4
    assert!(Uuid::parse_str(trace_id).is_ok());
}

#[tokio::test]
async fn a_supplied_trace_id_is_echoed_back() {
    let test_app = TestApp::spawn_app().await;
    let client = reqwest::Client::new();
    let url = format!("{}/subscriptions", test_app.address);

    let response = client
        .post(&url)
        .header("x-trace-id", "trace-from-the-caller")
        .json(&HashMap::from([("email", "frank@test.com")]))
        .send()
        .await
        .expect("Failed to execute request.");

    let trace_id = response
        .headers()
        .get("x-trace-id")
        .expect("Missing x-trace-id response header.")
        .to_str()
        .expect("x-trace-id header is not valid text.");

    assert_eq!("trace-from-the-caller", trace_id);
}

#[tokio::test]
async fn failed_requests_carry_the_trace_id_header_too() {
    let test_app = TestApp::spawn_app().await;
    let client = reqwest::Client::new();
    let url = format!("{}/subscriptions", test_app.address);

    let response = client
        .post(&url)
        .header("x-trace-id", "trace-for-a-rejection")
        .json(&HashMap::from([("email", "not-an-email")]))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    assert_eq!(
        "trace-for-a-rejection",
        response
            .headers()
            .get("x-trace-id")
            .expect("Missing x-trace-id response header.")
            .to_str()
            .expect("x-trace-id header is not valid text.")
    );
}
