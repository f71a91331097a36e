use std::collections::HashMap;

use crate::helpers::TestApp;

#[tokio::test]
async fn update_status_deactivates_and_reactivates_the_listed_rows() {
    let test_app = TestApp::spawn_app().await;

    for email in ["frank@test.com", "maria@test.com"] {
        test_app
            .post_subscription(HashMap::from([("email", email)]))
            .await;
    }

    let response = test_app
        .post_subscriptions_status(serde_json::json!({
            "emails": ["frank@test.com", "maria@test.com"],
            "active": false
        }))
        .await;

    assert_eq!(200, response.status().as_u16());
    assert!(test_app
        .stored_subscriptions()
        .await
        .iter()
        .all(|subscription| !subscription.active));

    let response = test_app
        .post_subscriptions_status(serde_json::json!({
            "emails": ["frank@test.com"],
            "active": true
        }))
        .await;

    assert_eq!(200, response.status().as_u16());

    let subscriptions = test_app.stored_subscriptions().await;

    assert!(subscriptions
        .iter()
        .find(|subscription| subscription.email == "frank@test.com")
        .unwrap()
        .active);
    assert!(!subscriptions
        .iter()
        .find(|subscription| subscription.email == "maria@test.com")
        .unwrap()
        .active);
}

#[tokio::test]
async fn update_status_skips_absent_addresses_without_creating_them() {
    let test_app = TestApp::spawn_app().await;

    test_app
        .post_subscription(HashMap::from([("email", "frank@test.com")]))
        .await;

    let response = test_app
        .post_subscriptions_status(serde_json::json!({
            "emails": ["frank@test.com", "ghost@test.com"],
            "active": false
        }))
        .await;

    assert_eq!(200, response.status().as_u16());

    let subscriptions = test_app.stored_subscriptions().await;

    assert_eq!(1, subscriptions.len());
    assert_eq!("frank@test.com", subscriptions[0].email);
    assert!(!subscriptions[0].active);
}

#[tokio::test]
async fn update_status_returns_400_when_body_is_malformed() {
    let test_app = TestApp::spawn_app().await;

    // This is a common practice and it is called table-driven tests. In this case, it simulates different kind of possible request bodies
    // where API should return 400.
    let test_cases: Vec<(serde_json::Value, &str)> = vec![
        (serde_json::json!({}), "missing body parameters"),
        (
            serde_json::json!({ "emails": ["frank@test.com"] }),
            "missing active parameter",
        ),
        (
            serde_json::json!({ "active": false }),
            "missing emails parameter",
        ),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = test_app.post_subscriptions_status(invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload was {}",
            error_message
        );
    }
}

#[tokio::test]
async fn delete_subscriptions_removes_the_listed_rows() {
    let test_app = TestApp::spawn_app().await;

    for email in ["frank@test.com", "maria@test.com", "keep@test.com"] {
        test_app
            .post_subscription(HashMap::from([("email", email)]))
            .await;
    }

    let response = test_app
        .delete_subscriptions(serde_json::json!({
            "emails": ["frank@test.com", "maria@test.com", "ghost@test.com"]
        }))
        .await;

    assert_eq!(200, response.status().as_u16());

    let subscriptions = test_app.stored_subscriptions().await;

    assert_eq!(1, subscriptions.len());
    assert_eq!("keep@test.com", subscriptions[0].email);
}

#[tokio::test]
async fn delete_domain_subscriptions_removes_exactly_the_matching_rows() {
    let test_app = TestApp::spawn_app().await;

    for email in [
        "user1@bulk.com",
        "user2@bulk.com",
        "user3@keep.com",
        "user4@mail.bulk.com",
        "user5@notbulk.com",
    ] {
        test_app
            .post_subscription(HashMap::from([("email", email)]))
            .await;
    }

    let response = test_app.delete_domain_subscriptions("bulk.com").await;

    assert_eq!(200, response.status().as_u16());

    let remaining: Vec<String> = test_app
        .stored_subscriptions()
        .await
        .into_iter()
        .map(|subscription| subscription.email)
        .collect();

    assert_eq!(
        vec![
            String::from("user3@keep.com"),
            String::from("user5@notbulk.com")
        ],
        remaining
    );
}
