use std::collections::HashMap;

use newsletter_subscriptions::domain::subscription::Subscription;

use crate::helpers::TestApp;

#[tokio::test]
async fn subscribe_returns_201_when_email_is_valid() {
    let test_app = TestApp::spawn_app().await;
    let mut body = HashMap::new();

    body.insert("email", "frank@test.com");

    let response = test_app.post_subscription(body).await;

    assert_eq!(201, response.status().as_u16());
}

#[tokio::test]
async fn subscribe_persists_an_active_subscription() {
    let test_app = TestApp::spawn_app().await;
    let mut body = HashMap::new();

    body.insert("email", "frank@test.com");

    test_app.post_subscription(body).await;

    let subscriptions = test_app.stored_subscriptions().await;

    assert_eq!(1, subscriptions.len());
    assert_eq!("frank@test.com", subscriptions[0].email);
    assert!(subscriptions[0].active);
}

#[tokio::test]
async fn subscribe_returns_400_when_body_is_invalid() {
    let test_app = TestApp::spawn_app().await;

    // This is a common practice and it is called table-driven tests. In this case, it simulates different kind of possible request bodies
    // where API should return 400.
    let test_cases: Vec<(HashMap<&str, &str>, &str)> = vec![
        (HashMap::from([]), "missing email parameter"),
        (
            HashMap::from([("email", "not-an-email")]),
            "email without an @",
        ),
        (HashMap::from([("email", "@test.com")]), "empty local part"),
        (HashMap::from([("email", "frank@")]), "empty domain part"),
        (
            HashMap::from([("email", "frank@test@com")]),
            "more than one @",
        ),
        (
            HashMap::from([("email", "frank@nodot")]),
            "domain without a dot",
        ),
        (
            HashMap::from([("email", "frank@.com")]),
            "domain with an empty segment",
        ),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = test_app.post_subscription(invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload was {}",
            error_message
        );
    }

    assert!(test_app.stored_subscriptions().await.is_empty());
}

#[tokio::test]
async fn subscribing_twice_keeps_a_single_row() {
    let test_app = TestApp::spawn_app().await;

    let first = test_app
        .post_subscription(HashMap::from([("email", "frank@test.com")]))
        .await;
    let second = test_app
        .post_subscription(HashMap::from([("email", "frank@test.com")]))
        .await;

    assert_eq!(201, first.status().as_u16());
    assert_eq!(201, second.status().as_u16());
    assert_eq!(1, test_app.stored_subscriptions().await.len());
}

#[tokio::test]
async fn subscribe_reactivates_a_deactivated_subscription() {
    let test_app = TestApp::spawn_app().await;

    test_app
        .post_subscription(HashMap::from([("email", "frank@test.com")]))
        .await;
    test_app
        .post_subscriptions_status(serde_json::json!({
            "emails": ["frank@test.com"],
            "active": false
        }))
        .await;

    test_app
        .post_subscription(HashMap::from([("email", "frank@test.com")]))
        .await;

    let subscriptions = test_app.stored_subscriptions().await;

    assert_eq!(1, subscriptions.len());
    assert!(subscriptions[0].active);
}

#[tokio::test]
async fn get_subscription_returns_200_for_an_existing_email() {
    let test_app = TestApp::spawn_app().await;

    test_app
        .post_subscription(HashMap::from([("email", "frank@test.com")]))
        .await;

    let response = test_app.get_subscription("frank@test.com").await;

    assert_eq!(200, response.status().as_u16());

    let subscription: Subscription = response
        .json()
        .await
        .expect("Failed to parse the response body.");

    assert_eq!("frank@test.com", subscription.email);
    assert!(subscription.active);
}

#[tokio::test]
async fn get_subscription_returns_404_for_an_absent_email() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.get_subscription("ghost@test.com").await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn list_subscriptions_returns_every_stored_row() {
    let test_app = TestApp::spawn_app().await;

    for user in ["user1", "user2", "user3", "user4", "user5"] {
        let email = format!("{}@testdomain.com", user);

        test_app
            .post_subscription(HashMap::from([("email", email.as_str())]))
            .await;
    }

    let response = test_app.get_subscriptions().await;

    assert_eq!(200, response.status().as_u16());

    let subscriptions: Vec<Subscription> = response
        .json()
        .await
        .expect("Failed to parse the response body.");

    assert_eq!(5, subscriptions.len());
    assert!(subscriptions
        .iter()
        .all(|subscription| subscription.active));
}

#[tokio::test]
async fn list_subscriptions_returns_an_empty_array_when_nothing_is_stored() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.get_subscriptions().await;

    assert_eq!(200, response.status().as_u16());

    let subscriptions: Vec<Subscription> = response
        .json()
        .await
        .expect("Failed to parse the response body.");

    assert!(subscriptions.is_empty());
}

#[tokio::test]
async fn unsubscribe_returns_200_and_removes_the_row() {
    let test_app = TestApp::spawn_app().await;

    test_app
        .post_subscription(HashMap::from([("email", "frank@test.com")]))
        .await;

    let response = test_app.delete_subscription("frank@test.com").await;

    assert_eq!(200, response.status().as_u16());
    assert!(test_app.stored_subscriptions().await.is_empty());
}

#[tokio::test]
async fn unsubscribe_returns_200_for_a_never_subscribed_email() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.delete_subscription("ghost@test.com").await;

    assert_eq!(200, response.status().as_u16());
}
