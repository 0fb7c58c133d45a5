//! Checkout: validation, all-or-nothing commit and concurrent buyers.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use kicks_integration_tests::TestContext;

#[tokio::test]
async fn test_purchase_success() {
    let ctx = TestContext::new().await;
    let token = ctx.logged_in_user("buyer").await;
    let item = ctx.seed_item("Air Force 1", 5).await;

    let response = ctx
        .post_json(
            "/transaction",
            &json!([{"itemId": item.id.as_i64(), "quantity": 2}]),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());

    let body = response.json();
    assert_eq!(body["message"], "Purchase successful!");
    assert_eq!(body["confirmationCode"].as_str().unwrap().len(), 64);
    assert_eq!(ctx.availability(item.id).await, 3);
    assert_eq!(ctx.order_line_count().await, 1);
}

#[tokio::test]
async fn test_purchase_exact_remaining_stock() {
    let ctx = TestContext::new().await;
    let token = ctx.logged_in_user("buyer").await;
    let item = ctx.seed_item("Dunk Low", 2).await;

    let response = ctx
        .post_json(
            "/transaction",
            &json!([{"itemId": item.id.as_i64(), "quantity": 2}]),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ctx.availability(item.id).await, 0);
}

#[tokio::test]
async fn test_insufficient_stock_leaves_state_unchanged() {
    let ctx = TestContext::new().await;
    let token = ctx.logged_in_user("buyer").await;
    let item = ctx.seed_item("Samba", 1).await;

    let response = ctx
        .post_json(
            "/transaction",
            &json!([{"itemId": item.id.as_i64(), "quantity": 2}]),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Item not in stock.");
    assert_eq!(ctx.availability(item.id).await, 1);
    assert_eq!(ctx.order_line_count().await, 0);
}

#[tokio::test]
async fn test_failing_later_line_commits_nothing() {
    let ctx = TestContext::new().await;
    let token = ctx.logged_in_user("buyer").await;
    let a = ctx.seed_item("Gazelle", 5).await;
    let b = ctx.seed_item("Forum Low", 0).await;

    let response = ctx
        .post_json(
            "/transaction",
            &json!([
                {"itemId": a.id.as_i64(), "quantity": 1},
                {"itemId": b.id.as_i64(), "quantity": 1},
            ]),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Item not in stock.");
    assert_eq!(ctx.availability(a.id).await, 5);
    assert_eq!(ctx.availability(b.id).await, 0);
    assert_eq!(ctx.order_line_count().await, 0);
}

#[tokio::test]
async fn test_repeated_item_lines_are_summed() {
    let ctx = TestContext::new().await;
    let token = ctx.logged_in_user("buyer").await;
    let item = ctx.seed_item("Superstar", 3).await;

    let response = ctx
        .post_json(
            "/transaction",
            &json!([
                {"itemId": item.id.as_i64(), "quantity": 2},
                {"itemId": item.id.as_i64(), "quantity": 2},
            ]),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(ctx.availability(item.id).await, 3);
}

#[tokio::test]
async fn test_unknown_item() {
    let ctx = TestContext::new().await;
    let token = ctx.logged_in_user("buyer").await;

    let response = ctx
        .post_json("/transaction", &json!([{"itemId": 4242, "quantity": 1}]), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Item not found.");
}

#[tokio::test]
async fn test_requires_session() {
    let ctx = TestContext::new().await;
    let item = ctx.seed_item("Old Skool", 4).await;
    let order = json!([{"itemId": item.id.as_i64(), "quantity": 1}]);

    let response = ctx.post_json("/transaction", &order, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "You must be logged in.");

    let stale = "ffffffffffffffffffffffffffffffff";
    let response = ctx.post_json("/transaction", &order, Some(stale)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    assert_eq!(ctx.availability(item.id).await, 4);
}

#[tokio::test]
async fn test_invalid_order_bodies() {
    let ctx = TestContext::new().await;
    let token = ctx.logged_in_user("buyer").await;
    let item = ctx.seed_item("Chuck 70", 4).await;

    for body in [
        json!([{"itemId": item.id.as_i64(), "quantity": 0}]),
        json!([{"itemId": item.id.as_i64(), "quantity": -3}]),
        json!([{"itemId": item.id.as_i64()}]),
        json!({"itemId": item.id.as_i64(), "quantity": 1}),
    ] {
        let response = ctx.post_json("/transaction", &body, Some(&token)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "body: {body}");
    }

    let response = ctx.post_json("/transaction", &json!([]), Some(&token)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Order must contain at least one item.");

    assert_eq!(ctx.availability(item.id).await, 4);
    assert_eq!(ctx.order_line_count().await, 0);
}

#[tokio::test]
async fn test_concurrent_buyers_of_last_unit() {
    let ctx = TestContext::with_file_database().await;
    let item = ctx.seed_item("Jordan 1", 1).await;

    let a = ctx.logged_in_user("first").await;
    let b = ctx.logged_in_user("second").await;
    let c = ctx.logged_in_user("third").await;
    let d = ctx.logged_in_user("fourth").await;

    let order = json!([{"itemId": item.id.as_i64(), "quantity": 1}]);
    let (ra, rb, rc, rd) = tokio::join!(
        ctx.post_json("/transaction", &order, Some(&a)),
        ctx.post_json("/transaction", &order, Some(&b)),
        ctx.post_json("/transaction", &order, Some(&c)),
        ctx.post_json("/transaction", &order, Some(&d)),
    );
    let responses = [ra, rb, rc, rd];

    let winners = responses
        .iter()
        .filter(|r| r.status == StatusCode::OK)
        .count();
    assert_eq!(winners, 1);
    for response in responses.iter().filter(|r| r.status != StatusCode::OK) {
        assert!(
            matches!(
                response.status,
                StatusCode::BAD_REQUEST | StatusCode::CONFLICT
            ),
            "unexpected status {}",
            response.status
        );
    }

    assert_eq!(ctx.availability(item.id).await, 0);
    assert_eq!(ctx.order_line_count().await, 1);
}
