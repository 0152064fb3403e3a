//! API integration tests
//!
//! These run against a live server with a seeded database. Seed one
//! admin (admin@school.test / password) and one student
//! (student@school.test / password) before running.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to log in and return a bearer token
async fn get_token(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn admin_token(client: &Client) -> String {
    get_token(client, "admin@school.test", "password").await
}

async fn student_token(client: &Client) -> String {
    get_token(client, "student@school.test", "password").await
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_non_bearer_authorization_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", "Basic YWRtaW46YWRtaW4=")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@school.test",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_me_reflects_login_role() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_catalog_write_requires_admin() {
    let client = Client::new();
    let token = student_token(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Unauthorized Addition",
            "shelf_location": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_new_book_starts_available() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Noli Me Tangere",
            "author": "Jose Rizal",
            "category": "Fiction",
            "shelf_location": 12
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "AVAILABLE");
}

#[tokio::test]
#[ignore]
async fn test_full_loan_lifecycle() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let student = student_token(&client).await;

    // Admin adds a book
    let book: Value = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({
            "title": "Lifecycle Test Book",
            "shelf_location": 3
        }))
        .send()
        .await
        .expect("Failed to create book")
        .json()
        .await
        .expect("Failed to parse book");
    let book_id = book["id"].as_i64().expect("No book id");

    // Student reserves it
    let response = client
        .post(format!("{}/loans/reserve", BASE_URL))
        .bearer_auth(&student)
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to reserve");
    assert_eq!(response.status(), 201);
    let record: Value = response.json().await.expect("Failed to parse record");
    assert_eq!(record["status"], "PENDING");
    let tx_id = record["transaction_id"].as_i64().expect("No transaction id");

    // A second reservation of the same book by the same student is rejected
    let response = client
        .post(format!("{}/loans/reserve", BASE_URL))
        .bearer_auth(&student)
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send duplicate reserve");
    assert_eq!(response.status(), 422);

    // Admin accepts, then hands the book over
    let response = client
        .post(format!("{}/loans/{}/accept", BASE_URL, tx_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to accept");
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/loans/{}/borrow", BASE_URL, tx_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to mark borrowed");
    assert!(response.status().is_success());
    let record: Value = response.json().await.expect("Failed to parse record");
    assert_eq!(record["status"], "BORROWED");

    // The due date is exactly one loan period after the borrow date
    let borrowed_at = chrono::DateTime::parse_from_rfc3339(
        record["date_borrowed"].as_str().expect("No date_borrowed"),
    )
    .expect("Unparseable date_borrowed");
    let due_date =
        chrono::DateTime::parse_from_rfc3339(record["due_date"].as_str().expect("No due_date"))
            .expect("Unparseable due_date");
    assert_eq!(due_date - borrowed_at, chrono::Duration::days(14));

    // The book left the shelf
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to fetch book")
        .json()
        .await
        .expect("Failed to parse book");
    assert_eq!(book["status"], "BORROWED");

    // Return closes the loan and queues the book for shelving
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, tx_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to mark returned");
    assert!(response.status().is_success());
    let record: Value = response.json().await.expect("Failed to parse record");
    assert_eq!(record["status"], "RETURNED");
    assert!(record["date_returned"].is_string());

    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to fetch book")
        .json()
        .await
        .expect("Failed to parse book");
    assert_eq!(book["status"], "PENDING_SHELVING");

    // A closed record cannot be accepted again
    let response = client
        .post(format!("{}/loans/{}/accept", BASE_URL, tx_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send accept");
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_active_reservation_quota() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let student = student_token(&client).await;

    // Six fresh books; with a quota of five the student cannot hold an
    // active record for all of them.
    let mut successes = 0;
    let mut quota_hits = 0;
    for n in 0..6 {
        let book: Value = client
            .post(format!("{}/books", BASE_URL))
            .bearer_auth(&admin)
            .json(&json!({
                "title": format!("Quota Test Book {}", n),
                "shelf_location": 9
            }))
            .send()
            .await
            .expect("Failed to create book")
            .json()
            .await
            .expect("Failed to parse book");

        let response = client
            .post(format!("{}/loans/reserve", BASE_URL))
            .bearer_auth(&student)
            .json(&json!({ "book_id": book["id"] }))
            .send()
            .await
            .expect("Failed to reserve");

        match response.status().as_u16() {
            201 => successes += 1,
            422 => quota_hits += 1,
            other => panic!("Unexpected reserve status {}", other),
        }
    }

    assert!(successes <= 5, "More than five active records accepted");
    assert!(quota_hits >= 1, "Sixth reservation was not rejected");
}

#[tokio::test]
#[ignore]
async fn test_student_cannot_cancel_foreign_reservation() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let student = student_token(&client).await;

    // Board is admin-only; find any pending record owned by someone else
    let board: Value = client
        .get(format!("{}/loans/active", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to fetch board")
        .json()
        .await
        .expect("Failed to parse board");

    let me: Value = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&student)
        .send()
        .await
        .expect("Failed to fetch me")
        .json()
        .await
        .expect("Failed to parse me");
    let my_id = me["school_id"].as_str().expect("No school id");

    let foreign = board
        .as_array()
        .expect("Board is not an array")
        .iter()
        .find(|r| r["status"] == "PENDING" && r["school_id"] != my_id);

    if let Some(record) = foreign {
        let tx_id = record["transaction_id"].as_i64().expect("No transaction id");
        let response = client
            .post(format!("{}/loans/{}/cancel", BASE_URL, tx_id))
            .bearer_auth(&student)
            .send()
            .await
            .expect("Failed to send cancel");
        assert_eq!(response.status(), 403);
    }
}

#[tokio::test]
#[ignore]
async fn test_cancel_is_owner_only() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let student = student_token(&client).await;

    let book: Value = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({
            "title": "Cancel Test Book",
            "shelf_location": 4
        }))
        .send()
        .await
        .expect("Failed to create book")
        .json()
        .await
        .expect("Failed to parse book");

    let record: Value = client
        .post(format!("{}/loans/reserve", BASE_URL))
        .bearer_auth(&student)
        .json(&json!({ "book_id": book["id"] }))
        .send()
        .await
        .expect("Failed to reserve")
        .json()
        .await
        .expect("Failed to parse record");
    let tx_id = record["transaction_id"].as_i64().expect("No transaction id");

    // Librarians refuse through decline; cancel is not theirs to call
    let response = client
        .post(format!("{}/loans/{}/cancel", BASE_URL, tx_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send admin cancel");
    assert_eq!(response.status(), 403);

    // The owning student can withdraw
    let response = client
        .post(format!("{}/loans/{}/cancel", BASE_URL, tx_id))
        .bearer_auth(&student)
        .send()
        .await
        .expect("Failed to send owner cancel");
    assert!(response.status().is_success());
    let record: Value = response.json().await.expect("Failed to parse record");
    assert_eq!(record["status"], "CANCELLED");
}

#[tokio::test]
#[ignore]
async fn test_stats_counts_partition_catalog() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let stats: Value = client
        .get(format!("{}/stats", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to fetch stats")
        .json()
        .await
        .expect("Failed to parse stats");

    let total = stats["total_books"].as_i64().expect("No total");
    let available = stats["available_books"].as_i64().expect("No available");
    let borrowed = stats["borrowed_books"].as_i64().expect("No borrowed");
    let pending = stats["pending_shelving"].as_i64().expect("No pending");

    // Every catalog row lands in exactly one bucket
    assert_eq!(total, available + borrowed + pending);
}

#[tokio::test]
#[ignore]
async fn test_stats_requires_admin() {
    let client = Client::new();
    let token = student_token(&client).await;

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}
