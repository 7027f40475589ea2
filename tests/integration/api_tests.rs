//! API integration tests
//!
//! These run against a live server backed by PostgreSQL.

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Suffix that keeps fixtures of different runs apart
fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{} {}", prefix, nanos)
}

async fn post(client: &Client, path: &str, body: Value) -> Value {
    let response = client
        .post(format!("{}{}", BASE_URL, path))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201, "POST {}", path);
    response.json().await.expect("Failed to parse response")
}

async fn get(client: &Client, path: &str) -> (u16, Value) {
    let response = client
        .get(format!("{}{}", BASE_URL, path))
        .send()
        .await
        .expect("Failed to send request");

    let status = response.status().as_u16();
    let body = response.json().await.expect("Failed to parse response");
    (status, body)
}

async fn create_author(client: &Client, last_name: &str) -> i64 {
    let body = post(
        client,
        "/authors",
        json!({ "first_name": "Test", "last_name": last_name }),
    )
    .await;
    body["id"].as_i64().expect("No id in response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let (status, body) = get(&client, "/health").await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let (status, body) = get(&client, "/ready").await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_publisher_name_ilike() {
    let client = Client::new();
    let name = unique("Ilike Press");
    let created = post(&client, "/publishers", json!({ "name": name })).await;
    assert!(created["id"].is_number());

    let needle = name.to_lowercase().replace(' ', "%20");
    let (status, body) = get(&client, &format!("/publishers?name__ilike={}", needle)).await;

    assert_eq!(status, 200);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["name"], name);
    assert!(body["items"][0]["books"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn test_book_year_range_filters() {
    let client = Client::new();
    let title = unique("Range");
    let author = create_author(&client, &unique("Range")).await;
    for year in [1990, 1995, 2000] {
        post(
            &client,
            "/books",
            json!({ "title": format!("{} {}", title, year), "year": year, "author_ids": [author] }),
        )
        .await;
    }

    let path = format!("/authors/{}/books?year__gte=1995&year__lt=2000", author);
    let (status, body) = get(&client, &path).await;

    assert_eq!(status, 200);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["year"], 1995);
    assert_eq!(body["items"][0]["authors"][0]["id"], author);
}

#[tokio::test]
#[ignore]
async fn test_sort_by_relation_rejected() {
    let client = Client::new();

    let (status, body) = get(&client, "/authors?order_by=books").await;

    assert_eq!(status, 422);
    assert_eq!(body["detail"][0]["msg"], "You can't sort by: books.");
}

#[tokio::test]
#[ignore]
async fn test_create_book_with_missing_authors() {
    let client = Client::new();
    let author = create_author(&client, &unique("Present")).await;
    let title = unique("Orphan");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({ "title": title, "year": 2001, "author_ids": [author, 987654321] }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["detail"][0]["msg"], "No such author: [987654321].");

    // Nothing was persisted
    let path = format!("/books?title__ilike={}", title.replace(' ', "%20"));
    let (_, body) = get(&client, &path).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
#[ignore]
async fn test_patch_keeps_unspecified_fields() {
    let client = Client::new();
    let created = post(
        &client,
        "/authors",
        json!({ "first_name": "Ada", "last_name": unique("Patch"), "middle_name": "Mary" }),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let patched: Value = client
        .patch(format!("{}/authors/{}", BASE_URL, id))
        .json(&json!({ "first_name": "Augusta" }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(patched["first_name"], "Augusta");
    assert_eq!(patched["middle_name"], "Mary");
    assert_eq!(patched["last_name"], created["last_name"]);

    // PUT replaces everything, clearing the omitted middle name
    let replaced: Value = client
        .put(format!("{}/authors/{}", BASE_URL, id))
        .json(&json!({ "first_name": "Ada", "last_name": "Lovelace" }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(replaced["last_name"], "Lovelace");
    assert!(replaced["middle_name"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_delete_missing_book() {
    let client = Client::new();

    let response = client
        .delete(format!("{}/books/987654321", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["detail"][0]["msg"], "No such book.");
    assert_eq!(body["detail"][0]["type"], "not_found.book");
}

#[tokio::test]
#[ignore]
async fn test_delete_publisher_detaches_books() {
    let client = Client::new();
    let publisher = post(&client, "/publishers", json!({ "name": unique("Closing") })).await;
    let publisher_id = publisher["id"].as_i64().unwrap();
    let author = create_author(&client, &unique("Detached")).await;
    let book = post(
        &client,
        "/books",
        json!({
            "title": unique("Detached"),
            "year": 1999,
            "publisher_id": publisher_id,
            "author_ids": [author]
        }),
    )
    .await;

    let response = client
        .delete(format!("{}/publishers/{}", BASE_URL, publisher_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let (status, body) = get(&client, &format!("/books/{}", book["id"])).await;
    assert_eq!(status, 200);
    assert!(body["publisher_id"].is_null());
    assert!(body["publisher"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_pagination_second_page() {
    let client = Client::new();
    let publisher = post(&client, "/publishers", json!({ "name": unique("Paging") })).await;
    let publisher_id = publisher["id"].as_i64().unwrap();
    let author = create_author(&client, &unique("Paging")).await;

    let mut ids = Vec::new();
    for n in 1..=5 {
        let book = post(
            &client,
            "/books",
            json!({
                "title": format!("Paged {}", n),
                "year": 2000 + n,
                "publisher_id": publisher_id,
                "author_ids": [author]
            }),
        )
        .await;
        ids.push(book["id"].as_i64().unwrap());
    }

    let path = format!("/publishers/{}/books?page=2&size=2", publisher_id);
    let (status, body) = get(&client, &path).await;

    assert_eq!(status, 200);
    assert_eq!(body["total"], 5);
    assert_eq!(body["pages"], 3);
    assert_eq!(body["page"], 2);
    let items: Vec<i64> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect();
    assert_eq!(items, vec![ids[2], ids[3]]);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_replacements_do_not_interleave() {
    let client = Client::new();
    let first = create_author(&client, &unique("First")).await;
    let second = create_author(&client, &unique("Second")).await;
    let book = post(
        &client,
        "/books",
        json!({ "title": unique("Contested"), "year": 2010, "author_ids": [first] }),
    )
    .await;
    let url = format!("{}/books/{}", BASE_URL, book["id"]);

    let left = client
        .put(&url)
        .json(&json!({ "title": "Left", "year": 2011, "author_ids": [first] }))
        .send();
    let right = client
        .put(&url)
        .json(&json!({ "title": "Right", "year": 2012, "author_ids": [second] }))
        .send();
    let (left, right) = tokio::join!(left, right);
    assert_eq!(left.expect("Failed to send request").status(), 200);
    assert_eq!(right.expect("Failed to send request").status(), 200);

    let (_, body) = get(&client, &format!("/books/{}", book["id"])).await;
    let authors: Vec<i64> = body["authors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|author| author["id"].as_i64().unwrap())
        .collect();
    match body["title"].as_str().unwrap() {
        "Left" => {
            assert_eq!(body["year"], 2011);
            assert_eq!(authors, vec![first]);
        }
        "Right" => {
            assert_eq!(body["year"], 2012);
            assert_eq!(authors, vec![second]);
        }
        other => panic!("unexpected title {}", other),
    }
}

#[tokio::test]
#[ignore]
async fn test_publisher_books_are_scoped_and_filtered() {
    let client = Client::new();
    let publisher = post(&client, "/publishers", json!({ "name": unique("Scoped") })).await;
    let other = post(&client, "/publishers", json!({ "name": unique("Elsewhere") })).await;
    let author = create_author(&client, &unique("Scoped")).await;
    for (title, year, publisher_id) in [
        ("Scoped Early", 1980, &publisher["id"]),
        ("Scoped Late", 2020, &publisher["id"]),
        ("Scoped Foreign", 2020, &other["id"]),
    ] {
        post(
            &client,
            "/books",
            json!({
                "title": title,
                "year": year,
                "publisher_id": publisher_id,
                "author_ids": [author]
            }),
        )
        .await;
    }

    let (status, body) = get(&client, &format!("/publishers/{}/books", publisher["id"])).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 2);
    for item in body["items"].as_array().unwrap() {
        assert_eq!(item["publisher_id"], publisher["id"]);
        assert_eq!(item["publisher"]["id"], publisher["id"]);
    }

    let path = format!("/publishers/{}/books?year__gte=2000", publisher["id"]);
    let (status, body) = get(&client, &path).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["title"], "Scoped Late");

    let (status, body) = get(&client, "/publishers/987654321/books").await;
    assert_eq!(status, 404);
    assert_eq!(body["detail"][0]["msg"], "No such publisher.");
}

#[tokio::test]
#[ignore]
async fn test_author_books_are_scoped() {
    let client = Client::new();
    let author = create_author(&client, &unique("Prolific")).await;
    let stranger = create_author(&client, &unique("Stranger")).await;
    let mine = post(
        &client,
        "/books",
        json!({ "title": unique("Mine"), "year": 2001, "author_ids": [author, stranger] }),
    )
    .await;
    post(
        &client,
        "/books",
        json!({ "title": unique("Theirs"), "year": 2002, "author_ids": [stranger] }),
    )
    .await;

    let (status, body) = get(&client, &format!("/authors/{}/books", author)).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], mine["id"]);

    let (status, body) = get(&client, "/authors/987654321/books").await;
    assert_eq!(status, 404);
    assert_eq!(body["detail"][0]["msg"], "No such author.");
}

#[tokio::test]
#[ignore]
async fn test_book_authors_are_scoped_and_filtered() {
    let client = Client::new();
    let kept = unique("Kept");
    let first = create_author(&client, &kept).await;
    let second = create_author(&client, &unique("Other")).await;
    let outsider = create_author(&client, &unique("Outsider")).await;
    let book = post(
        &client,
        "/books",
        json!({ "title": unique("Coauthored"), "year": 2003, "author_ids": [first, second] }),
    )
    .await;

    let (status, body) = get(&client, &format!("/books/{}/authors", book["id"])).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 2);
    let ids: Vec<i64> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![first, second]);
    assert!(!ids.contains(&outsider));

    let needle = kept.to_lowercase().replace(' ', "%20");
    let path = format!("/books/{}/authors?last_name__ilike={}", book["id"], needle);
    let (status, body) = get(&client, &path).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], first);

    let (status, body) = get(&client, "/books/987654321/authors").await;
    assert_eq!(status, 404);
    assert_eq!(body["detail"][0]["msg"], "No such book.");
}

#[tokio::test]
#[ignore]
async fn test_patch_book_replaces_author_set() {
    let client = Client::new();
    let first = create_author(&client, &unique("Before")).await;
    let second = create_author(&client, &unique("After")).await;
    let book = post(
        &client,
        "/books",
        json!({ "title": unique("Reassigned"), "year": 2004, "author_ids": [first] }),
    )
    .await;
    let url = format!("{}/books/{}", BASE_URL, book["id"]);

    let response = client
        .patch(&url)
        .json(&json!({ "author_ids": [second] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["title"], book["title"]);
    assert_eq!(body["authors"].as_array().unwrap().len(), 1);
    assert_eq!(body["authors"][0]["id"], second);

    // A missing author fails the whole update
    let response = client
        .patch(&url)
        .json(&json!({ "title": "Never Saved", "author_ids": [first, 987654321] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["detail"][0]["msg"], "No such author: [987654321].");

    let (_, body) = get(&client, &format!("/books/{}", book["id"])).await;
    assert_eq!(body["title"], book["title"]);
    assert_eq!(body["authors"][0]["id"], second);
    assert_eq!(body["authors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_publisher_delete_races_book_patch() {
    let client = Client::new();
    let author = create_author(&client, &unique("Racing")).await;

    for _ in 0..20 {
        let publisher = post(&client, "/publishers", json!({ "name": unique("Racing") })).await;
        let book = post(
            &client,
            "/books",
            json!({
                "title": unique("Racing"),
                "year": 2005,
                "publisher_id": publisher["id"],
                "author_ids": [author]
            }),
        )
        .await;

        let delete = client
            .delete(format!("{}/publishers/{}", BASE_URL, publisher["id"]))
            .send();
        let patch = client
            .patch(format!("{}/books/{}", BASE_URL, book["id"]))
            .json(&json!({ "title": "Renamed" }))
            .send();
        let (delete, patch) = tokio::join!(delete, patch);

        assert_eq!(delete.expect("Failed to send request").status(), 200);
        // The patch either lands first or finds the publisher gone
        let status = patch.expect("Failed to send request").status().as_u16();
        assert!(status == 200 || status == 404, "unexpected status {}", status);

        let (_, body) = get(&client, &format!("/books/{}", book["id"])).await;
        assert!(body["publisher_id"].is_null());
    }
}
