mod common;

use axum::http::StatusCode;
use common::{MultipartBody, PNG_BYTES, Payload, setup};
use serde_json::json;

#[tokio::test]
async fn test_genre_crud() {
    let t = setup().await;
    let token = t.admin_token().await;

    let id = t.create_genre(&token, "Action").await;

    let response = t.get(&format!("/api/genres/{}", id), Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "id": id, "name": "Action" }));

    let response = t
        .send(
            "PUT",
            &format!("/api/genres/{}", id),
            Some(&token),
            Payload::Json(json!({ "name": "Adventure" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = t.get("/api/genres", Some(&token)).await;
    assert_eq!(response.total_records(), 1);
    assert_eq!(response.json()[0]["name"], "Adventure");

    let response = t
        .send(
            "DELETE",
            &format!("/api/genres/{}", id),
            Some(&token),
            Payload::Empty,
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = t.get(&format!("/api/genres/{}", id), Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = t
        .send(
            "DELETE",
            &format!("/api/genres/{}", id),
            Some(&token),
            Payload::Empty,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_genre_name_rules() {
    let t = setup().await;
    let token = t.admin_token().await;

    let response = t
        .post_json("/api/genres", Some(&token), json!({ "name": "action" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["errors"]["name"][0],
        "The first letter should be uppercase"
    );

    let response = t
        .post_json("/api/genres", Some(&token), json!({ "name": "" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = t
        .post_json(
            "/api/genres",
            Some(&token),
            json!({ "name": format!("A{}", "a".repeat(50)) }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Nothing was stored
    let response = t.get("/api/genres/all", None).await;
    assert!(response.json().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_genre_listing_access() {
    let t = setup().await;
    let user = t.register("ana@movies.test").await;

    assert_eq!(t.get("/api/genres/all", None).await.status, StatusCode::OK);
    assert_eq!(
        t.get("/api/genres", None).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        t.get("/api/genres", Some(&user)).await.status,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_movie_theater_point_round_trip() {
    let t = setup().await;
    let token = t.admin_token().await;

    let response = t
        .post_json(
            "/api/movietheaters",
            Some(&token),
            json!({ "name": "Downtown", "latitude": 10.0, "longitude": 20.0 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.json().as_i64().unwrap();

    let theater = t
        .get(&format!("/api/movietheaters/{}", id), Some(&token))
        .await
        .json();
    assert_eq!(theater["latitude"], 10.0);
    assert_eq!(theater["longitude"], 20.0);

    let response = t
        .send(
            "PUT",
            &format!("/api/movietheaters/{}", id),
            Some(&token),
            Payload::Json(json!({ "name": "Uptown", "latitude": -33.5, "longitude": 151.2 })),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let theaters = t.get("/api/movietheaters", Some(&token)).await.json();
    assert_eq!(theaters[0]["name"], "Uptown");
    assert_eq!(theaters[0]["latitude"], -33.5);
    assert_eq!(theaters[0]["longitude"], 151.2);

    let response = t
        .post_json(
            "/api/movietheaters",
            Some(&token),
            json!({ "name": "Nowhere", "latitude": 100.0, "longitude": 0.0 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["errors"]["latitude"].is_array());

    let response = t
        .send(
            "DELETE",
            &format!("/api/movietheaters/{}", id),
            Some(&token),
            Payload::Empty,
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(
        t.get(&format!("/api/movietheaters/{}", id), Some(&token))
            .await
            .status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_actor_picture_lifecycle() {
    let t = setup().await;
    let token = t.admin_token().await;

    let form = MultipartBody::new()
        .text("name", "Sigourney Weaver")
        .text("dateOfBirth", "1949-10-08")
        .text("biography", "Actress")
        .file("picture", "weaver.png", "image/png", PNG_BYTES);
    let response = t
        .send("POST", "/api/actors", Some(&token), Payload::Multipart(form))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.json().as_i64().unwrap();

    let actor = t
        .get(&format!("/api/actors/{}", id), Some(&token))
        .await
        .json();
    assert_eq!(actor["dateOfBirth"], "1949-10-08");
    let picture = actor["picture"].as_str().unwrap().to_string();
    assert!(picture.starts_with("mock://actors/"));

    // Update without a file keeps the picture
    let form = MultipartBody::new().text("name", "S. Weaver");
    let response = t
        .send(
            "PUT",
            &format!("/api/actors/{}", id),
            Some(&token),
            Payload::Multipart(form),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let actor = t
        .get(&format!("/api/actors/{}", id), Some(&token))
        .await
        .json();
    assert_eq!(actor["name"], "S. Weaver");
    assert_eq!(actor["picture"], picture.as_str());

    // Update with a file replaces it
    let form = MultipartBody::new()
        .text("name", "Sigourney Weaver")
        .file("picture", "new.png", "image/png", PNG_BYTES);
    t.send(
        "PUT",
        &format!("/api/actors/{}", id),
        Some(&token),
        Payload::Multipart(form),
    )
    .await;
    let stored = t.storage.stored();
    assert_eq!(stored.len(), 1);
    assert_ne!(stored[0], picture);

    let response = t
        .send(
            "DELETE",
            &format!("/api/actors/{}", id),
            Some(&token),
            Payload::Empty,
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(t.storage.stored().is_empty());
}

#[tokio::test]
async fn test_failed_actor_writes_leave_no_stray_pictures() {
    let t = setup().await;
    let token = t.admin_token().await;

    let form = MultipartBody::new()
        .text("name", "Sigourney Weaver")
        .file("picture", "weaver.png", "image/png", PNG_BYTES);
    let response = t
        .send("POST", "/api/actors", Some(&token), Payload::Multipart(form))
        .await;
    let id = response.json().as_i64().unwrap();
    let picture = t
        .get(&format!("/api/actors/{}", id), Some(&token))
        .await
        .json()["picture"]
        .as_str()
        .unwrap()
        .to_string();

    t.execute(
        "CREATE TRIGGER freeze_actors_update BEFORE UPDATE ON actors \
         BEGIN SELECT RAISE(ABORT, 'actors are read-only'); END;",
    )
    .await;
    t.execute(
        "CREATE TRIGGER freeze_actors_insert BEFORE INSERT ON actors \
         BEGIN SELECT RAISE(ABORT, 'actors are read-only'); END;",
    )
    .await;

    // A failed update keeps the current picture and drops the new upload
    let form = MultipartBody::new()
        .text("name", "Sigourney Weaver")
        .file("picture", "new.png", "image/png", PNG_BYTES);
    let response = t
        .send(
            "PUT",
            &format!("/api/actors/{}", id),
            Some(&token),
            Payload::Multipart(form),
        )
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let actor = t
        .get(&format!("/api/actors/{}", id), Some(&token))
        .await
        .json();
    assert_eq!(actor["picture"], picture.as_str());
    assert_eq!(t.storage.stored(), vec![picture.clone()]);

    // A failed insert removes the picture it saved
    let form = MultipartBody::new()
        .text("name", "John Hurt")
        .file("picture", "hurt.png", "image/png", PNG_BYTES);
    let response = t
        .send("POST", "/api/actors", Some(&token), Payload::Multipart(form))
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(t.storage.stored(), vec![picture]);
}

#[tokio::test]
async fn test_actor_search_by_name() {
    let t = setup().await;
    let token = t.admin_token().await;

    for name in [
        "Tom Hanks",
        "Tom Cruise",
        "Tom Hardy",
        "Tom Holland",
        "Tom Hiddleston",
        "Tom Selleck",
        "Meryl Streep",
    ] {
        t.create_actor(&token, name).await;
    }

    let response = t
        .post_json("/api/actors/searchByName", Some(&token), json!("Tom"))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<String> = response
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "Tom Cruise",
            "Tom Hanks",
            "Tom Hardy",
            "Tom Hiddleston",
            "Tom Holland"
        ]
    );

    let response = t
        .post_json("/api/actors/searchByName", Some(&token), json!(""))
        .await;
    assert!(response.json().as_array().unwrap().is_empty());

    // Wildcards are literal
    for pattern in ["%", "_"] {
        let response = t
            .post_json("/api/actors/searchByName", Some(&token), json!(pattern))
            .await;
        assert!(response.json().as_array().unwrap().is_empty(), "{}", pattern);
    }

    let response = t.get("/api/actors?recordsPerPage=2", Some(&token)).await;
    assert_eq!(response.total_records(), 7);
    assert_eq!(response.json().as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_health_and_openapi() {
    let t = setup().await;

    let response = t.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["database"], "connected");

    let response = t.get("/api-docs/openapi.json", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json()["paths"]["/api/movies/filter"].is_object());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let t = setup().await;
    let response = t.get("/health", None).await;
    assert!(response.headers.get("x-request-id").is_some());
}
