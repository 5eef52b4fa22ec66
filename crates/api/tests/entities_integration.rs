//! Entity storage tests against a real PostgreSQL database.
//!
//! Set `TEST_DATABASE_URL` to run these; without it every test returns
//! early. Each test removes the entities it creates.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use common::{create_test_app, create_test_pool, empty_request, json_request, parse_response_body};
use domain::models::GeoLocation;
use domain::services::{EntityStore, StoreError};
use fake::{faker::address::en::CityName, Fake};
use persistence::repositories::EntityRepository;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use tower::ServiceExt;
use uuid::Uuid;

async fn test_repository() -> Option<EntityRepository> {
    create_test_pool()
        .await
        .map(|pool| EntityRepository::new(pool).with_timeout(Duration::from_secs(10)))
}

#[tokio::test]
async fn test_register_then_get_has_no_location() {
    let Some(repo) = test_repository().await else {
        return;
    };

    let city: String = CityName().fake();
    let entity_id = assert_ok!(repo.register_entity(json!({ "city": city })).await);

    let entity = assert_ok!(repo.get_entity(entity_id).await);
    assert_eq!(entity.entity_id, entity_id);
    assert_eq!(entity.meta["city"], city.as_str());
    assert!(entity.location.is_none());
    assert!(entity.last_updated.is_none());

    assert_eq!(assert_ok!(repo.delete_entity(entity_id).await), 1);
}

#[tokio::test]
async fn test_register_rejects_non_object_meta() {
    let Some(repo) = test_repository().await else {
        return;
    };

    let err = assert_err!(repo.register_entity(json!("truck")).await);
    assert!(matches!(err, StoreError::InvalidMetadata(_)));
}

#[tokio::test]
async fn test_get_unknown_entity_is_not_found() {
    let Some(repo) = test_repository().await else {
        return;
    };

    let missing = Uuid::new_v4();
    let err = assert_err!(repo.get_entity(missing).await);
    assert!(matches!(err, StoreError::NotFound(id) if id == missing));
}

#[tokio::test]
async fn test_set_location_updates_timestamp() {
    let Some(repo) = test_repository().await else {
        return;
    };

    let entity_id = assert_ok!(repo.register_entity(json!({})).await);
    let before = chrono::Utc::now() - chrono::Duration::seconds(1);

    let first = assert_ok!(
        repo.set_entity_location(entity_id, GeoLocation::new(51.5, -0.12))
            .await
    );
    assert!(first >= before);

    let second = assert_ok!(
        repo.set_entity_location(entity_id, GeoLocation::new(-33.86, 151.2))
            .await
    );
    assert!(second >= first);

    let entity = assert_ok!(repo.get_entity(entity_id).await);
    assert_eq!(entity.location, Some(GeoLocation::new(-33.86, 151.2)));
    assert!(entity.last_updated.is_some());

    assert_ok!(repo.delete_entity(entity_id).await);
}

#[tokio::test]
async fn test_set_location_returns_stored_timestamp() {
    let Some(repo) = test_repository().await else {
        return;
    };

    let entity_id = assert_ok!(repo.register_entity(json!({})).await);

    for _ in 0..20 {
        let before = chrono::Utc::now();
        let returned = assert_ok!(
            repo.set_entity_location(entity_id, GeoLocation::new(1.0, 2.0))
                .await
        );
        let stored = assert_ok!(repo.get_entity(entity_id).await).last_updated;
        assert_eq!(stored, Some(returned));
        assert!(returned >= before);
    }

    assert_ok!(repo.delete_entity(entity_id).await);
}

#[tokio::test]
async fn test_malformed_location_is_skipped_in_listing() {
    let Some(repo) = test_repository().await else {
        return;
    };

    let good = assert_ok!(repo.register_entity(json!({"name": "good"})).await);
    let bad = assert_ok!(repo.register_entity(json!({"name": "bad"})).await);
    assert_ok!(
        repo.set_entity_location(good, GeoLocation::new(10.0, 20.0))
            .await
    );

    sqlx::query(r#"UPDATE locations SET location = '{"lat":"x"}'::jsonb WHERE entity_id = $1"#)
        .bind(bad)
        .execute(repo.pool())
        .await
        .unwrap();

    let entities = assert_ok!(repo.get_entities().await);
    let ids: Vec<Uuid> = entities.iter().map(|e| e.entity_id).collect();
    assert!(ids.contains(&good));
    assert!(!ids.contains(&bad));

    let err = assert_err!(repo.get_entity(bad).await);
    assert!(matches!(err, StoreError::MalformedLocation { entity_id, .. } if entity_id == bad));

    assert_ok!(repo.delete_entity(good).await);
    assert_ok!(repo.delete_entity(bad).await);
}

#[tokio::test]
async fn test_set_location_rejects_out_of_range() {
    let Some(repo) = test_repository().await else {
        return;
    };

    let entity_id = assert_ok!(repo.register_entity(json!({})).await);

    let err = assert_err!(
        repo.set_entity_location(entity_id, GeoLocation::new(90.0001, 0.0))
            .await
    );
    assert!(matches!(err, StoreError::InvalidLocation { .. }));

    let entity = assert_ok!(repo.get_entity(entity_id).await);
    assert!(entity.location.is_none());

    assert_ok!(repo.delete_entity(entity_id).await);
}

#[tokio::test]
async fn test_set_location_unknown_entity_is_not_found() {
    let Some(repo) = test_repository().await else {
        return;
    };

    let err = assert_err!(
        repo.set_entity_location(Uuid::new_v4(), GeoLocation::new(0.0, 0.0))
            .await
    );
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_removes_entity_and_location() {
    let Some(repo) = test_repository().await else {
        return;
    };

    let entity_id = assert_ok!(repo.register_entity(json!({"name": "truck-1"})).await);
    assert_ok!(
        repo.set_entity_location(entity_id, GeoLocation::new(10.0, 20.0))
            .await
    );

    assert_eq!(assert_ok!(repo.delete_entity(entity_id).await), 1);
    assert!(matches!(
        repo.get_entity(entity_id).await,
        Err(StoreError::NotFound(_))
    ));

    let orphans: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM locations WHERE entity_id = $1")
            .bind(entity_id)
            .fetch_one(repo.pool())
            .await
            .unwrap();
    assert_eq!(orphans, 0);

    assert_eq!(assert_ok!(repo.delete_entity(entity_id).await), 0);
}

#[tokio::test]
async fn test_get_entities_includes_registered() {
    let Some(repo) = test_repository().await else {
        return;
    };

    let first = assert_ok!(repo.register_entity(json!({"n": 1})).await);
    let second = assert_ok!(repo.register_entity(json!({"n": 2})).await);

    let entities = assert_ok!(repo.get_entities().await);
    let ids: Vec<Uuid> = entities.iter().map(|e| e.entity_id).collect();
    assert!(ids.contains(&first));
    assert!(ids.contains(&second));
    assert!(ids.windows(2).all(|w| w[0] <= w[1]));

    assert_ok!(repo.delete_entity(first).await);
    assert_ok!(repo.delete_entity(second).await);
}

#[tokio::test]
async fn test_ping() {
    let Some(repo) = test_repository().await else {
        return;
    };
    assert_ok!(repo.ping().await);
}

#[tokio::test]
async fn test_end_to_end_over_http() {
    let Some(repo) = test_repository().await else {
        return;
    };
    let store: Arc<dyn EntityStore> = Arc::new(repo);

    let response = create_test_app(store.clone())
        .oneshot(json_request(
            Method::POST,
            "/geoprowler/entities/new",
            json!({"meta": {"name": "truck-1"}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    let entity_id = body["entity_id"].as_str().unwrap().to_string();

    let response = create_test_app(store.clone())
        .oneshot(json_request(
            Method::PUT,
            &format!("/geoprowler/location/{}", entity_id),
            json!({"latitude": 51.5, "longitude": -0.12}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = create_test_app(store.clone())
        .oneshot(empty_request(
            Method::GET,
            &format!("/geoprowler/entities/{}", entity_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["entity"]["meta"], json!({"name": "truck-1"}));
    assert_eq!(
        body["entity"]["location"],
        json!({"latitude": 51.5, "longitude": -0.12})
    );
    assert!(body["entity"]["last_updated"].is_string());

    let response = create_test_app(store.clone())
        .oneshot(empty_request(
            Method::DELETE,
            &format!("/geoprowler/entities/{}", entity_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = create_test_app(store)
        .oneshot(empty_request(
            Method::GET,
            &format!("/geoprowler/entities/{}", entity_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
