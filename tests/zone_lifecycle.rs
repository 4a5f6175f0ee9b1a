use panop::config::ApiConfig;
use panop::db::init_memory_db;
use panop::db::state_repo::{self, ResourceKind};
use panop::panop::HttpTransport;
use panop::{ApiError, NewZone, Session, StateError, ZoneLister, ZoneReconciler};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "test-access-key";

fn transport_for(server: &MockServer) -> HttpTransport {
    let config = ApiConfig {
        host: server.uri(),
        skip_tls_verify: false,
        access_key: KEY.into(),
    };
    HttpTransport::new(&config).unwrap()
}

#[tokio::test]
async fn create_then_read_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/zones"))
        .and(header("authorization", format!("Bearer {KEY}").as_str()))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"zone_name": "example.com"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "zone_id": 41,
            "zone_name": "example.com",
            "zone_type": "dns",
            "validated": false,
            "token": "verify-41"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/zones"))
        .and(header("authorization", format!("Bearer {KEY}").as_str()))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 40, "zone_name": "other.org", "zone_type": "dns", "token": "x", "tenant_id": 1},
            {"id": 41, "zone_name": "example.com", "zone_type": "dns", "token": "verify-41", "tenant_id": 1}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let zones = ZoneReconciler::new(&transport);

    let created = zones.create(&NewZone::new("example.com")).await.unwrap();
    assert_eq!(created.id, 41);

    let read = zones.read(&created).await.unwrap().unwrap();
    assert_eq!(read.name, "example.com");
    assert!(read.token.as_deref().is_some_and(|t| !t.is_empty()));
    assert_eq!(read.tenant_id, Some(1));
}

#[tokio::test]
async fn create_server_error_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/zones"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let err = ZoneReconciler::new(&transport)
        .create(&NewZone::new("example.com"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert!(err.to_string().contains("create zone"));
}

#[tokio::test]
async fn deleting_twice_surfaces_remote_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/zones/41"))
        .and(header("authorization", format!("Bearer {KEY}").as_str()))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/zones/41"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let zones = ZoneReconciler::new(&transport);
    let zone = zones.import("41").unwrap();

    zones.delete(&zone).await.unwrap();
    let err = zones.delete(&zone).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn malformed_listing_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let err = ZoneLister::new(&transport).list().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { op: "list zones", .. }));
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    let config = ApiConfig {
        host: "http://127.0.0.1:1".into(),
        skip_tls_verify: false,
        access_key: KEY.into(),
    };

    let transport = HttpTransport::new(&config).unwrap();
    let err = ZoneLister::new(&transport).list().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { op: "list zones", .. }));
}

#[tokio::test]
async fn session_tracks_zone_across_its_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/zones"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "zone_id": 8, "zone_name": "example.com", "zone_type": "domain", "token": "tok"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/zones/8"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/zones/8"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let session = Session::new(transport_for(&server), init_memory_db().await.unwrap());
    let desired = NewZone::new("example.com");

    let created = session.create_zone("main", &desired).await.unwrap();
    assert_eq!(session.update_zone("main", &desired).await.unwrap(), created);

    let err = session.delete_zone("main").await.unwrap_err();
    match err {
        StateError::Api(api) => assert_eq!(api.status(), Some(StatusCode::INTERNAL_SERVER_ERROR)),
        other => panic!("unexpected error: {other}"),
    }
    let kept = state_repo::find(&session.db, ResourceKind::Zone, "main")
        .await
        .unwrap();
    assert_eq!(kept.map(|row| row.remote_id), Some(8));

    session.delete_zone("main").await.unwrap();
    assert!(state_repo::list(&session.db, None).await.unwrap().is_empty());
}
