use super::*;
use std::{sync::Arc, time::Duration};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct RecordedRequests {
    bodies: Arc<Mutex<Vec<Value>>>,
    content_types: Arc<Mutex<Vec<String>>>,
}

async fn handle_predict(
    State(recorded): State<RecordedRequests>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    recorded.content_types.lock().await.push(content_type);
    recorded.bodies.lock().await.push(body);
    Json(json!({ "predicted_price": 250000.0 }))
}

async fn spawn_server(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn service_for(api_url: &str) -> HttpPredictionService {
    let settings = ClientSettings::default()
        .with_api_url(api_url)
        .expect("api url");
    HttpPredictionService::new(&settings).expect("http client")
}

fn sample_request() -> PredictionRequest {
    PredictionRequest {
        size: 1500.0,
        bedrooms: 3,
        age: 10,
    }
}

#[tokio::test]
async fn predict_posts_json_payload_and_reads_price() {
    let recorded = RecordedRequests::default();
    let app = Router::new()
        .route("/predict", post(handle_predict))
        .with_state(recorded.clone());
    let api_url = spawn_server(app).await;

    let price = service_for(&format!("{api_url}/"))
        .predict(&sample_request())
        .await
        .expect("predict");

    assert_eq!(price, 250000.0);
    assert_eq!(
        *recorded.bodies.lock().await,
        vec![json!({ "Size": 1500.0, "Bedrooms": 3, "Age": 10 })]
    );
    assert_eq!(
        *recorded.content_types.lock().await,
        vec!["application/json".to_string()]
    );
}

#[tokio::test]
async fn predict_maps_error_status_to_server_error() {
    let app = Router::new().route(
        "/predict",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model exploded") }),
    );
    let api_url = spawn_server(app).await;

    let err = service_for(&api_url)
        .predict(&sample_request())
        .await
        .expect_err("must fail");

    assert_eq!(err, PredictionError::Server { status: 500 });
    assert_eq!(err.to_string(), "API error: 500");
}

#[tokio::test]
async fn predict_reports_unreadable_body_as_shape_error() {
    let app = Router::new().route("/predict", post(|| async { "not json" }));
    let api_url = spawn_server(app).await;

    let err = service_for(&api_url)
        .predict(&sample_request())
        .await
        .expect_err("must fail");

    assert!(matches!(err, PredictionError::Shape(_)), "unexpected: {err:?}");
}

#[tokio::test]
async fn predict_reports_missing_price_as_shape_error() {
    let app = Router::new().route(
        "/predict",
        post(|| async { Json(json!({ "price": 1.0 })) }),
    );
    let api_url = spawn_server(app).await;

    let err = service_for(&api_url)
        .predict(&sample_request())
        .await
        .expect_err("must fail");

    assert!(matches!(err, PredictionError::Shape(_)), "unexpected: {err:?}");
}

#[tokio::test]
async fn predict_reports_unreachable_server_as_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = service_for(&format!("http://{addr}"))
        .predict(&sample_request())
        .await
        .expect_err("must fail");

    assert!(matches!(err, PredictionError::Transport(_)), "unexpected: {err:?}");
}

#[tokio::test]
async fn predict_times_out_on_hung_server() {
    let app = Router::new().route(
        "/predict",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "predicted_price": 1.0 }))
        }),
    );
    let api_url = spawn_server(app).await;
    let settings = ClientSettings {
        request_timeout: Duration::from_millis(200),
        ..ClientSettings::default()
    }
    .with_api_url(&api_url)
    .expect("api url");
    let service = HttpPredictionService::new(&settings).expect("http client");

    let err = service
        .predict(&sample_request())
        .await
        .expect_err("must time out");

    assert!(matches!(err, PredictionError::Transport(_)), "unexpected: {err:?}");
}

#[tokio::test]
async fn model_version_reads_version_field() {
    let app = Router::new().route(
        "/version",
        get(|| async { Json(json!({ "model_version": "v1.2" })) }),
    );
    let api_url = spawn_server(app).await;

    let version = service_for(&api_url)
        .model_version()
        .await
        .expect("version");

    assert_eq!(version, "v1.2");
}

#[tokio::test]
async fn model_version_surfaces_missing_route_as_server_error() {
    let api_url = spawn_server(Router::new()).await;

    let err = service_for(&api_url)
        .model_version()
        .await
        .expect_err("must fail");

    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn reads_health_and_service_info() {
    let app = Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "healthy" })) }))
        .route(
            "/",
            get(|| async {
                Json(json!({
                    "message": "Welcome to the House Price Prediction API!",
                    "model_loaded": true
                }))
            }),
        );
    let api_url = spawn_server(app).await;
    let service = service_for(&api_url);

    let health = service.health().await.expect("health");
    let info = service.service_info().await.expect("info");

    assert_eq!(health.status, "healthy");
    assert!(info.model_loaded);
    assert!(info.message.contains("House Price"));
}
