// Integration tests for the HTTP control surface

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use camcorder::{
    create_router, AppState, CaptureSessionController, ControllerConfig, SimulatedConfig,
    SimulatedPlatform, SimulatedProbe,
};
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    probe: SimulatedProbe,
    _temp_dir: TempDir,
    _library_dir: TempDir,
}

fn test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let library_dir = TempDir::new().unwrap();

    let config = ControllerConfig {
        temp_dir: temp_dir.path().to_path_buf(),
        ..ControllerConfig::default()
    };
    let (platform, probe) = SimulatedPlatform::new(SimulatedConfig::phone(library_dir.path()));
    let (controller, events) = CaptureSessionController::spawn(platform, config);
    controller.check_authorization();

    TestApp {
        router: create_router(AppState::new(controller, events)),
        probe,
        _temp_dir: temp_dir,
        _library_dir: library_dir,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Poll `/ui` until the folded flags satisfy `ready`
async fn wait_for_ui(router: &Router, ready: impl Fn(&Value) -> bool) -> Value {
    for _ in 0..50 {
        let (status, body) = send(router, get("/ui")).await;
        assert_eq!(status, StatusCode::OK);
        if ready(&body) {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("UI state never settled");
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app();

    let response = app.router.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_session_snapshot() {
    let app = test_app();

    let (status, body) = send(&app.router, get("/session")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["config_state"], "success");
    assert_eq!(body["authorization"], "authorized");
    assert_eq!(body["active_device"], "back-dual-wide");
    assert_eq!(body["is_recording"], false);
}

#[tokio::test]
async fn test_start_and_toggle_recording() {
    let app = test_app();

    let (status, body) = send(&app.router, post("/session/start")).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, json!({"operation": "start_session", "status": "queued"}));

    let (status, _) = send(&app.router, post("/recording/toggle")).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (_, body) = send(&app.router, get("/session")).await;
    assert_eq!(body["is_session_running"], true);
    assert_eq!(body["is_recording"], true);
    assert!(app.probe.is_recording());
}

#[tokio::test]
async fn test_focus_rejects_point_outside_unit_square() {
    let app = test_app();

    let (status, body) = send(&app.router, post_json("/focus", json!({"x": 1.5, "y": 0.5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("outside"));

    let (status, _) = send(&app.router, post_json("/focus", json!({"x": 0.5, "y": 0.5}))).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    send(&app.router, get("/session")).await;
    assert_eq!(app.probe.device_changes().len(), 1);
}

#[tokio::test]
async fn test_orientation_updates_preview() {
    let app = test_app();

    let (status, _) = send(
        &app.router,
        post_json("/orientation", json!({"orientation": "landscape_left"})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (_, body) = send(&app.router, get("/session")).await;
    assert_eq!(body["preview_orientation"], "landscape_left");
}

#[tokio::test]
async fn test_ui_flags_follow_controller_events() {
    let app = test_app();

    let (_, body) = send(&app.router, get("/ui")).await;
    assert_eq!(body["recording_enabled"], false);
    assert_eq!(body["is_recording"], false);

    send(&app.router, post("/session/start")).await;
    let body = wait_for_ui(&app.router, |ui| ui["recording_enabled"] == true).await;
    assert_eq!(body["camera_switching_enabled"], true);
    assert_eq!(body["is_recording"], false);

    send(&app.router, post("/recording/toggle")).await;
    let body = wait_for_ui(&app.router, |ui| ui["is_recording"] == true).await;
    assert_eq!(body["recording_enabled"], true);
    assert_eq!(body["camera_switching_enabled"], false, "No switching while recording");

    send(&app.router, post("/recording/toggle")).await;
    let body = wait_for_ui(&app.router, |ui| ui["is_recording"] == false).await;
    assert_eq!(body["recording_enabled"], true);
    assert_eq!(body["camera_switching_enabled"], true);
}
