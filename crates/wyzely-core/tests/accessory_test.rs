#![allow(clippy::unwrap_used)]
// End-to-end accessory tests against a mocked cloud API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wyzely_api::models::TokenPair;
use wyzely_api::token_store::TokenStore;
use wyzely_api::{ApiConfig, Credentials, DeviceClient, SessionManager};
use wyzely_core::{
    AccessorySync, Characteristic, CharacteristicSink, CharacteristicValue, ContactSensorSync,
    DeviceSnapshot, LightSync, MeshLightSync, MotionSensorSync,
};

// ── Helpers ─────────────────────────────────────────────────────────

const USERNAME: &str = "tester@example.com";

#[derive(Default)]
struct RecordingSink {
    updates: Mutex<Vec<(Characteristic, CharacteristicValue)>>,
}

impl RecordingSink {
    fn take(&self) -> Vec<(Characteristic, CharacteristicValue)> {
        std::mem::take(&mut *self.updates.lock().unwrap())
    }
}

impl CharacteristicSink for RecordingSink {
    fn update(&self, characteristic: Characteristic, value: CharacteristicValue) {
        self.updates.lock().unwrap().push((characteristic, value));
    }
}

/// A client with a pre-seeded token pair, so tests exercise device
/// traffic without a login exchange.
fn client(server: &MockServer, dir: &TempDir) -> DeviceClient {
    TokenStore::for_account(USERNAME, Some(dir.path())).save(&TokenPair {
        access_token: "at-0".into(),
        refresh_token: "rt-0".into(),
    });

    let url: Url = server.uri().parse().unwrap();
    let config = ApiConfig {
        auth_base_url: url.clone(),
        api_base_url: url,
        token_dir: Some(dir.path().to_path_buf()),
        ..ApiConfig::default()
    };
    let credentials = Credentials {
        username: USERNAME.into(),
        password: SecretString::from("hunter2".to_string()),
        mfa_code: None,
    };
    DeviceClient::new(Arc::new(SessionManager::new(config, credentials).unwrap()))
}

fn mesh_snapshot() -> DeviceSnapshot {
    DeviceSnapshot {
        mac: "MESH01".into(),
        product_model: "WLPA19C".into(),
        product_type: "MeshLight".into(),
        nickname: Some("Desk Bulb".into()),
        device_params: serde_json::Map::new(),
    }
}

fn light_snapshot() -> DeviceSnapshot {
    DeviceSnapshot {
        mac: "BULB01".into(),
        product_model: "WLPA19".into(),
        product_type: "Light".into(),
        nickname: None,
        device_params: serde_json::Map::new(),
    }
}

fn sensor_snapshot(product_type: &str, params: serde_json::Value) -> DeviceSnapshot {
    let serde_json::Value::Object(device_params) = params else {
        panic!("params must be an object");
    };
    DeviceSnapshot {
        mac: "SENSOR01".into(),
        product_model: "DWS3U".into(),
        product_type: product_type.into(),
        nickname: None,
        device_params,
    }
}

fn ok_body(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "code": "1", "msg": "", "data": data }))
}

// ── Mesh light color pairing ────────────────────────────────────────

#[tokio::test]
async fn hue_then_saturation_issues_one_combined_write() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // hsv(120, 100, 100) == 00ff00
    Mock::given(method("POST"))
        .and(path("/app/v2/device/set_property"))
        .and(body_partial_json(json!({
            "device_mac": "MESH01",
            "pid": "P1507",
            "pvalue": "00ff00",
        })))
        .respond_with(ok_body(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let light = MeshLightSync::new(client(&server, &dir), sink, &mesh_snapshot());

    light.set_hue(120.0).await.unwrap();
    light.set_saturation(100.0).await.unwrap();
}

#[tokio::test]
async fn saturation_alone_stays_staged_with_zero_writes() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/app/v2/device/set_property"))
        .respond_with(ok_body(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let light = MeshLightSync::new(client(&server, &dir), sink, &mesh_snapshot());

    light.set_saturation(50.0).await.unwrap();
}

#[tokio::test]
async fn repeating_one_dimension_only_restages_it() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // The second hue value is the one that pairs:
    // hsv(200, 100, 100) == 00aaff
    Mock::given(method("POST"))
        .and(path("/app/v2/device/set_property"))
        .and(body_partial_json(json!({ "pid": "P1507", "pvalue": "00aaff" })))
        .respond_with(ok_body(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let light = MeshLightSync::new(client(&server, &dir), sink, &mesh_snapshot());

    light.set_hue(10.0).await.unwrap();
    light.set_hue(200.0).await.unwrap();
    light.set_saturation(100.0).await.unwrap();
}

#[tokio::test]
async fn failed_combined_write_resets_the_pairing() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // The combined write fails semantically; refresh and login are both
    // rejected, so the ladder surfaces the failure after one attempt.
    Mock::given(method("POST"))
        .and(path("/app/v2/device/set_property"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "code": "2001", "msg": "boom" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/app/user/refresh_token"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/user/login"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let light = MeshLightSync::new(client(&server, &dir), sink, &mesh_snapshot());

    light.set_hue(120.0).await.unwrap();
    assert!(light.set_saturation(100.0).await.is_err());

    // Back to idle: another single-dimension edit stages silently
    // instead of writing (the expect(1) above would trip otherwise).
    light.set_hue(240.0).await.unwrap();
}

#[tokio::test]
async fn remote_color_refreshes_the_pair_edits_stage_against() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/app/v2/device/get_property_list"))
        .respond_with(ok_body(json!({
            "property_list": [{ "pid": "P1507", "value": "00ff00" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The staged hue (240) is superseded by the polled color (hue 120)
    // before the pair completes: hsv(120, 50, 100) == 80ff80
    Mock::given(method("POST"))
        .and(path("/app/v2/device/set_property"))
        .and(body_partial_json(json!({ "pid": "P1507", "pvalue": "80ff80" })))
        .respond_with(ok_body(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let snapshot = mesh_snapshot();
    let light = MeshLightSync::new(client(&server, &dir), Arc::clone(&sink) as _, &snapshot);

    light.set_hue(240.0).await.unwrap();
    light.update_characteristics(&snapshot).await.unwrap();

    let updates = sink.take();
    assert!(updates.contains(&(Characteristic::Hue, CharacteristicValue::Float(120.0))));
    assert!(updates.contains(&(Characteristic::Saturation, CharacteristicValue::Float(100.0))));

    light.set_saturation(50.0).await.unwrap();
}

#[tokio::test]
async fn malformed_remote_color_is_a_logged_no_op() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/app/v2/device/get_property_list"))
        .respond_with(ok_body(json!({
            "property_list": [
                { "pid": "P1507", "value": "not-a-color" },
                { "pid": "P1501", "value": "40" },
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let snapshot = mesh_snapshot();
    let light = MeshLightSync::new(client(&server, &dir), Arc::clone(&sink) as _, &snapshot);

    light.update_characteristics(&snapshot).await.unwrap();

    let updates = sink.take();
    assert!(updates.contains(&(Characteristic::Brightness, CharacteristicValue::Int(40))));
    assert!(
        !updates.iter().any(|(c, _)| *c == Characteristic::Hue),
        "a malformed color must not push a hue update"
    );
}

// ── Light ───────────────────────────────────────────────────────────

#[tokio::test]
async fn light_update_pushes_normalized_values() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/app/v2/device/get_property_list"))
        .and(body_partial_json(json!({
            "device_mac": "BULB01",
            "device_model": "WLPA19",
        })))
        .respond_with(ok_body(json!({
            "property_list": [
                { "pid": "P3", "value": "1" },
                { "pid": "P1501", "value": "75" },
                { "pid": "P1502", "value": "3800" },
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let snapshot = light_snapshot();
    let light = LightSync::new(client(&server, &dir), Arc::clone(&sink) as _, &snapshot);

    light.update_characteristics(&snapshot).await.unwrap();

    let updates = sink.take();
    assert!(updates.contains(&(Characteristic::Power, CharacteristicValue::Bool(true))));
    assert!(updates.contains(&(Characteristic::Brightness, CharacteristicValue::Int(75))));
    // 3800 K in [2700, 6500] lands at 396 on the inverted host scale.
    assert!(updates.contains(&(
        Characteristic::ColorTemperature,
        CharacteristicValue::Int(396)
    )));
}

#[tokio::test]
async fn light_color_temperature_write_converts_to_kelvin() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // Host 320 in [500, 140] is half-cold: 4600 K for a 2700-6500 bulb.
    Mock::given(method("POST"))
        .and(path("/app/v2/device/set_property"))
        .and(body_partial_json(json!({ "pid": "P1502", "pvalue": "4600" })))
        .respond_with(ok_body(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let light = LightSync::new(client(&server, &dir), sink, &light_snapshot())
        .with_debounce(Duration::from_millis(5));

    light.set_color_temperature(320).await.unwrap();
}

#[tokio::test]
async fn debounced_brightness_transmits_only_the_most_recent_value() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/app/v2/device/set_property"))
        .and(body_partial_json(json!({ "pid": "P1501", "pvalue": "80" })))
        .respond_with(ok_body(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let light = LightSync::new(client(&server, &dir), sink, &light_snapshot())
        .with_debounce(Duration::from_millis(25));

    // Both arrive inside one window; the superseded slider position
    // completes without a remote call.
    let (first, second) = tokio::join!(light.set_brightness(10), light.set_brightness(80));
    first.unwrap();
    second.unwrap();
}

// ── Sensors ─────────────────────────────────────────────────────────

#[tokio::test]
async fn contact_sensor_reads_snapshot_and_writes_switch_values() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/app/v2/device/set_property"))
        .and(body_partial_json(json!({
            "device_mac": "SENSOR01",
            "pid": "open_close_state",
            "pvalue": "1",
        })))
        .respond_with(ok_body(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let snapshot = sensor_snapshot("ContactSensor", json!({ "open_close_state": 1 }));
    let sensor = ContactSensorSync::new(client(&server, &dir), Arc::clone(&sink) as _, &snapshot);

    assert!(sensor.info().matches(&snapshot));
    assert!(!sensor.info().matches(&mesh_snapshot()));

    sensor.update_characteristics(&snapshot).await.unwrap();
    assert_eq!(
        sink.take(),
        vec![(Characteristic::ContactState, CharacteristicValue::Bool(true))]
    );

    sensor.set_state(true).await.unwrap();
}

#[tokio::test]
async fn motion_sensor_reports_detection_state() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let sink = Arc::new(RecordingSink::default());
    let snapshot = sensor_snapshot("MotionSensor", json!({ "motion_state": "0" }));
    let sensor = MotionSensorSync::new(client(&server, &dir), Arc::clone(&sink) as _, &snapshot);

    sensor.update_characteristics(&snapshot).await.unwrap();

    assert_eq!(
        sink.take(),
        vec![(
            Characteristic::MotionDetected,
            CharacteristicValue::Bool(false)
        )]
    );
}
