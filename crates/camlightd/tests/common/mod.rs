//! Fake Elgato Key Light serving `/elgato/lights` on 127.0.0.1.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde_json::json;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct FakeLight {
    /// Every PUT body received, in arrival order
    pub puts: Arc<Mutex<Vec<Value>>>,

    /// The single light's current state, updated by PUTs
    pub state: Arc<Mutex<Value>>,

    /// Status for every response
    pub status: StatusCode,

    /// Sent instead of JSON when set
    pub raw_body: Option<&'static str>,

    /// Delay before answering
    pub delay: Duration,
}

impl Default for FakeLight {
    fn default() -> Self {
        Self {
            puts: Arc::default(),
            state: Arc::new(Mutex::new(json!({
                "on": 0,
                "brightness": 40,
                "temperature": 222,
            }))),
            status: StatusCode::OK,
            raw_body: None,
            delay: Duration::ZERO,
        }
    }
}

impl FakeLight {
    pub fn puts(&self) -> Vec<Value> {
        self.puts.lock().unwrap().clone()
    }

    /// Serve on an ephemeral port, returning the port
    pub async fn start(&self) -> u16 {
        let app = Router::new()
            .route("/elgato/lights", get(get_lights).put(put_lights))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        port
    }

    fn respond(&self) -> Response {
        if let Some(body) = self.raw_body {
            return (self.status, body).into_response();
        }
        let state = self.state.lock().unwrap().clone();
        let body = json!({ "numberOfLights": 1, "lights": [state] });
        (self.status, Json(body)).into_response()
    }
}

async fn get_lights(State(light): State<FakeLight>) -> Response {
    tokio::time::sleep(light.delay).await;
    light.respond()
}

async fn put_lights(State(light): State<FakeLight>, Json(body): Json<Value>) -> Response {
    tokio::time::sleep(light.delay).await;
    light.puts.lock().unwrap().push(body.clone());

    if let Some(Value::Object(fields)) = body["lights"].get(0) {
        let mut state = light.state.lock().unwrap();
        for (key, value) in fields {
            state[key] = value.clone();
        }
    }
    light.respond()
}
