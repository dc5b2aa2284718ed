#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use http_body_util::BodyExt;
use pms_admin::config::{AuthSettings, BackendSettings, SessionSettings};
use pms_admin::services::{auth_client::AuthClient, backend_client::BackendClient};
use pms_admin::startup::build_router;
use pms_admin::AppState;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse";

/// A request the mock upstream received.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub path: String,
    pub cookie: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<Captured>>>,
    permissions: Arc<HashMap<&'static str, Value>>,
}

/// In-process stand-in for both the PMS backend and the authentication provider.
pub struct MockUpstream {
    pub url: String,
    state: MockState,
}

impl MockUpstream {
    pub async fn spawn() -> Self {
        let state = MockState {
            requests: Arc::default(),
            permissions: Arc::new(session_permissions()),
        };

        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<Captured> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            url: self.url.clone(),
            session_cookie: "session_token".to_string(),
            request_timeout_secs: 5,
        }
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            url: self.url.clone(),
            session_cookie: "session_token".to_string(),
            request_timeout_secs: 5,
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(
            Arc::new(AuthClient::new(self.auth_settings()).unwrap()),
            Arc::new(BackendClient::new(self.backend_settings()).unwrap()),
        )
    }

    pub fn router(&self) -> Router {
        build_router(self.app_state(), &SessionSettings::default())
    }
}

fn session_permissions() -> HashMap<&'static str, Value> {
    HashMap::from([
        (
            "tok-admin",
            json!({ "role": "admin", "groupId": null, "groupName": null, "menus": [] }),
        ),
        (
            "tok-clerk",
            json!({
                "role": "user",
                "groupId": "g-1",
                "groupName": "Front Desk",
                "menus": [
                    {
                        "main_menu": "Team",
                        "sub_menu": [
                            { "menu_name": "Users", "url": "/team/users",
                              "permissions": { "add": true, "change": false, "delete": false } }
                        ]
                    },
                    {
                        "main_menu": "Billing",
                        "sub_menu": [
                            { "menu_name": "Plans", "url": "/billing/plans",
                              "permissions": { "add": false, "change": false, "delete": false } }
                        ]
                    }
                ]
            }),
        ),
    ])
}

fn accounts(email: &str) -> Option<(&'static str, Value)> {
    match email {
        "admin@hotel.test" => Some((
            "tok-admin",
            json!({ "id": "u-admin", "name": "Admin", "email": email, "role": "admin" }),
        )),
        "clerk@hotel.test" => Some((
            "tok-clerk",
            json!({ "id": "u-clerk", "name": "Clerk", "email": email, "role": "user", "groupId": "g-1" }),
        )),
        "nobody@hotel.test" => Some((
            "tok-nobody",
            json!({ "id": "u-nobody", "name": "", "email": email, "role": "user" }),
        )),
        _ => None,
    }
}

fn list(resource: &str) -> Option<Value> {
    let data = match resource {
        "plans" => json!([
            { "id": "p-1", "fromRooms": 1, "toRooms": 10, "ratePerRoom": 59.99,
              "createdAt": "2026-01-05T10:00:00Z" }
        ]),
        "users" => json!([
            { "id": "u-clerk", "name": "Clerk", "email": "clerk@hotel.test",
              "role": "user", "groupId": "g-1" }
        ]),
        "groups" => json!([
            {
                "id": "g-1",
                "name": "Front Desk",
                "description": "Reception staff",
                "userCount": 3,
                "permissions": [
                    { "mainMenu": "Team", "subMenu": "Users", "url": "/team/users",
                      "canAdd": true, "canChange": false, "canDelete": false },
                    { "mainMenu": "Legacy", "subMenu": "Archive", "url": "/legacy",
                      "canAdd": false, "canChange": true, "canDelete": false }
                ]
            }
        ]),
        _ => return None,
    };
    Some(json!({ "data": data }))
}

fn with_id(body: &Value, id: &str) -> Value {
    let mut body = body.clone();
    if let Some(object) = body.as_object_mut() {
        object.insert("id".to_string(), json!(id));
    }
    body
}

fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn token(cookie: Option<&str>) -> Option<&str> {
    cookie?
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix("session_token="))
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.requests.lock().unwrap().push(Captured {
        method: method.clone(),
        path: uri.path().to_string(),
        cookie: cookie.clone(),
        body: body.clone(),
    });

    let segments: Vec<&str> = uri.path().trim_start_matches('/').split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("POST", ["api", "auth", "sign-in", "email"]) => {
            let email = body["email"].as_str().unwrap_or_default();
            match accounts(email) {
                Some((token, user)) if body["password"] == PASSWORD => {
                    Json(json!({ "token": token, "user": user })).into_response()
                }
                _ => message(StatusCode::UNAUTHORIZED, "Invalid credentials"),
            }
        }
        ("POST", ["api", "auth", "sign-out"]) => StatusCode::OK.into_response(),
        ("GET", ["api", "me", "permissions"]) => {
            match token(cookie.as_deref()).and_then(|t| state.permissions.get(t)) {
                Some(permissions) => Json(permissions.clone()).into_response(),
                None => message(StatusCode::UNAUTHORIZED, "Unauthorized"),
            }
        }
        ("GET", ["api", resource]) => match list(resource) {
            Some(envelope) => Json(envelope).into_response(),
            None => message(StatusCode::NOT_FOUND, "Not found"),
        },
        ("POST", ["api", "plans", "bulk-delete"]) => StatusCode::NO_CONTENT.into_response(),
        ("POST", ["api", _]) => (StatusCode::CREATED, Json(with_id(&body, "new-1"))).into_response(),
        (_, ["api", _, "missing"]) => message(StatusCode::NOT_FOUND, "Plan not found"),
        (_, ["api", _, "boom"]) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        ("PUT", ["api", _, id]) => Json(with_id(&body, id)).into_response(),
        ("DELETE", ["api", _, _]) => StatusCode::NO_CONTENT.into_response(),
        _ => message(StatusCode::NOT_FOUND, "Not found"),
    }
}

/// Sign in through the BFF. Returns the status, the session cookie and the JSON body.
pub async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Option<String>, Value) {
    login_in_session(app, None, email, password).await
}

/// Sign in on a browser that already holds `cookie`.
pub async fn login_in_session(
    app: &Router,
    cookie: Option<&str>,
    email: &str,
    password: &str,
) -> (StatusCode, Option<String>, Value) {
    let mut request = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }

    let response = app
        .clone()
        .oneshot(
            request
                .body(Body::from(format!("email={}&password={}", email, password)))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let body = json_body(response).await;
    (status, cookie, body)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    let body = match body {
        Some(body) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    app.clone().oneshot(request.body(body).unwrap()).await.unwrap()
}

pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = send(app, method, uri, cookie, body).await;
    let status = response.status();
    (status, json_body(response).await)
}

pub async fn text_body(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}
