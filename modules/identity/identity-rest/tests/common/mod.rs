#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! In-memory Keystone v2 admin API behind the `Transport` seam.
//!
//! Users and tenants are kept sorted by id and paged with the last id as the
//! marker; role listings page by offset. Every request is recorded.

use async_trait::async_trait;
use identity_rest::{IdentityClient, IdentityClientConfig};
use ksc_http::{ApiRequest, ApiResponse, Method, StatusCode, Transport, TransportError};
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type FailureRule = Box<dyn Fn(&ApiRequest) -> Option<Failure> + Send + Sync>;

/// Injected outcome replacing the normal answer.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Status(u16),
    Timeout,
}

#[derive(Default)]
struct State {
    users: BTreeMap<String, Value>,
    tenants: BTreeMap<String, Value>,
    /// Global role listing per user; may repeat a role granted on several tenants.
    user_roles: HashMap<String, Vec<Value>>,
    grants: HashMap<(String, String), Vec<Value>>,
    next_id: u64,
    stuck_marker: Option<String>,
}

pub struct FakeKeystone {
    max_page: usize,
    state: Mutex<State>,
    requests: Mutex<Vec<ApiRequest>>,
    failure: Mutex<Option<FailureRule>>,
}

impl FakeKeystone {
    /// Server that never returns more than `max_page` items per response.
    pub fn new(max_page: usize) -> Arc<Self> {
        Arc::new(Self {
            max_page: max_page.max(1),
            state: Mutex::new(State::default()),
            requests: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        })
    }

    pub fn client(self: &Arc<Self>, page_size: Option<u32>) -> IdentityClient {
        let config = IdentityClientConfig {
            page_size,
            ..Default::default()
        };
        IdentityClient::new(self.clone(), &config)
    }

    pub fn add_user(&self, id: &str, name: &str) {
        self.state.lock().unwrap().users.insert(
            id.to_owned(),
            json!({
                "id": id,
                "name": name,
                "email": format!("{name}@example.com"),
                "enabled": true,
                "tenantId": null
            }),
        );
    }

    pub fn add_tenant(&self, id: &str, name: &str) {
        self.state.lock().unwrap().tenants.insert(
            id.to_owned(),
            json!({
                "id": id,
                "name": name,
                "description": format!("{name} tenant"),
                "enabled": true
            }),
        );
    }

    /// Grant `role` to the user on the tenant; also shows up in the user's
    /// global listing.
    pub fn grant(&self, user_id: &str, tenant_id: &str, role_id: &str, role_name: &str) {
        let role = json!({"id": role_id, "name": role_name});
        self.grant_raw(user_id, tenant_id, role);
    }

    /// Grant an arbitrary role document, e.g. one without an id.
    pub fn grant_raw(&self, user_id: &str, tenant_id: &str, role: Value) {
        let mut state = self.state.lock().unwrap();
        state
            .user_roles
            .entry(user_id.to_owned())
            .or_default()
            .push(role.clone());
        state
            .grants
            .entry((user_id.to_owned(), tenant_id.to_owned()))
            .or_default()
            .push(role);
    }

    /// Seed `count` users named `user-NNN`.
    pub fn seed_users(&self, count: usize) {
        for n in 0..count {
            self.add_user(&format!("u{n:03}"), &format!("user-{n:03}"));
        }
    }

    /// Every list response will advertise this marker as next.
    pub fn stick_marker(&self, marker: &str) {
        self.state.lock().unwrap().stuck_marker = Some(marker.to_owned());
    }

    pub fn fail_when<F>(&self, rule: F)
    where
        F: Fn(&ApiRequest) -> Option<Failure> + Send + Sync + 'static,
    {
        *self.failure.lock().unwrap() = Some(Box::new(rule));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// GET requests whose path is exactly `path` (segments joined by `/`).
    pub fn gets_of(&self, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == Method::GET && r.path.join("/") == path)
            .collect()
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }

    fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let path: Vec<&str> = request.path.iter().map(String::as_str).collect();
        let mut state = self.state.lock().unwrap();
        let stuck = state.stuck_marker.clone();

        match (request.method.clone(), path.as_slice()) {
            (Method::GET, ["users"]) => match request.query_param("name") {
                Some(name) => find_by_name(&state.users, name, "user"),
                None => {
                    self.page(&collect(&state.users), "users", request, stuck.as_deref(), true)
                }
            },
            (Method::GET, ["users", id]) => entity(state.users.get(*id), "user"),
            (Method::POST, ["users"]) => {
                let id = next_id(&mut state, "u-new");
                create(&mut state.users, &id, request, "user")
            }
            (Method::PUT, ["users", id]) => match state.users.get_mut(*id) {
                Some(user) => {
                    let changes = request.body.as_ref().and_then(|b| b.get("user")).cloned();
                    if let (Some(Value::Object(fields)), Value::Object(target)) =
                        (changes, &mut *user)
                    {
                        target.extend(fields);
                    }
                    ok(json!({"user": user.clone()}))
                }
                None => not_found(),
            },
            (Method::DELETE, ["users", id]) => remove(&mut state.users, id),
            (Method::GET, ["users", id, "roles"]) => {
                if !state.users.contains_key(*id) {
                    return not_found();
                }
                let roles = state.user_roles.get(*id).cloned().unwrap_or_default();
                self.page(&roles, "roles", request, stuck.as_deref(), false)
            }
            (Method::GET, ["tenants"]) => match request.query_param("name") {
                Some(name) => find_by_name(&state.tenants, name, "tenant"),
                None => {
                    let tenants = collect(&state.tenants);
                    self.page(&tenants, "tenants", request, stuck.as_deref(), true)
                }
            },
            (Method::GET, ["tenants", id]) => entity(state.tenants.get(*id), "tenant"),
            (Method::POST, ["tenants"]) => {
                let id = next_id(&mut state, "t-new");
                create(&mut state.tenants, &id, request, "tenant")
            }
            (Method::DELETE, ["tenants", id]) => remove(&mut state.tenants, id),
            (Method::GET, ["tenants", tenant_id, "users", user_id, "roles"]) => {
                if !state.tenants.contains_key(*tenant_id) || !state.users.contains_key(*user_id) {
                    return not_found();
                }
                let roles = state
                    .grants
                    .get(&((*user_id).to_owned(), (*tenant_id).to_owned()))
                    .cloned()
                    .unwrap_or_default();
                self.page(&roles, "roles", request, stuck.as_deref(), false)
            }
            _ => not_found(),
        }
    }

    /// One page of `items`; `by_id` selects last-id markers over offsets.
    fn page(
        &self,
        items: &[Value],
        key: &str,
        request: &ApiRequest,
        stuck: Option<&str>,
        by_id: bool,
    ) -> ApiResponse {
        let start = match request.query_param("marker") {
            None => 0,
            Some(marker) if by_id => items
                .iter()
                .position(|item| id_of(item) > marker)
                .unwrap_or(items.len()),
            Some(marker) => match marker.parse::<usize>() {
                Ok(offset) => offset.min(items.len()),
                Err(_) => return status(StatusCode::BAD_REQUEST, "invalid marker"),
            },
        };
        let limit = request
            .query_param("limit")
            .and_then(|l| l.parse::<usize>().ok())
            .map_or(self.max_page, |l| l.clamp(1, self.max_page));
        let end = (start + limit).min(items.len());

        let mut body = json!({ key: items[start..end].to_vec() });
        let next = match stuck {
            Some(marker) => Some(marker.to_owned()),
            None if end < items.len() => Some(if by_id {
                id_of(&items[end - 1]).to_owned()
            } else {
                end.to_string()
            }),
            None => None,
        };
        if let Some(marker) = next {
            let marker: String = url::form_urlencoded::byte_serialize(marker.as_bytes()).collect();
            let base = format!("http://keystone.test/v2.0/{}", request.path.join("/"));
            body[format!("{key}_links")] = json!([
                {"rel": "self", "href": base},
                {"rel": "next", "href": format!("{base}?limit={limit}&marker={marker}")}
            ]);
        }
        ok(body)
    }
}

#[async_trait]
impl Transport for FakeKeystone {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        let failure = self.failure.lock().unwrap().as_ref().and_then(|rule| rule(&request));
        match failure {
            Some(Failure::Status(code)) => {
                let code = StatusCode::from_u16(code).unwrap();
                Ok(status(code, "injected failure"))
            }
            Some(Failure::Timeout) => Err(TransportError::Timeout(Duration::from_secs(1))),
            None => Ok(self.handle(&request)),
        }
    }
}

fn collect(map: &BTreeMap<String, Value>) -> Vec<Value> {
    map.values().cloned().collect()
}

fn id_of(item: &Value) -> &str {
    item.get("id").and_then(Value::as_str).unwrap_or_default()
}

fn next_id(state: &mut State, prefix: &str) -> String {
    state.next_id += 1;
    format!("{prefix}-{:04}", state.next_id)
}

fn ok(body: Value) -> ApiResponse {
    ApiResponse::json_value(StatusCode::OK, &body)
}

fn status(code: StatusCode, message: &str) -> ApiResponse {
    ApiResponse::json_value(code, &json!({"error": {"code": code.as_u16(), "message": message}}))
}

fn not_found() -> ApiResponse {
    status(StatusCode::NOT_FOUND, "Could not find resource")
}

fn entity(found: Option<&Value>, key: &str) -> ApiResponse {
    match found {
        Some(value) => ok(json!({ key: value })),
        None => not_found(),
    }
}

fn find_by_name(map: &BTreeMap<String, Value>, name: &str, key: &str) -> ApiResponse {
    entity(map.values().find(|v| v.get("name") == Some(&json!(name))), key)
}

fn create(
    map: &mut BTreeMap<String, Value>,
    id: &str,
    request: &ApiRequest,
    key: &str,
) -> ApiResponse {
    let body = request.body.as_ref().and_then(|b| b.get(key)).cloned();
    let Some(Value::Object(mut fields)) = body else {
        return status(StatusCode::BAD_REQUEST, "missing entity");
    };
    let name = fields.get("name").cloned().unwrap_or(Value::Null);
    if map.values().any(|v| v.get("name") == Some(&name)) {
        return status(StatusCode::CONFLICT, "name already taken");
    }
    fields.remove("password");
    fields.insert("id".to_owned(), json!(id));
    let value = Value::Object(fields);
    map.insert(id.to_owned(), value.clone());
    ok(json!({ key: value }))
}

fn remove(map: &mut BTreeMap<String, Value>, id: &str) -> ApiResponse {
    match map.remove(id) {
        Some(_) => ApiResponse::new(StatusCode::NO_CONTENT, ""),
        None => not_found(),
    }
}
