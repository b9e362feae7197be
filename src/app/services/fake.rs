//! 測試用的記憶體後端，同時實作三個 port。

use crate::domain::model::{AuthUser, Session, SignUpOutcome};
use crate::domain::ports::{AuthProvider, ObjectStorage, RequestContext, TableStore, UploadOptions};
use crate::domain::query::Query;
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const FIXED_CREATED_AT: &str = "2025-01-01T12:00:00.000Z";

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<Value>>,
    failing_tables: HashSet<String>,
    users: HashMap<String, (String, AuthUser)>,
    signed_out: Vec<String>,
    passwords: HashMap<String, String>,
    objects: HashMap<String, (bytes::Bytes, UploadOptions)>,
    next_id: i64,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<State>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut state = self.state.lock().unwrap();
        state.next_id = state.next_id.max(rows.len() as i64 + 100);
        state.tables.entry(table.to_string()).or_default().extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        let state = self.state.lock().unwrap();
        state.tables.get(table).cloned().unwrap_or_default()
    }

    pub fn fail_table(&self, table: &str) {
        self.state.lock().unwrap().failing_tables.insert(table.to_string());
    }

    /// 註冊一個可登入的使用者，token 為 `token-{id}`
    pub fn add_user(&self, id: &str, email: &str, password: &str) -> RequestContext {
        let user = AuthUser {
            id: id.to_string(),
            email: Some(email.to_string()),
            user_metadata: json!({}),
        };
        self.state
            .lock()
            .unwrap()
            .users
            .insert(email.to_string(), (password.to_string(), user));
        RequestContext::with_token(format!("token-{}", id))
    }

    pub fn signed_out(&self) -> Vec<String> {
        self.state.lock().unwrap().signed_out.clone()
    }

    pub fn password_of(&self, user_id: &str) -> Option<String> {
        self.state.lock().unwrap().passwords.get(user_id).cloned()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<(bytes::Bytes, UploadOptions)> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(&format!("{}/{}", bucket, key))
            .cloned()
    }

    pub fn object_keys(&self) -> Vec<String> {
        self.state.lock().unwrap().objects.keys().cloned().collect()
    }

    fn user_for(&self, ctx: &RequestContext) -> Option<AuthUser> {
        let token = ctx.access_token()?;
        let state = self.state.lock().unwrap();
        state
            .users
            .values()
            .map(|(_, user)| user)
            .find(|user| format!("token-{}", user.id) == token)
            .cloned()
    }

    fn check_failing(state: &State, table: &str) -> Result<()> {
        if state.failing_tables.contains(table) {
            return Err(SiteError::BackendError {
                status: 500,
                message: format!("relation \"{}\" is unavailable", table),
            });
        }
        Ok(())
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches_filters(row: &Value, query: &Query) -> bool {
    query.filters.iter().all(|(column, expected)| {
        row.get(column)
            .map(|value| value_text(value) == *expected)
            .unwrap_or(false)
    })
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => value_text(x).cmp(&value_text(y)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// 支援 `*, profiles(username, avatar_url)` 這種內嵌寫法
fn embed(state: &State, row: &mut Value, columns: &str) {
    let Some(start) = columns.find("profiles(") else {
        return;
    };
    let Some(end) = columns[start..].find(')') else {
        return;
    };
    let fields: Vec<&str> = columns[start + "profiles(".len()..start + end]
        .split(',')
        .map(str::trim)
        .collect();

    let owner = row.get("user_id").map(value_text);
    let profile = state.tables.get("profiles").and_then(|profiles| {
        profiles
            .iter()
            .find(|p| p.get("id").map(value_text) == owner)
            .map(|p| {
                let picked: Map<String, Value> = fields
                    .iter()
                    .map(|f| (f.to_string(), p.get(*f).cloned().unwrap_or(Value::Null)))
                    .collect();
                Value::Object(picked)
            })
    });

    if let Value::Object(obj) = row {
        obj.insert("profiles".to_string(), profile.unwrap_or(Value::Null));
    }
}

#[async_trait]
impl TableStore for FakeBackend {
    async fn select(&self, _ctx: &RequestContext, query: &Query) -> Result<Vec<Value>> {
        let state = self.state.lock().unwrap();
        Self::check_failing(&state, &query.table)?;

        let mut rows: Vec<Value> = state
            .tables
            .get(&query.table)
            .map(|rows| rows.iter().filter(|row| matches_filters(row, query)).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        for row in rows.iter_mut() {
            embed(&state, row, &query.columns);
        }

        Ok(rows)
    }

    async fn insert(&self, _ctx: &RequestContext, table: &str, rows: Value) -> Result<Vec<Value>> {
        let mut state = self.state.lock().unwrap();
        Self::check_failing(&state, table)?;

        let rows = match rows {
            Value::Array(rows) => rows,
            single => vec![single],
        };

        let mut inserted = Vec::new();
        for mut row in rows {
            state.next_id += 1;
            let next_id = state.next_id;
            if let Value::Object(obj) = &mut row {
                obj.entry("id").or_insert(json!(next_id));
                obj.entry("created_at").or_insert(json!(FIXED_CREATED_AT));
            }
            inserted.push(row);
        }

        state
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn update(
        &self,
        _ctx: &RequestContext,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>> {
        let mut state = self.state.lock().unwrap();
        Self::check_failing(&state, &query.table)?;

        let mut updated = Vec::new();
        if let Some(rows) = state.tables.get_mut(&query.table) {
            for row in rows.iter_mut().filter(|row| matches_filters(row, query)) {
                if let (Value::Object(target), Value::Object(changes)) = (&mut *row, &patch) {
                    for (key, value) in changes {
                        target.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, _ctx: &RequestContext, query: &Query) -> Result<Vec<Value>> {
        let mut state = self.state.lock().unwrap();
        Self::check_failing(&state, &query.table)?;

        let mut deleted = Vec::new();
        if let Some(rows) = state.tables.get_mut(&query.table) {
            let (gone, kept): (Vec<Value>, Vec<Value>) =
                rows.drain(..).partition(|row| matches_filters(row, query));
            *rows = kept;
            deleted = gone;
        }
        Ok(deleted)
    }
}

#[async_trait]
impl AuthProvider for FakeBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let state = self.state.lock().unwrap();
        match state.users.get(email) {
            Some((expected, user)) if expected == password => Ok(Session {
                access_token: format!("token-{}", user.id),
                refresh_token: Some("refresh".to_string()),
                expires_in: Some(3600),
                token_type: Some("bearer".to_string()),
                user: user.clone(),
            }),
            _ => Err(SiteError::BackendError {
                status: 400,
                message: "Invalid login credentials".to_string(),
            }),
        }
    }

    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<SignUpOutcome> {
        let mut state = self.state.lock().unwrap();
        if state.users.contains_key(email) {
            return Err(SiteError::BackendError {
                status: 422,
                message: "User already registered".to_string(),
            });
        }

        state.next_id += 1;
        let user = AuthUser {
            id: format!("user-{}", state.next_id),
            email: Some(email.to_string()),
            user_metadata: metadata,
        };
        state
            .users
            .insert(email.to_string(), (password.to_string(), user.clone()));
        Ok(SignUpOutcome::ConfirmationPending { user })
    }

    async fn sign_out(&self, ctx: &RequestContext) -> Result<()> {
        if let Some(token) = ctx.access_token() {
            self.state.lock().unwrap().signed_out.push(token.to_string());
        }
        Ok(())
    }

    async fn get_user(&self, ctx: &RequestContext) -> Result<Option<AuthUser>> {
        Ok(self.user_for(ctx))
    }

    async fn update_password(&self, ctx: &RequestContext, new_password: &str) -> Result<AuthUser> {
        let user = self.user_for(ctx).ok_or(SiteError::Unauthorized)?;
        self.state
            .lock()
            .unwrap()
            .passwords
            .insert(user.id.clone(), new_password.to_string());
        Ok(user)
    }
}

#[async_trait]
impl ObjectStorage for FakeBackend {
    async fn upload(
        &self,
        _ctx: &RequestContext,
        bucket: &str,
        key: &str,
        body: bytes::Bytes,
        options: &UploadOptions,
    ) -> Result<String> {
        let path = format!("{}/{}", bucket, key);
        let mut state = self.state.lock().unwrap();
        if state.objects.contains_key(&path) && !options.upsert {
            return Err(SiteError::BackendError {
                status: 409,
                message: "The resource already exists".to_string(),
            });
        }
        state.objects.insert(path.clone(), (body, options.clone()));
        Ok(path)
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("https://fake.local/storage/v1/object/public/{}/{}", bucket, key)
    }
}
