//! Shared helpers for unit and HTTP tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use rand::{rngs::StdRng, SeedableRng};
use serde_json::Value;
use tower::ServiceExt;

use crate::{
    auth,
    config::Config,
    db::{MemoryStore, Store},
    models::{NewQuestion, User, QUESTION_LEVELS},
    routes, AppState,
};

pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// A valid question whose correct answer is "<text> right"
pub fn new_question(text: &str, level: i32) -> NewQuestion {
    NewQuestion::from_answers(
        text,
        level,
        [
            format!("{text} right"),
            format!("{text} wrong 1"),
            format!("{text} wrong 2"),
            format!("{text} wrong 3"),
        ],
    )
}

/// Store `per_level` questions for every level
pub async fn seed_questions(store: &dyn Store, per_level: usize) {
    for level in QUESTION_LEVELS {
        for n in 0..per_level {
            store
                .create_question(&new_question(&format!("Question {n} of level {level}"), level))
                .await
                .unwrap();
        }
    }
}

pub mod fixtures {
    use chrono::{DateTime, Utc};

    use super::seeded_rng;
    use crate::{
        game::GameSession,
        models::{Question, QUESTION_LEVELS},
    };

    /// One question per level, ids matching `level + 1`
    pub fn questions() -> Vec<Question> {
        QUESTION_LEVELS
            .map(|level| Question {
                id: i64::from(level) + 1,
                text: format!("Question of level {level}"),
                level,
                answer1: format!("Right {level}"),
                answer2: format!("Wrong {level}.1"),
                answer3: format!("Wrong {level}.2"),
                answer4: format!("Wrong {level}.3"),
            })
            .collect()
    }

    pub fn session(user_id: i64, now: DateTime<Utc>) -> GameSession {
        GameSession::start(user_id, questions(), now, &mut seeded_rng()).unwrap()
    }
}

/// Router over an in-memory store
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: Arc<AppState>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        seed_questions(&*store, 2).await;
        let state = Arc::new(AppState {
            config: Config::for_tests(),
            store: store.clone(),
        });
        Self { store, state }
    }

    fn router(&self) -> Router {
        routes::create_routes().with_state(self.state.clone())
    }

    pub async fn user(&self, name: &str) -> User {
        self.store.create_user(name, false).await.unwrap()
    }

    pub async fn admin(&self, name: &str) -> User {
        self.store.create_user(name, true).await.unwrap()
    }

    pub fn token_for(&self, user: &User) -> String {
        let security = &self.state.config.security;
        auth::generate_token(user.id, &user.name, &security.jwt_secret, security.token_ttl_hours)
            .unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router().oneshot(request).await.unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse {
            status,
            location,
            body,
        }
    }
}
