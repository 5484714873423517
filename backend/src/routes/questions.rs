use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{
    auth::AuthenticatedUser,
    error::{AppError, StoreError, ValidationErrors},
    models::{NewQuestion, Question},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ImportedQuestion {
    pub text: String,
    /// The first answer is the correct one
    pub answers: [String; 4],
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub level: i32,
    pub questions: Vec<ImportedQuestion>,
}

#[derive(Debug, Serialize)]
pub struct RejectedQuestion {
    pub text: String,
    pub errors: ValidationErrors,
}

#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub created: Vec<Question>,
    pub rejected: Vec<RejectedQuestion>,
}

/// Batch upload of questions for one level, admins only
pub async fn import(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ImportRequest>,
) -> Result<Json<ImportReport>, AppError> {
    let is_admin = state
        .store
        .get_user(user.user_id)
        .await?
        .is_some_and(|u| u.is_admin);
    if !is_admin {
        tracing::warn!("User {} tried to import questions", user.user_id);
        return Err(AppError::Forbidden);
    }

    let mut report = ImportReport::default();
    for imported in payload.questions {
        let question =
            NewQuestion::from_answers(imported.text.trim(), payload.level, imported.answers);
        match state.store.create_question(&question).await {
            Ok(stored) => report.created.push(stored),
            Err(StoreError::Validation(errors)) => report.rejected.push(RejectedQuestion {
                text: question.text,
                errors,
            }),
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(
        "User {} imported {} questions for level {} ({} rejected)",
        user.name,
        report.created.len(),
        payload.level,
        report.rejected.len()
    );
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use crate::{db::Store, test_support::TestApp};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    fn batch() -> serde_json::Value {
        json!({
            "level": 3,
            "questions": [
                {"text": "Largest planet?", "answers": ["Jupiter", "Mars", "Venus", "Earth"]},
                {"text": "", "answers": ["a", "b", "c", "d"]},
                {"text": "Question 0 of level 3", "answers": ["a", "b", "c", "d"]}
            ]
        })
    }

    #[tokio::test]
    async fn test_admin_imports_questions() {
        let app = TestApp::new().await;
        let admin = app.admin("Admin").await;
        let before = app.store.count_questions().await.unwrap();

        let response = app
            .send(
                Method::POST,
                "/api/questions",
                Some(&app.token_for(&admin)),
                Some(batch()),
            )
            .await;

        assert_eq!(response.status, StatusCode::OK);
        let created = response.body["created"].as_array().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0]["answer1"], "Jupiter");
        assert_eq!(created[0]["level"], 3);

        let rejected = response.body["rejected"].as_array().unwrap();
        assert_eq!(rejected.len(), 2);
        assert_eq!(
            rejected[0]["errors"][0],
            json!({"field": "text", "message": "can't be blank"})
        );
        assert_eq!(
            rejected[1]["errors"][0],
            json!({"field": "text", "message": "has already been taken"})
        );
        assert_eq!(app.store.count_questions().await.unwrap(), before + 1);
    }

    #[tokio::test]
    async fn test_players_cannot_import() {
        let app = TestApp::new().await;
        let user = app.user("Vadim").await;
        let before = app.store.count_questions().await.unwrap();

        let response = app
            .send(
                Method::POST,
                "/api/questions",
                Some(&app.token_for(&user)),
                Some(batch()),
            )
            .await;

        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(app.store.count_questions().await.unwrap(), before);
    }
}
