use chrono::{DateTime, Utc};

use crate::{
    db::Store,
    error::{GameError, StoreError},
    game::GameSession,
    models::{User, QUESTION_LEVELS},
};

/// Start a new game for `user` with one random question per level.
///
/// Rejected with `GameError::ActiveGameExists` while the user has an
/// unfinished game; nothing is stored in that case.
pub async fn create_game_for_user(
    store: &dyn Store,
    user: &User,
    now: DateTime<Utc>,
) -> Result<GameSession, StoreError> {
    if let Some(active) = store.active_game_id(user.id).await? {
        tracing::warn!(
            "User {} tried to start a game while game {} is unfinished",
            user.id,
            active
        );
        return Err(GameError::ActiveGameExists(active).into());
    }

    let mut questions = Vec::with_capacity(QUESTION_LEVELS.count());
    for level in QUESTION_LEVELS {
        let question = store
            .random_question(level)
            .await?
            .ok_or(GameError::NoQuestionsForLevel(level))?;
        questions.push(question);
    }

    let session = {
        let mut rng = rand::rng();
        GameSession::start(user.id, questions, now, &mut rng)?
    };
    let session = store.insert_game(&session).await?;

    tracing::info!("Created game {} for user {}", session.id(), user.id);
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryStore,
        models::GameStatus,
        test_support::seed_questions,
    };
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_create_game_for_user() {
        let store = MemoryStore::new();
        seed_questions(&store, 4).await;
        let user = store.create_user("Vadim", false).await.unwrap();
        let questions_before = store.count_questions().await.unwrap();

        let game = assert_ok!(create_game_for_user(&store, &user, Utc::now()).await);

        assert_eq!(store.count_games().await.unwrap(), 1);
        assert_eq!(store.count_questions().await.unwrap(), questions_before);
        assert_eq!(game.game.user_id, user.id);
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.questions.len(), 15);
        let levels: Vec<i32> = game.questions.iter().map(|q| q.level()).collect();
        assert_eq!(levels, (0..=14).collect::<Vec<_>>());
        assert!(game.questions.iter().all(|q| q.id > 0));
    }

    #[tokio::test]
    async fn test_second_game_is_rejected() {
        let store = MemoryStore::new();
        seed_questions(&store, 2).await;
        let user = store.create_user("Vadim", false).await.unwrap();
        let first = create_game_for_user(&store, &user, Utc::now())
            .await
            .unwrap();

        let result = create_game_for_user(&store, &user, Utc::now()).await;

        assert!(matches!(
            result,
            Err(StoreError::Game(GameError::ActiveGameExists(id))) if id == first.id()
        ));
        assert_eq!(store.count_games().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_new_game_allowed_after_finishing() {
        let store = MemoryStore::new();
        seed_questions(&store, 2).await;
        let user = store.create_user("Vadim", false).await.unwrap();
        let mut first = create_game_for_user(&store, &user, Utc::now())
            .await
            .unwrap();
        first.take_money(Utc::now()).unwrap();
        store.save_game(&first).await.unwrap();

        assert_ok!(create_game_for_user(&store, &user, Utc::now()).await);
        assert_eq!(store.count_games().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_missing_level_is_reported() {
        let store = MemoryStore::new();
        let user = store.create_user("Vadim", false).await.unwrap();

        let result = create_game_for_user(&store, &user, Utc::now()).await;

        assert!(matches!(
            assert_err!(result),
            StoreError::Game(GameError::NoQuestionsForLevel(0))
        ));
        assert_eq!(store.count_games().await.unwrap(), 0);
    }
}
