use sqlx::{types::Json, FromRow, PgConnection, PgPool, Result};
use uuid::Uuid;

use crate::{
    game::GameSession,
    models::{is_slot_permutation, Game, GameQuestion, HelpHash, NewQuestion, Question, User},
};

/// Game question row joined with its question
#[derive(Debug, FromRow)]
struct GameQuestionRecord {
    id: i64,
    game_id: Uuid,
    a: i16,
    b: i16,
    c: i16,
    d: i16,
    help_hash: Json<HelpHash>,
    question_id: i64,
    text: String,
    level: i32,
    answer1: String,
    answer2: String,
    answer3: String,
    answer4: String,
}

impl GameQuestionRecord {
    fn into_game_question(self) -> Result<GameQuestion> {
        let slots = [self.a, self.b, self.c, self.d];
        if !is_slot_permutation(&slots) {
            tracing::error!(
                "Game question {} of game {} has invalid answer slots {:?}",
                self.id,
                self.game_id,
                slots
            );
            return Err(sqlx::Error::Protocol(format!(
                "Invalid answer slots for game question {}",
                self.id
            )));
        }

        Ok(GameQuestion {
            id: self.id,
            game_id: self.game_id,
            question: Question {
                id: self.question_id,
                text: self.text,
                level: self.level,
                answer1: self.answer1,
                answer2: self.answer2,
                answer3: self.answer3,
                answer4: self.answer4,
            },
            slots,
            help_hash: self.help_hash.0,
        })
    }
}

const GAME_COLUMNS: &str = "id, user_id, current_level, is_failed, prize, fifty_fifty_used, \
     audience_help_used, friend_call_used, created_at, finished_at";

// User queries
pub async fn create_user(pool: &PgPool, name: &str, is_admin: bool) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, is_admin)
        VALUES ($1, $2)
        RETURNING id, name, balance, is_admin, created_at
        "#,
    )
    .bind(name)
    .bind(is_admin)
    .fetch_one(pool)
    .await
}

pub async fn get_user(pool: &PgPool, user_id: i64) -> Result<Option<User>> {
    sqlx::query_as::<_, User>(
        "SELECT id, name, balance, is_admin, created_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_users_by_balance(pool: &PgPool, limit: i64) -> Result<Vec<User>> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, balance, is_admin, created_at FROM users
        ORDER BY balance DESC, id
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn credit_user_balance(conn: &mut PgConnection, user_id: i64, amount: i64) -> Result<()> {
    sqlx::query("UPDATE users SET balance = balance + $1 WHERE id = $2")
        .bind(amount)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

// Question queries
pub async fn question_text_taken(pool: &PgPool, text: &str) -> Result<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM questions WHERE text = $1)")
        .bind(text)
        .fetch_one(pool)
        .await
}

pub async fn create_question(pool: &PgPool, question: &NewQuestion) -> Result<Question> {
    sqlx::query_as::<_, Question>(
        r#"
        INSERT INTO questions (text, level, answer1, answer2, answer3, answer4)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, text, level, answer1, answer2, answer3, answer4
        "#,
    )
    .bind(&question.text)
    .bind(question.level)
    .bind(&question.answer1)
    .bind(&question.answer2)
    .bind(&question.answer3)
    .bind(&question.answer4)
    .fetch_one(pool)
    .await
}

pub async fn random_question(pool: &PgPool, level: i32) -> Result<Option<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, text, level, answer1, answer2, answer3, answer4 FROM questions
        WHERE level = $1
        ORDER BY RANDOM()
        LIMIT 1
        "#,
    )
    .bind(level)
    .fetch_optional(pool)
    .await
}

pub async fn count_questions(pool: &PgPool) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await
}

// Game queries
pub async fn active_game_id(pool: &PgPool, user_id: i64) -> Result<Option<Uuid>> {
    sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM games WHERE user_id = $1 AND finished_at IS NULL LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn insert_game(conn: &mut PgConnection, game: &Game) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO games (id, user_id, current_level, is_failed, prize,
                           fifty_fifty_used, audience_help_used, friend_call_used,
                           created_at, finished_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(game.id)
    .bind(game.user_id)
    .bind(game.current_level)
    .bind(game.is_failed)
    .bind(game.prize)
    .bind(game.fifty_fifty_used)
    .bind(game.audience_help_used)
    .bind(game.friend_call_used)
    .bind(game.created_at)
    .bind(game.finished_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Insert a game question and return its id
pub async fn insert_game_question(conn: &mut PgConnection, question: &GameQuestion) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO game_questions (game_id, question_id, a, b, c, d, help_hash)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(question.game_id)
    .bind(question.question.id)
    .bind(question.slots[0])
    .bind(question.slots[1])
    .bind(question.slots[2])
    .bind(question.slots[3])
    .bind(Json(&question.help_hash))
    .fetch_one(conn)
    .await
}

/// Get a game with its questions, only if it belongs to `user_id`
pub async fn find_user_game(
    pool: &PgPool,
    user_id: i64,
    game_id: Uuid,
) -> Result<Option<GameSession>> {
    let game = sqlx::query_as::<_, Game>(&format!(
        "SELECT {GAME_COLUMNS} FROM games WHERE id = $1 AND user_id = $2"
    ))
    .bind(game_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let game = match game {
        Some(g) => g,
        None => return Ok(None),
    };

    let records = sqlx::query_as::<_, GameQuestionRecord>(
        r#"
        SELECT gq.id, gq.game_id, gq.a, gq.b, gq.c, gq.d, gq.help_hash,
               q.id AS question_id, q.text, q.level,
               q.answer1, q.answer2, q.answer3, q.answer4
        FROM game_questions gq
        JOIN questions q ON q.id = gq.question_id
        WHERE gq.game_id = $1
        ORDER BY q.level
        "#,
    )
    .bind(game.id)
    .fetch_all(pool)
    .await?;

    let questions = records
        .into_iter()
        .map(GameQuestionRecord::into_game_question)
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(GameSession { game, questions }))
}

pub async fn list_games_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Game>> {
    sqlx::query_as::<_, Game>(&format!(
        "SELECT {GAME_COLUMNS} FROM games WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn count_games(pool: &PgPool) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM games")
        .fetch_one(pool)
        .await
}

/// Update a game that is still unfinished in the database.
/// Returns false when no unfinished row matched.
pub async fn update_unfinished_game(conn: &mut PgConnection, game: &Game) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE games
        SET current_level = $1,
            is_failed = $2,
            prize = $3,
            fifty_fifty_used = $4,
            audience_help_used = $5,
            friend_call_used = $6,
            finished_at = $7
        WHERE id = $8 AND finished_at IS NULL
        "#,
    )
    .bind(game.current_level)
    .bind(game.is_failed)
    .bind(game.prize)
    .bind(game.fifty_fifty_used)
    .bind(game.audience_help_used)
    .bind(game.friend_call_used)
    .bind(game.finished_at)
    .bind(game.id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn update_help_hash(
    conn: &mut PgConnection,
    game_question_id: i64,
    help_hash: &HelpHash,
) -> Result<()> {
    sqlx::query("UPDATE game_questions SET help_hash = $1 WHERE id = $2")
        .bind(Json(help_hash))
        .bind(game_question_id)
        .execute(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(slots: [i16; 4]) -> GameQuestionRecord {
        GameQuestionRecord {
            id: 10,
            game_id: Uuid::new_v4(),
            a: slots[0],
            b: slots[1],
            c: slots[2],
            d: slots[3],
            help_hash: Json(HelpHash::default()),
            question_id: 3,
            text: "Largest ocean?".into(),
            level: 2,
            answer1: "Pacific".into(),
            answer2: "Atlantic".into(),
            answer3: "Indian".into(),
            answer4: "Arctic".into(),
        }
    }

    #[test]
    fn test_record_converts_to_game_question() {
        let gq = record([3, 1, 2, 4]).into_game_question().unwrap();

        assert_eq!(gq.id, 10);
        assert_eq!(gq.question.id, 3);
        assert_eq!(gq.level(), 2);
        assert_eq!(gq.slots, [3, 1, 2, 4]);
        assert_eq!(gq.correct_answer(), "Pacific");
        assert!(gq.help_hash.is_empty());
    }

    #[test]
    fn test_record_with_broken_slots_is_rejected() {
        let result = record([1, 1, 2, 4]).into_game_question();
        assert!(matches!(result, Err(sqlx::Error::Protocol(_))));
    }

    #[test]
    fn test_help_hash_column_json() {
        let json = serde_json::json!({"fifty_fifty": ["a", "c"]});
        let help: HelpHash = serde_json::from_value(json).unwrap();
        assert_eq!(help.remaining_keys().len(), 2);
        assert!(help.audience_help.is_none());
    }
}
