use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use crate::config::DatabaseConfig;

use super::models::{Todo, TodoPatch, User};
use super::{Store, StoreError};

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        tokens TEXT[] NOT NULL DEFAULT '{}',
        created_at TIMESTAMPTZ NOT NULL
    )
"#;

const CREATE_TODOS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS todos (
        id UUID PRIMARY KEY,
        owner UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        completed BOOLEAN NOT NULL,
        date TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL
    )
"#;

const USER_COLUMNS: &str = "id, email, password_hash, tokens, created_at";
const TODO_COLUMNS: &str = "id, owner, title, completed, date, created_at";

/// Durable backend. Token mutations are single-statement array updates on
/// the user row, so concurrent sessions never clobber each other's tokens.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_USERS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_TODOS_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_unique_violation() {
            return StoreError::DuplicateEmail;
        }
    }
    StoreError::Sqlx(err)
}

#[async_trait]
impl Store for PostgresStore {
    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, tokens, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.tokens)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_token(&self, id: Uuid, token: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1 AND $2 = ANY(tokens)",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user(&self, id: Uuid, email: &str, password_hash: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET email = $2, password_hash = $3 WHERE id = $1")
            .bind(id)
            .bind(email)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::UserMissing);
        }
        Ok(())
    }

    async fn push_token(&self, id: Uuid, token: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET tokens = array_append(tokens, $2) WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::UserMissing);
        }
        Ok(())
    }

    async fn remove_token(&self, id: Uuid, token: &str) -> Result<(), StoreError> {
        // Tokens are unique strings (each carries a fresh jti claim), so
        // array_remove drops at most one element.
        sqlx::query("UPDATE users SET tokens = array_remove(tokens, $2) WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn clear_tokens(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET tokens = '{}' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        // todos cascade via the foreign key
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn create_todo(&self, todo: Todo) -> Result<Todo, StoreError> {
        sqlx::query(
            "INSERT INTO todos (id, owner, title, completed, date, created_at) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(todo.id)
        .bind(todo.owner)
        .bind(&todo.title)
        .bind(todo.completed)
        .bind(todo.date)
        .bind(todo.created_at)
        .execute(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn list_todos(&self, owner: Uuid) -> Result<Vec<Todo>, StoreError> {
        let todos = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {} FROM todos WHERE owner = $1 ORDER BY created_at, id",
            TODO_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    async fn find_todo(&self, owner: Uuid, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {} FROM todos WHERE owner = $1 AND id = $2",
            TODO_COLUMNS
        ))
        .bind(owner)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn update_todo(&self, owner: Uuid, id: Uuid, patch: TodoPatch) -> Result<Option<Todo>, StoreError> {
        // One statement so the read-modify-write is atomic on the row. $5
        // marks whether the due date was touched at all; $6 carries its new
        // value (possibly NULL, which clears it).
        let touch_date = patch.date.is_some();
        let date_value = patch.date.flatten();

        let todo = sqlx::query_as::<_, Todo>(&format!(
            r#"
            UPDATE todos SET
                title = COALESCE($3, title),
                completed = COALESCE($4, completed),
                date = CASE WHEN $5 THEN $6 ELSE date END
            WHERE owner = $1 AND id = $2
            RETURNING {}
            "#,
            TODO_COLUMNS
        ))
        .bind(owner)
        .bind(id)
        .bind(patch.title)
        .bind(patch.completed)
        .bind(touch_date)
        .bind(date_value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn delete_todo(&self, owner: Uuid, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "DELETE FROM todos WHERE owner = $1 AND id = $2 RETURNING {}",
            TODO_COLUMNS
        ))
        .bind(owner)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
