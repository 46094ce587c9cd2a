use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::credentials::errors::StoreError;
use crate::domain::credentials::models::EmailAddress;
use crate::domain::credentials::models::RefreshCredential;
use crate::domain::credentials::models::RefreshHandle;
use crate::domain::credentials::models::Role;
use crate::domain::credentials::models::User;
use crate::domain::credentials::models::UserId;
use crate::domain::credentials::models::Username;
use crate::domain::credentials::ports::UserStore;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    username: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(row.id),
            email: EmailAddress::new(row.email)
                .map_err(|e| StoreError::Storage(format!("Corrupt email column: {}", e)))?,
            username: Username::new(row.username)
                .map_err(|e| StoreError::Storage(format!("Corrupt username column: {}", e)))?,
            password_hash: row.password_hash,
            role: row
                .role
                .parse::<Role>()
                .map_err(|e| StoreError::Storage(format!("Corrupt role column: {}", e)))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RefreshRow {
    token: String,
    user_id: Uuid,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    revoked: bool,
}

impl From<RefreshRow> for RefreshCredential {
    fn from(row: RefreshRow) -> Self {
        RefreshCredential {
            token: RefreshHandle::new(row.token),
            user_id: UserId(row.user_id),
            issued_at: row.issued_at,
            expires_at: row.expires_at,
            revoked: row.revoked,
        }
    }
}

fn storage_error(e: sqlx::Error) -> StoreError {
    tracing::error!("Database operation failed: {}", e);
    StoreError::Storage(e.to_string())
}

fn write_error(e: sqlx::Error, email: &EmailAddress) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
            return StoreError::ConflictEmail(email.as_str().to_string());
        }
    }
    storage_error(e)
}

/// PostgreSQL user store.
///
/// Schema lives in `migrations/`. Rotation runs as a conditional update plus
/// insert inside one transaction.
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, username, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.0)
        .bind(user.email.as_str())
        .bind(user.username.as_str())
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, &user.email))?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &EmailAddress) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, email, username, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, email, username, password_hash, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(User::try_from).transpose()
    }

    async fn update_user(&self, user: User) -> Result<User, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, username = $3, password_hash = $4, role = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id.0)
        .bind(user.email.as_str())
        .bind(user.username.as_str())
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, &user.email))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(user)
    }

    async fn save_refresh(&self, credential: RefreshCredential) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_credentials (token, user_id, issued_at, expires_at, revoked)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(credential.token.as_str())
        .bind(credential.user_id.0)
        .bind(credential.issued_at)
        .bind(credential.expires_at)
        .bind(credential.revoked)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn find_refresh(
        &self,
        token: &RefreshHandle,
    ) -> Result<Option<RefreshCredential>, StoreError> {
        let row: Option<RefreshRow> = sqlx::query_as(
            r#"
            SELECT token, user_id, issued_at, expires_at, revoked
            FROM refresh_credentials
            WHERE token = $1
            "#,
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(RefreshCredential::from))
    }

    async fn revoke_refresh(&self, token: &RefreshHandle) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_credentials
            SET revoked = TRUE
            WHERE token = $1
            "#,
        )
        .bind(token.as_str())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn rotate_refresh(
        &self,
        old: &RefreshHandle,
        new: RefreshCredential,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        // Row lock on the old handle serializes concurrent rotations.
        let flipped = sqlx::query(
            r#"
            UPDATE refresh_credentials
            SET revoked = TRUE
            WHERE token = $1 AND revoked = FALSE
            "#,
        )
        .bind(old.as_str())
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?;

        if flipped.rows_affected() == 0 {
            tx.rollback().await.map_err(storage_error)?;
            return Err(StoreError::NotFound);
        }

        sqlx::query(
            r#"
            INSERT INTO refresh_credentials (token, user_id, issued_at, expires_at, revoked)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(new.token.as_str())
        .bind(new.user_id.0)
        .bind(new.issued_at)
        .bind(new.expires_at)
        .bind(new.revoked)
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;

        Ok(())
    }

    async fn prune_expired_refresh(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_credentials
            WHERE expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected())
    }
}
