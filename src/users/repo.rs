use async_trait::async_trait;
use sqlx::PgPool;

use crate::users::repo_types::{NewUser, User, UserChanges, UserCounts};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The `users_email_unique` constraint rejected the write.
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    fn from_write(e: sqlx::Error) -> Self {
        let unique = matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
        if unique {
            Self::DuplicateEmail
        } else {
            Self::Database(e)
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Records ordered by id, `limit` rows starting after `offset`.
    async fn page(&self, limit: i64, offset: i64) -> StoreResult<Vec<User>>;
    async fn counts(&self) -> StoreResult<UserCounts>;
    async fn find(&self, id: i64) -> StoreResult<Option<User>>;
    /// Whether `email` belongs to a record other than `ignore`. Stored addresses
    /// are always lowercase, so callers pass the lowercased form.
    async fn email_taken(&self, email: &str, ignore: Option<i64>) -> StoreResult<bool>;
    async fn insert(&self, user: NewUser) -> StoreResult<User>;
    /// Returns `None` when no record has this id.
    async fn update(&self, id: i64, changes: UserChanges) -> StoreResult<Option<User>>;
    /// Returns whether a record was removed.
    async fn delete(&self, id: i64) -> StoreResult<bool>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn page(&self, limit: i64, offset: i64) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, email_verified_at, created_at, updated_at
            FROM users
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn counts(&self) -> StoreResult<UserCounts> {
        let counts = sqlx::query_as::<_, UserCounts>(
            r#"
            SELECT COUNT(*) AS total, COUNT(email_verified_at) AS verified
            FROM users
            "#,
        )
        .fetch_one(&self.db)
        .await?;
        Ok(counts)
    }

    async fn find(&self, id: i64) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, email_verified_at, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn email_taken(&self, email: &str, ignore: Option<i64>) -> StoreResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE email = lower($1)
                  AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(ignore)
        .fetch_one(&self.db)
        .await?;
        Ok(taken)
    }

    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, email_verified_at, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(StoreError::from_write)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET name          = COALESCE($2, name),
                   email         = COALESCE($3, email),
                   password_hash = COALESCE($4, password_hash),
                   updated_at    = now()
             WHERE id = $1
            RETURNING id, name, email, password_hash, email_verified_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.password_hash)
        .fetch_optional(&self.db)
        .await
        .map_err(StoreError::from_write)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
pub mod memory {
    use std::sync::Mutex;

    use time::OffsetDateTime;

    use super::*;

    #[derive(Default)]
    struct Inner {
        next_id: i64,
        rows: Vec<User>,
    }

    /// In-process store with the same uniqueness rule as the `users` table.
    #[derive(Default)]
    pub struct MemoryUserStore {
        inner: Mutex<Inner>,
    }

    impl MemoryUserStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn mark_verified(&self, id: i64) {
            let mut inner = self.inner.lock().unwrap();
            if let Some(row) = inner.rows.iter_mut().find(|u| u.id == id) {
                row.email_verified_at = Some(OffsetDateTime::now_utc());
            }
        }

        pub fn stored(&self, id: i64) -> Option<User> {
            let inner = self.inner.lock().unwrap();
            inner.rows.iter().find(|u| u.id == id).cloned()
        }
    }

    fn clashes(rows: &[User], email: &str, ignore: Option<i64>) -> bool {
        rows.iter()
            .any(|u| Some(u.id) != ignore && u.email.eq_ignore_ascii_case(email))
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn page(&self, limit: i64, offset: i64) -> StoreResult<Vec<User>> {
            let inner = self.inner.lock().unwrap();
            Ok(inner
                .rows
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn counts(&self) -> StoreResult<UserCounts> {
            let inner = self.inner.lock().unwrap();
            let verified = inner
                .rows
                .iter()
                .filter(|u| u.email_verified_at.is_some())
                .count();
            Ok(UserCounts {
                total: inner.rows.len() as i64,
                verified: verified as i64,
            })
        }

        async fn find(&self, id: i64) -> StoreResult<Option<User>> {
            Ok(self.stored(id))
        }

        async fn email_taken(&self, email: &str, ignore: Option<i64>) -> StoreResult<bool> {
            let inner = self.inner.lock().unwrap();
            Ok(clashes(&inner.rows, email, ignore))
        }

        async fn insert(&self, user: NewUser) -> StoreResult<User> {
            let mut inner = self.inner.lock().unwrap();
            if clashes(&inner.rows, &user.email, None) {
                return Err(StoreError::DuplicateEmail);
            }
            inner.next_id += 1;
            let now = OffsetDateTime::now_utc();
            let row = User {
                id: inner.next_id,
                name: user.name,
                email: user.email,
                password_hash: user.password_hash,
                email_verified_at: None,
                created_at: now,
                updated_at: now,
            };
            inner.rows.push(row.clone());
            Ok(row)
        }

        async fn update(&self, id: i64, changes: UserChanges) -> StoreResult<Option<User>> {
            let mut inner = self.inner.lock().unwrap();
            if let Some(email) = &changes.email {
                if clashes(&inner.rows, email, Some(id)) {
                    return Err(StoreError::DuplicateEmail);
                }
            }
            let Some(row) = inner.rows.iter_mut().find(|u| u.id == id) else {
                return Ok(None);
            };
            if let Some(name) = changes.name {
                row.name = name;
            }
            if let Some(email) = changes.email {
                row.email = email;
            }
            if let Some(hash) = changes.password_hash {
                row.password_hash = hash;
            }
            row.updated_at = OffsetDateTime::now_utc();
            Ok(Some(row.clone()))
        }

        async fn delete(&self, id: i64) -> StoreResult<bool> {
            let mut inner = self.inner.lock().unwrap();
            let before = inner.rows.len();
            inner.rows.retain(|u| u.id != id);
            Ok(inner.rows.len() < before)
        }
    }
}
