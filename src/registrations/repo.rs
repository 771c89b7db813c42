use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use super::repo_types::{NewRegistration, Registration};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("registration not found")]
    NotFound,
    #[error("database error: {0}")]
    Persistence(#[from] sqlx::Error),
}

/// Persistence seam for registrations. Every method runs a single statement.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn create(&self, new: &NewRegistration) -> Result<Registration, StoreError>;
    async fn list_all(&self) -> Result<Vec<Registration>, StoreError>;
    async fn get_by_id(&self, id: i64) -> Result<Registration, StoreError>;
    /// Overwrite the mutable fields and refresh `updated_at`.
    async fn update(&self, id: i64, new: &NewRegistration) -> Result<Registration, StoreError>;
    /// Deleting a missing id is not an error.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgRegistrationStore {
    db: PgPool,
}

impl PgRegistrationStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RegistrationStore for PgRegistrationStore {
    async fn create(&self, new: &NewRegistration) -> Result<Registration, StoreError> {
        let row = sqlx::query_as::<_, Registration>(
            r#"
            INSERT INTO registrations (name, email, phone, date_of_birth)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, phone, date_of_birth, created_at, updated_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(new.date_of_birth)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_all(&self) -> Result<Vec<Registration>, StoreError> {
        let rows = sqlx::query_as::<_, Registration>(
            r#"
            SELECT id, name, email, phone, date_of_birth, created_at, updated_at
            FROM registrations
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: i64) -> Result<Registration, StoreError> {
        sqlx::query_as::<_, Registration>(
            r#"
            SELECT id, name, email, phone, date_of_birth, created_at, updated_at
            FROM registrations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: i64, new: &NewRegistration) -> Result<Registration, StoreError> {
        sqlx::query_as::<_, Registration>(
            r#"
            UPDATE registrations
            SET name = $1, email = $2, phone = $3, date_of_birth = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING id, name, email, phone, date_of_birth, created_at, updated_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(new.date_of_birth)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        debug!(id, rows = result.rows_affected(), "registration delete executed");
        Ok(())
    }
}


/// Store backed by a vector, used to drive the HTTP layer in tests.
#[cfg(test)]
pub mod memory {
    use std::sync::Mutex;

    use time::{Duration, OffsetDateTime};

    use super::*;

    #[derive(Default)]
    pub struct InMemoryStore {
        inner: Mutex<Inner>,
    }

    #[derive(Default)]
    struct Inner {
        next_id: i64,
        rows: Vec<Registration>,
    }

    #[async_trait]
    impl RegistrationStore for InMemoryStore {
        async fn create(&self, new: &NewRegistration) -> Result<Registration, StoreError> {
            let mut inner = self.inner.lock().unwrap();
            inner.next_id += 1;
            let now = OffsetDateTime::now_utc();
            let row = Registration {
                id: inner.next_id,
                name: new.name.clone(),
                email: new.email.clone(),
                phone: new.phone.clone(),
                date_of_birth: new.date_of_birth,
                created_at: now,
                updated_at: now,
            };
            inner.rows.push(row.clone());
            Ok(row)
        }

        async fn list_all(&self) -> Result<Vec<Registration>, StoreError> {
            Ok(self.inner.lock().unwrap().rows.clone())
        }

        async fn get_by_id(&self, id: i64) -> Result<Registration, StoreError> {
            let inner = self.inner.lock().unwrap();
            inner
                .rows
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or(StoreError::NotFound)
        }

        async fn update(&self, id: i64, new: &NewRegistration) -> Result<Registration, StoreError> {
            let mut inner = self.inner.lock().unwrap();
            let row = inner
                .rows
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(StoreError::NotFound)?;
            // keep updated_at strictly increasing even on a coarse clock
            let now = OffsetDateTime::now_utc().max(row.updated_at + Duration::microseconds(1));
            row.name = new.name.clone();
            row.email = new.email.clone();
            row.phone = new.phone.clone();
            row.date_of_birth = new.date_of_birth;
            row.updated_at = now;
            Ok(row.clone())
        }

        async fn delete(&self, id: i64) -> Result<(), StoreError> {
            self.inner.lock().unwrap().rows.retain(|r| r.id != id);
            Ok(())
        }
    }

    mod tests {
        use super::*;

        fn ada() -> NewRegistration {
            NewRegistration {
                name: "Ada".into(),
                email: "ada@x.com".into(),
                phone: None,
                date_of_birth: None,
            }
        }

        #[tokio::test]
        async fn create_assigns_sequential_ids_and_equal_timestamps() {
            let store = InMemoryStore::default();
            let first = store.create(&ada()).await.unwrap();
            let second = store.create(&ada()).await.unwrap();
            assert_eq!(first.id, 1);
            assert_eq!(second.id, 2);
            assert_eq!(first.created_at, first.updated_at);
        }

        #[tokio::test]
        async fn update_missing_id_is_not_found() {
            let store = InMemoryStore::default();
            let err = store.update(42, &ada()).await.unwrap_err();
            assert!(matches!(err, StoreError::NotFound));
        }

        #[tokio::test]
        async fn delete_is_idempotent() {
            let store = InMemoryStore::default();
            let row = store.create(&ada()).await.unwrap();
            store.delete(row.id).await.unwrap();
            store.delete(row.id).await.unwrap();
            assert!(matches!(
                store.get_by_id(row.id).await.unwrap_err(),
                StoreError::NotFound
            ));
        }
    }
}
