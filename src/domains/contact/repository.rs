use crate::domains::contact::types::{Contact, ContactRow, NewContact};
use crate::domains::core::repository::{date_to_db, finish_tx, FindById};
use crate::errors::{DbError, DomainError, DomainResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

/// Trait defining contact repository operations
#[async_trait]
pub trait ContactRepository: FindById<Contact> + Send + Sync {
    async fn create(&self, new_contact: &NewContact) -> DomainResult<Contact>;

    /// Store every field of `contact` and refresh the participant name mirrors.
    async fn update(&self, contact: &Contact) -> DomainResult<Contact>;
    async fn update_with_tx<'t>(
        &self,
        contact: &Contact,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Contact>;
}

/// SQLite implementation for ContactRepository
#[derive(Debug, Clone)]
pub struct SqliteContactRepository {
    pool: SqlitePool,
}

impl SqliteContactRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_by_id_with_tx<'t>(
        &self,
        id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Contact> {
        let row = query_as::<_, ContactRow>("SELECT * FROM contacts WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut **tx)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound("Contact".to_string(), id))?;

        row.into_entity()
    }
}

#[async_trait]
impl FindById<Contact> for SqliteContactRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Contact> {
        let row = query_as::<_, ContactRow>("SELECT * FROM contacts WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound("Contact".to_string(), id))?;

        row.into_entity()
    }
}

#[async_trait]
impl ContactRepository for SqliteContactRepository {
    async fn create(&self, new_contact: &NewContact) -> DomainResult<Contact> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        query(
            "INSERT INTO contacts (id, name, email, phone, birthdate, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(new_contact.name.trim())
        .bind(&new_contact.email)
        .bind(&new_contact.phone)
        .bind(new_contact.birthdate.as_ref().map(date_to_db))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        self.find_by_id(id).await
    }

    async fn update(&self, contact: &Contact) -> DomainResult<Contact> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let result = self.update_with_tx(contact, &mut tx).await;
        finish_tx(tx, result).await
    }

    async fn update_with_tx<'t>(
        &self,
        contact: &Contact,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Contact> {
        let now = Utc::now().to_rfc3339();

        let result = query(
            "UPDATE contacts SET name = ?, email = ?, phone = ?, birthdate = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(contact.birthdate.as_ref().map(date_to_db))
        .bind(&now)
        .bind(contact.id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("Contact".to_string(), contact.id));
        }

        // participants store the contact name for sorting and search
        query("UPDATE participants SET name = ?, updated_at = ? WHERE contact_id = ? AND name <> ?")
            .bind(&contact.name)
            .bind(&now)
            .bind(contact.id.to_string())
            .bind(&contact.name)
            .execute(&mut **tx)
            .await
            .map_err(DbError::from)?;

        self.find_by_id_with_tx(contact.id, tx).await
    }
}
