use crate::domains::core::repository::{finish_tx, FindById, HardDeletable};
use crate::domains::module::types::{Module, ModuleRow};
use crate::errors::{DbError, DomainError, DomainResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, query_scalar, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

/// Trait defining module repository operations
#[async_trait]
pub trait ModuleRepository: FindById<Module> + HardDeletable + Send + Sync {
    async fn insert_with_tx<'t>(
        &self,
        module: &Module,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Module>;

    async fn find_by_id_with_tx<'t>(
        &self,
        id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Module>;

    /// Modules of an event ordered by sequence then name.
    async fn find_by_event(&self, event_id: Uuid, include_archived: bool) -> DomainResult<Vec<Module>>;

    /// Active modules of an event, read inside a transaction.
    async fn find_active_by_event_with_tx<'t>(
        &self,
        event_id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Vec<Module>>;

    async fn update_with_tx<'t>(
        &self,
        module: &Module,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Module>;

    /// No-op write on the module row. As the first statement of a transaction it
    /// takes the database write lock, serializing writers that scan sessions.
    async fn touch_with_tx<'t>(
        &self,
        id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<()>;

    /// Active sessions owned by the module.
    async fn session_count(&self, id: Uuid) -> DomainResult<i64>;
}

/// SQLite implementation for ModuleRepository
#[derive(Debug, Clone)]
pub struct SqliteModuleRepository {
    pool: SqlitePool,
}

impl SqliteModuleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_rows(rows: Vec<ModuleRow>) -> DomainResult<Vec<Module>> {
        rows.into_iter().map(ModuleRow::into_entity).collect()
    }
}

#[async_trait]
impl FindById<Module> for SqliteModuleRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Module> {
        let row = query_as::<_, ModuleRow>("SELECT * FROM modules WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound("Module".to_string(), id))?;

        row.into_entity()
    }
}

#[async_trait]
impl HardDeletable for SqliteModuleRepository {
    async fn hard_delete_with_tx(
        &self,
        id: Uuid,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()> {
        let result = query("DELETE FROM modules WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut **tx)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            Err(DomainError::EntityNotFound("Module".to_string(), id))
        } else {
            Ok(())
        }
    }

    async fn hard_delete(&self, id: Uuid) -> DomainResult<()> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let result = self.hard_delete_with_tx(id, &mut tx).await;
        finish_tx(tx, result).await
    }
}

#[async_trait]
impl ModuleRepository for SqliteModuleRepository {
    async fn insert_with_tx<'t>(
        &self,
        module: &Module,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Module> {
        query(
            "INSERT INTO modules (id, event_id, name, description, notes, sequence, active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(module.id.to_string())
        .bind(module.event_id.to_string())
        .bind(&module.name)
        .bind(&module.description)
        .bind(&module.notes)
        .bind(module.sequence)
        .bind(module.active)
        .bind(module.created_at.to_rfc3339())
        .bind(module.updated_at.to_rfc3339())
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        self.find_by_id_with_tx(module.id, tx).await
    }

    async fn find_by_id_with_tx<'t>(
        &self,
        id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Module> {
        let row = query_as::<_, ModuleRow>("SELECT * FROM modules WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut **tx)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound("Module".to_string(), id))?;

        row.into_entity()
    }

    async fn find_by_event(&self, event_id: Uuid, include_archived: bool) -> DomainResult<Vec<Module>> {
        let sql = if include_archived {
            "SELECT * FROM modules WHERE event_id = ? ORDER BY sequence, name"
        } else {
            "SELECT * FROM modules WHERE event_id = ? AND active = 1 ORDER BY sequence, name"
        };
        let rows = query_as::<_, ModuleRow>(sql)
            .bind(event_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        Self::map_rows(rows)
    }

    async fn find_active_by_event_with_tx<'t>(
        &self,
        event_id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Vec<Module>> {
        let rows = query_as::<_, ModuleRow>(
            "SELECT * FROM modules WHERE event_id = ? AND active = 1 ORDER BY sequence, name",
        )
        .bind(event_id.to_string())
        .fetch_all(&mut **tx)
        .await
        .map_err(DbError::from)?;

        Self::map_rows(rows)
    }

    async fn update_with_tx<'t>(
        &self,
        module: &Module,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Module> {
        let result = query(
            "UPDATE modules SET event_id = ?, name = ?, description = ?, notes = ?, sequence = ?,
                active = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(module.event_id.to_string())
        .bind(&module.name)
        .bind(&module.description)
        .bind(&module.notes)
        .bind(module.sequence)
        .bind(module.active)
        .bind(Utc::now().to_rfc3339())
        .bind(module.id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("Module".to_string(), module.id));
        }

        self.find_by_id_with_tx(module.id, tx).await
    }

    async fn touch_with_tx<'t>(
        &self,
        id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<()> {
        let result = query("UPDATE modules SET updated_at = updated_at WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut **tx)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("Module".to_string(), id));
        }
        Ok(())
    }

    async fn session_count(&self, id: Uuid) -> DomainResult<i64> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM sessions WHERE module_id = ? AND active = 1")
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(count)
    }
}
