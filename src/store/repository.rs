/// Generic repository with staged mutations
use sqlx::sqlite::SqlitePool;
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::entity::{fetch_by_id, select_sql, Entity};

/// A mutation staged against a repository, not yet durable.
#[derive(Debug, Clone)]
pub(crate) enum Staged<E> {
    Insert(E),
    Update(E),
}

/// Uniform CRUD access to one entity type. Reads go straight to the pool;
/// writes are staged until the owning unit of work commits them.
pub struct Repository<E: Entity> {
    pool: SqlitePool,
    staged: Vec<Staged<E>>,
}

impl<E: Entity> Repository<E> {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            staged: Vec::new(),
        }
    }

    /// All rows for the entity.
    pub async fn get_all(&self) -> AppResult<Vec<E>> {
        let sql = select_sql::<E>();
        sqlx::query_as::<_, E>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    /// All rows matching a predicate, applied to the fetched set.
    pub async fn get_all_where<F>(&self, filter: F) -> AppResult<Vec<E>>
    where
        F: Fn(&E) -> bool,
    {
        let mut rows = self.get_all().await?;
        rows.retain(|row| filter(row));
        Ok(rows)
    }

    /// Keyed lookup, optionally eager-loading the named relation paths.
    pub async fn get_by_id(&self, id: Uuid, include: &[&str]) -> AppResult<Option<E>> {
        let Some(mut entity) = fetch_by_id::<E>(&self.pool, id).await? else {
            return Ok(None);
        };
        for path in include {
            entity.fetch_relation(&self.pool, path).await?;
        }
        Ok(Some(entity))
    }

    /// Stage an insert.
    pub fn add(&mut self, entity: E) {
        self.staged.push(Staged::Insert(entity));
    }

    /// Stage inserts for a batch of entities.
    pub fn add_range(&mut self, entities: impl IntoIterator<Item = E>) {
        for entity in entities {
            self.add(entity);
        }
    }

    /// Stage an update, stamping the entity's update timestamp.
    pub fn update(&mut self, mut entity: E) {
        entity.touch();
        self.staged.push(Staged::Update(entity));
    }

    /// Stage updates for a batch of entities.
    pub fn update_range(&mut self, entities: impl IntoIterator<Item = E>) {
        for entity in entities {
            self.update(entity);
        }
    }

    /// Number of staged, uncommitted mutations.
    pub fn pending(&self) -> usize {
        self.staged.len()
    }

    pub(crate) fn drain(&mut self) -> Vec<Staged<E>> {
        std::mem::take(&mut self.staged)
    }

    pub(crate) fn clear(&mut self) {
        self.staged.clear();
    }
}

fn insert_sql<E: Entity>() -> String {
    let placeholders = (1..=E::COLUMNS.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        E::TABLE,
        E::COLUMNS.join(", "),
        placeholders
    )
}

fn update_sql<E: Entity>() -> String {
    // COLUMNS[0] is always id; the same bind order serves both statements.
    let assignments = E::COLUMNS
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, column)| format!("{} = ?{}", column, i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    format!("UPDATE {} SET {} WHERE id = ?1", E::TABLE, assignments)
}

/// Execute staged mutations for one entity type inside a transaction.
pub(crate) async fn apply_staged<E: Entity>(
    tx: &mut Transaction<'_, Sqlite>,
    staged: &[Staged<E>],
) -> AppResult<()> {
    for op in staged {
        match op {
            Staged::Insert(entity) => {
                let sql = insert_sql::<E>();
                entity
                    .bind(sqlx::query(&sql))
                    .execute(&mut **tx)
                    .await
                    .map_err(AppError::Database)?;
            }
            Staged::Update(entity) => {
                let sql = update_sql::<E>();
                entity
                    .bind(sqlx::query(&sql))
                    .execute(&mut **tx)
                    .await
                    .map_err(AppError::Database)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::entity::{Platform, Wall};

    #[test]
    fn insert_sql_uses_positional_placeholders() {
        assert_eq!(
            insert_sql::<Wall>(),
            "INSERT INTO walls (id, name, created_at, updated_at, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)"
        );
    }

    #[test]
    fn update_sql_keys_on_id() {
        assert_eq!(
            update_sql::<Platform>(),
            "UPDATE platforms SET name = ?2, app_id = ?3, api_endpoint = ?4, \
             created_at = ?5, updated_at = ?6, deleted_at = ?7 WHERE id = ?1"
        );
    }
}
