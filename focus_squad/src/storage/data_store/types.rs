use sqlx::{PgPool, SqlitePool};

#[derive(Clone, Debug)]
pub(crate) struct SqliteDataStore {
    pub(super) pool: SqlitePool,
}

#[derive(Clone, Debug)]
pub(crate) struct PostgresDataStore {
    pub(super) pool: PgPool,
}

/// Backend-neutral handle; each store module branches on whichever pool is present.
pub(crate) trait DataStore: Send + Sync {
    fn as_sqlite(&self) -> Option<&SqlitePool> {
        None
    }

    fn as_postgres(&self) -> Option<&PgPool> {
        None
    }
}

impl DataStore for SqliteDataStore {
    fn as_sqlite(&self) -> Option<&SqlitePool> {
        Some(&self.pool)
    }
}

impl DataStore for PostgresDataStore {
    fn as_postgres(&self) -> Option<&PgPool> {
        Some(&self.pool)
    }
}
