//! Relational store selection: users, link codes, live status and the
//! session version all live behind the pool chosen here.

use std::{env, str::FromStr, sync::LazyLock};
use tokio::sync::Mutex;

use super::types::{DataStore, PostgresDataStore, SqliteDataStore};

fn store_setting(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("{name} must be set to select the data store"))
}

fn open_data_store(kind: &str, url: &str) -> Box<dyn DataStore> {
    match kind {
        "sqlite" => {
            let options = match sqlx::sqlite::SqliteConnectOptions::from_str(url) {
                Ok(options) => options.create_if_missing(true),
                Err(e) => panic!("Invalid SQLite url {url}: {e}"),
            };
            Box::new(SqliteDataStore {
                pool: sqlx::sqlite::SqlitePool::connect_lazy_with(options),
            })
        }
        "postgres" => match sqlx::PgPool::connect_lazy(url) {
            Ok(pool) => Box::new(PostgresDataStore { pool }),
            Err(e) => panic!("Invalid Postgres url {url}: {e}"),
        },
        other => panic!("Data store type '{other}' is not one of: sqlite, postgres"),
    }
}

pub(crate) static GENERIC_DATA_STORE: LazyLock<Mutex<Box<dyn DataStore>>> = LazyLock::new(|| {
    let kind = store_setting("GENERIC_DATA_STORE_TYPE");
    let url = store_setting("GENERIC_DATA_STORE_URL");

    let store = open_data_store(&kind, &url);
    tracing::info!(kind = %kind, "Data store pool ready");
    Mutex::new(store)
});

/// Prepended to every table name, `fs_` unless `DB_TABLE_PREFIX` says otherwise
pub(crate) static DB_TABLE_PREFIX: LazyLock<String> =
    LazyLock::new(|| env::var("DB_TABLE_PREFIX").unwrap_or_else(|_| "fs_".to_string()));
