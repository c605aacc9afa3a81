use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub mod games;
pub mod picks;
pub mod players;
pub mod settings;
pub mod teams;
pub mod weeks;

pub const DB_PATH_VAR: &str = "SURVIVOR_DB";

const SCHEMA: &str = include_str!("schema.sql");

pub async fn create_db_pool(db_path: &str, create_if_missing: bool) -> sqlx::Result<Pool<Sqlite>> {
    let conn_options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(create_if_missing)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(conn_options)
        .await
}

/// Creates every table that does not exist yet.
pub async fn create_schema(pool: &Pool<Sqlite>) -> sqlx::Result<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
