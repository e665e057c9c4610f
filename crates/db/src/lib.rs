//! SQLite pool construction and module migration runner.

use anyhow::Context;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use bookstock_kernel::settings::DatabaseSettings;
use bookstock_kernel::Migration;

/// Open a connection pool against the configured database.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.url)
        .await
        .with_context(|| format!("failed to open database at {}", settings.url))?;

    tracing::info!(url = %settings.url, "database pool ready");
    Ok(pool)
}

/// Open a single-connection in-memory database, used by tests.
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    // One connection only: each SQLite `:memory:` connection is its own database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .context("failed to open in-memory database")?;

    Ok(pool)
}

/// Apply module-contributed migrations that have not run yet.
///
/// Applied migrations are tracked per `(module, id)` pair in a `_migrations`
/// table so reruns are no-ops.
pub async fn run_migrations(
    pool: &SqlitePool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            module     TEXT NOT NULL,
            id         TEXT NOT NULL,
            applied_at TEXT NOT NULL,
            PRIMARY KEY (module, id)
        )",
    )
    .execute(pool)
    .await
    .context("failed to create migration tracking table")?;

    for (module, migration) in migrations {
        let applied: Option<(String,)> =
            sqlx::query_as("SELECT id FROM _migrations WHERE module = ? AND id = ?")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(pool)
                .await?;

        if applied.is_some() {
            continue;
        }

        tracing::info!(module = %module, id = migration.id, "applying migration");

        sqlx::raw_sql(migration.up)
            .execute(pool)
            .await
            .with_context(|| format!("migration '{}/{}' failed", module, migration.id))?;

        sqlx::query("INSERT INTO _migrations (module, id, applied_at) VALUES (?, ?, ?)")
            .bind(module)
            .bind(migration.id)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(pool)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_migrations() -> Vec<(String, Migration)> {
        vec![(
            "widgets".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE widgets (id INTEGER PRIMARY KEY, name TEXT NOT NULL);",
            },
        )]
    }

    #[tokio::test]
    async fn migrations_apply_once() {
        let pool = connect_in_memory().await.unwrap();
        let migrations = test_migrations();

        run_migrations(&pool, &migrations).await.unwrap();
        // Second run must skip the already-applied migration.
        run_migrations(&pool, &migrations).await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 1);

        sqlx::query("INSERT INTO widgets (name) VALUES ('gear')")
            .execute(&pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failed_migration_reports_module_and_id() {
        let pool = connect_in_memory().await.unwrap();
        let migrations = vec![(
            "broken".to_string(),
            Migration {
                id: "001_bad",
                up: "NOT VALID SQL;",
            },
        )];

        let err = run_migrations(&pool, &migrations).await.unwrap_err();
        assert!(err.to_string().contains("broken/001_bad"));
    }
}
