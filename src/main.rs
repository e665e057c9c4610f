use anyhow::Context;

use bookstock_kernel::{InitCtx, ModuleRegistry};
use bookstock_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookstock settings")?;
    bookstock_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "bookstock starting"
    );

    let pool = bookstock_db::connect(&settings.database).await?;

    let mut registry = ModuleRegistry::new();
    bookstock::modules::register_all(&mut registry);

    let migrations = registry.collect_migrations();
    bookstock_db::run_migrations(&pool, &migrations).await?;

    let ctx = InitCtx {
        settings: &settings,
        db: &pool,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    bookstock_http::start_server(&registry, &settings, &pool).await?;

    registry.stop_all().await?;
    Ok(())
}
