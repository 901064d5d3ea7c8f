use trendcast_core::AppConfig;

pub(crate) async fn run_db_ping(config: &AppConfig) -> anyhow::Result<()> {
    let pool = trendcast_db::connect_pool_from_config(config).await?;
    trendcast_db::health_check(&pool).await?;
    println!("database ok");
    Ok(())
}

pub(crate) async fn run_db_migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = trendcast_db::connect_pool_from_config(config).await?;
    let applied = trendcast_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations complete");
    println!("applied {applied} migration(s)");
    Ok(())
}
