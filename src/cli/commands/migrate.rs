use tracing::info;

use crate::config;
use crate::database::DatabaseManager;

pub async fn handle() -> anyhow::Result<()> {
    let config = config::config()?;
    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;
    pool.close().await;
    info!("migrations complete");
    Ok(())
}
