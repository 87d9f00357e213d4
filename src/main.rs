use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use timetable_api::{config::ApiConfig, init_tracing};
use timetable_db::{create_pool, repositories::slot::PgSlotStore, schema::initialize_database};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let config = ApiConfig::from_env()?;
    init_tracing(config.log_level)?;

    let db_pool = create_pool(&config.database_url, config.database_max_connections).await?;
    initialize_database(&db_pool).await?;
    info!(
        max_connections = config.database_max_connections,
        "Connected to timetable database"
    );

    let store = Arc::new(PgSlotStore::new(db_pool));
    timetable_api::start_server(config, store).await?;

    Ok(())
}
