use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use timetable_db::schema::initialize_database;
use tracing::{Level, info};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();
    timetable_api::init_tracing(Level::INFO)?;

    let database_url =
        std::env::var("DATABASE_URL").wrap_err("DATABASE_URL environment variable must be set")?;

    info!("Connecting to database...");
    let db_pool = timetable_db::create_pool(&database_url, 1).await?;

    // Idempotent: safe to run against an already migrated database
    initialize_database(&db_pool).await?;

    Ok(())
}
