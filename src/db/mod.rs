pub mod models;
pub mod queries;

use anyhow::Result;
use sqlx::{MySql, Pool, mysql::MySqlPoolOptions};

/// Connect to MySQL. A failed initial connection is fatal to startup; the
/// error propagates out of `main`. No migrations are run here, the schema is
/// provisioned out-of-band (see schema.sql).
pub async fn init_pool(database_url: &str) -> Result<Pool<MySql>> {
    let pool = MySqlPoolOptions::new().connect(database_url).await?;
    Ok(pool)
}
