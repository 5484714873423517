use sqlx::{postgres::PgPoolOptions, PgPool, Result};

pub mod memory;
pub mod postgres;
pub mod queries;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::Store;

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
