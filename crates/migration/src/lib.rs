pub use sea_orm_migration::prelude::*;

mod m20240501_000001_houses_and_logs;
mod m20240501_000002_feed_batches;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240501_000001_houses_and_logs::Migration),
            Box::new(m20240501_000002_feed_batches::Migration),
        ]
    }
}
