use std::sync::Arc;

use storeforge::adapter::outbound::sqlite::{
    create_pool, run_migrations, DbPool, SqliteStoreRepository,
};
use tempfile::TempDir;

/// Temporary SQLite database file for integration tests.
///
/// The file lives in its own directory, which is removed on drop.
pub struct TempDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TempDb {
    pub fn create(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(format!("storeforge-{name}.db"));

        let pool = create_pool(&path.display().to_string()).expect("create sqlite pool");
        run_migrations(&pool).expect("run migrations");

        Self { _dir: dir, pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn repository(&self) -> Arc<SqliteStoreRepository> {
        Arc::new(SqliteStoreRepository::new(self.pool.clone()))
    }
}
