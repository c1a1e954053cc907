//! Temp-file database fixture shared by repository tests.

use std::sync::Arc;

use tempfile::{tempdir, TempDir};

use crate::db::{create_pool, init, run_migrations, spawn_writer, DbPool, WriteHandle};

/// Keeps the temp dir alive for as long as the pool is used.
pub struct TestDb {
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
    _dir: TempDir,
}

pub fn test_db() -> TestDb {
    let dir = tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db").to_string_lossy().into_owned();
    init(&db_path).expect("Failed to init database");
    let pool = create_pool(&db_path).expect("Failed to create pool");
    run_migrations(&pool).expect("Failed to run migrations");
    let writer = spawn_writer((*pool).clone());
    TestDb {
        pool,
        writer,
        _dir: dir,
    }
}
