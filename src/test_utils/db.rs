use tempfile::TempDir;

use crate::{AppState, Database, initialize_db};

/// The lowest cost bcrypt accepts, so that tests do not spend seconds hashing.
pub(crate) const TEST_PASSWORD_HASH_COST: u32 = 4;

/// A database file in a fresh temporary directory, without any tables.
///
/// The directory is deleted when the returned [TempDir] is dropped.
pub(crate) fn get_test_database() -> (TempDir, Database) {
    let dir = tempfile::tempdir().expect("Could not create temporary directory");
    let database = Database::new(dir.path().join("test.db"));

    (dir, database)
}

pub(crate) fn get_initialized_test_database() -> (TempDir, Database) {
    let (dir, database) = get_test_database();
    initialize_db(&database).expect("Could not initialize test database");

    (dir, database)
}

pub(crate) fn get_test_app_state() -> (TempDir, AppState) {
    let (dir, database) = get_initialized_test_database();
    let state = AppState::new(database, "Etc/UTC").with_password_hash_cost(TEST_PASSWORD_HASH_COST);

    (dir, state)
}
