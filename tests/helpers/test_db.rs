use eduresolve::infrastructure::persistence::Database;
use uuid::Uuid;

pub async fn setup_test_db() -> Database {
    // Use file-based SQLite for tests (unique UUID per test for parallel execution)
    let temp_file = std::env::temp_dir().join(format!("eduresolve_test_{}.db", Uuid::new_v4()));
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.display());

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    db
}
