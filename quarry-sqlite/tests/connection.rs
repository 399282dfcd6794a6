#[cfg(test)]
mod tests {
    use quarry::{Db, Session, Value};
    use quarry_sqlite::SqliteSession;
    use quarry_tests::{TestModel, init_logs, silent_logs};
    use std::{path::Path, sync::Mutex, time::Duration};
    use tokio::{fs, time::timeout};

    static MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn create_database() {
        init_logs();
        const DB_PATH: &'static str = "../target/debug/creation.sqlite";
        let _guard = MUTEX.lock().unwrap();
        if Path::new(DB_PATH).exists() {
            fs::remove_file(DB_PATH)
                .await
                .expect(format!("Failed to remove test database file {}", DB_PATH).as_str());
        }
        assert!(
            !Path::new(DB_PATH).exists(),
            "Database file should not exist before test"
        );
        SqliteSession::connect(&format!("sqlite://{}?mode=rwc", DB_PATH))
            .await
            .expect("Could not open the database");
        assert!(
            Path::new(DB_PATH).exists(),
            "Database file should be created after connection"
        );
        SqliteSession::connect(&format!("sqlite://{}?mode=ro", DB_PATH))
            .await
            .expect("Could not open the database");
        fs::remove_file(DB_PATH)
            .await
            .expect(format!("Failed to remove existing test database file {}", DB_PATH).as_str());
        silent_logs! {
            assert!(
                SqliteSession::connect(&format!("sqlite://{}?mode=ro", DB_PATH))
                    .await
                    .is_err(),
                "Should not be able to open in read only unexisting database"
            );
        };
    }

    #[tokio::test]
    async fn wrong_url() {
        silent_logs! {
            assert!(SqliteSession::connect("duckdb://some_value").await.is_err());
        };
    }

    #[tokio::test]
    async fn session_directly() {
        init_logs();
        let session = SqliteSession::connect(":memory:")
            .await
            .expect("Could not open the in memory database");
        let result = session
            .exec_context("CREATE TABLE `numbers` (`n` INTEGER PRIMARY KEY, `label` TEXT)", &[])
            .await
            .expect("Failed to create the table");
        assert_eq!(result.rows_affected, 0);
        let result = session
            .exec_context(
                "INSERT INTO `numbers` (`n`, `label`) VALUES (?, ?), (?, ?)",
                &[
                    Value::Int64(Some(7)),
                    Value::Varchar(Some("seven".into())),
                    Value::Int64(Some(9)),
                    Value::Null,
                ],
            )
            .await
            .expect("Failed to insert");
        assert_eq!(result.rows_affected, 2);
        assert_eq!(result.last_insert_id, Some(9));

        let result = silent_logs! {
            session.exec_context("SELECT 1; SELECT 2", &[]).await
        };
        assert!(result.is_err(), "Multiple statements are rejected");
    }

    #[tokio::test]
    async fn default_dialect_runs_on_sqlite() {
        init_logs();
        let session = SqliteSession::connect(":memory:")
            .await
            .expect("Could not open the in memory database");
        // Backtick quoting is understood by SQLite too
        let db = Db::new(session);
        db.raw::<TestModel>(
            "CREATE TABLE `test_model` (`id` INTEGER PRIMARY KEY, `first_name` TEXT NOT NULL, `age` INTEGER NOT NULL, `last_name` TEXT)",
            [],
        )
        .exec()
        .await
        .expect("Failed to create the table");
        let model = TestModel {
            id: 1,
            first_name: "Zoe".into(),
            age: 33,
            last_name: None,
        };
        db.insert::<TestModel>()
            .values([model.clone()])
            .exec()
            .await
            .expect("Failed to insert");
        let found = db
            .select::<TestModel>()
            .get()
            .await
            .expect("Failed to select");
        assert_eq!(found, model);
    }

    #[tokio::test]
    async fn abandoned_query_keeps_the_connection() {
        init_logs();
        let session = SqliteSession::connect(":memory:")
            .await
            .expect("Could not open the in memory database");
        session
            .exec_context("CREATE TABLE `events` (`id` INTEGER PRIMARY KEY, `name` TEXT)", &[])
            .await
            .expect("Failed to create the table");
        let slow = session.query_context(
            "WITH RECURSIVE `c`(`x`) AS (SELECT 1 UNION ALL SELECT `x` + 1 FROM `c` WHERE `x` < 5000000) \
             SELECT COUNT(*) FROM `c`",
            &[],
        );
        let result = timeout(Duration::from_millis(1), slow).await;
        assert!(result.is_err(), "The query should still be running");

        // Waits for the abandoned statement, then reports its own changes
        let result = session
            .exec_context(
                "INSERT INTO `events` (`id`, `name`) VALUES (?, ?)",
                &[Value::Int64(Some(41)), Value::Varchar(Some("after".into()))],
            )
            .await
            .expect("Failed to insert after the abandoned query");
        assert_eq!(result.rows_affected, 1);
        assert_eq!(result.last_insert_id, Some(41));
    }
}
