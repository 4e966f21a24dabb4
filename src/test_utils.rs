#[cfg(test)]
pub mod test_utils {
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use chrono::NaiveDate;
    use compute::forecast::Horizon;
    use migration::{Migrator, MigratorTrait};
    use model::entities::master_data;
    use moka::future::Cache;
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
    use std::sync::Arc;
    use std::time::Duration;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    pub async fn insert_row(db: &DatabaseConnection, state: &str, month: NaiveDate, pop_group: &str, avg: Option<f64>) {
        master_data::ActiveModel {
            state: Set(state.to_string()),
            month: Set(month),
            pop_group: Set(pop_group.to_string()),
            avg: Set(avg),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to insert master_data row");
    }

    fn first_of(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).expect("valid date")
    }

    /// Seeds a small dataset:
    /// - Kerala Urban, 14 months from 2022-01 (40, 41, ...)
    /// - Kerala Rural, 6 months from 2022-09 (20, 20.5, ...)
    /// - Goa Urban and Semi-Urban, February 2023 only
    /// - one row without a value and one with an unknown group
    pub async fn seed_rows(db: &DatabaseConnection) {
        for i in 0..14u32 {
            let month = first_of(2022 + (i / 12) as i32, i % 12 + 1);
            insert_row(db, "Kerala", month, "Urban", Some(40.0 + i as f64)).await;
        }
        for i in 0..6u32 {
            let month = first_of(2022 + ((8 + i) / 12) as i32, (8 + i) % 12 + 1);
            insert_row(db, "kerala ", month, "Rural", Some(20.0 + i as f64 * 0.5)).await;
        }
        insert_row(db, " goa", first_of(2023, 2), "Urban", Some(60.0)).await;
        insert_row(db, "GOA", first_of(2023, 2), "S - Urban", Some(30.0)).await;
        insert_row(db, "Goa", first_of(2023, 1), "Urban", None).await;
        insert_row(db, "Goa", first_of(2023, 1), "Metro", Some(99.0)).await;
    }

    /// Create AppState for testing, over a seeded database
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;
        seed_rows(&db).await;

        let cache = Cache::new(100);
        let records = compute::default_source(100, Duration::from_secs(300));

        AppState {
            db,
            cache,
            records: Arc::new(records),
            forecaster: Arc::new(compute::default_forecaster()),
            default_horizon: Horizon::DEFAULT,
        }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| level.parse::<Level>().ok())
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let _guard = init_test_tracing();
        create_router(setup_test_app_state().await)
    }

    /// App and state sharing the same caches, for tests that inspect them.
    pub async fn setup_test_app_with_state() -> (Router, AppState) {
        let state = setup_test_app_state().await;
        (create_router(state.clone()), state)
    }
}
