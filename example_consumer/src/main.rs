//! Example consumer: a separate Rust project that uses outline-sdk as a dependency.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Or from this directory: `cargo run`
//!
//! With `DATABASE_URL=sqlite::memory:` it runs without any external database.

use outline_sdk::{
    common_routes_with_ready, ensure_database_exists, entity, entity_routes, AppState, Database, DatabaseConfig,
    MigrationRunner, Outline, OutlineMigrator,
};
use tokio::net::TcpListener;

entity! {
    #[derive(Debug, Default)]
    pub struct Note: NoteFields {
        #[read_only]
        pub id: i64,
        pub title: String,
        pub body: Option<String>,
        pub pinned: bool,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("outline_sdk=info")),
        )
        .init();

    let config = DatabaseConfig::from_env()?;
    ensure_database_exists(&config.url).await?;
    let db = Database::connect(&config).await?;

    OutlineMigrator::new()
        .register(Outline::<Note>::of(config.case)?, "id")?
        .migrate(&db)
        .await?;

    let state = AppState::from_config(db, &config);
    let app = common_routes_with_ready(state.clone()).merge(entity_routes::<Note>(state)?);
    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    let port = listener.local_addr()?.port();
    tracing::info!("Example consumer listening on http://127.0.0.1:{}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
