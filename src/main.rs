use library_loans::{
    adapters::{
        mock::{LoanRepository as InMemoryLoanRepository, PenaltyStore as InMemoryPenaltyStore},
        postgres::{PostgresLoanRepository, PostgresPenaltyStore},
    },
    api::{handlers::AppState, router::create_router},
    application::loan::ServiceDependencies,
    config::Config,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_loans=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Initialize adapters
    let service_deps = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Connected to PostgreSQL, migrations applied");

            ServiceDependencies {
                loan_repository: Arc::new(PostgresLoanRepository::new(pool.clone())),
                penalty_store: Arc::new(PostgresPenaltyStore::new(pool)),
            }
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage");
            ServiceDependencies {
                loan_repository: Arc::new(InMemoryLoanRepository::new()),
                penalty_store: Arc::new(InMemoryPenaltyStore::new()),
            }
        }
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
