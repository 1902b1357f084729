use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use application::services::{
    RatingService, RatingServiceDependencies, UserService, UserServiceDependencies,
};
use application::SystemClock;
use config::AppConfig;
use infrastructure::{
    create_pg_pool, BcryptPasswordHasher, PgCatalogRepository, PgRatingRepository,
    PgSessionRepository, PgUserRepository,
};
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env_with_defaults();
    config.validate()?;

    let pool = create_pg_pool(&config.database.url, config.database.max_connections).await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    let catalog_repository = Arc::new(PgCatalogRepository::new(pool.clone()));
    let rating_repository = Arc::new(PgRatingRepository::new(pool.clone()));
    let user_repository = Arc::new(PgUserRepository::new(pool.clone()));
    let session_repository = Arc::new(PgSessionRepository::new(pool));

    let password_hasher = match config.server.bcrypt_cost {
        Some(cost) => Arc::new(BcryptPasswordHasher::new(cost)),
        None => Arc::new(BcryptPasswordHasher::default()),
    };

    let rating_service = Arc::new(RatingService::new(RatingServiceDependencies {
        catalog_repository,
        rating_repository,
    }));
    let user_service = Arc::new(UserService::new(UserServiceDependencies {
        user_repository,
        session_repository,
        password_hasher,
        clock: Arc::new(SystemClock),
        session_ttl: chrono::Duration::hours(config.session.ttl_hours),
    }));

    let app = router(AppState::new(rating_service, user_service));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "rating service listening");
    axum::serve(listener, app).await?;

    Ok(())
}
