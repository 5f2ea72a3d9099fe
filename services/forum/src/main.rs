use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::database::{DatabaseConfig, health_check};
use forum::{
    AppState, aggregator,
    config::ForumConfig,
    db,
    routes,
    seed::{self, SeedData},
    service::ForumService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting forum service");

    let config = ForumConfig::from_env()?;

    // Initialize database connection pool and schema
    let db_config = DatabaseConfig::from_env()?;
    let pool = db::connect(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let service = ForumService::new(pool.clone(), config.login_limits());

    if let Some(dir) = &config.seed_dir {
        info!("Seeding catalog from {}", dir.display());
        let data = SeedData::load_dir(dir)?;
        seed::ingest(&pool, &data).await?;

        for entry in aggregator::tagged_only(service.list_movies_with_genres().await?) {
            info!("{}: {}", entry.movie.title, entry.genres.join(", "));
        }
        for entry in service.list_genres_with_movies().await? {
            info!("{}: {}", entry.genre.name, entry.movies.join(", "));
        }
    }

    let app_state = AppState {
        service,
        cookies: config.cookie_policy(),
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Forum service listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
