use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;
use warp::Filter;

use recipe_vault::{ingredients, recipes, rejections, tags, users, Config};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(8)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::error!("failed to run migrations: {e}");
        std::process::exit(1);
    }

    let routes = users::routes(&pool, &config)
        .or(recipes::routes(&pool, &config))
        .or(tags::routes(&pool, &config))
        .or(ingredients::routes(&pool, &config))
        .recover(rejections::handle_rejection);

    tracing::info!("listening on {}", config.bind_addr);

    warp::serve(routes).run(config.bind_addr).await;
}
