use axum::{routing::get, Router};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::{env, net::SocketAddr};
use tracing_subscriber;
use anyhow::Result;

mod routes;
mod models;
mod stats;
mod store;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    let app = Router::new()
        .merge(routes::session::routes(pool.clone()))
        .merge(routes::entries::routes(pool.clone()))
        .merge(routes::summary::routes(pool.clone()))
        .merge(routes::calendar::routes(pool.clone()))
        .route("/health", get(|| async { "✅ Backend up" }));

    let addr = SocketAddr::from(([0, 0, 0, 0], 3060));
    tracing::info!("🧠 Server running at {}", addr);

    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        app.into_make_service(),
    )
    .await?;

    Ok(())
}
