use std::sync::Arc;

use axum::Router;
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::deadpool::Pool;
use dotenv::dotenv;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod blog;
mod config;
mod error;
mod identity;
mod json;
mod schema;

use config::ServerConfig;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub type DieselPool = Pool<AsyncPgConnection>;

#[derive(Clone)]
pub struct App {
    pub diesel: DieselPool,
    pub config: Arc<ServerConfig>,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::new_from_env();

    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
    let diesel = Pool::builder(manager)
        .max_size(10)
        .build()
        .expect("couldn't build the database pool");

    let app = App {
        diesel,
        config: Arc::new(config),
    };

    let router = Router::new()
        .nest("/posts", blog::routes::route())
        .nest("/identity", identity::routes::route())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app.clone());

    let listener = tokio::net::TcpListener::bind(app.config.listen_addr)
        .await
        .expect("couldn't bind the listen address");
    tracing::info!("listening on {}", app.config.listen_addr);
    axum::serve(listener, router).await.expect("server error");
}
