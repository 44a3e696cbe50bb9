use std::net::SocketAddr;
use std::sync::Arc;

use aerovia_api::{app, AppState, AuthConfig};
use aerovia_cache::{Cache, RedisCache};
use aerovia_core::repository::{BookingStore, FlightStore, UserStore};
use aerovia_ledger::{BookingLedger, FlightService, UserService};
use aerovia_store::{DbClient, PostgresBookingStore, PostgresFlightStore, PostgresUserStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aerovia_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = aerovia_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Aerovia API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let cache: Arc<dyn Cache> = Arc::new(
        RedisCache::new(&config.redis.url).expect("Failed to create Redis client"),
    );

    let flight_store: Arc<dyn FlightStore> =
        Arc::new(PostgresFlightStore::new(db.pool.clone()));
    let booking_store: Arc<dyn BookingStore> =
        Arc::new(PostgresBookingStore::new(db.pool.clone()));
    let user_store: Arc<dyn UserStore> = Arc::new(PostgresUserStore::new(db.pool.clone()));

    let flights = Arc::new(FlightService::new(
        flight_store,
        cache.clone(),
        config.cache_ttls.clone(),
    ));
    let ledger = Arc::new(BookingLedger::new(
        flights.clone(),
        booking_store,
        user_store.clone(),
        cache,
        config.cache_ttls.clone(),
    ));
    let users = Arc::new(UserService::new(user_store));

    let app_state = AppState {
        flights,
        ledger,
        users,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
