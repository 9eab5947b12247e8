use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mongodb::Client;

use marketpulse::services::alert_scheduler::AlertScheduler;
use marketpulse::services::mailer::MailQueue;
use marketpulse::services::polygon::PolygonClient;
use marketpulse::services::threshold_service::MongoThresholdStore;
use marketpulse::services::twelvedata::TwelveDataClient;
use marketpulse::services::user_service::MongoUserDirectory;
use marketpulse::services::db_init;
use marketpulse::{AppState, config, routes};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    // Mongo connection
    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");
    let db = client.database(&settings.mongodb_db);

    if let Err(e) = db_init::ensure_indexes(&db).await {
        tracing::warn!("index setup failed: {e}");
    }

    let twelvedata = TwelveDataClient::new(settings.twelvedata_api_key.clone());
    let polygon = PolygonClient::new(settings.polygon_api_key.clone());
    let thresholds = MongoThresholdStore::new(db.clone());

    // Background threshold evaluation; collaborators owned here, not by the
    // scheduler's callers.
    AlertScheduler::new(
        Arc::new(thresholds.clone()),
        Arc::new(twelvedata.clone()),
        Arc::new(MongoUserDirectory::new(db.clone())),
        Arc::new(MailQueue::new(db.clone())),
        Duration::from_secs(settings.alert_interval_secs),
    )
    .spawn();

    let state = AppState {
        db,
        settings: settings.clone(),
        twelvedata,
        polygon,
        thresholds,
    };

    let app = routes::app(state);

    let addr = SocketAddr::from((
        settings.host.parse::<std::net::IpAddr>().expect("invalid HOST"),
        settings.port,
    ));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app).await.expect("server error");
}
