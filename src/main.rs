use helpdesk_directory::{
    api::{build_router, AppState},
    config::{Config, ObservabilityConfig},
    listing::ListingService,
    notifications::{LogMailer, MailTransport, NotificationDispatcher, SmtpMailer},
    realtime::{EventBroadcaster, InMemoryPresence},
    search::SearchService,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    init_tracing(&config.observability);

    tracing::info!(
        service = %config.observability.service_name,
        "Starting helpdesk directory v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = helpdesk_directory::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        }
    } else {
        tracing::info!("Prometheus metrics disabled in configuration");
    }

    // Open the search index
    let search = Arc::new(SearchService::new(config.search.clone()).await?);
    let stats = search.get_stats().await?;
    tracing::info!(
        documents = stats.total_documents,
        segments = stats.num_segments,
        path = %config.search.index_path.display(),
        "Search index ready"
    );

    // Notification transports
    let mailer: Arc<dyn MailTransport> = match SmtpMailer::from_config(&config.notifications) {
        Ok(Some(mailer)) => {
            tracing::info!("SMTP mail transport configured");
            Arc::new(mailer)
        }
        Ok(None) => {
            tracing::info!("Email delivery disabled; messages will be logged");
            Arc::new(LogMailer)
        }
        Err(e) => {
            tracing::warn!("SMTP configuration invalid: {}", e);
            tracing::warn!("Continuing with email delivery disabled");
            Arc::new(LogMailer)
        }
    };
    let broadcaster = Arc::new(EventBroadcaster::new(
        config.notifications.realtime_channel_capacity,
    ));
    // Fed through the connections endpoints by the socket gateway
    let presence = Arc::new(InMemoryPresence::new());

    let dispatcher = Arc::new(NotificationDispatcher::new(
        &config.notifications,
        mailer,
        broadcaster,
        presence.clone(),
    ));

    let listing = Arc::new(ListingService::new(search.clone()).with_dispatcher(dispatcher));

    let app_state = AppState::new(listing, search.clone())
        .with_listing_config(config.listing.clone())
        .with_presence(presence);

    let app = build_router(app_state).layer(TimeoutLayer::new(Duration::from_secs(
        config.server.request_timeout_secs,
    )));

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Accounts: http://{}/api/human_resource/accounts", http_addr);

    axum::serve(http_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Flush anything written without a realtime commit
    search.commit().await?;
    tracing::info!("Shutdown complete");

    Ok(())
}

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "helpdesk_directory={},tower_http=info",
            observability.log_level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
