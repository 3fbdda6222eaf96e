use axum::extract::Extension;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use stagehub::config::{AppConfig, ContactConfig};
use stagehub::error::AppError;
use stagehub::telemetry;
use stagehub::workflows::placement::{
    placement_router, AdminContact, AllocationResolver, ApplicationDesk, ApplicationRepository,
    LoggingMessenger, MemoryStore, Messenger, NotificationCenter, NotificationRepository,
    PlacementState, ProposalDesk, ProposalRepository, RequestDesk, RequestRepository,
    UserDirectory,
};
use tracing::info;

mod demo;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: Arc<PrometheusHandle>,
}

#[derive(Parser, Debug)]
#[command(
    name = "Internship Placement Coordinator",
    about = "Run the internship placement coordination service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk the allocation scenario end to end against the in-memory store
    Demo,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Demo => demo::run(),
    }
}

/// Wire the placement services over one shared store.
fn build_placement_state(store: &MemoryStore, contact: &ContactConfig) -> Arc<PlacementState> {
    let directory: Arc<dyn UserDirectory> = Arc::new(store.clone());
    let proposals: Arc<dyn ProposalRepository> = Arc::new(store.clone());
    let requests: Arc<dyn RequestRepository> = Arc::new(store.clone());
    let applications: Arc<dyn ApplicationRepository> = Arc::new(store.clone());
    let notifications: Arc<dyn NotificationRepository> = Arc::new(store.clone());
    let messenger: Arc<dyn Messenger> = Arc::new(LoggingMessenger);

    let center = Arc::new(NotificationCenter::new(
        notifications,
        messenger,
        AdminContact {
            email: contact.admin_email.clone(),
            sms_number: contact.admin_sms.clone(),
        },
    ));

    Arc::new(PlacementState {
        directory: directory.clone(),
        resolver: AllocationResolver::new(directory.clone(), proposals.clone(), requests.clone()),
        proposals: ProposalDesk::new(proposals, center.clone()),
        requests: RequestDesk::new(requests, directory, center.clone()),
        applications: ApplicationDesk::new(applications, center.clone()),
        center,
    })
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = MemoryStore::new();
    let placement = build_placement_state(&store, &config.contact);

    let app = placement_router(placement)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "internship placement coordinator ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
