use clap::Parser;
use emove_api::remote::RemoteApi;
use emove_api::{AppState, ConsoleState, create_app};

/// Command line arguments for the electromove console server
#[derive(Parser, Debug)]
#[command(name = "electromove-console")]
#[command(about = "ElectroMove charging network operator console")]
struct Args {
    /// Base URL of the upstream data API
    #[arg(long, default_value = "http://localhost:3000")]
    upstream: String,

    /// Port to bind the server to
    #[arg(short, long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt().pretty().init();

    let remote = RemoteApi::new(args.upstream.clone());
    let mut console = ConsoleState::new();

    // Seed the console from upstream; an unreachable upstream is not fatal,
    // the operator can POST /refresh later.
    match remote.fetch_snapshot().await {
        Ok(snapshot) => {
            tracing::info!(
                "Loaded {} stations, {} customers, {} prices from {}",
                snapshot.stations.len(),
                snapshot.customers.len(),
                snapshot.prices.len(),
                args.upstream
            );
            console.store.replace_all(snapshot.stations);
            console.prices.replace_all(snapshot.prices);
            console.customers = snapshot.customers;
        }
        Err(error) => {
            tracing::warn!("Initial load from {} failed: {}", args.upstream, error);
        }
    }

    // Build our application with routes
    let app = create_app(AppState::new(console, remote));

    // Run our app with hyper
    let bind_addr = format!("0.0.0.0:{}", args.port);
    tracing::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", bind_addr, e))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    Ok(())
}
