//! Serve command - runs the account routes behind the authentication gate.

use tokio::signal::unix::{SignalKind, signal};
use yagogame::{
    Directory,
    backend::{backend_label, database::SqlxBackend},
    service,
};

use crate::backend::create_directory;
use crate::cli::ServeArgs;

/// Run the server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let directory = create_directory(&args.backend_config).await?;
    let users = directory.count().await?;
    tracing::info!(
        backend = backend_label(directory.store().as_ref()),
        users,
        "Identity store ready"
    );

    let app = service::router(directory.clone());

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!("yagogame server listening on http://{local_addr}");
    println!();
    println!("Available endpoints:");
    println!("  GET  /health                      - Health and user count");
    println!("  POST /api/v0/RegisterUser         - Register the credentials in the headers");
    println!("  POST /api/v0/RemoveUser           - Remove the caller");
    println!("  POST /api/v0/ChangeUserRequisites - Change the caller's login and password");
    println!("  GET  /api/v0/WhoAmI               - Show the caller's identity");
    println!();
    println!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_store(&directory).await;
    println!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Failed to set up signal handlers: {e}");
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
    }
}

/// Return pooled database connections before exit.
async fn close_store(directory: &Directory) {
    if let Some(sql) = directory.as_any().downcast_ref::<SqlxBackend>() {
        sql.close().await;
        tracing::info!("Database connections closed");
    }
}
