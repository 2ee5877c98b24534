// Server loop module
// Accepts connections until shutdown is signalled

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinSet;

use super::connection::serve_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections until `shutdown` is notified, then abort every
/// connection still in flight and wait for those tasks to finish.
///
/// Aborting a connection also aborts the endpoint task it is waiting on,
/// and any running script child is killed on drop.
pub async fn run_server(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) -> std::io::Result<()> {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connections.spawn(serve_connection(stream, peer_addr, Arc::clone(&state)));
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = joined {
                    if e.is_panic() {
                        logger::log_error(&format!("Connection task panicked: {e}"));
                    }
                }
            }

            () = shutdown.notified() => break,
        }
    }

    drop(listener);
    logger::log_shutdown(connections.len());
    connections.shutdown().await;
    Ok(())
}
