// Connection handling module
// Serves HTTP/1.1 on a single accepted TCP connection

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Serve one connection until the client closes it or it sits idle.
///
/// The connection timeout only bounds the wait for the next request's
/// headers; a request whose headers arrived runs to completion.
pub async fn serve_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    let io = TokioIo::new(stream);
    let idle_timeout = Duration::from_secs(state.config.performance.connection_timeout);

    let mut builder = http1::Builder::new();
    builder
        .keep_alive(state.config.performance.keep_alive)
        .timer(TokioTimer::new())
        .header_read_timeout(idle_timeout);

    let service_state = Arc::clone(&state);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
    );

    match conn.await {
        Ok(()) => {}
        Err(err) if err.is_timeout() => {
            logger::log_warning(&format!(
                "Connection from {peer_addr} idle for {} seconds, closing",
                idle_timeout.as_secs()
            ));
        }
        Err(err) => logger::log_connection_error(&err),
    }
}
