use clap::Parser;
use std::sync::Arc;
use tokio::sync::Notify;

mod config;
mod handler;
mod http;
mod logger;
mod script;
mod server;

/// HTTP front-end that hands authentication and contact-form submissions
/// to external scripts.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Opts {
    /// Port to listen on (overrides server.port, default 8000)
    port: Option<u16>,

    /// Configuration file, with or without extension (default: ./config.toml if present)
    #[arg(long)]
    config: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();

    let mut cfg = config::Config::load_from(opts.config.as_deref())?;
    if let Some(port) = opts.port {
        cfg.server.port = port;
    }
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        println!("[CONFIG] Using {workers} worker threads");
    } else {
        println!("[CONFIG] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(config::AppState::new(&cfg)?);
    let listener = server::create_listener(addr)?;

    logger::log_server_start(&addr, &cfg, &state.scripts);
    for script in [&state.scripts.authenticate, &state.scripts.contact] {
        if !script.is_file() {
            logger::log_warning(&format!("Script not found: {}", script.display()));
        }
    }

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    server::run_server(listener, state, shutdown).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_argument() {
        let opts = Opts::try_parse_from(["mail_gateway", "8080"]).unwrap();
        assert_eq!(opts.port, Some(8080));
        assert!(opts.config.is_none());

        let opts = Opts::try_parse_from(["mail_gateway"]).unwrap();
        assert_eq!(opts.port, None);
    }

    #[test]
    fn test_invalid_port_is_usage_error() {
        for arg in ["abc", "70000", "-1"] {
            let err = Opts::try_parse_from(["mail_gateway", arg]).unwrap_err();
            assert_ne!(err.exit_code(), 0, "{arg}");
            assert!(err.use_stderr(), "{arg}");
        }
    }

    #[test]
    fn test_config_flag() {
        let opts = Opts::try_parse_from(["mail_gateway", "--config", "/etc/gateway", "9000"]).unwrap();
        assert_eq!(opts.config.as_deref(), Some("/etc/gateway"));
        assert_eq!(opts.port, Some(9000));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Opts::command().debug_assert();
        assert!(Opts::try_parse_from(["mail_gateway", "1", "2"]).is_err());
    }
}
