use std::sync::Arc;

use clap::Parser;

mod cli;
mod config;
mod error;
mod handler;
mod http;
mod logger;
mod routing;
mod server;

use routing::RouteTable;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::Cli::parse();

    if args.genconfig {
        print!("{}", config::SAMPLE_CONFIG);
        return Ok(());
    }

    // An explicitly named file must exist; the default one is optional
    let cfg = match args.config.as_deref() {
        Some(path) => config::Config::load_from(path, true)?,
        None => config::Config::load_from(config::DEFAULT_CONFIG_PATH, false)?,
    };

    logger::init(&cfg.logging)?;

    let routes = match RouteTable::from_config(&cfg.routes) {
        Ok(routes) => routes,
        Err(e) => {
            logger::log_error(&format!("Invalid route configuration: {e}"));
            return Err(e.into());
        }
    };

    if args.check {
        println!("{}", cfg.to_toml()?);
        logger::log_routes(&routes);
        println!("Configuration OK");
        return Ok(());
    }

    // Create Tokio runtime, thread count follows `workers`
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, routes))
}

async fn async_main(
    cfg: config::Config,
    routes: RouteTable,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    let tls = if cfg.server.tls {
        Some(server::load_acceptor(&cfg.server.certfile, &cfg.server.keyfile)?)
    } else {
        None
    };

    let listener = server::create_listener(addr, cfg.server.backlog)?;

    logger::log_server_start(&addr, &cfg);
    logger::log_routes(&routes);

    let state = Arc::new(config::AppState::new(cfg, routes));
    server::start_signal_handler(Arc::clone(&state))?;
    server::start_server_loop(listener, state, tls).await;
    Ok(())
}
