use std::sync::Arc;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod network;
mod server;

use handler::static_files::StaticRoot;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Worker threads default to the number of CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let base_dir = cfg.resolve_base_dir()?;

    if !base_dir.join(&cfg.server.index_file).is_file() {
        logger::log_warning(&format!(
            "{} not found in {}; '/' will answer 404 until it exists",
            cfg.server.index_file,
            base_dir.display()
        ));
    }

    let listener = server::create_listener(addr)?;
    let root = StaticRoot::new(base_dir, cfg.server.index_file.clone());
    let lan_ip = network::local_ip();
    logger::log_server_start(&addr, root.base(), lan_ip, &cfg);

    let state = Arc::new(config::AppState::new(cfg, root));

    server::start_server_loop(listener, state, server::shutdown_signal()).await;
    Ok(())
}
