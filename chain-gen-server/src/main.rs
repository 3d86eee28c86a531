use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use clap::Parser;

use chain_gen_core::ChainStore;

mod config;
mod routes;

use config::ServerConfig;
use routes::AppState;

/// Largest accepted dataset upload.
const MAX_DATASET_BYTES: usize = 64 * 1024 * 1024;

/// Main entry point for the server.
///
/// Reads the configuration from the command line and environment, loads the dataset file if
/// it exists, and starts an Actix-web HTTP server sharing one `ChainStore`
/// across all workers.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = ServerConfig::parse();
	if config.allow_all {
		log::warn!("CHAIN_GEN_ALLOW_ALL is set, every caller is authorized");
	} else if config.whitelist.iter().all(|id| id.trim().is_empty()) {
		log::warn!("WHITELISTED_USER_IDS is empty, every request will be rejected");
	}

	let store = ChainStore::new();
	match store.load_file(&config.dataset_path) {
		Ok(Some(table)) => log::info!("Loaded {} ({} entries)", config.dataset_path.display(), table.len()),
		Ok(None) => log::info!("Waiting for a dataset upload"),
		Err(e) => log::error!("Failed to load {}: {}", config.dataset_path.display(), e),
	}

	let bind = (config.host.clone(), config.port);
	let state = AppState::new(store, config)
		.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
	let state = web::Data::new(state);

	log::info!("Listening on {}:{}", bind.0, bind.1);
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(state.clone())
			.app_data(web::PayloadConfig::new(MAX_DATASET_BYTES))
			.configure(routes::configure)
	})
		.workers(num_cpus::get())
		.bind(bind)?
		.run()
		.await
}
