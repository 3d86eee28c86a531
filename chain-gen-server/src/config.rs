use std::path::PathBuf;

use clap::Parser;

use chain_gen_core::WalkInput;
use chain_gen_core::model::walk_input::{DEFAULT_MAX_STEPS, DEFAULT_STOPPING_CHANCE};

/// Chain generation HTTP server configuration
///
/// Every option can also be set from the environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "chain-gen-server")]
#[command(about = "Markov-chain text generation HTTP server")]
pub struct ServerConfig {
	/// Address to listen on
	#[arg(long, env = "CHAIN_GEN_HOST", default_value = "127.0.0.1")]
	pub host: String,

	/// Port to listen on
	#[arg(long, env = "CHAIN_GEN_PORT", default_value = "5000")]
	pub port: u16,

	/// Dataset file loaded at startup and overwritten by uploads
	#[arg(long, env = "CHAIN_GEN_DATASET", default_value = "./resources/data.json")]
	pub dataset_path: PathBuf,

	/// Default probability of stopping after each transition (0.0..=1.0)
	#[arg(long, env = "CHAIN_GEN_STOPPING_CHANCE", default_value_t = DEFAULT_STOPPING_CHANCE, value_parser = parse_stopping_chance)]
	pub stopping_chance: f64,

	/// Default maximum number of tokens per generation
	#[arg(long, env = "CHAIN_GEN_MAX_STEPS", default_value_t = DEFAULT_MAX_STEPS, value_parser = parse_max_steps)]
	pub max_steps: usize,

	/// Users allowed to call the API (comma-separated)
	#[arg(long = "whitelist", env = "WHITELISTED_USER_IDS", value_delimiter = ',')]
	pub whitelist: Vec<String>,

	/// DANGEROUS: authorize every caller regardless of the whitelist
	#[arg(long, env = "CHAIN_GEN_ALLOW_ALL")]
	pub allow_all: bool,
}

impl ServerConfig {
	/// Walk defaults applied when a generate request does not override them.
	pub fn walk_input(&self) -> Result<WalkInput, chain_gen_core::Error> {
		WalkInput::new(self.stopping_chance, self.max_steps)
	}

	/// Whether `user_id` may use the API.
	///
	/// Without `allow_all`, an empty whitelist authorizes nobody.
	pub fn is_authorized(&self, user_id: Option<&str>) -> bool {
		if self.allow_all {
			return true;
		}
		let Some(id) = user_id.map(str::trim).filter(|id| !id.is_empty()) else {
			return false;
		};
		self.whitelist.iter().any(|allowed| allowed.trim() == id)
	}
}

fn parse_stopping_chance(value: &str) -> Result<f64, String> {
	let chance: f64 = value.trim().parse().map_err(|_| format!("invalid number '{value}'"))?;
	WalkInput::default()
		.set_stopping_chance(chance)
		.map(|_| chance)
		.map_err(|e| e.to_string())
}

fn parse_max_steps(value: &str) -> Result<usize, String> {
	let max_steps: usize = value.trim().parse().map_err(|_| format!("invalid integer '{value}'"))?;
	WalkInput::default()
		.set_max_steps(max_steps)
		.map(|_| max_steps)
		.map_err(|e| e.to_string())
}
