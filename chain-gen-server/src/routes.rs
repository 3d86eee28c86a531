use actix_web::{get, put, web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use chain_gen_core::{ChainStore, Error, Validation, WalkInput};

use crate::config::ServerConfig;

/// Header carrying the caller's user id.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// State shared by all workers.
///
/// The store swaps its table atomically, so no lock wraps it.
pub struct AppState {
	pub store: ChainStore,
	pub config: ServerConfig,
	/// Validated walk defaults from `config`.
	pub walk_input: WalkInput,
}

impl AppState {
	/// # Errors
	/// Returns an error if the configured walk defaults are out of range.
	pub fn new(store: ChainStore, config: ServerConfig) -> Result<Self, Error> {
		let walk_input = config.walk_input()?;
		Ok(Self { store, config, walk_input })
	}
}

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	stopping_chance: Option<f64>,
	max_steps: Option<usize>,
}

impl GenerateParams {
	/// Applies the request overrides on top of the configured defaults.
	fn walk_input(&self, defaults: &WalkInput) -> Result<WalkInput, Error> {
		let mut input = *defaults;
		if let Some(chance) = self.stopping_chance {
			input.set_stopping_chance(chance)?;
		}
		if let Some(max_steps) = self.max_steps {
			input.set_max_steps(max_steps)?;
		}
		Ok(input)
	}
}

#[derive(Deserialize)]
struct DatasetQuery {
	strict: Option<bool>,
}

#[derive(Serialize)]
struct Status {
	loaded: bool,
	entries: usize,
}

/// Registers every endpoint on an actix service config.
pub fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated).service(put_dataset).service(get_status);
}

/// Returns a `403` response if the caller is not whitelisted.
fn reject_unauthorized(req: &HttpRequest, config: &ServerConfig) -> Option<HttpResponse> {
	let user_id = req.headers().get(USER_ID_HEADER).and_then(|v| v.to_str().ok());
	if config.is_authorized(user_id) {
		None
	} else {
		log::info!("Rejected request from {:?}", user_id);
		Some(HttpResponse::Forbidden().body("Not authorized."))
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Walks the active table and returns the generated text.
#[get("/v1/generate")]
async fn get_generated(
	req: HttpRequest,
	data: web::Data<AppState>,
	query: web::Query<GenerateParams>,
) -> impl Responder {
	if let Some(response) = reject_unauthorized(&req, &data.config) {
		return response;
	}

	let input = match query.walk_input(&data.walk_input) {
		Ok(input) => input,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};

	match data.store.generate(&input) {
		Ok(text) => HttpResponse::Ok().body(text),
		Err(Error::EmptyTable) => HttpResponse::ServiceUnavailable().body("Missing setup."),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

/// HTTP PUT endpoint `/v1/dataset`
///
/// Replaces the active table with the JSON snapshot in the request body and
/// persists it to the configured dataset path. A rejected snapshot leaves
/// both the active table and the file untouched.
#[put("/v1/dataset")]
async fn put_dataset(
	req: HttpRequest,
	data: web::Data<AppState>,
	query: web::Query<DatasetQuery>,
	body: web::Bytes,
) -> impl Responder {
	if let Some(response) = reject_unauthorized(&req, &data.config) {
		return response;
	}

	let validation = if query.strict.unwrap_or(false) { Validation::Strict } else { Validation::Lenient };
	let state = data.clone();
	let result = web::block(move || {
		state.store.persist_and_reload(&state.config.dataset_path, &body, validation)
	})
	.await;

	match result {
		Ok(Ok(table)) => {
			log::info!("Dataset replaced ({} entries)", table.len());
			HttpResponse::Ok().body("Setup done.")
		}
		Ok(Err(e @ (Error::Deserialization(_) | Error::Validation(_)))) => {
			log::warn!("Rejected dataset: {}", e);
			HttpResponse::BadRequest().body(e.to_string())
		}
		Ok(Err(e)) => {
			log::error!("Failed to store dataset: {}", e);
			HttpResponse::InternalServerError().body(e.to_string())
		}
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

/// HTTP GET endpoint `/v1/status`
#[get("/v1/status")]
async fn get_status(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
	if let Some(response) = reject_unauthorized(&req, &data.config) {
		return response;
	}

	let table = data.store.current();
	HttpResponse::Ok().json(Status {
		loaded: table.is_some(),
		entries: table.map_or(0, |table| table.len()),
	})
}

#[cfg(test)]
mod tests {
	use actix_web::http::StatusCode;
	use actix_web::{test, App};
	use clap::Parser;

	use super::*;

	const AB: &str = r#"{
		"A": {"token": "A", "conditions": [{"min": 0, "max": 1, "token": "B"}], "total": 1},
		"B": {"token": "B", "conditions": [], "total": 0}
	}"#;

	/// Server state writing to `dir`; an empty whitelist opts into `allow_all`.
	fn state(dir: &tempfile::TempDir, whitelist: &[&str]) -> web::Data<AppState> {
		let mut config = ServerConfig::try_parse_from(["chain-gen-server"]).unwrap();
		config.dataset_path = dir.path().join("data.json");
		config.whitelist = whitelist.iter().map(|s| s.to_string()).collect();
		config.allow_all = whitelist.is_empty();
		web::Data::new(AppState::new(ChainStore::new(), config).unwrap())
	}

	#[actix_web::test]
	async fn test_generate_before_setup() {
		let dir = tempfile::tempdir().unwrap();
		let app = test::init_service(App::new().app_data(state(&dir, &[])).configure(configure)).await;

		let req = test::TestRequest::get().uri("/v1/generate").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
	}

	#[actix_web::test]
	async fn test_setup_then_generate() {
		let dir = tempfile::tempdir().unwrap();
		let app = test::init_service(App::new().app_data(state(&dir, &[])).configure(configure)).await;

		let req = test::TestRequest::put().uri("/v1/dataset").set_payload(AB).to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);
		assert!(dir.path().join("data.json").exists());

		let req = test::TestRequest::get().uri("/v1/generate?stopping_chance=0").to_request();
		let body = test::call_and_read_body(&app, req).await;
		let text = String::from_utf8(body.to_vec()).unwrap();
		assert!(text == "A B" || text == "B", "{text}");

		let req = test::TestRequest::get().uri("/v1/status").to_request();
		let status: serde_json::Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(status["loaded"], true);
		assert_eq!(status["entries"], 2);
	}

	#[actix_web::test]
	async fn test_rejected_dataset_keeps_table() {
		let dir = tempfile::tempdir().unwrap();
		let data = state(&dir, &[]);
		data.store.reload(AB.as_bytes()).unwrap();
		let app = test::init_service(App::new().app_data(data.clone()).configure(configure)).await;

		let req = test::TestRequest::put().uri("/v1/dataset").set_payload("{ nope").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
		assert_eq!(data.store.current().unwrap().len(), 2);
		assert!(!dir.path().join("data.json").exists());

		let dangling = r#"{"A": {"token": "A", "conditions": [{"min": 0, "max": 1, "token": "Z"}], "total": 1}}"#;
		let req = test::TestRequest::put().uri("/v1/dataset?strict=true").set_payload(dangling).to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn test_invalid_parameters() {
		let dir = tempfile::tempdir().unwrap();
		let data = state(&dir, &[]);
		data.store.reload(AB.as_bytes()).unwrap();
		let app = test::init_service(App::new().app_data(data).configure(configure)).await;

		let req = test::TestRequest::get().uri("/v1/generate?stopping_chance=3").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn test_whitelist() {
		let dir = tempfile::tempdir().unwrap();
		let app = test::init_service(App::new().app_data(state(&dir, &["42"])).configure(configure)).await;

		let req = test::TestRequest::get().uri("/v1/status").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::FORBIDDEN);

		let req = test::TestRequest::get().uri("/v1/status").insert_header((USER_ID_HEADER, "42")).to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);
	}

	#[actix_web::test]
	async fn test_missing_whitelist_denies_everyone() {
		let dir = tempfile::tempdir().unwrap();
		let mut config = ServerConfig::try_parse_from(["chain-gen-server"]).unwrap();
		config.dataset_path = dir.path().join("data.json");
		let data = web::Data::new(AppState::new(ChainStore::new(), config).unwrap());
		let app = test::init_service(App::new().app_data(data.clone()).configure(configure)).await;

		let req = test::TestRequest::put()
			.uri("/v1/dataset")
			.insert_header((USER_ID_HEADER, "42"))
			.set_payload(AB)
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::FORBIDDEN);
		assert!(!data.store.is_loaded());

		let req = test::TestRequest::get().uri("/v1/generate").insert_header((USER_ID_HEADER, "")).to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::FORBIDDEN);
	}
}
