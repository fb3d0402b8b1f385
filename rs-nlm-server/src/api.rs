use actix_web::{get, web, HttpResponse, Responder};

use rs_nlm_core::CorpusModel;
use serde::{Deserialize, Serialize};

/// Upper bounds on the caps a client may ask for.
#[derive(Clone, Copy, Debug)]
pub struct Limits {
	pub title_max_len: usize,
	pub body_max_len: usize,
}

/// Data shared by every worker. The model is read-only, no lock is needed.
pub struct AppState {
	pub model: CorpusModel,
	pub limits: Limits,
}

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
pub struct GenerateParams {
	title_max: Option<usize>,
	body_max: Option<usize>,
}

impl GenerateParams {
	/// Resolves the caps, falling back to the configured limits.
	fn caps(&self, limits: &Limits) -> Result<(usize, usize), String> {
		let title_max = self.title_max.unwrap_or(limits.title_max_len);
		let body_max = self.body_max.unwrap_or(limits.body_max_len);

		if title_max > limits.title_max_len {
			return Err(format!("title_max must be <= {}", limits.title_max_len));
		}
		if body_max > limits.body_max_len {
			return Err(format!("body_max must be <= {}", limits.body_max_len));
		}
		Ok((title_max, body_max))
	}
}

/// Summary returned by `/v1/model`.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ModelInfo {
	pub title_order: usize,
	pub content_order: usize,
	pub title_contexts: usize,
	pub content_contexts: usize,
	pub title_starters: usize,
	pub content_starters: usize,
}

impl From<&CorpusModel> for ModelInfo {
	fn from(model: &CorpusModel) -> Self {
		Self {
			title_order: model.config().title_order,
			content_order: model.config().content_order,
			title_contexts: model.title_chain().len(),
			content_contexts: model.content_chain().len(),
			title_starters: model.title_starters().len(),
			content_starters: model.content_starters().len(),
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates one article and returns it as JSON `{ "title", "paragraphs" }`.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<AppState>, query: web::Query<GenerateParams>) -> impl Responder {
	let (title_max, body_max) = match query.caps(&data.limits) {
		Ok(caps) => caps,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	HttpResponse::Ok().json(data.model.generate(title_max, body_max))
}

/// HTTP GET endpoint `/v1/model`
#[get("/v1/model")]
async fn get_model(data: web::Data<AppState>) -> impl Responder {
	HttpResponse::Ok().json(ModelInfo::from(&data.model))
}

/// Registers every endpoint.
pub fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated).service(get_model);
}
