use std::path::PathBuf;
use std::time::Instant;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rs_nlm_core::{CorpusLoader, CorpusModel, DirectoryCorpus, ModelConfig, StaticCorpus};
use rs_nlm_server::api::{self, AppState, Limits};

#[derive(Parser)]
#[command(name = "rs-nlm-server", about = "Markov chain article generator")]
struct Cli {
	/// Address to bind
	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	/// Port to listen on
	#[arg(long, default_value = "5000")]
	port: u16,

	/// Directory of `.txt` training documents (built-in lorem ipsum if omitted)
	#[arg(long)]
	corpus: Option<PathBuf>,

	/// Model snapshot, loaded if present and written after training
	#[arg(long)]
	snapshot: Option<PathBuf>,

	/// Chain order of the title model
	#[arg(long, default_value = "5")]
	title_order: usize,

	/// Chain order of the body model
	#[arg(long, default_value = "6")]
	content_order: usize,

	/// Maximum number of generated title characters
	#[arg(long, default_value = "120")]
	title_max_len: usize,

	/// Maximum number of generated body characters
	#[arg(long, default_value = "5000")]
	body_max_len: usize,
}

/// Main entry point for the server.
///
/// Trains (or loads) the model once, then serves it read-only from every
/// worker.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let cli = Cli::parse();
	let config = ModelConfig { title_order: cli.title_order, content_order: cli.content_order };

	let loader: Box<dyn CorpusLoader> = match &cli.corpus {
		Some(folder) => Box::new(DirectoryCorpus::new(folder)),
		None => Box::new(StaticCorpus::lorem_ipsum()),
	};

	info!("Loading model...");
	let start = Instant::now();
	let model = match &cli.snapshot {
		Some(path) => CorpusModel::load_or_train(path, loader.as_ref(), config)?,
		None => CorpusModel::from_loader(loader.as_ref(), config)?,
	};
	info!("Time elapsed loading model: {:?}", start.elapsed());

	let state = web::Data::new(AppState {
		model,
		limits: Limits { title_max_len: cli.title_max_len, body_max_len: cli.body_max_len },
	});

	info!("Server starting on {}:{}", cli.host, cli.port);
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(state.clone())
			.configure(api::configure)
	})
		.bind((cli.host.as_str(), cli.port))?
		.run()
		.await?;

	Ok(())
}
