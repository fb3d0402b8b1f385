use std::path::Path;
use std::sync::mpsc;
use std::thread;

use rand::Rng;
use rand::seq::IndexedRandom;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::builder::ChainBuilder;
use super::chain::CompiledChain;
use super::symbol::{Context, Symbol};
use crate::corpus::{CorpusLoader, Document};
use crate::error::{NlmError, Result, TextPart};

/// Chain orders of a `CorpusModel`.
///
/// Titles are short, so they use a shorter context than body text.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelConfig {
	pub title_order: usize,
	pub content_order: usize,
}

impl Default for ModelConfig {
	fn default() -> Self {
		Self { title_order: 5, content_order: 6 }
	}
}

/// A generated document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Article {
	pub title: String,
	pub paragraphs: Vec<String>,
}

/// Training state of a `CorpusModel`: two builders and the starter contexts.
///
/// Trainers fed with disjoint document sets can be merged, which is how
/// [`CorpusModel::train_parallel`] spreads the work over threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusTrainer {
	title: ChainBuilder,
	content: ChainBuilder,
	title_starters: Vec<Context>,
	content_starters: Vec<Context>,
}

impl CorpusTrainer {
	/// # Errors
	/// Returns `InvalidOrder` if an order of `config` is 0.
	pub fn new(config: ModelConfig) -> Result<Self> {
		Ok(Self {
			title: ChainBuilder::new(config.title_order)?,
			content: ChainBuilder::new(config.content_order)?,
			title_starters: Vec::new(),
			content_starters: Vec::new(),
		})
	}

	/// Feeds one document.
	///
	/// The document must have passed [`CorpusModel::validate`], otherwise its
	/// short parts are silently ignored by the builders.
	pub fn add_document(&mut self, document: &Document) {
		self.title_starters.push(prefix(&document.title, self.title.order()));
		self.title.add_text(&document.title, Symbol::EndOfDocument);

		let last = document.paragraphs.len().saturating_sub(1);
		for (i, paragraph) in document.paragraphs.iter().enumerate() {
			let end = if i == last { Symbol::EndOfDocument } else { Symbol::EndOfParagraph };
			self.content_starters.push(prefix(paragraph, self.content.order()));
			self.content.add_text(paragraph, end);
		}
	}

	/// Appends the counts and starters of `other`.
	///
	/// # Errors
	/// Returns `OrderMismatch` if the trainers use different orders.
	pub fn merge(&mut self, other: Self) -> Result<()> {
		self.title.merge(&other.title)?;
		self.content.merge(&other.content)?;
		self.title_starters.extend(other.title_starters);
		self.content_starters.extend(other.content_starters);
		Ok(())
	}

	/// Compiles both chains. The builders are dropped.
	pub fn finish(self) -> CorpusModel {
		CorpusModel {
			config: ModelConfig { title_order: self.title.order(), content_order: self.content.order() },
			title: self.title.compile(),
			content: self.content.compile(),
			title_starters: self.title_starters,
			content_starters: self.content_starters,
		}
	}
}

/// First `order` symbols of `text`.
fn prefix(text: &str, order: usize) -> Context {
	text.chars().take(order).map(Symbol::Char).collect()
}

/// Trained title and body chains, ready to generate articles.
///
/// ## Responsibilities
/// - Validate a corpus and train both chains from it
/// - Keep the contexts that opened a title or a paragraph, to seed generation
/// - Generate articles, concurrently, from shared references
/// - Save and load itself as a binary snapshot
///
/// ## Invariants
/// - Both starter sets are non-empty
/// - Every title starter has `title_order` symbols and is a context of the
///   title chain (same for paragraphs and the content chain)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CorpusModel {
	config: ModelConfig,
	title: CompiledChain,
	content: CompiledChain,
	title_starters: Vec<Context>,
	content_starters: Vec<Context>,
}

impl CorpusModel {
	/// Checks that every document can be trained with `config`.
	///
	/// # Errors
	/// - `EmptyCorpus` if there is no document
	/// - `EmptyDocument` if a document has no paragraph
	/// - `TrainingData` if a title or a paragraph is shorter than its order
	pub fn validate(config: &ModelConfig, documents: &[Document]) -> Result<()> {
		if documents.is_empty() {
			return Err(NlmError::EmptyCorpus);
		}

		let check = |document: usize, part: TextPart, text: &str, order: usize| {
			let length = text.chars().count();
			if length < order {
				return Err(NlmError::TrainingData { document, part, length, order });
			}
			Ok(())
		};

		for (i, document) in documents.iter().enumerate() {
			check(i, TextPart::Title, &document.title, config.title_order)?;
			if document.paragraphs.is_empty() {
				return Err(NlmError::EmptyDocument { document: i });
			}
			for (p, paragraph) in document.paragraphs.iter().enumerate() {
				check(i, TextPart::Paragraph(p), paragraph, config.content_order)?;
			}
		}

		Ok(())
	}

	/// Trains a model from `documents` in a single pass.
	///
	/// # Errors
	/// Fails if `config` or the corpus is invalid, see [`CorpusModel::validate`].
	/// Nothing is trained in that case.
	pub fn train(config: ModelConfig, documents: &[Document]) -> Result<Self> {
		let mut trainer = CorpusTrainer::new(config)?;
		Self::validate(&config, documents)?;

		for document in documents {
			trainer.add_document(document);
		}

		let model = trainer.finish();
		model.log_summary(documents.len());
		Ok(model)
	}

	/// Trains a model using one thread per chunk of documents.
	///
	/// Produces the same model as [`CorpusModel::train`]: partial trainers are
	/// merged back in document order.
	///
	/// # Errors
	/// Same as [`CorpusModel::train`].
	pub fn train_parallel(config: ModelConfig, documents: &[Document]) -> Result<Self> {
		let mut trainer = CorpusTrainer::new(config)?;
		Self::validate(&config, documents)?;

		let chunks = num_cpus::get() * 8;
		let chunk_size = documents.len().div_ceil(chunks).max(1);

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| -> Result<()> {
			for (index, chunk) in documents.chunks(chunk_size).enumerate() {
				let tx = tx.clone();
				let mut partial = CorpusTrainer::new(config)?;
				scope.spawn(move || {
					for document in chunk {
						partial.add_document(document);
					}
					// The receiver outlives the scope.
					let _ = tx.send((index, partial));
				});
			}
			Ok(())
		})?;
		drop(tx);

		let mut partials: Vec<(usize, CorpusTrainer)> = rx.iter().collect();
		partials.sort_by_key(|(index, _)| *index);
		debug!(chunks = partials.len(), chunk_size, "merging partial trainers");
		for (_, partial) in partials {
			trainer.merge(partial)?;
		}

		let model = trainer.finish();
		model.log_summary(documents.len());
		Ok(model)
	}

	/// Loads the corpus from `loader` and trains a model from it.
	///
	/// # Errors
	/// Propagates loader errors unchanged, then training errors.
	pub fn from_loader<L: CorpusLoader + ?Sized>(loader: &L, config: ModelConfig) -> Result<Self> {
		let documents = loader.load_corpus()?;
		Self::train_parallel(config, &documents)
	}

	/// Loads the snapshot at `snapshot` if it exists and was trained with
	/// `config`, otherwise trains from `loader` and writes the snapshot.
	///
	/// # Errors
	/// Loader and training errors, or I/O errors while writing the snapshot.
	pub fn load_or_train<L: CorpusLoader + ?Sized>(snapshot: &Path, loader: &L, config: ModelConfig) -> Result<Self> {
		if snapshot.exists() {
			match Self::load(snapshot) {
				Ok(model) if model.config == config => {
					info!(path = %snapshot.display(), "model snapshot loaded");
					return Ok(model);
				}
				Ok(model) => warn!(
					path = %snapshot.display(),
					snapshot = ?model.config,
					expected = ?config,
					"snapshot was trained with another config, retraining"
				),
				Err(e) => warn!(path = %snapshot.display(), error = %e, "unreadable snapshot, retraining"),
			}
		}

		let model = Self::from_loader(loader, config)?;
		model.save(snapshot)?;
		info!(path = %snapshot.display(), "model snapshot written");
		Ok(model)
	}

	/// Serializes the model to `path` with postcard.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(path, bytes)?;
		Ok(())
	}

	/// Reads a model written by [`CorpusModel::save`].
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = std::fs::read(path)?;
		Ok(postcard::from_bytes(&bytes)?)
	}

	pub fn config(&self) -> &ModelConfig {
		&self.config
	}

	pub fn title_chain(&self) -> &CompiledChain {
		&self.title
	}

	pub fn content_chain(&self) -> &CompiledChain {
		&self.content
	}

	pub fn title_starters(&self) -> &[Context] {
		&self.title_starters
	}

	pub fn content_starters(&self) -> &[Context] {
		&self.content_starters
	}

	/// Generates an article with the thread-local random generator.
	///
	/// `title_max_len` and `body_max_len` cap the number of symbols drawn after
	/// the starter context of each walk.
	pub fn generate(&self, title_max_len: usize, body_max_len: usize) -> Article {
		self.generate_with_rng(title_max_len, body_max_len, &mut rand::rng())
	}

	/// Same as [`CorpusModel::generate`] with an explicit random generator.
	pub fn generate_with_rng<R: Rng + ?Sized>(&self, title_max_len: usize, body_max_len: usize, rng: &mut R) -> Article {
		let title = match self.title_starters.choose(rng) {
			Some(start) => self.title.generate_text(start, title_max_len, rng).into_iter().next(),
			None => None,
		};
		let paragraphs = match self.content_starters.choose(rng) {
			Some(start) => self.content.generate_text(start, body_max_len, rng),
			None => Vec::new(),
		};

		Article { title: title.unwrap_or_default(), paragraphs }
	}

	fn log_summary(&self, documents: usize) {
		info!(
			documents,
			title_contexts = self.title.len(),
			content_contexts = self.content.len(),
			title_starters = self.title_starters.len(),
			content_starters = self.content_starters.len(),
			"model trained"
		);
	}
}
