use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{NlmError, Result};
use crate::io;

/// A training document: a title and its paragraphs, in order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Document {
	pub title: String,
	pub paragraphs: Vec<String>,
}

impl Document {
	pub fn new<T, P, S>(title: T, paragraphs: P) -> Self
	where
		T: Into<String>,
		P: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self { title: title.into(), paragraphs: paragraphs.into_iter().map(Into::into).collect() }
	}

	/// Parses a plain text document.
	///
	/// The first non-empty line is the title. The rest of the text is split on
	/// blank lines, each block becoming one paragraph with its lines joined by
	/// a space.
	pub fn parse(text: &str) -> Option<Self> {
		let mut lines = text.lines().skip_while(|l| l.trim().is_empty());
		let title = lines.next()?.trim().to_owned();

		let mut paragraphs = Vec::new();
		let mut current: Vec<&str> = Vec::new();
		for line in lines {
			let line = line.trim();
			if line.is_empty() {
				if !current.is_empty() {
					paragraphs.push(current.join(" "));
					current.clear();
				}
			} else {
				current.push(line);
			}
		}
		if !current.is_empty() {
			paragraphs.push(current.join(" "));
		}

		Some(Self { title, paragraphs })
	}
}

/// Source of training documents, injected into the model at startup.
pub trait CorpusLoader {
	/// Loads every document of the corpus.
	///
	/// # Errors
	/// Returns `CorpusUnavailable` if the corpus cannot be read.
	fn load_corpus(&self) -> Result<Vec<Document>>;
}

/// In-memory corpus.
#[derive(Clone, Debug, Default)]
pub struct StaticCorpus {
	documents: Vec<Document>,
}

impl StaticCorpus {
	pub fn new(documents: Vec<Document>) -> Self {
		Self { documents }
	}

	/// A small lorem ipsum corpus, good enough to produce placeholder text.
	pub fn lorem_ipsum() -> Self {
		Self::new(vec![
			Document::new("Lorem Ipsum", [
				"Lorem ipsum dolor sit amet, consectetur adipiscing elit. Donec aliquam eros at venenatis vulputate. Vestibulum ullamcorper est et euismod tristique. Morbi sit amet facilisis sem, eu dignissim massa. Quisque gravida, dolor id maximus pharetra, tortor massa mattis arcu, sit amet porttitor sem libero ut est.",
				"Nullam feugiat justo ac bibendum elementum. Vestibulum volutpat urna vel felis venenatis ultricies. Nulla mauris ante, volutpat ac eros sit amet, volutpat imperdiet ex. Integer finibus tellus ut metus luctus, pellentesque interdum quam blandit. Aenean luctus ipsum at quam sagittis euismod.",
				"Proin dignissim accumsan ipsum ut rutrum. Vestibulum sit amet consectetur dui. Nunc sagittis rutrum arcu, quis vehicula libero volutpat non. Fusce consectetur ligula lacus, a viverra dolor tincidunt ut. Curabitur eget tincidunt dolor.",
			]),
			Document::new("Dolor Sit Amet", [
				"Quisque lorem sapien, luctus non aliquet et, dictum non purus. Praesent ante felis, tempor a risus et, malesuada tristique ante. Suspendisse non urna viverra, consequat eros in, rhoncus risus. Pellentesque quis diam ut sapien molestie molestie.",
				"Etiam porta ut ex vel euismod. In hac habitasse platea dictumst. Donec mauris ligula, varius nec felis in, dapibus accumsan diam. Aliquam sed lorem blandit, vestibulum massa consectetur, gravida lacus.",
			]),
			Document::new("Consectetur Adipiscing", [
				"Vestibulum lectus augue, consectetur vel hendrerit et, rhoncus quis quam. Integer eu rutrum massa, in tempus dui. Aenean convallis ex vitae velit molestie, ut accumsan felis dictum. Sed rutrum quis ex in ornare.",
				"Morbi dictum mi vitae nulla dictum, id scelerisque mauris semper. Praesent maximus metus tortor, nec ultricies felis mattis id. In purus justo, euismod eu lorem nec, efficitur vestibulum libero. Donec ultricies eleifend lorem sed volutpat.",
			]),
		])
	}
}

impl CorpusLoader for StaticCorpus {
	fn load_corpus(&self) -> Result<Vec<Document>> {
		Ok(self.documents.clone())
	}
}

/// Corpus made of every `.txt` file of a directory, see [`Document::parse`].
///
/// Files are read in name order. Files without any non-empty line are skipped.
#[derive(Clone, Debug)]
pub struct DirectoryCorpus {
	folder: PathBuf,
}

impl DirectoryCorpus {
	pub fn new<P: AsRef<Path>>(folder: P) -> Self {
		Self { folder: io::normalize_folder(folder.as_ref()) }
	}

	fn unavailable(&self, reason: impl ToString) -> NlmError {
		NlmError::CorpusUnavailable { source_name: self.folder.display().to_string(), reason: reason.to_string() }
	}
}

impl CorpusLoader for DirectoryCorpus {
	fn load_corpus(&self) -> Result<Vec<Document>> {
		if !self.folder.is_dir() {
			return Err(self.unavailable("not a directory"));
		}

		let files = io::list_files(&self.folder, "txt").map_err(|e| self.unavailable(e))?;
		let mut documents = Vec::with_capacity(files.len());
		for file in files {
			let text = io::read_file(self.folder.join(&file)).map_err(|e| self.unavailable(format!("{file}: {e}")))?;
			match Document::parse(&text) {
				Some(document) => documents.push(document),
				None => debug!(file = %file, "skipping empty corpus file"),
			}
		}

		info!(folder = %self.folder.display(), documents = documents.len(), "corpus loaded");
		Ok(documents)
	}
}
