use std::fmt;

use thiserror::Error;

/// Part of a document rejected during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPart {
	Title,
	/// Zero-based paragraph index.
	Paragraph(usize),
}

impl fmt::Display for TextPart {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TextPart::Title => f.write_str("title"),
			TextPart::Paragraph(i) => write!(f, "paragraph {i}"),
		}
	}
}

#[derive(Error, Debug)]
pub enum NlmError {
	#[error("Chain order must be >= 1, got {0}")]
	InvalidOrder(usize),

	#[error("Chain order mismatch: expected {expected}, got {got}")]
	OrderMismatch { expected: usize, got: usize },

	#[error("Training data error: document {document} {part} has {length} symbols, chain order is {order}")]
	TrainingData {
		document: usize,
		part: TextPart,
		length: usize,
		order: usize,
	},

	#[error("Training data error: corpus contains no documents")]
	EmptyCorpus,

	#[error("Training data error: document {document} has no paragraphs")]
	EmptyDocument { document: usize },

	#[error("Corpus unavailable ({source_name}): {reason}")]
	CorpusUnavailable { source_name: String, reason: String },

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Snapshot error: {0}")]
	Snapshot(#[from] postcard::Error),
}

pub type Result<T> = std::result::Result<T, NlmError>;
