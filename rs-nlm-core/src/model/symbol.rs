use std::fmt;

use serde::{Deserialize, Serialize};

/// A single unit of the chain alphabet.
///
/// Ordinary text is made of `Char` symbols. The two sentinels never occur in
/// text: they are recorded as transitions so that a compiled chain learns where
/// paragraphs and documents end.
///
/// The derived ordering is only used to give compiled samplers a stable layout.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
	Char(char),
	EndOfParagraph,
	EndOfDocument,
}

/// A chain context: the `n` most recent symbols.
pub type Context = Vec<Symbol>;

impl Symbol {
	/// Returns `true` for `EndOfParagraph` and `EndOfDocument`.
	pub fn is_sentinel(&self) -> bool {
		!matches!(self, Symbol::Char(_))
	}
}

/// The zero value returned by an empty sampler.
impl Default for Symbol {
	fn default() -> Self {
		Symbol::Char('\0')
	}
}

impl From<char> for Symbol {
	fn from(c: char) -> Self {
		Symbol::Char(c)
	}
}

impl fmt::Display for Symbol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Symbol::Char(c) => write!(f, "{c}"),
			Symbol::EndOfParagraph => f.write_str("<EOP>"),
			Symbol::EndOfDocument => f.write_str("<EOD>"),
		}
	}
}

/// Converts a string into its symbols, one per Unicode code point.
pub fn to_symbols(text: &str) -> Vec<Symbol> {
	text.chars().map(Symbol::Char).collect()
}

/// Splits a generated symbol sequence into paragraphs.
///
/// `EndOfParagraph` separates paragraphs, `EndOfDocument` is dropped, and empty
/// segments (a walk cut right after a paragraph break) are skipped.
pub fn paragraphs(symbols: &[Symbol]) -> Vec<String> {
	symbols
		.split(|s| *s == Symbol::EndOfParagraph)
		.map(|segment| {
			segment
				.iter()
				.filter_map(|s| match s {
					Symbol::Char(c) => Some(*c),
					_ => None,
				})
				.collect::<String>()
		})
		.filter(|p| !p.is_empty())
		.collect()
}
