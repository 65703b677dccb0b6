/*!
	Composable grammars over abstract token streams.

	A grammar is a tree of [Pattern]s built from single-token predicates
	([unit]), fixed token runs ([series]) and the combinators [concat], [alt],
	[rep] (with [opt], [any], [some] and [n]), [except] and [end]. The same
	tree can be matched against a [TokenReader] into a [MatchResult],
	used to generate random token sequences it accepts, and printed as EBNF.
	A [TransformTable] reduces match results into domain values.
*/

mod generator;
mod matcher;
pub mod pattern;
mod printer;
pub mod result;
mod scan;
pub mod stream;
pub mod transform;

pub use crate::pattern::{
	Pattern,
	PatternKind,
	alt,
	any,
	concat,
	end,
	except,
	literal,
	n,
	opt,
	rep,
	series,
	some,
	token,
	unit,
};
pub use crate::printer::print_rules;
pub use crate::result::{MatchResult, Mismatch, MismatchLogger};
pub use crate::scan::scan;
pub use crate::stream::{TextStream, TokenReader, TokenWriter, VecStream};
pub use crate::transform::TransformTable;
