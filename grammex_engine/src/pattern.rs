use std::fmt;
use std::rc::Rc;

use rand::RngCore;

/// Generation cap for unbounded repetitions unless overridden with `max_gen`.
pub const DEFAULT_MAX_GEN: usize = 5;

pub type Predicate<T> = Box<dyn Fn(&T) -> bool>;
pub type Equality<T> = Box<dyn Fn(&T, &T) -> bool>;
pub type Generator<T> = Box<dyn Fn(&mut dyn RngCore) -> T>;

/**
	A node of a grammar.

	Patterns are built once and then only read: the same tree can be matched
	against any number of streams, used to generate token sequences, and
	printed as EBNF. Children are reference counted so that a named rule can
	appear in several parents.
*/
pub struct Pattern<T> {
	pub(crate) id: String,
	pub(crate) logging: bool,
	pub(crate) description: Option<String>,
	pub(crate) kind: PatternKind<T>,
}

pub enum PatternKind<T> {
	/// A single token accepted by a predicate.
	Unit {
		predicate: Predicate<T>,
		generator: Option<Generator<T>>,
	},
	/// A fixed run of tokens compared with `eq`.
	Series {
		tokens: Vec<T>,
		eq: Equality<T>,
	},
	/// Every child, one after another.
	Concat(Vec<Rc<Pattern<T>>>),
	/// The first child that matches.
	Alt(Vec<Rc<Pattern<T>>>),
	/// Between `min` and `max` repetitions of a child; a `max` of 0 is unbounded.
	Rep {
		pattern: Rc<Pattern<T>>,
		min: usize,
		max: usize,
		max_gen: usize,
	},
	/// `must_match`, provided `except` does not match at the same position.
	Except {
		must_match: Rc<Pattern<T>>,
		except: Rc<Pattern<T>>,
	},
	/// The end of the stream.
	End,
}

impl<T> Pattern<T> {
	fn new(kind: PatternKind<T>) -> Self {
		Self {
			id: String::new(),
			logging: false,
			description: None,
			kind,
		}
	}

	/// Give the pattern an identifier, used by `print` and transform tables.
	pub fn named(mut self, id: impl Into<String>) -> Self {
		self.id = id.into();
		self
	}

	/// Whether this pattern reports its own mismatches to a logger.
	pub fn logged(mut self, logging: bool) -> Self {
		self.logging = logging;
		self
	}

	/**
		Set the literal EBNF printed for this pattern.

		Units and series print nothing without one. Composite patterns print
		the description instead of their structure.
	*/
	pub fn print_as(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	/// Set the token generator of a unit pattern. Other patterns ignore it.
	pub fn generate_with(mut self, func: impl Fn(&mut dyn RngCore) -> T + 'static) -> Self {
		if let PatternKind::Unit { generator, .. } = &mut self.kind {
			*generator = Some(Box::new(func));
		}
		self
	}

	/// Set how many repetitions past `min` an unbounded repetition may generate.
	/// Other patterns ignore it.
	pub fn max_gen(mut self, cap: usize) -> Self {
		if let PatternKind::Rep { max_gen, .. } = &mut self.kind {
			*max_gen = cap;
		}
		self
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn is_named(&self) -> bool {
		!self.id.is_empty()
	}

	pub fn logging(&self) -> bool {
		self.logging
	}

	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	pub fn kind(&self) -> &PatternKind<T> {
		&self.kind
	}

	pub fn kind_name(&self) -> &'static str {
		match self.kind {
			PatternKind::Unit { .. } => "unit",
			PatternKind::Series { .. } => "series",
			PatternKind::Concat(_) => "concat",
			PatternKind::Alt(_) => "alt",
			PatternKind::Rep { .. } => "rep",
			PatternKind::Except { .. } => "except",
			PatternKind::End => "end",
		}
	}

	/// The identifier, or the kind of pattern for anonymous ones.
	pub fn label(&self) -> &str {
		if self.is_named() {
			&self.id
		} else {
			self.kind_name()
		}
	}
}

impl<T> fmt::Debug for Pattern<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Pattern")
			.field("id", &self.id)
			.field("kind", &self.kind_name())
			.field("logging", &self.logging)
			.field("ebnf", &format_args!("{self}"))
			.finish()
	}
}

/// A single token satisfying `predicate`.
pub fn unit<T>(predicate: impl Fn(&T) -> bool + 'static) -> Pattern<T> {
	Pattern::new(PatternKind::Unit {
		predicate: Box::new(predicate),
		generator: None,
	})
}

/// The exact token sequence `tokens`, compared with `eq`.
pub fn series<T>(
	tokens: impl IntoIterator<Item = T>,
	eq: impl Fn(&T, &T) -> bool + 'static,
) -> Pattern<T> {
	Pattern::new(PatternKind::Series {
		tokens: tokens.into_iter().collect(),
		eq: Box::new(eq),
	})
}

/// A single token equal to `token`, which is also what it generates.
pub fn token<T: Clone + PartialEq + 'static>(token: T) -> Pattern<T> {
	let generated = token.clone();
	unit(move |other: &T| *other == token).generate_with(move |_| generated.clone())
}

/// The exact token sequence `tokens`, compared with `==`.
pub fn literal<T: PartialEq + 'static>(tokens: impl IntoIterator<Item = T>) -> Pattern<T> {
	series(tokens, |a: &T, b: &T| a == b)
}

pub fn concat<T>(patterns: impl IntoIterator<Item = Rc<Pattern<T>>>) -> Pattern<T> {
	Pattern::new(PatternKind::Concat(patterns.into_iter().collect()))
}

pub fn alt<T>(patterns: impl IntoIterator<Item = Rc<Pattern<T>>>) -> Pattern<T> {
	Pattern::new(PatternKind::Alt(patterns.into_iter().collect()))
}

pub fn rep<T>(pattern: impl Into<Rc<Pattern<T>>>, min: usize, max: usize) -> Pattern<T> {
	Pattern::new(PatternKind::Rep {
		pattern: pattern.into(),
		min,
		max,
		max_gen: DEFAULT_MAX_GEN,
	})
}

/// Zero or one.
pub fn opt<T>(pattern: impl Into<Rc<Pattern<T>>>) -> Pattern<T> {
	rep(pattern, 0, 1)
}

/// Zero or more.
pub fn any<T>(pattern: impl Into<Rc<Pattern<T>>>) -> Pattern<T> {
	rep(pattern, 0, 0)
}

/// One or more.
pub fn some<T>(pattern: impl Into<Rc<Pattern<T>>>) -> Pattern<T> {
	rep(pattern, 1, 0)
}

/// Exactly `count`. A count of 0 is unbounded, like `any`.
pub fn n<T>(pattern: impl Into<Rc<Pattern<T>>>, count: usize) -> Pattern<T> {
	rep(pattern, count, count)
}

pub fn except<T>(
	must_match: impl Into<Rc<Pattern<T>>>,
	except: impl Into<Rc<Pattern<T>>>,
) -> Pattern<T> {
	Pattern::new(PatternKind::Except {
		must_match: must_match.into(),
		except: except.into(),
	})
}

pub fn end<T>() -> Pattern<T> {
	Pattern::new(PatternKind::End)
}

#[test]
fn test_builders() {
	let digit = unit(|c: &char| c.is_ascii_digit())
		.named("digit")
		.logged(true)
		.print_as("[0-9]");
	assert_eq!(digit.id(), "digit");
	assert!(digit.logging());
	assert_eq!(digit.description(), Some("[0-9]"));
	assert_eq!(digit.label(), "digit");

	let digits = some(digit).max_gen(2);
	assert_eq!(digits.label(), "rep");
	let PatternKind::Rep { min, max, max_gen, .. } = digits.kind() else {
		panic!("expected a repetition")
	};
	assert_eq!((*min, *max, *max_gen), (1, 0, 2));

	// generate_with and max_gen only apply to their own kinds
	let end = end::<char>().generate_with(|_| 'x').max_gen(3);
	assert!(matches!(end.kind(), PatternKind::End));
}
