use std::fmt;

use anyhow::Result as AResult;

use crate::{Pattern, TokenReader, TransformTable};

/**
	What a pattern matched: where, and with which sub-results.

	Leaf patterns (units and series) store the matched tokens in `value` as
	extracted by the stream; composite patterns leave `value` empty and list
	their children's results in `components`, in match order. A result only
	borrows the grammar, never the stream, so it outlives the cursor moving on.
*/
pub struct MatchResult<'g, S: TokenReader + ?Sized> {
	pub pattern: &'g Pattern<S::Token>,
	pub begin: S::Position,
	pub end: S::Position,
	pub value: S::Value,
	pub components: Vec<MatchResult<'g, S>>,
}

impl<'g, S: TokenReader + ?Sized> MatchResult<'g, S> {
	pub fn new(
		pattern: &'g Pattern<S::Token>,
		begin: S::Position,
		end: S::Position,
		value: S::Value,
		components: Vec<MatchResult<'g, S>>,
	) -> Self {
		Self {
			pattern,
			begin,
			end,
			value,
			components,
		}
	}

	/// A result carrying neither a value nor components.
	pub fn bare(pattern: &'g Pattern<S::Token>, begin: S::Position, end: S::Position) -> Self {
		Self::new(pattern, begin, end, S::Value::default(), vec![])
	}

	pub fn id(&self) -> &'g str {
		self.pattern.id()
	}

	/// The values of the components, for concatenations and repetitions of leaves.
	pub fn values(&self) -> Vec<&S::Value> {
		self.components.iter().map(|component| &component.value).collect()
	}

	/// The matched repetition of an optional pattern, if it was present.
	pub fn optional(&self) -> Option<&MatchResult<'g, S>> {
		self.components.first()
	}

	pub fn transform<O>(&self, table: &TransformTable<S, O>, stream: &mut S) -> AResult<O>
	where
		O: From<S::Value>,
	{
		table.transform(self, stream)
	}
}

impl<S: TokenReader + ?Sized> Clone for MatchResult<'_, S> {
	fn clone(&self) -> Self {
		Self {
			pattern: self.pattern,
			begin: self.begin.clone(),
			end: self.end.clone(),
			value: self.value.clone(),
			components: self.components.clone(),
		}
	}
}

impl<S: TokenReader + ?Sized> fmt::Debug for MatchResult<'_, S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MatchResult")
			.field("pattern", &self.pattern.label())
			.field("begin", &self.begin)
			.field("end", &self.end)
			.field("value", &self.value)
			.field("components", &self.components)
			.finish()
	}
}

/**
	Diagnostic for a failed match attempt.

	`mismatch_component` is the child attempt that caused the failure, when the
	pattern can name one, and `matched_components` are the siblings that did
	match before it.
*/
pub struct Mismatch<'g, S: TokenReader + ?Sized> {
	pub pattern: &'g Pattern<S::Token>,
	pub begin: S::Position,
	pub end: S::Position,
	pub mismatch_component: Option<MatchResult<'g, S>>,
	pub matched_components: Vec<MatchResult<'g, S>>,
}

impl<'g, S: TokenReader + ?Sized> Mismatch<'g, S> {
	pub fn new(pattern: &'g Pattern<S::Token>, begin: S::Position, end: S::Position) -> Self {
		Self::with_components(pattern, begin, end, None, vec![])
	}

	pub fn with_components(
		pattern: &'g Pattern<S::Token>,
		begin: S::Position,
		end: S::Position,
		mismatch_component: Option<MatchResult<'g, S>>,
		matched_components: Vec<MatchResult<'g, S>>,
	) -> Self {
		Self {
			pattern,
			begin,
			end,
			mismatch_component,
			matched_components,
		}
	}

	pub fn id(&self) -> &'g str {
		self.pattern.id()
	}
}

impl<S: TokenReader + ?Sized> fmt::Display for Mismatch<'_, S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} did not match between {:?} and {:?}",
			self.pattern.label(),
			self.begin,
			self.end,
		)?;
		if let Some(component) = &self.mismatch_component {
			write!(
				f,
				", failing at {} from {:?}",
				component.pattern.label(),
				component.begin,
			)?;
		}
		if !self.matched_components.is_empty() {
			let matched: Vec<_> = self
				.matched_components
				.iter()
				.map(|component| component.pattern.label())
				.collect();
			write!(f, " after matching [{}]", matched.join(", "))?;
		}
		Ok(())
	}
}

impl<S: TokenReader + ?Sized> fmt::Debug for Mismatch<'_, S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Mismatch")
			.field("pattern", &self.pattern.label())
			.field("begin", &self.begin)
			.field("end", &self.end)
			.field("mismatch_component", &self.mismatch_component)
			.field("matched_components", &self.matched_components)
			.finish()
	}
}

/**
	Receives mismatches from patterns that have logging enabled.

	Logging never changes how matching proceeds.
*/
pub trait MismatchLogger<'g, S: TokenReader + ?Sized> {
	fn log(&mut self, mismatch: Mismatch<'g, S>);
}

impl<'g, S: TokenReader + ?Sized> MismatchLogger<'g, S> for Vec<Mismatch<'g, S>> {
	fn log(&mut self, mismatch: Mismatch<'g, S>) {
		self.push(mismatch);
	}
}

#[test]
fn test_mismatch_display() {
	use crate::{TextStream, token};

	let open = token('{').named("open");
	let word = token('w');
	let group = token('g').named("group");

	let mismatch: Mismatch<'_, TextStream> = Mismatch::with_components(
		&group,
		0,
		3,
		Some(MatchResult::bare(&word, 2, 3)),
		vec![MatchResult::new(&open, 0, 1, "{".into(), vec![])],
	);
	assert_eq!(
		mismatch.to_string(),
		"group did not match between 0 and 3, failing at unit from 2 after matching [open]",
	);
	assert_eq!(mismatch.id(), "group");

	let mismatch: Mismatch<'_, TextStream> = Mismatch::new(&word, 4, 4);
	assert_eq!(mismatch.to_string(), "unit did not match between 4 and 4");
}

#[test]
fn test_result_accessors() {
	use crate::{TextStream, token};

	let a = token('a').named("a");
	let list = token('l');
	let result: MatchResult<'_, TextStream> = MatchResult::new(
		&list,
		0,
		2,
		String::new(),
		vec![
			MatchResult::new(&a, 0, 1, "a".into(), vec![]),
			MatchResult::new(&a, 1, 2, "a".into(), vec![]),
		],
	);
	assert_eq!(result.values(), [&"a".to_string(), &"a".to_string()]);
	assert_eq!(result.optional().map(MatchResult::id), Some("a"));
	assert_eq!(result.clone().components.len(), 2);
	assert!(format!("{result:?}").contains("pattern: \"a\""));
}
