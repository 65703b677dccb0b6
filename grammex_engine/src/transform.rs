use std::collections::HashMap;
use std::fmt;

use anyhow::Result as AResult;

use crate::{MatchResult, TokenReader};

pub type Reducer<S, O> =
	Box<dyn Fn(&MatchResult<'_, S>, &TransformTable<S, O>, &mut S) -> AResult<O>>;

/**
	Turns match results into domain values.

	Reducers are registered under pattern identifiers and are handed the result,
	the table itself (to transform components recursively) and the stream.
	Results of patterns without a reducer pass their raw value through, which
	is what lets anonymous helpers be reduced by their named parent instead.
*/
pub struct TransformTable<S: TokenReader + ?Sized, O> {
	reducers: HashMap<String, Reducer<S, O>>,
}

impl<S: TokenReader + ?Sized, O> TransformTable<S, O> {
	pub fn new() -> Self {
		Self {
			reducers: HashMap::new(),
		}
	}

	/// Register `reducer` for results of patterns named `id`.
	pub fn with(
		mut self,
		id: impl Into<String>,
		reducer: impl Fn(&MatchResult<'_, S>, &Self, &mut S) -> AResult<O> + 'static,
	) -> Self {
		self.insert(id, reducer);
		self
	}

	pub fn insert(
		&mut self,
		id: impl Into<String>,
		reducer: impl Fn(&MatchResult<'_, S>, &Self, &mut S) -> AResult<O> + 'static,
	) -> Option<Reducer<S, O>> {
		self.reducers.insert(id.into(), Box::new(reducer))
	}

	pub fn contains(&self, id: &str) -> bool {
		self.reducers.contains_key(id)
	}

	pub fn transform(&self, result: &MatchResult<'_, S>, stream: &mut S) -> AResult<O>
	where
		O: From<S::Value>,
	{
		match self.reducers.get(result.id()) {
			Some(reducer) => reducer(result, self, stream),
			None => Ok(O::from(result.value.clone())),
		}
	}
}

impl<S: TokenReader + ?Sized, O> Default for TransformTable<S, O> {
	fn default() -> Self {
		Self::new()
	}
}

impl<S: TokenReader + ?Sized, O> fmt::Debug for TransformTable<S, O> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut ids: Vec<_> = self.reducers.keys().collect();
		ids.sort();
		f.debug_struct("TransformTable").field("reducers", &ids).finish()
	}
}

#[test]
fn test_transform_dispatch() {
	use std::rc::Rc;

	use crate::{TextStream, alt, rep, token};

	let a = Rc::new(token('a').named("is_a"));
	let b = Rc::new(token('b').named("is_b"));
	let a_or_b = Rc::new(alt([a, b]).named("is_a_or_b"));
	let repeated = rep(a_or_b, 3, 4).named("ab_repeat");

	let table = TransformTable::<TextStream, String>::new()
		.with("is_a_or_b", |result, table, stream| {
			table.transform(&result.components[0], stream)
		})
		.with("ab_repeat", |result, table, stream| {
			let mut out = String::new();
			for component in &result.components {
				out += &table.transform(component, stream)?;
			}
			Ok(out)
		})
		.with("is_b", |_, _, _| Ok("B".into()));

	let mut stream = TextStream::new("abaaa");
	let result = repeated.try_match(&mut stream, None).unwrap().unwrap();
	assert_eq!(result.transform(&table, &mut stream).unwrap(), "aBaa");
	assert_eq!(stream.remaining(), "a");
	assert!(table.contains("is_b"));
	assert!(!table.contains("is_a"));
	assert_eq!(
		format!("{table:?}"),
		r#"TransformTable { reducers: ["ab_repeat", "is_a_or_b", "is_b"] }"#
	);
}

#[test]
fn test_transform_passthrough() {
	use crate::{TextStream, literal};

	let hallo = literal("hallo".chars()).named("hallo");
	let table = TransformTable::<TextStream, String>::default();
	let mut stream = TextStream::new("hallo");
	let result = hallo.try_match(&mut stream, None).unwrap().unwrap();
	assert_eq!(table.transform(&result, &mut stream).unwrap(), "hallo");
}

#[test]
fn test_transform_errors_propagate() {
	use crate::{TextStream, token};

	let a = token('a').named("a");
	let table = TransformTable::<TextStream, String>::new()
		.with("a", |_, _, _| anyhow::bail!("not today"));
	let mut stream = TextStream::new("a");
	let result = a.try_match(&mut stream, None).unwrap().unwrap();
	let err = table.transform(&result, &mut stream).unwrap_err();
	assert_eq!(err.to_string(), "not today");
}
