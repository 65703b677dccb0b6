use std::rc::Rc;

use anyhow::Result as AResult;

use crate::pattern::{Equality, Predicate};
use crate::{MatchResult, Mismatch, MismatchLogger, Pattern, PatternKind, TokenReader};

type Logger<'r, 'l, 'g, S> = Option<&'r mut (dyn MismatchLogger<'g, S> + 'l)>;
type Matched<'g, S> = AResult<Option<MatchResult<'g, S>>>;

impl<T> Pattern<T> {
	/**
		Match this pattern at the stream's current position.

		Returns `Ok(Some(_))` on a match, leaving the stream just past it, and
		`Ok(None)` if the pattern does not match. A failed match leaves the
		stream wherever the attempt stopped: a caller that wants to try
		something else from the same place saves the position first and
		restores it afterwards, which is what alternations, repetitions,
		exceptions and `scan` do. `Err` means the stream failed, and aborts the
		whole match without logging anything further.

		Mismatches of patterns with logging enabled are reported to `logger`.
	*/
	pub fn try_match<'g, S>(
		&'g self,
		stream: &mut S,
		logger: Option<&mut (dyn MismatchLogger<'g, S> + '_)>,
	) -> Matched<'g, S>
	where
		S: TokenReader<Token = T> + ?Sized,
	{
		match &self.kind {
			PatternKind::Unit { predicate, .. } => self.match_unit(predicate, stream, logger),
			PatternKind::Series { tokens, eq } => self.match_series(tokens, eq, stream, logger),
			PatternKind::Concat(patterns) => self.match_concat(patterns, stream, logger),
			PatternKind::Alt(patterns) => self.match_alt(patterns, stream, logger),
			&PatternKind::Rep {
				ref pattern,
				min,
				max,
				..
			} => self.match_rep(pattern, min, max, stream, logger),
			PatternKind::Except { must_match, except } => {
				self.match_except(must_match, except, stream, logger)
			},
			PatternKind::End => self.match_end(stream, logger),
		}
	}

	fn match_unit<'g, S>(
		&'g self,
		predicate: &Predicate<T>,
		stream: &mut S,
		logger: Logger<'_, '_, 'g, S>,
	) -> Matched<'g, S>
	where
		S: TokenReader<Token = T> + ?Sized,
	{
		let begin = stream.position()?;
		// always consumes, even on a mismatch
		let token = stream.read1()?;
		if token.as_ref().is_some_and(|token| predicate(token)) {
			let end = stream.position()?;
			let value = stream.range(&begin, &end)?;
			return Ok(Some(MatchResult::new(self, begin, end, value, vec![])));
		}

		if let Some(logger) = logger.filter(|_| self.logging) {
			let end = stream.position()?;
			logger.log(Mismatch::new(self, begin, end));
		}
		Ok(None)
	}

	fn match_series<'g, S>(
		&'g self,
		tokens: &[T],
		eq: &Equality<T>,
		stream: &mut S,
		logger: Logger<'_, '_, 'g, S>,
	) -> Matched<'g, S>
	where
		S: TokenReader<Token = T> + ?Sized,
	{
		let begin = stream.position()?;
		for expected in tokens {
			let token = stream.read1()?;
			if !token.as_ref().is_some_and(|token| eq(expected, token)) {
				if let Some(logger) = logger.filter(|_| self.logging) {
					let end = stream.position()?;
					logger.log(Mismatch::new(self, begin, end));
				}
				return Ok(None);
			}
		}

		let end = stream.position()?;
		let value = stream.range(&begin, &end)?;
		Ok(Some(MatchResult::new(self, begin, end, value, vec![])))
	}

	fn match_concat<'g, S>(
		&'g self,
		patterns: &'g [Rc<Pattern<T>>],
		stream: &mut S,
		mut logger: Logger<'_, '_, 'g, S>,
	) -> Matched<'g, S>
	where
		S: TokenReader<Token = T> + ?Sized,
	{
		let begin = stream.position()?;
		let mut matches = Vec::with_capacity(patterns.len());
		for pattern in patterns {
			let sub_begin = stream.position()?;
			let Some(result) = pattern.try_match(stream, logger.as_deref_mut())? else {
				if let Some(logger) = logger.filter(|_| self.logging) {
					let sub_end = stream.position()?;
					let failed = MatchResult::<S>::bare(pattern, sub_begin, sub_end.clone());
					logger.log(Mismatch::with_components(
						self,
						begin,
						sub_end,
						Some(failed),
						matches,
					));
				}
				return Ok(None);
			};
			matches.push(result);
		}

		let end = stream.position()?;
		Ok(Some(MatchResult::new(self, begin, end, S::Value::default(), matches)))
	}

	fn match_alt<'g, S>(
		&'g self,
		patterns: &'g [Rc<Pattern<T>>],
		stream: &mut S,
		mut logger: Logger<'_, '_, 'g, S>,
	) -> Matched<'g, S>
	where
		S: TokenReader<Token = T> + ?Sized,
	{
		let begin = stream.position()?;
		for pattern in patterns {
			stream.set_position(&begin)?;
			if let Some(result) = pattern.try_match(stream, logger.as_deref_mut())? {
				let end = stream.position()?;
				return Ok(Some(MatchResult::new(
					self,
					begin,
					end,
					S::Value::default(),
					vec![result],
				)));
			}
		}

		if let Some(logger) = logger.filter(|_| self.logging) {
			let end = stream.position()?;
			logger.log(Mismatch::new(self, begin, end));
		}
		Ok(None)
	}

	fn match_rep<'g, S>(
		&'g self,
		pattern: &'g Pattern<T>,
		min: usize,
		max: usize,
		stream: &mut S,
		mut logger: Logger<'_, '_, 'g, S>,
	) -> Matched<'g, S>
	where
		S: TokenReader<Token = T> + ?Sized,
	{
		let begin = stream.position()?;
		let mut matches = vec![];
		while !stream.finished() {
			let reset = stream.position()?;
			let Some(result) = pattern.try_match(stream, logger.as_deref_mut())? else {
				stream.set_position(&reset)?;
				break;
			};
			let zero_width = result.end == reset;
			matches.push(result);

			if max != 0 && matches.len() == max {
				break;
			}
			// an unbounded repetition of an empty match would never finish
			if max == 0 && zero_width && matches.len() >= min {
				break;
			}
		}

		if matches.len() < min {
			if let Some(logger) = logger.filter(|_| self.logging) {
				let end = stream.position()?;
				logger.log(Mismatch::with_components(self, begin, end, None, matches));
			}
			return Ok(None);
		}

		let end = stream.position()?;
		Ok(Some(MatchResult::new(self, begin, end, S::Value::default(), matches)))
	}

	fn match_except<'g, S>(
		&'g self,
		must_match: &'g Pattern<T>,
		except: &'g Pattern<T>,
		stream: &mut S,
		mut logger: Logger<'_, '_, 'g, S>,
	) -> Matched<'g, S>
	where
		S: TokenReader<Token = T> + ?Sized,
	{
		let begin = stream.position()?;
		if let Some(excepted) = except.try_match(stream, logger.as_deref_mut())? {
			if let Some(logger) = logger.filter(|_| self.logging) {
				let end = stream.position()?;
				logger.log(Mismatch::with_components(
					self,
					begin,
					end,
					Some(excepted),
					vec![],
				));
			}
			return Ok(None);
		}

		stream.set_position(&begin)?;
		must_match.try_match(stream, logger)
	}

	fn match_end<'g, S>(&'g self, stream: &mut S, logger: Logger<'_, '_, 'g, S>) -> Matched<'g, S>
	where
		S: TokenReader<Token = T> + ?Sized,
	{
		let position = stream.position()?;
		if stream.finished() {
			return Ok(Some(MatchResult::bare(self, position.clone(), position)));
		}

		if let Some(logger) = logger.filter(|_| self.logging) {
			logger.log(Mismatch::new(self, position.clone(), position));
		}
		Ok(None)
	}
}

#[cfg(test)]
fn text_match<'g>(
	pattern: &'g Pattern<char>,
	input: &str,
) -> (Option<MatchResult<'g, crate::TextStream>>, crate::TextStream) {
	let mut stream = crate::TextStream::new(input);
	let result = pattern.try_match(&mut stream, None).unwrap();
	(result, stream)
}

#[test]
fn test_unit() {
	use crate::{TextStream, token};

	let a = token('a').named("a").logged(true);
	let (result, mut stream) = text_match(&a, "ab");
	let result = result.unwrap();
	assert_eq!((result.begin, result.end), (0, 1));
	assert_eq!(result.value, "a");
	assert_eq!(stream.position().unwrap(), 1);

	// the token is consumed even when it does not match
	let mut stream = TextStream::new("ba");
	let mut mismatches: Vec<Mismatch<'_, TextStream>> = vec![];
	assert!(a.try_match(&mut stream, Some(&mut mismatches)).unwrap().is_none());
	assert_eq!(stream.position().unwrap(), 1);
	assert_eq!(mismatches.len(), 1);
	assert_eq!((mismatches[0].begin, mismatches[0].end), (0, 1));

	// end of input is an ordinary mismatch
	let (result, _) = text_match(&a, "");
	assert!(result.is_none());
}

#[test]
fn test_series() {
	use crate::{TextStream, literal};

	let hallo = literal("hallo".chars()).named("hallo").logged(true);
	let (result, _) = text_match(&hallo, "hallo!");
	assert_eq!(result.unwrap().value, "hallo");

	let mut stream = TextStream::new("hallr");
	let mut mismatches: Vec<Mismatch<'_, TextStream>> = vec![];
	assert!(hallo.try_match(&mut stream, Some(&mut mismatches)).unwrap().is_none());
	assert_eq!((mismatches[0].begin, mismatches[0].end), (0, 5));

	// stops at the first differing token
	let mut stream = TextStream::new("hxllo");
	assert!(hallo.try_match(&mut stream, None).unwrap().is_none());
	assert_eq!(stream.remaining(), "llo");

	let (result, _) = text_match(&hallo, "hal");
	assert!(result.is_none());
}

#[test]
fn test_concat() {
	use crate::{TextStream, concat, token};

	let open = Rc::new(token('(').named("open"));
	let x = Rc::new(token('x'));
	let close = Rc::new(token(')').named("close"));
	let group = concat([open, x, close]).named("group").logged(true);

	let (result, _) = text_match(&group, "(x)");
	let result = result.unwrap();
	assert_eq!((result.begin, result.end), (0, 3));
	assert_eq!(result.value, "");
	let ids: Vec<_> = result.components.iter().map(MatchResult::id).collect();
	assert_eq!(ids, ["open", "", "close"]);

	let mut stream = TextStream::new("(x]");
	let mut mismatches: Vec<Mismatch<'_, TextStream>> = vec![];
	assert!(group.try_match(&mut stream, Some(&mut mismatches)).unwrap().is_none());
	// no rollback to the beginning of the concatenation
	assert_eq!(stream.position().unwrap(), 3);
	let [mismatch] = &mismatches[..] else {
		panic!("expected one mismatch, got {mismatches:?}")
	};
	assert_eq!((mismatch.begin, mismatch.end), (0, 3));
	let failed = mismatch.mismatch_component.as_ref().unwrap();
	assert_eq!((failed.id(), failed.begin, failed.end), ("close", 2, 3));
	assert_eq!(mismatch.matched_components.len(), 2);
}

#[test]
fn test_alt() {
	use crate::{TextStream, alt, literal};

	let ab = Rc::new(literal("ab".chars()).named("ab"));
	let a = Rc::new(literal("a".chars()).named("a"));
	let choice = alt([ab.clone(), a.clone()]).logged(true);

	let (result, _) = text_match(&choice, "ab");
	assert_eq!(result.unwrap().components[0].id(), "ab");

	// the second alternative starts from the beginning again
	let (result, stream) = text_match(&choice, "ac");
	let result = result.unwrap();
	assert_eq!(result.components[0].id(), "a");
	assert_eq!((result.begin, result.end), (0, 1));
	assert_eq!(stream.remaining(), "c");

	// first match wins even when a later alternative also matches
	let first = alt([a, ab.clone()]);
	let (result, _) = text_match(&first, "ab");
	assert_eq!(result.unwrap().components[0].id(), "a");

	let mut stream = TextStream::new("zz");
	let mut mismatches: Vec<Mismatch<'_, TextStream>> = vec![];
	assert!(choice.try_match(&mut stream, Some(&mut mismatches)).unwrap().is_none());
	let [mismatch] = &mismatches[..] else {
		panic!("expected one mismatch, got {mismatches:?}")
	};
	assert!(mismatch.mismatch_component.is_none());
	assert_eq!(mismatch.begin, 0);

	// a failed alternation is not rewound, the last attempt decides where it stops
	let ab_or_xyz = alt([ab.clone(), Rc::new(literal("xyz".chars()))]);
	let mut stream = TextStream::new("xyq");
	assert!(ab_or_xyz.try_match(&mut stream, None).unwrap().is_none());
	assert_eq!(stream.position().unwrap(), 3);
}

#[test]
fn test_rep() {
	use crate::{TextStream, any, opt, rep, token};

	let a = Rc::new(token('a'));
	let three_to_four = rep(a.clone(), 3, 4).logged(true);

	let (result, stream) = text_match(&three_to_four, "aaaaa");
	assert_eq!(result.unwrap().components.len(), 4);
	assert_eq!(stream.remaining(), "a");

	// the failed attempt is rolled back, earlier repetitions kept
	let (result, stream) = text_match(&three_to_four, "aaab");
	assert_eq!(result.unwrap().components.len(), 3);
	assert_eq!(stream.remaining(), "b");

	let mut stream = TextStream::new("aab");
	let mut mismatches: Vec<Mismatch<'_, TextStream>> = vec![];
	assert!(three_to_four.try_match(&mut stream, Some(&mut mismatches)).unwrap().is_none());
	assert_eq!(stream.remaining(), "b");
	assert_eq!(mismatches[0].matched_components.len(), 2);
	assert_eq!((mismatches[0].begin, mismatches[0].end), (0, 2));

	let any_a = any(a.clone());
	let (result, stream) = text_match(&any_a, "bbb");
	assert!(result.unwrap().components.is_empty());
	assert_eq!(stream.remaining(), "bbb");

	// optional presence
	let maybe = opt(a);
	let (result, _) = text_match(&maybe, "a");
	assert!(result.unwrap().optional().is_some());
	let (result, _) = text_match(&maybe, "b");
	assert!(result.unwrap().optional().is_none());
}

#[test]
fn test_rep_of_empty_match_terminates() {
	use crate::{any, opt, rep, token};

	let maybe_a = Rc::new(opt(token('a')));
	let any_maybe = any(maybe_a.clone());
	let (result, stream) = text_match(&any_maybe, "aab");
	assert_eq!(result.unwrap().components.len(), 3);
	assert_eq!(stream.remaining(), "b");

	let at_least_two = rep(maybe_a, 2, 0);
	let (result, _) = text_match(&at_least_two, "b");
	assert_eq!(result.unwrap().components.len(), 2);
}

#[test]
fn test_except() {
	use crate::{TextStream, except, literal, unit};

	let digit = Rc::new(unit(|c: &char| c.is_ascii_digit()).named("digit"));
	let six = Rc::new(unit(|c: &char| *c == '6').named("six"));
	let not_six = except(digit, six).named("not_six").logged(true);

	let (result, _) = text_match(&not_six, "5");
	let result = result.unwrap();
	// no wrapping node, the result is the digit's
	assert_eq!(result.id(), "digit");

	let mut stream = TextStream::new("6");
	let mut mismatches: Vec<Mismatch<'_, TextStream>> = vec![];
	assert!(not_six.try_match(&mut stream, Some(&mut mismatches)).unwrap().is_none());
	let excepted = mismatches[0].mismatch_component.as_ref().unwrap();
	assert_eq!(excepted.id(), "six");

	let (result, _) = text_match(&not_six, "x");
	assert!(result.is_none());

	// the stream stays where the excluded pattern left it
	let alpha = unit(|c: &char| c.is_ascii_alphabetic());
	let not_ab = except(alpha, literal("ab".chars()));
	let mut stream = TextStream::new("abc");
	assert!(not_ab.try_match(&mut stream, None).unwrap().is_none());
	assert_eq!(stream.position().unwrap(), 2);
}

#[test]
fn test_end() {
	use crate::{TextStream, end, token};

	let end = end::<char>().logged(true);
	let (result, _) = text_match(&end, "");
	let result = result.unwrap();
	assert_eq!((result.begin, result.end), (0, 0));

	let mut stream = TextStream::new("a");
	token('a').try_match(&mut stream, None).unwrap().unwrap();
	assert!(end.try_match(&mut stream, None).unwrap().is_some());

	let mut stream = TextStream::new("ab");
	stream.skip(1).unwrap();
	let mut mismatches: Vec<Mismatch<'_, TextStream>> = vec![];
	assert!(end.try_match(&mut stream, Some(&mut mismatches)).unwrap().is_none());
	assert_eq!((mismatches[0].begin, mismatches[0].end), (1, 1));
	assert_eq!(stream.position().unwrap(), 1);
}

#[test]
fn test_logging_is_per_pattern() {
	use crate::{TextStream, concat, token};

	let quiet = Rc::new(token('a'));
	let loud = Rc::new(token('b').named("b").logged(true));
	let pair = concat([quiet, loud]);

	let mut mismatches: Vec<Mismatch<'_, TextStream>> = vec![];
	let mut stream = TextStream::new("ac");
	assert!(pair.try_match(&mut stream, Some(&mut mismatches)).unwrap().is_none());
	// only the logged child reports, its anonymous parent does not
	let ids: Vec<_> = mismatches.iter().map(Mismatch::id).collect();
	assert_eq!(ids, ["b"]);

	let mut stream = TextStream::new("xc");
	mismatches.clear();
	assert!(pair.try_match(&mut stream, Some(&mut mismatches)).unwrap().is_none());
	assert!(mismatches.is_empty());
}
