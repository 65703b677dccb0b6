use anyhow::Result as AResult;

use crate::{MatchResult, Pattern, TokenReader};

/**
	Find every non-overlapping match of `pattern` in the rest of `stream`.

	Matching resumes after each match; where the pattern does not match, the
	stream is rewound to where the attempt began and one token skipped. A
	match consuming nothing is kept and followed by a skip as well, so the
	scan always makes progress. Stream errors end the scan.
*/
pub fn scan<'g, S>(stream: &mut S, pattern: &'g Pattern<S::Token>) -> AResult<Vec<MatchResult<'g, S>>>
where
	S: TokenReader + ?Sized,
{
	let mut results = vec![];
	while !stream.finished() {
		let position = stream.position()?;
		match pattern.try_match(stream, None)? {
			Some(result) => {
				let zero_width = result.end == position;
				results.push(result);
				if zero_width {
					stream.skip(1)?;
				}
			},
			None => {
				stream.set_position(&position)?;
				stream.skip(1)?;
			},
		}
	}
	Ok(results)
}

#[test]
fn test_scan() {
	use std::rc::Rc;

	use crate::{TextStream, concat, literal, token};

	let mut stream = TextStream::new("testing {hallo}hallo this :330ehallo");
	let hallo = concat([
		Rc::new(token('{')),
		Rc::new(literal("hallo".chars())),
		Rc::new(token('}')),
	]);
	let results = scan(&mut stream, &hallo).unwrap();
	let spans: Vec<_> = results.iter().map(|result| (result.begin, result.end)).collect();
	assert_eq!(spans, [(8, 15)]);
	assert_eq!(stream.range(&8, &15).unwrap(), "{hallo}");
	assert!(stream.finished());
}

#[test]
fn test_scan_finds_adjacent_matches() {
	use crate::{TextStream, literal};

	let mut stream = TextStream::new("abab-ab");
	let ab = literal("ab".chars());
	let spans: Vec<_> = scan(&mut stream, &ab)
		.unwrap()
		.iter()
		.map(|result| (result.begin, result.end))
		.collect();
	assert_eq!(spans, [(0, 2), (2, 4), (5, 7)]);
}

#[test]
fn test_scan_zero_width_matches() {
	use crate::{TextStream, opt, token};

	let mut stream = TextStream::new("xax");
	let maybe_a = opt(token('a'));
	let spans: Vec<_> = scan(&mut stream, &maybe_a)
		.unwrap()
		.iter()
		.map(|result| (result.begin, result.end))
		.collect();
	assert_eq!(spans, [(0, 0), (1, 2), (2, 2)]);
}
