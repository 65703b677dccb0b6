use std::fmt::Debug;

use anyhow::{Result as AResult, ensure};

/**
	A peekable, rewindable source of tokens that patterns match against.

	Reading past the end is not an error: `read1`/`peek1` return `Ok(None)` and
	the counted operations return how many tokens were actually available. An
	`Err` is reserved for the stream being unable to serve a request at all, and
	aborts whatever match is in progress.
*/
pub trait TokenReader {
	/// The element type yielded by the stream.
	type Token;
	/// An opaque cursor into the stream, restorable with `set_position`.
	type Position: Clone + PartialEq + Debug;
	/// What `range` extracts; leaf results carry one of these.
	type Value: Clone + Default + Debug;

	/// Look at the next token without consuming it.
	fn peek1(&mut self) -> AResult<Option<Self::Token>>;

	/// Consume the next token.
	fn read1(&mut self) -> AResult<Option<Self::Token>>;

	/// Whether every token has been consumed.
	fn finished(&mut self) -> bool;

	/// The current cursor.
	fn position(&mut self) -> AResult<Self::Position>;

	/// Move the cursor to a position previously returned by `position`.
	fn set_position(&mut self, position: &Self::Position) -> AResult<()>;

	/// Extract the tokens between two positions.
	fn range(&mut self, begin: &Self::Position, end: &Self::Position) -> AResult<Self::Value>;

	/// Append up to `count` upcoming tokens to `buf` without consuming them.
	fn peek(&mut self, count: usize, buf: &mut Vec<Self::Token>) -> AResult<usize> {
		let position = self.position()?;
		let read = self.read(count, buf)?;
		self.set_position(&position)?;
		Ok(read)
	}

	/// Consume up to `count` tokens, appending them to `buf`.
	fn read(&mut self, count: usize, buf: &mut Vec<Self::Token>) -> AResult<usize> {
		let mut read = 0;
		while read < count {
			let Some(token) = self.read1()? else { break };
			buf.push(token);
			read += 1;
		}
		Ok(read)
	}

	/// Consume up to `count` tokens, discarding them.
	fn skip(&mut self, count: usize) -> AResult<usize> {
		let mut skipped = 0;
		while skipped < count && self.read1()?.is_some() {
			skipped += 1;
		}
		Ok(skipped)
	}
}

/**
	Sink for tokens produced by `Pattern::generate`.

	`finish` is called by end-of-input patterns to mark that the generated
	sequence is complete.
*/
pub trait TokenWriter {
	type Token;

	fn write<I: IntoIterator<Item = Self::Token>>(&mut self, tokens: I) -> AResult<()>;

	fn finish(&mut self) -> AResult<()> {
		Ok(())
	}
}

impl<T> TokenWriter for Vec<T> {
	type Token = T;

	fn write<I: IntoIterator<Item = T>>(&mut self, tokens: I) -> AResult<()> {
		self.extend(tokens);
		Ok(())
	}
}

impl TokenWriter for String {
	type Token = char;

	fn write<I: IntoIterator<Item = char>>(&mut self, tokens: I) -> AResult<()> {
		self.extend(tokens);
		Ok(())
	}
}

/// An in-memory token stream whose positions are indices into the buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VecStream<T> {
	tokens: Vec<T>,
	position: usize,
}

impl<T> VecStream<T> {
	pub fn new(tokens: impl Into<Vec<T>>) -> Self {
		Self {
			tokens: tokens.into(),
			position: 0,
		}
	}

	pub fn tokens(&self) -> &[T] {
		&self.tokens
	}

	/// The tokens not yet consumed.
	pub fn remaining(&self) -> &[T] {
		&self.tokens[self.position ..]
	}

	pub fn into_inner(self) -> Vec<T> {
		self.tokens
	}

	fn slice(&self, begin: usize, end: usize) -> AResult<&[T]> {
		ensure!(
			begin <= end && end <= self.tokens.len(),
			"range {begin}..{end} is outside the stream (0..{})",
			self.tokens.len(),
		);
		Ok(&self.tokens[begin .. end])
	}
}

impl<T> FromIterator<T> for VecStream<T> {
	fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
		Self::new(iter.into_iter().collect::<Vec<_>>())
	}
}

impl<T: Clone + Debug> TokenReader for VecStream<T> {
	type Token = T;
	type Position = usize;
	type Value = Vec<T>;

	fn peek1(&mut self) -> AResult<Option<T>> {
		Ok(self.tokens.get(self.position).cloned())
	}

	fn read1(&mut self) -> AResult<Option<T>> {
		let token = self.tokens.get(self.position).cloned();
		if token.is_some() {
			self.position += 1;
		}
		Ok(token)
	}

	fn finished(&mut self) -> bool {
		self.position >= self.tokens.len()
	}

	fn position(&mut self) -> AResult<usize> {
		Ok(self.position)
	}

	fn set_position(&mut self, &position: &usize) -> AResult<()> {
		ensure!(
			position <= self.tokens.len(),
			"position {position} is past the end of the stream ({} tokens)",
			self.tokens.len(),
		);
		self.position = position;
		Ok(())
	}

	fn range(&mut self, &begin: &usize, &end: &usize) -> AResult<Vec<T>> {
		Ok(self.slice(begin, end)?.to_vec())
	}

	fn peek(&mut self, count: usize, buf: &mut Vec<T>) -> AResult<usize> {
		let end = self.tokens.len().min(self.position.saturating_add(count));
		buf.extend_from_slice(&self.tokens[self.position .. end]);
		Ok(end - self.position)
	}

	fn skip(&mut self, count: usize) -> AResult<usize> {
		let end = self.tokens.len().min(self.position.saturating_add(count));
		let skipped = end - self.position;
		self.position = end;
		Ok(skipped)
	}
}

/// A stream over the characters of a string, extracting ranges as `String`s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextStream(VecStream<char>);

impl TextStream {
	pub fn new(text: &str) -> Self {
		Self(text.chars().collect())
	}

	/// The text not yet consumed.
	pub fn remaining(&self) -> String {
		self.0.remaining().iter().collect()
	}
}

impl From<&str> for TextStream {
	fn from(text: &str) -> Self {
		Self::new(text)
	}
}

impl TokenReader for TextStream {
	type Token = char;
	type Position = usize;
	type Value = String;

	fn peek1(&mut self) -> AResult<Option<char>> {
		self.0.peek1()
	}

	fn read1(&mut self) -> AResult<Option<char>> {
		self.0.read1()
	}

	fn finished(&mut self) -> bool {
		self.0.finished()
	}

	fn position(&mut self) -> AResult<usize> {
		self.0.position()
	}

	fn set_position(&mut self, position: &usize) -> AResult<()> {
		self.0.set_position(position)
	}

	fn range(&mut self, &begin: &usize, &end: &usize) -> AResult<String> {
		Ok(self.0.slice(begin, end)?.iter().collect())
	}

	fn peek(&mut self, count: usize, buf: &mut Vec<char>) -> AResult<usize> {
		self.0.peek(count, buf)
	}

	fn skip(&mut self, count: usize) -> AResult<usize> {
		self.0.skip(count)
	}
}

#[test]
fn test_vec_stream_reads() {
	let mut stream = VecStream::new([1, 2, 3, 4]);
	assert_eq!(stream.peek1().unwrap(), Some(1));
	assert_eq!(stream.read1().unwrap(), Some(1));

	let mut buf = vec![];
	assert_eq!(stream.peek(2, &mut buf).unwrap(), 2);
	assert_eq!(buf, [2, 3]);
	assert_eq!(stream.position().unwrap(), 1);

	buf.clear();
	assert_eq!(stream.read(5, &mut buf).unwrap(), 3);
	assert_eq!(buf, [2, 3, 4]);
	assert!(stream.finished());

	// reading past the end is not an error
	assert_eq!(stream.read1().unwrap(), None);
	assert_eq!(stream.peek1().unwrap(), None);
	assert_eq!(stream.skip(3).unwrap(), 0);
}

#[test]
fn test_vec_stream_positions() {
	let mut stream = VecStream::new(vec!['a', 'b', 'c']);
	assert_eq!(stream.skip(2).unwrap(), 2);
	let position = stream.position().unwrap();
	assert_eq!(stream.remaining(), ['c']);

	stream.set_position(&0).unwrap();
	assert_eq!(stream.range(&0, &position).unwrap(), ['a', 'b']);
	assert_eq!(stream.position().unwrap(), 0);

	assert!(stream.set_position(&4).is_err());
	assert!(stream.range(&2, &1).is_err());
	assert!(stream.range(&0, &9).is_err());
}

#[test]
fn test_default_reader_methods() {
	// only the required methods, so the provided ones are exercised
	struct Digits(u8);
	impl TokenReader for Digits {
		type Token = u8;
		type Position = u8;
		type Value = ();

		fn peek1(&mut self) -> AResult<Option<u8>> {
			Ok((self.0 < 10).then_some(self.0))
		}

		fn read1(&mut self) -> AResult<Option<u8>> {
			let token = self.peek1()?;
			self.0 += token.is_some() as u8;
			Ok(token)
		}

		fn finished(&mut self) -> bool {
			self.0 >= 10
		}

		fn position(&mut self) -> AResult<u8> {
			Ok(self.0)
		}

		fn set_position(&mut self, &position: &u8) -> AResult<()> {
			self.0 = position;
			Ok(())
		}

		fn range(&mut self, _: &u8, _: &u8) -> AResult<()> {
			Ok(())
		}
	}

	let mut digits = Digits(7);
	let mut buf = vec![];
	assert_eq!(digits.peek(5, &mut buf).unwrap(), 3);
	assert_eq!(buf, [7, 8, 9]);
	assert_eq!(digits.position().unwrap(), 7);
	assert_eq!(digits.skip(2).unwrap(), 2);
	assert_eq!(digits.skip(2).unwrap(), 1);
	assert!(digits.finished());
}

#[test]
fn test_text_stream() {
	let mut stream = TextStream::new("héllo");
	assert_eq!(stream.read1().unwrap(), Some('h'));
	assert_eq!(stream.read1().unwrap(), Some('é'));
	let end = stream.position().unwrap();
	assert_eq!(stream.range(&0, &end).unwrap(), "hé");
	assert_eq!(stream.remaining(), "llo");

	let mut written = String::new();
	written.write("ab".chars()).unwrap();
	written.finish().unwrap();
	assert_eq!(written, "ab");
}
