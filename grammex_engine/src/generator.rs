use anyhow::{Result as AResult, ensure};
use rand::{Rng, RngCore};

use crate::{Pattern, PatternKind, TokenWriter};

impl<T: Clone> Pattern<T> {
	/**
		Write a random token sequence accepted by this pattern to `writer`.

		Alternations pick a child uniformly and repetitions a count uniformly
		between their bounds, with unbounded repetitions capped at `min +
		max_gen`. Units without a generator write nothing, and end-of-input
		patterns finish the writer. All randomness comes from `rng`, so a
		seeded generator reproduces the same sequence.
	*/
	pub fn generate<W>(&self, writer: &mut W, rng: &mut dyn RngCore) -> AResult<()>
	where
		W: TokenWriter<Token = T>,
	{
		match &self.kind {
			PatternKind::Unit { generator, .. } => match generator {
				Some(generator) => writer.write([generator(rng)]),
				None => Ok(()),
			},
			PatternKind::Series { tokens, .. } => writer.write(tokens.iter().cloned()),
			PatternKind::Concat(patterns) => {
				for pattern in patterns {
					pattern.generate(writer, rng)?;
				}
				Ok(())
			},
			PatternKind::Alt(patterns) => {
				ensure!(
					!patterns.is_empty(),
					"cannot generate {} as it has no alternatives",
					self.label(),
				);
				let index = rng.gen_range(0 .. patterns.len());
				patterns[index].generate(writer, rng)
			},
			&PatternKind::Rep {
				ref pattern,
				min,
				max,
				max_gen,
			} => {
				let max = if max > 0 { max } else { min.saturating_add(max_gen) };
				ensure!(
					min <= max,
					"cannot generate {} as its minimum of {min} exceeds its maximum of {max}",
					self.label(),
				);
				for _ in 0 .. rng.gen_range(min ..= max) {
					pattern.generate(writer, rng)?;
				}
				Ok(())
			},
			PatternKind::Except { must_match, .. } => must_match.generate(writer, rng),
			PatternKind::End => writer.finish(),
		}
	}

	/// Generate into a fresh buffer.
	pub fn generate_tokens(&self, rng: &mut dyn RngCore) -> AResult<Vec<T>> {
		let mut tokens = vec![];
		self.generate(&mut tokens, rng)?;
		Ok(tokens)
	}
}

#[cfg(test)]
fn seeded(seed: u64) -> rand::rngs::StdRng {
	rand::SeedableRng::seed_from_u64(seed)
}

#[test]
fn test_generate_leaves() {
	use crate::{literal, token, unit};

	let mut rng = seeded(1);
	assert_eq!(token('a').generate_tokens(&mut rng).unwrap(), ['a']);
	assert_eq!(literal("abc".chars()).generate_tokens(&mut rng).unwrap(), ['a', 'b', 'c']);
	// no generator, nothing produced
	let digit = unit(|c: &char| c.is_ascii_digit());
	assert!(digit.generate_tokens(&mut rng).unwrap().is_empty());
}

#[test]
fn test_generate_composites() {
	use std::rc::Rc;

	use crate::{alt, concat, except, rep, token};

	let a = Rc::new(token('a'));
	let b = Rc::new(token('b'));
	let mut rng = seeded(7);

	let ab = concat([a.clone(), b.clone()]);
	assert_eq!(ab.generate_tokens(&mut rng).unwrap(), ['a', 'b']);

	let either = alt([a.clone(), b.clone()]);
	for _ in 0 .. 20 {
		let tokens = either.generate_tokens(&mut rng).unwrap();
		assert!(tokens == ['a'] || tokens == ['b'], "{tokens:?}");
	}

	let bounded = rep(a.clone(), 2, 4);
	let unbounded = rep(a.clone(), 1, 0).max_gen(2);
	for _ in 0 .. 20 {
		let count = bounded.generate_tokens(&mut rng).unwrap().len();
		assert!((2 ..= 4).contains(&count), "{count}");
		let count = unbounded.generate_tokens(&mut rng).unwrap().len();
		assert!((1 ..= 3).contains(&count), "{count}");
	}

	let not_b = except(a, b);
	assert_eq!(not_b.generate_tokens(&mut rng).unwrap(), ['a']);
}

#[test]
fn test_generate_is_reproducible() {
	use std::rc::Rc;

	use crate::{alt, any, token};

	let letters = Rc::new(alt("abcdef".chars().map(|c| Rc::new(token(c)))));
	let word = any(letters).max_gen(20);
	let first = word.generate_tokens(&mut seeded(42)).unwrap();
	let second = word.generate_tokens(&mut seeded(42)).unwrap();
	assert_eq!(first, second);
}

#[test]
fn test_generate_end_finishes_writer() {
	use crate::{TokenWriter, concat, end, token};

	#[derive(Default)]
	struct Recorder {
		tokens: String,
		finished: bool,
	}
	impl TokenWriter for Recorder {
		type Token = char;

		fn write<I: IntoIterator<Item = char>>(&mut self, tokens: I) -> AResult<()> {
			self.tokens.extend(tokens);
			Ok(())
		}

		fn finish(&mut self) -> AResult<()> {
			self.finished = true;
			Ok(())
		}
	}

	let terminated = concat([token('x').into(), end().into()]);
	let mut recorder = Recorder::default();
	terminated.generate(&mut recorder, &mut seeded(0)).unwrap();
	assert_eq!(recorder.tokens, "x");
	assert!(recorder.finished);
}

#[test]
fn test_generate_rejects_misconfigured_grammars() {
	use crate::{alt, rep, token};

	let empty = alt::<char>([]).named("nothing");
	let err = empty.generate_tokens(&mut seeded(0)).unwrap_err();
	assert!(err.to_string().contains("nothing"), "{err}");

	let inverted = rep(token('a'), 3, 2);
	assert!(inverted.generate_tokens(&mut seeded(0)).is_err());
}
