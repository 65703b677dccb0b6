mod common;

use grammex_engine::{TextStream, TokenReader, except, rep, scan, some, token, unit};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::common::{Value, grammar, transforms};

fn generate_program(seed: u64) -> String {
	let grammar = grammar();
	let mut rng = StdRng::seed_from_u64(seed);
	let mut text = String::new();
	grammar.program.generate(&mut text, &mut rng).unwrap();
	text
}

proptest! {
	#[test]
	fn generated_programs_match(seed in any::<u64>()) {
		let text = generate_program(seed);
		let grammar = grammar();
		let mut stream = TextStream::new(&text);
		let result = grammar.program.try_match(&mut stream, None).unwrap();
		prop_assert!(result.is_some(), "generated program did not match: {text:?}");
		let result = result.unwrap();
		prop_assert_eq!(result.end, text.chars().count());
		prop_assert!(stream.finished());

		let value = result.transform(&transforms(), &mut stream).unwrap();
		let is_program = matches!(value, Value::Program { .. });
		prop_assert!(is_program);
	}

	#[test]
	fn generation_is_reproducible(seed in any::<u64>()) {
		prop_assert_eq!(generate_program(seed), generate_program(seed));
	}

	#[test]
	fn repetition_respects_bounds(
		input in "[ab]{0,12}",
		min in 0usize .. 5,
		extra in 0usize .. 4,
		bounded in any::<bool>(),
	) {
		let max = if bounded { min + extra } else { 0 };
		let pattern = rep(token('a'), min, max);
		let leading = input.chars().take_while(|&c| c == 'a').count();
		let expected = if max == 0 { leading } else { leading.min(max) };

		let mut stream = TextStream::new(&input);
		let result = pattern.try_match(&mut stream, None).unwrap();
		if expected < min {
			prop_assert!(result.is_none());
		} else {
			let result = result.unwrap();
			prop_assert_eq!(result.components.len(), expected);
			prop_assert_eq!(result.end, expected);
			prop_assert_eq!(stream.position().unwrap(), expected);
		}
	}

	#[test]
	fn generated_repetitions_stay_in_bounds(
		seed in any::<u64>(),
		min in 0usize .. 5,
		extra in 0usize .. 4,
		bounded in any::<bool>(),
	) {
		let max = if bounded { min + extra } else { 0 };
		let pattern = rep(token('x'), min, max).max_gen(3);
		let mut rng = StdRng::seed_from_u64(seed);
		let count = pattern.generate_tokens(&mut rng).unwrap().len();
		let upper = if max == 0 { min + 3 } else { max };
		prop_assert!((min ..= upper).contains(&count));
	}

	#[test]
	fn scanned_ranges_reproduce_input(input in "[a-c ]{0,20}") {
		let word = some(unit(|c: &char| c.is_alphabetic()));
		let chars: Vec<char> = input.chars().collect();
		let mut stream = TextStream::new(&input);
		let results = scan(&mut stream, &word).unwrap();
		prop_assert_eq!(results.len(), input.split_whitespace().count());

		let mut previous_end = 0;
		for result in &results {
			prop_assert!(result.begin >= previous_end);
			let text = stream.range(&result.begin, &result.end).unwrap();
			let expected: String = chars[result.begin .. result.end].iter().collect();
			prop_assert_eq!(text, expected);
			previous_end = result.end;
		}
	}

	#[test]
	fn exception_rejects_excluded_tokens(input in "[0-9]{1,5}") {
		let digit_but_six = except(unit(char::is_ascii_digit), token('6'));
		let mut stream = TextStream::new(&input);
		let result = digit_but_six.try_match(&mut stream, None).unwrap();
		prop_assert_eq!(result.is_some(), !input.starts_with('6'));
		if result.is_some() {
			prop_assert_eq!(stream.position().unwrap(), 1);
		}
	}
}
