mod common;

use std::rc::Rc;

use grammex_engine::{
	Mismatch,
	TextStream,
	TokenReader,
	TransformTable,
	alt,
	concat,
	end,
	except,
	literal,
	print_rules,
	rep,
	scan,
	some,
	token,
	unit,
};
use rstest::rstest;

use crate::common::{PROGRAM, Value, grammar, transforms};

#[rstest]
#[case("abaaa", Some("abaa"), "a")]
#[case("bbbbb", Some("bbbb"), "b")]
#[case("aba", Some("aba"), "")]
#[case("ab", None, "")]
#[case("abca", None, "a")]
fn test_repeated_choice(#[case] input: &str, #[case] matched: Option<&str>, #[case] rest: &str) {
	let a = Rc::new(token('a').named("is_a"));
	let b = Rc::new(token('b').named("is_b"));
	let a_or_b = Rc::new(alt([a, b]).named("is_a_or_b"));
	let repeated = rep(a_or_b, 3, 4).named("ab_repeat");

	let mut stream = TextStream::new(input);
	let result = repeated.try_match(&mut stream, None).unwrap();
	let text = result.map(|result| stream.range(&result.begin, &result.end).unwrap());
	assert_eq!(text.as_deref(), matched);
	if matched.is_some() {
		assert_eq!(stream.remaining(), rest);
	}
}

fn digits_without_six() -> grammex_engine::Pattern<char> {
	let digit = Rc::new(unit(char::is_ascii_digit).named("digit"));
	let six = Rc::new(token('6').named("six"));
	concat([
		Rc::new(some(except(digit, six))),
		Rc::new(end()),
	])
	.named("all_digits_except_six")
	.logged(true)
}

#[test]
fn test_digits_except_six_transform() {
	let pattern = digits_without_six();
	let table = TransformTable::<TextStream, String>::new().with(
		"all_digits_except_six",
		|result, _, _| Ok(result.components[0].values().into_iter().cloned().collect()),
	);

	let mut stream = TextStream::new("123457");
	let result = pattern.try_match(&mut stream, None).unwrap().unwrap();
	assert_eq!((result.begin, result.end), (0, 6));
	assert_eq!(result.transform(&table, &mut stream).unwrap(), "123457");
}

#[test]
fn test_digits_except_six_mismatch() {
	let pattern = digits_without_six();
	let mut stream = TextStream::new("123467");
	let mut mismatches: Vec<Mismatch<'_, TextStream>> = vec![];
	assert!(pattern.try_match(&mut stream, Some(&mut mismatches)).unwrap().is_none());

	assert_eq!(mismatches.len(), 1);
	assert_eq!(
		mismatches[0].to_string(),
		"all_digits_except_six did not match between 0 and 4, failing at end from 4 after matching [rep]",
	);
}

#[rstest]
#[case("testing {hallo}hallo this :330ehallo", &[(8, 15)])]
#[case("{hallo}{hallo}", &[(0, 7), (7, 14)])]
#[case("{hallo", &[])]
#[case("", &[])]
fn test_scan_for_braced_word(#[case] input: &str, #[case] spans: &[(usize, usize)]) {
	let hallo = concat([
		Rc::new(token('{')),
		Rc::new(literal("hallo".chars())),
		Rc::new(token('}')),
	]);
	let mut stream = TextStream::new(input);
	let found: Vec<_> = scan(&mut stream, &hallo)
		.unwrap()
		.iter()
		.map(|result| (result.begin, result.end))
		.collect();
	assert_eq!(found, spans);
}

#[rstest]
#[case("ab", "b")]
#[case("a", "")]
fn test_alternation_commits_to_first(#[case] input: &str, #[case] rest: &str) {
	let short = Rc::new(literal("a".chars()).named("short"));
	let long = Rc::new(literal("ab".chars()).named("long"));
	let choice = alt([short, long]);

	let mut stream = TextStream::new(input);
	let result = choice.try_match(&mut stream, None).unwrap().unwrap();
	assert_eq!(result.components[0].id(), "short");
	assert_eq!(stream.remaining(), rest);
}

#[test]
fn test_program_transform() {
	let grammar = grammar();
	let mut stream = TextStream::new(PROGRAM);
	let mut mismatches: Vec<Mismatch<'_, TextStream>> = vec![];
	let result = grammar
		.program
		.try_match(&mut stream, Some(&mut mismatches))
		.unwrap()
		.unwrap();
	assert!(stream.finished());
	assert_eq!(result.end, PROGRAM.chars().count());

	let expected = [
		("A", "3"),
		("B", "45"),
		("H", "-100023"),
		("C", "A"),
		("D123", "B34A"),
		("BABOON", "GIRAFFE"),
		("TEXT", "Hello world!"),
	];
	assert_eq!(
		result.transform(&transforms(), &mut stream).unwrap(),
		Value::Program {
			name: "DEMO1".into(),
			assignments: expected
				.iter()
				.map(|&(left, right)| (left.into(), right.into()))
				.collect(),
		},
	);
}

#[test]
fn test_program_mismatches() {
	let grammar = grammar();
	let mut stream = TextStream::new("PROGRAM DEMO1 BEGIN A:=; END");
	let mut mismatches: Vec<Mismatch<'_, TextStream>> = vec![];
	let result = grammar.program.try_match(&mut stream, Some(&mut mismatches)).unwrap();
	assert!(result.is_none());

	let ids: Vec<_> = mismatches.iter().map(Mismatch::id).collect();
	assert_eq!(ids, ["string", "program"]);
	assert_eq!((mismatches[0].begin, mismatches[0].end), (23, 24));

	// the statements were abandoned, so END was expected right after BEGIN
	let failed = mismatches[1].mismatch_component.as_ref().unwrap();
	assert_eq!(failed.begin, 20);
	assert_eq!(mismatches[1].matched_components.len(), 7);
}

#[test]
fn test_program_rules() {
	let grammar = grammar();
	let rules = print_rules([
		&*grammar.digit,
		&*grammar.alpha,
		&*grammar.identifier,
		&*grammar.number,
		&*grammar.assignment,
	])
	.unwrap();
	assert_eq!(
		rules,
		"digit = [0-9]\n\
		alpha = [A-Z]\n\
		identifier = (alpha, (alpha | digit)*)\n\
		number = ('-'?, digit, [0-9]*)\n\
		assignment = (identifier, \":=\", (number | identifier | string))\n",
	);
}
