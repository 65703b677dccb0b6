use grammex::{Assignment, Grammar, Token, Value, lex, parse, render};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rstest::rstest;

fn identifier() -> impl Strategy<Value = String> {
	"[A-Z][A-Z0-9]{0,6}".prop_filter("keywords are not identifiers", |name| {
		!matches!(name.as_str(), "PROGRAM" | "BEGIN" | "END")
	})
}

fn value() -> impl Strategy<Value = Value> {
	prop_oneof![
		(-1_000_000i64 .. 1_000_000).prop_map(Value::Number),
		identifier().prop_map(Value::Identifier),
		"[a-z0-9 :=;]{0,12}".prop_map(Value::Text),
	]
}

fn source_of(name: &str, assignments: &[Assignment]) -> String {
	let mut source = format!("PROGRAM {name}\nBEGIN\n");
	for Assignment { left, right } in assignments {
		let right = match right {
			Value::Number(number) => number.to_string(),
			Value::Identifier(name) => name.clone(),
			Value::Text(text) => format!("\"{text}\""),
		};
		source += &format!("\t{left} := {right};\n");
	}
	source + "END\n"
}

proptest! {
	#[test]
	fn written_programs_parse_back(
		name in identifier(),
		assignments in prop::collection::vec(
			(identifier(), value()).prop_map(|(left, right)| Assignment { left, right }),
			0 .. 8,
		),
	) {
		let program = parse(&source_of(&name, &assignments)).unwrap();
		prop_assert_eq!(program.name, name);
		prop_assert_eq!(program.assignments, assignments);
	}

	#[test]
	fn generated_programs_render_and_parse(seed in any::<u64>()) {
		let grammar = Grammar::new();
		let tokens = grammar.generate(&mut StdRng::seed_from_u64(seed)).unwrap();
		let source = render(&tokens);
		prop_assert_eq!(lex(&source).unwrap(), tokens.clone());

		let mut mismatches = vec![];
		let program = grammar.parse(tokens, &mut mismatches).unwrap();
		prop_assert_eq!(program, Some(parse(&source).unwrap()));
	}
}

#[rstest]
#[case::missing_begin("PROGRAM P A := 1; END")]
#[case::missing_semicolon("PROGRAM P BEGIN A := 1 END")]
#[case::missing_end("PROGRAM P BEGIN A := 1;")]
#[case::trailing("PROGRAM P BEGIN END A := 1;")]
#[case::not_lexable("PROGRAM p BEGIN END")]
fn test_rejected_programs(#[case] source: &str) {
	assert!(parse(source).is_err());
}

#[test]
fn test_scan_ignores_surroundings() {
	let tokens = lex("BEGIN X := 1 ; END END Y := Z PROGRAM").unwrap();
	assert_eq!(tokens.first(), Some(&Token::Begin));
	let found = Grammar::new().assignments(tokens).unwrap();
	assert_eq!(
		found,
		[
			Assignment {
				left: "X".into(),
				right: Value::Number(1),
			},
			Assignment {
				left: "Y".into(),
				right: Value::Identifier("Z".into()),
			},
		],
	);
}
