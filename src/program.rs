use std::rc::Rc;

use anyhow::{Result as AResult, bail};
use grammex_engine::{
	MatchResult,
	Mismatch,
	Pattern,
	TransformTable,
	VecStream,
	alt,
	any,
	concat,
	end,
	print_rules,
	scan,
	token,
	unit,
};
use rand::{Rng, RngCore};

use crate::lexer::{Token, lex};

pub type TokenStream = VecStream<Token>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
	Number(i64),
	Identifier(String),
	Text(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
	pub left: String,
	pub right: Value,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
	pub name: String,
	pub assignments: Vec<Assignment>,
}

/// Intermediate values produced while reducing a match of [Grammar::program].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
	Tokens(Vec<Token>),
	Name(String),
	Value(Value),
	Assignment(Assignment),
	Program(Program),
}

impl From<Vec<Token>> for Node {
	fn from(tokens: Vec<Token>) -> Self {
		Self::Tokens(tokens)
	}
}

impl Node {
	fn into_name(self) -> AResult<String> {
		match self {
			Self::Name(name) => Ok(name),
			other => bail!("expected an identifier, got {other:?}"),
		}
	}

	fn into_value(self) -> AResult<Value> {
		match self {
			Self::Name(name) => Ok(Value::Identifier(name)),
			Self::Value(value) => Ok(value),
			other => bail!("expected a value, got {other:?}"),
		}
	}

	fn into_assignment(self) -> AResult<Assignment> {
		match self {
			Self::Assignment(assignment) => Ok(assignment),
			other => bail!("expected an assignment, got {other:?}"),
		}
	}
}

const WORDS: &[&str] = &["hello", "grammar", "token stream", "42", "x := y;", ""];

fn random_identifier(rng: &mut dyn RngCore) -> String {
	// a letter and digits only, so no identifier is ever a keyword
	let mut name = String::from(char::from(rng.gen_range(b'A' ..= b'Z')));
	for _ in 0 .. rng.gen_range(0 ..= 3) {
		name.push(char::from(rng.gen_range(b'0' ..= b'9')));
	}
	name
}

/**
	The assignment-program language over lexed [Token]s:

	```text
	program = "PROGRAM", identifier, "BEGIN", (assignment, ";")*, "END"
	assignment = identifier, ":=", value
	value = number | identifier | string
	```

	The program and assignment rules log their mismatches.
*/
pub struct Grammar {
	pub identifier: Rc<Pattern<Token>>,
	pub number: Rc<Pattern<Token>>,
	pub string: Rc<Pattern<Token>>,
	pub value: Rc<Pattern<Token>>,
	pub assignment: Rc<Pattern<Token>>,
	pub program: Rc<Pattern<Token>>,
}

impl Grammar {
	pub fn new() -> Self {
		let identifier = Rc::new(
			unit(|token: &Token| matches!(token, Token::Identifier(_)))
				.generate_with(|rng| Token::Identifier(random_identifier(rng)))
				.named("identifier")
				.print_as("? identifier token ?"),
		);
		let number = Rc::new(
			unit(|token: &Token| matches!(token, Token::Number(_)))
				.generate_with(|rng| Token::Number(rng.gen_range(-1000 ..= 1000)))
				.named("number")
				.print_as("? number token ?"),
		);
		let string = Rc::new(
			unit(|token: &Token| matches!(token, Token::Str(_)))
				.generate_with(|rng| Token::Str(WORDS[rng.gen_range(0 .. WORDS.len())].into()))
				.named("string")
				.print_as("? string token ?"),
		);
		let value = Rc::new(alt([number.clone(), identifier.clone(), string.clone()]).named("value"));
		let assignment = Rc::new(
			concat([
				identifier.clone(),
				Rc::new(token(Token::Assign).print_as("\":=\"")),
				value.clone(),
			])
			.named("assignment")
			.logged(true),
		);
		let statement = concat([
			assignment.clone(),
			Rc::new(token(Token::Semicolon).print_as("\";\"")),
		]);
		let program = Rc::new(
			concat([
				Rc::new(token(Token::Program).print_as("\"PROGRAM\"")),
				identifier.clone(),
				Rc::new(token(Token::Begin).print_as("\"BEGIN\"")),
				Rc::new(any(statement)),
				Rc::new(token(Token::End).print_as("\"END\"")),
				Rc::new(end().print_as("? end of input ?")),
			])
			.named("program")
			.logged(true),
		);

		Self {
			identifier,
			number,
			string,
			value,
			assignment,
			program,
		}
	}

	/// The named rules, outermost first, as `name = EBNF` lines.
	pub fn rules(&self) -> AResult<String> {
		print_rules([
			&self.program,
			&self.assignment,
			&self.value,
			&self.identifier,
			&self.number,
			&self.string,
		].map(|rule| &**rule))
	}

	/**
		Match a whole token sequence as a program and reduce it.

		Returns `Ok(None)` if the tokens are not a program, with the reasons
		appended to `mismatches`.
	*/
	pub fn parse<'g>(
		&'g self,
		tokens: Vec<Token>,
		mismatches: &mut Vec<Mismatch<'g, TokenStream>>,
	) -> AResult<Option<Program>> {
		let mut stream = TokenStream::new(tokens);
		let Some(result) = self.program.try_match(&mut stream, Some(mismatches))? else {
			return Ok(None);
		};
		match result.transform(&transforms(), &mut stream)? {
			Node::Program(program) => Ok(Some(program)),
			other => bail!("program reduced to {other:?}"),
		}
	}

	/// Every assignment in `tokens`, wherever it appears.
	pub fn assignments(&self, tokens: Vec<Token>) -> AResult<Vec<Assignment>> {
		let mut stream = TokenStream::new(tokens);
		let table = transforms();
		scan(&mut stream, &self.assignment)?
			.iter()
			.map(|result| table.transform(result, &mut stream)?.into_assignment())
			.collect()
	}

	/// A random program, as tokens.
	pub fn generate(&self, rng: &mut dyn RngCore) -> AResult<Vec<Token>> {
		self.program.generate_tokens(rng)
	}
}

impl Default for Grammar {
	fn default() -> Self {
		Self::new()
	}
}

fn single_token<'a>(result: &'a MatchResult<'_, TokenStream>) -> AResult<&'a Token> {
	match result.value.as_slice() {
		[token] => Ok(token),
		tokens => bail!("expected one token from {}, got {tokens:?}", result.pattern.label()),
	}
}

pub fn transforms() -> TransformTable<TokenStream, Node> {
	TransformTable::new()
		.with("identifier", |result, _, _| match single_token(result)? {
			Token::Identifier(name) => Ok(Node::Name(name.clone())),
			other => bail!("not an identifier: {other}"),
		})
		.with("number", |result, _, _| match single_token(result)? {
			&Token::Number(number) => Ok(Node::Value(Value::Number(number))),
			other => bail!("not a number: {other}"),
		})
		.with("string", |result, _, _| match single_token(result)? {
			Token::Str(text) => Ok(Node::Value(Value::Text(text.clone()))),
			other => bail!("not a string: {other}"),
		})
		.with("value", |result, table, stream| {
			table.transform(&result.components[0], stream)
		})
		.with("assignment", |result, table, stream| {
			let left = table.transform(&result.components[0], stream)?.into_name()?;
			let right = table.transform(&result.components[2], stream)?.into_value()?;
			Ok(Node::Assignment(Assignment { left, right }))
		})
		.with("program", |result, table, stream| {
			let name = table.transform(&result.components[1], stream)?.into_name()?;
			let mut assignments = vec![];
			for statement in &result.components[3].components {
				assignments.push(table.transform(&statement.components[0], stream)?.into_assignment()?);
			}
			Ok(Node::Program(Program { name, assignments }))
		})
}

/// Lex and parse source text, failing with the logged mismatches if it is not a program.
pub fn parse(source: &str) -> AResult<Program> {
	let grammar = Grammar::new();
	let mut mismatches = vec![];
	match grammar.parse(lex(source)?, &mut mismatches)? {
		Some(program) => Ok(program),
		None => {
			let reasons: Vec<_> = mismatches.iter().map(ToString::to_string).collect();
			bail!("not a program:\n{}", reasons.join("\n"))
		},
	}
}

#[test]
fn test_parse() {
	let program = parse(
		r#"PROGRAM DEMO1
		BEGIN
			A:=3;
			H:=-100023;
			C:=A;
			TEXT:="Hello world!";
		END"#,
	)
	.unwrap();
	assert_eq!(program.name, "DEMO1");
	assert_eq!(
		program.assignments,
		[
			Assignment { left: "A".into(), right: Value::Number(3) },
			Assignment { left: "H".into(), right: Value::Number(-100023) },
			Assignment { left: "C".into(), right: Value::Identifier("A".into()) },
			Assignment { left: "TEXT".into(), right: Value::Text("Hello world!".into()) },
		],
	);
}

#[test]
fn test_parse_failures() {
	let grammar = Grammar::new();
	let mut mismatches = vec![];
	let tokens = lex("PROGRAM P BEGIN A := ; END").unwrap();
	assert_eq!(grammar.parse(tokens, &mut mismatches).unwrap(), None);
	let ids: Vec<_> = mismatches.iter().map(Mismatch::id).collect();
	assert_eq!(ids, ["assignment", "program"]);
	assert_eq!(
		mismatches[0].to_string(),
		"assignment did not match between 3 and 6, failing at value from 5 after matching [identifier, unit]",
	);

	// trailing tokens after END
	let err = parse("PROGRAM P BEGIN END END").unwrap_err();
	assert!(err.to_string().contains("\nprogram did not match between 0 and 4, failing at end from 4"));
}

#[test]
fn test_assignments() {
	let grammar = Grammar::new();
	let tokens = lex("A := 1; ; B := \"two\" C := D END").unwrap();
	assert_eq!(
		grammar.assignments(tokens).unwrap(),
		[
			Assignment { left: "A".into(), right: Value::Number(1) },
			Assignment { left: "B".into(), right: Value::Text("two".into()) },
			Assignment { left: "C".into(), right: Value::Identifier("D".into()) },
		],
	);
}

#[test]
fn test_generated_programs_parse() {
	use rand::SeedableRng;

	use crate::lexer::render;

	let grammar = Grammar::new();
	for seed in 0 .. 32 {
		let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
		let tokens = grammar.generate(&mut rng).unwrap();
		let mut mismatches = vec![];
		let program = grammar.parse(tokens.clone(), &mut mismatches).unwrap().unwrap();
		assert_eq!(program.assignments.len(), tokens.iter().filter(|token| **token == Token::Assign).count());
		assert_eq!(parse(&render(&tokens)).unwrap(), program);
	}
}

#[test]
fn test_rules() {
	assert_eq!(
		Grammar::new().rules().unwrap(),
		"program = (\"PROGRAM\", identifier, \"BEGIN\", (assignment, \";\")*, \"END\", ? end of input ?)\n\
		assignment = (identifier, \":=\", value)\n\
		value = (number | identifier | string)\n\
		identifier = ? identifier token ?\n\
		number = ? number token ?\n\
		string = ? string token ?\n",
	);
}
