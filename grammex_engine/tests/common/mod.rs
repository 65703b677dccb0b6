#![allow(dead_code)]

use std::rc::Rc;

use anyhow::{Result as AResult, bail};
use grammex_engine::{
	Pattern,
	TextStream,
	TokenReader,
	TransformTable,
	alt,
	any,
	concat,
	except,
	literal,
	opt,
	some,
	token,
	unit,
};
use rand::Rng;

pub type CharPattern = Rc<Pattern<char>>;

pub const PROGRAM: &str = r#"PROGRAM DEMO1
	BEGIN
		A:=3;
		B:=45;
		H:=-100023;
		C:=A;
		D123:=B34A;
		BABOON:=GIRAFFE;
		TEXT:="Hello world!";
	END"#;

/// A unit accepting `accept` that generates one of `choices`.
pub fn char_class(accept: fn(&char) -> bool, choices: &'static str) -> Pattern<char> {
	let choices: Vec<char> = choices.chars().collect();
	unit(accept).generate_with(move |rng| choices[rng.gen_range(0 .. choices.len())])
}

/// The named rules of the assignment-program language, at the character level.
pub struct Grammar {
	pub digit: CharPattern,
	pub alpha: CharPattern,
	pub identifier: CharPattern,
	pub number: CharPattern,
	pub string: CharPattern,
	pub assignment: CharPattern,
	pub program: CharPattern,
}

pub fn grammar() -> Grammar {
	let minus = Rc::new(token('-').print_as("'-'"));
	let quote = Rc::new(token('"').print_as("'\"'"));
	let assign = Rc::new(literal(":=".chars()).print_as("\":=\""));
	let semicolon = Rc::new(token(';').print_as("';'"));
	let printable = char_class(|c| !c.is_control(), "456$#@agsg ");
	let not_quote = except(printable.print_as("[^\\0-\\x1f]"), quote.clone());
	let string = Rc::new(
		concat([quote.clone(), any(not_quote).into(), quote])
			.named("string")
			.logged(true),
	);
	let whitespace = char_class(char::is_ascii_whitespace, " ").print_as("[ \\t\\n]");
	let spacing = Rc::new(some(whitespace).max_gen(0));
	let digit = Rc::new(
		char_class(char::is_ascii_digit, "0123456789")
			.named("digit")
			.print_as("[0-9]"),
	);
	let alpha = Rc::new(
		char_class(char::is_ascii_uppercase, "ABCDEFGHIJKLMNOPQRSTUVWXYZ")
			.named("alpha")
			.print_as("[A-Z]"),
	);
	let alnum = any(alt([alpha.clone(), digit.clone()]));
	let identifier = Rc::new(concat([alpha.clone(), alnum.into()]).named("identifier"));
	let number = Rc::new(
		concat([opt(minus).into(), digit.clone(), any(digit.clone()).into()]).named("number"),
	);
	let right_side = alt([number.clone(), identifier.clone(), string.clone()]);
	let assignment = Rc::new(
		concat([identifier.clone(), assign, right_side.into()]).named("assignment"),
	);
	let statement = concat([assignment.clone(), semicolon, spacing.clone()]);
	let program = Rc::new(
		concat([
			Rc::new(literal("PROGRAM".chars()).print_as("\"PROGRAM\"")),
			spacing.clone(),
			identifier.clone(),
			spacing.clone(),
			Rc::new(literal("BEGIN".chars()).print_as("\"BEGIN\"")),
			spacing.clone(),
			any(statement).into(),
			Rc::new(literal("END".chars()).print_as("\"END\"")),
		])
		.named("program")
		.logged(true),
	);

	Grammar {
		digit,
		alpha,
		identifier,
		number,
		string,
		assignment,
		program,
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
	Text(String),
	Assignment(String, String),
	Program {
		name: String,
		assignments: Vec<(String, String)>,
	},
}

impl From<String> for Value {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl Value {
	pub fn text(self) -> AResult<String> {
		match self {
			Self::Text(text) => Ok(text),
			other => bail!("expected text but got {other:?}"),
		}
	}
}

pub fn transforms() -> TransformTable<TextStream, Value> {
	TransformTable::<TextStream, Value>::new()
		.with("identifier", |result, _, stream| {
			Ok(Value::Text(stream.range(&result.begin, &result.end)?))
		})
		.with("number", |result, _, stream| {
			Ok(Value::Text(stream.range(&result.begin, &result.end)?))
		})
		.with("string", |result, _, _| {
			// the quotes are the first and last components
			let content = result.components[1].values().into_iter().cloned().collect();
			Ok(Value::Text(content))
		})
		.with("assignment", |result, table, stream| {
			let left = table.transform(&result.components[0], stream)?.text()?;
			let chosen = &result.components[2].components[0];
			let right = table.transform(chosen, stream)?.text()?;
			Ok(Value::Assignment(left, right))
		})
		.with("program", |result, table, stream| {
			let name = table.transform(&result.components[2], stream)?.text()?;
			let mut assignments = vec![];
			for statement in &result.components[6].components {
				match table.transform(&statement.components[0], stream)? {
					Value::Assignment(left, right) => assignments.push((left, right)),
					other => bail!("expected an assignment but got {other:?}"),
				}
			}
			Ok(Value::Program { name, assignments })
		})
}
