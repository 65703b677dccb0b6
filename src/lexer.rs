use std::fmt;

use nom::{
	Finish,
	Parser,
	branch::alt,
	bytes::complete::{tag, take_while},
	character::complete::{i64 as integer, satisfy},
	combinator::{eof, map, recognize, value},
	multi::many0,
	sequence::{delimited, preceded},
};
use nom_language::error::{VerboseError, convert_error};

/// A lexeme of the assignment-program language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
	Program,
	Begin,
	End,
	Identifier(String),
	Number(i64),
	Str(String),
	Assign,
	Semicolon,
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Program => f.write_str("PROGRAM"),
			Self::Begin => f.write_str("BEGIN"),
			Self::End => f.write_str("END"),
			Self::Identifier(name) => f.write_str(name),
			Self::Number(number) => write!(f, "{number}"),
			Self::Str(text) => write!(f, "\"{text}\""),
			Self::Assign => f.write_str(":="),
			Self::Semicolon => f.write_str(";"),
		}
	}
}

pub fn lex(input: &str) -> anyhow::Result<Vec<Token>> {
	let res = top.parse(input).finish();
	let res = res.map_err(|err| anyhow::anyhow!("{}", convert_error(input, err)));
	let (_, res) = res?;
	Ok(res)
}

/**
	Lay tokens out as source text that lexes back to the same tokens.

	Statements go on their own line; everything else is separated by a space.
*/
pub fn render(tokens: &[Token]) -> String {
	let mut out = String::new();
	for (index, token) in tokens.iter().enumerate() {
		if index > 0 {
			let newline = matches!(tokens[index - 1], Token::Begin | Token::Semicolon);
			out.push(if newline { '\n' } else { ' ' });
		}
		out += &token.to_string();
	}
	out
}

type PResult<'a, T> = nom::IResult<&'a str, T, VerboseError<&'a str>>;

fn top(input: &str) -> PResult<Vec<Token>> {
	let (input, tokens) = many0(preceded(whitespace, token)).parse(input)?;
	let (input, _) = whitespace.parse(input)?;
	let (input, _) = eof.parse(input)?;
	Ok((input, tokens))
}

fn token(input: &str) -> PResult<Token> {
	alt((
		map(word, |word| match word {
			"PROGRAM" => Token::Program,
			"BEGIN" => Token::Begin,
			"END" => Token::End,
			_ => Token::Identifier(word.to_string()),
		}),
		map(integer, Token::Number),
		map(string, Token::Str),
		value(Token::Assign, tag(":=")),
		value(Token::Semicolon, tag(";")),
	))
	.parse(input)
}

fn word(input: &str) -> PResult<&str> {
	recognize((
		satisfy(|c| c.is_ascii_uppercase()),
		take_while(|c: char| c.is_ascii_uppercase() || c.is_ascii_digit()),
	))
	.parse(input)
}

fn string(input: &str) -> PResult<String> {
	map(
		delimited(tag("\""), take_while(|c: char| c != '"'), tag("\"")),
		str::to_string,
	)
	.parse(input)
}

fn whitespace(input: &str) -> PResult<()> {
	map(take_while(char::is_whitespace), |_| ()).parse(input)
}

#[test]
fn test_lex_program() {
	let tokens = lex("PROGRAM DEMO1\nBEGIN\n\tA:=3;\n\tB2 := -45 ;\n\tT:=\"hi there\";\nEND\n").unwrap();
	assert_eq!(
		tokens,
		[
			Token::Program,
			Token::Identifier("DEMO1".into()),
			Token::Begin,
			Token::Identifier("A".into()),
			Token::Assign,
			Token::Number(3),
			Token::Semicolon,
			Token::Identifier("B2".into()),
			Token::Assign,
			Token::Number(-45),
			Token::Semicolon,
			Token::Identifier("T".into()),
			Token::Assign,
			Token::Str("hi there".into()),
			Token::Semicolon,
			Token::End,
		],
	);
}

#[test]
fn test_keywords_need_whole_words() {
	assert_eq!(
		lex("ENDING BEGIN2").unwrap(),
		[
			Token::Identifier("ENDING".into()),
			Token::Identifier("BEGIN2".into()),
		],
	);
	assert!(lex("").unwrap().is_empty());
}

#[test]
fn test_lex_errors() {
	assert!(lex("A := lowercase").is_err());
	assert!(lex("T := \"unterminated").is_err());
	assert!(lex("N := 99999999999999999999").is_err());
}

#[test]
fn test_render() {
	let source = "PROGRAM P BEGIN X := \"a b\"; Y := -1; END";
	let tokens = lex(source).unwrap();
	let rendered = render(&tokens);
	assert_eq!(rendered, "PROGRAM P BEGIN\nX := \"a b\" ;\nY := -1 ;\nEND");
	assert_eq!(lex(&rendered).unwrap(), tokens);
}
