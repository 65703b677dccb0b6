use std::borrow::Borrow;
use std::fmt::{self, Write};
use std::rc::Rc;

use anyhow::Result as AResult;

use crate::{Pattern, PatternKind};

impl<T> Pattern<T> {
	/**
		Write this pattern as EBNF.

		Concatenations and alternations refer to named children by identifier
		and expand anonymous ones; repetitions and exceptions always expand
		their operands. Units and series print their description, and the end
		of input prints nothing.
	*/
	pub fn print<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
		if let Some(description) = &self.description {
			return out.write_str(description);
		}
		match &self.kind {
			PatternKind::Unit { .. } | PatternKind::Series { .. } | PatternKind::End => Ok(()),
			PatternKind::Concat(patterns) => print_group(out, patterns, ", "),
			PatternKind::Alt(patterns) => print_group(out, patterns, " | "),
			&PatternKind::Rep {
				ref pattern,
				min,
				max,
				..
			} => print_rep(out, pattern, min, max),
			PatternKind::Except { must_match, except } => {
				must_match.print(out)?;
				out.write_str(" - ")?;
				except.print(out)
			},
		}
	}
}

impl<T> fmt::Display for Pattern<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.print(f)
	}
}

fn print_child<T, W: Write + ?Sized>(out: &mut W, child: &Pattern<T>) -> fmt::Result {
	if child.is_named() {
		out.write_str(child.id())
	} else {
		child.print(out)
	}
}

fn print_group<T, W: Write + ?Sized>(
	out: &mut W,
	patterns: &[Rc<Pattern<T>>],
	separator: &str,
) -> fmt::Result {
	out.write_char('(')?;
	for (index, child) in patterns.iter().enumerate() {
		if index > 0 {
			out.write_str(separator)?;
		}
		print_child(out, child)?;
	}
	out.write_char(')')
}

fn print_rep<T, W: Write + ?Sized>(
	out: &mut W,
	pattern: &Pattern<T>,
	min: usize,
	max: usize,
) -> fmt::Result {
	match (min, max) {
		(0, 0) => {
			pattern.print(out)?;
			out.write_char('*')
		},
		(0, 1) => {
			pattern.print(out)?;
			out.write_char('?')
		},
		(1, 0) => {
			pattern.print(out)?;
			out.write_char('+')
		},
		(min, 0) => {
			write!(out, "({min} * ")?;
			pattern.print(out)?;
			out.write_str(", ")?;
			pattern.print(out)?;
			out.write_str("*)")
		},
		(min, max) if min == max => {
			write!(out, "{min} * ")?;
			pattern.print(out)
		},
		(min, max) => {
			write!(out, "({min} * ")?;
			pattern.print(out)?;
			write!(out, ", {} * ", max.saturating_sub(min))?;
			pattern.print(out)?;
			out.write_str("?)")
		},
	}
}

/**
	Render each pattern as a `<identifier> = <EBNF>` line.

	Meant for documenting a grammar's named rules; the output is not parsed
	back by anything.
*/
pub fn print_rules<T, P: Borrow<Pattern<T>>>(patterns: impl IntoIterator<Item = P>) -> AResult<String> {
	let mut out = String::new();
	for pattern in patterns {
		let pattern = pattern.borrow();
		write!(out, "{} = ", pattern.id())?;
		pattern.print(&mut out)?;
		out.push('\n');
	}
	Ok(out)
}

#[test]
fn test_print_rules() {
	use crate::{alt, any, concat, except, unit};

	let zero = unit(|c: &char| *c == '0').print_as("[0]");
	let digit = Rc::new(unit(char::is_ascii_digit).named("digit").print_as("[0-9]"));
	let alpha = Rc::new(unit(char::is_ascii_uppercase).named("alphachar").print_as("[A-Z]"));
	let alnum = any(alt([alpha.clone(), digit.clone()]));
	let identifier = concat([alpha.clone(), alnum.into()]).named("identifier");
	let digit_minus_zero = except(digit.clone(), zero).named("digit_minus_zero");

	let rules = print_rules([
		&*digit,
		&*alpha,
		&identifier,
		&digit_minus_zero,
	])
	.unwrap();
	assert_eq!(
		rules,
		"digit = [0-9]\n\
		alphachar = [A-Z]\n\
		identifier = (alphachar, (alphachar | digit)*)\n\
		digit_minus_zero = [0-9] - [0]\n"
	);
}

#[test]
fn test_print_repetitions() {
	use crate::{n, opt, rep, some, token};

	let a = Rc::new(token('a').print_as("\"a\""));
	assert_eq!(opt(a.clone()).to_string(), "\"a\"?");
	assert_eq!(some(a.clone()).to_string(), "\"a\"+");
	assert_eq!(n(a.clone(), 3).to_string(), "3 * \"a\"");
	assert_eq!(rep(a.clone(), 2, 5).to_string(), "(2 * \"a\", 3 * \"a\"?)");
	assert_eq!(rep(a, 2, 0).to_string(), "(2 * \"a\", \"a\"*)");
}

#[test]
fn test_print_misc() {
	use crate::{concat, end, literal, token};

	assert_eq!(end::<char>().to_string(), "");
	assert_eq!(literal("ab".chars()).to_string(), "");
	let quoted = concat([token('"').print_as("'\"'").into(), end().into()]);
	assert_eq!(quoted.to_string(), "('\"', )");
	// a description overrides the structure of a composite
	assert_eq!(quoted.print_as("quote").to_string(), "quote");
}
