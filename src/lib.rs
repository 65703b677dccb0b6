/*!
	Composable token-stream grammars that match, generate and print themselves.

	The pattern engine lives in [grammex_engine] and is re-exported here. The
	[lexer] and [program] modules build a small assignment language on top of
	it, which is what the `grammex` binary drives.
*/

pub mod lexer;
pub mod program;

pub use grammex_engine::*;
pub use nom;

pub use crate::{
	lexer::{Token, lex, render},
	program::{Assignment, Grammar, Program, Value, parse},
};
