use std::io::Read as _;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use grammex::{Grammar, lex, render};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Parser)]
#[command(name = "grammex")]
#[command(about = "Match, scan, generate and print assignment programs")]
struct Cli {
	/// Seed for `generate`, for reproducible output
	#[arg(long, global = true)]
	seed: Option<u64>,

	/// Print logged mismatches even when matching succeeds
	#[arg(long, short, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
#[cfg_attr(test, derive(Debug, PartialEq))]
enum Commands {
	/// Parse a whole program and print it
	Match(SourceArgs),
	/// Print every assignment found anywhere in the input
	Scan(SourceArgs),
	/// Print random programs
	Generate {
		/// How many programs to print
		#[arg(long, default_value_t = 1)]
		count: usize,
	},
	/// Print the grammar as EBNF
	Rules,
}

#[derive(clap::Args)]
#[cfg_attr(test, derive(Debug, PartialEq))]
struct SourceArgs {
	/// Source file; reads stdin when omitted
	file: Option<PathBuf>,

	/// Source text (skips the file and stdin)
	#[arg(long, conflicts_with = "file")]
	text: Option<String>,
}

impl SourceArgs {
	fn read(&self) -> anyhow::Result<String> {
		if let Some(text) = &self.text {
			return Ok(text.clone());
		}
		match &self.file {
			Some(file) => std::fs::read_to_string(file)
				.with_context(|| format!("couldn't read {}", file.display())),
			None => {
				let mut source = String::new();
				std::io::stdin()
					.read_to_string(&mut source)
					.context("couldn't read stdin")?;
				Ok(source)
			},
		}
	}
}

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	let grammar = Grammar::new();

	match &cli.command {
		Commands::Match(source) => {
			let tokens = lex(&source.read()?).context("couldn't lex input")?;
			let mut mismatches = vec![];
			let program = grammar.parse(tokens, &mut mismatches)?;
			if program.is_none() || cli.verbose {
				for mismatch in &mismatches {
					eprintln!("{mismatch}");
				}
			}
			let Some(program) = program else {
				bail!("input is not a program");
			};
			println!("{program:#?}");
		},
		Commands::Scan(source) => {
			let tokens = lex(&source.read()?).context("couldn't lex input")?;
			for assignment in grammar.assignments(tokens)? {
				println!("{} := {:?}", assignment.left, assignment.right);
			}
		},
		&Commands::Generate { count } => {
			let mut rng = match cli.seed {
				Some(seed) => StdRng::seed_from_u64(seed),
				None => StdRng::from_entropy(),
			};
			for index in 0 .. count {
				if index > 0 {
					println!();
				}
				println!("{}", render(&grammar.generate(&mut rng)?));
			}
		},
		Commands::Rules => print!("{}", grammar.rules()?),
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case::match_file(
		&["grammex", "match", "demo.prog"],
		Commands::Match(SourceArgs { file: Some("demo.prog".into()), text: None }),
	)]
	#[case::scan_text(
		&["grammex", "scan", "--text", "A := 1;"],
		Commands::Scan(SourceArgs { file: None, text: Some("A := 1;".into()) }),
	)]
	#[case::generate_default(&["grammex", "generate"], Commands::Generate { count: 1 })]
	#[case::generate_many(
		&["grammex", "--seed", "7", "generate", "--count", "3"],
		Commands::Generate { count: 3 },
	)]
	#[case::rules(&["grammex", "rules", "-v"], Commands::Rules)]
	fn test_cli_parsing(#[case] argv: &[&str], #[case] expected: Commands) {
		let cli = Cli::parse_from(argv);
		assert_eq!(cli.command, expected);
	}

	#[test]
	fn test_global_flags() {
		let cli = Cli::parse_from(["grammex", "generate", "--seed", "9", "--verbose"]);
		assert_eq!(cli.seed, Some(9));
		assert!(cli.verbose);
		assert!(Cli::try_parse_from(["grammex", "match", "a.prog", "--text", "x"]).is_err());
	}
}
