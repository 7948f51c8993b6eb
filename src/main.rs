//! Command line entrypoint: reads a graph document from a file, or stdin, and
//! writes its layout to stdout as JSON.

// Bin target reuses lib deps, silence noisy lint.
#![allow(unused_crate_dependencies)]

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use join_graph::{Document, Error, init_logging, layout_document};
use log::error;

#[derive(Debug, Parser)]
#[command(name = "join-graph")]
#[command(version)]
#[command(about = "Normalize and lay out an execution dependency graph")]
struct Args {
	/// Graph document to read. Reads stdin when omitted.
	input: Option<PathBuf>,

	/// Write compact JSON instead of pretty-printed output
	#[arg(long)]
	compact: bool,
}

fn read_input(path: Option<&PathBuf>) -> Result<String, Error> {
	match path {
		Some(path) => Ok(std::fs::read_to_string(path)?),
		None => {
			let mut text = String::new();
			io::stdin().read_to_string(&mut text)?;
			Ok(text)
		}
	}
}

fn run(args: &Args) -> Result<(), Error> {
	let text = read_input(args.input.as_ref())?;
	let document: Document = serde_json::from_str(&text)?;
	let rendering = layout_document(&document)?;

	let mut out = io::stdout().lock();
	if args.compact {
		serde_json::to_writer(&mut out, &rendering)?;
	} else {
		serde_json::to_writer_pretty(&mut out, &rendering)?;
	}
	writeln!(out)?;
	Ok(())
}

fn main() -> ExitCode {
	let args = Args::parse();
	init_logging();

	match run(&args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!("join-graph: {e}");
			ExitCode::FAILURE
		}
	}
}

#[cfg(test)]
mod tests {
	use clap::error::ErrorKind;

	use super::*;

	#[test]
	fn input_is_optional() {
		let args = Args::try_parse_from(["join-graph"]).unwrap();
		assert_eq!(args.input, None);
		assert!(!args.compact);

		let args = Args::try_parse_from(["join-graph", "doc.json", "--compact"]).unwrap();
		assert_eq!(args.input, Some(PathBuf::from("doc.json")));
		assert!(args.compact);
	}

	#[test]
	fn help_is_not_a_file_name() {
		let err = Args::try_parse_from(["join-graph", "--help"]).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::DisplayHelp);
	}

	#[test]
	fn extra_arguments_are_rejected() {
		assert!(Args::try_parse_from(["join-graph", "doc.json", "extra", "junk"]).is_err());
	}

	#[test]
	fn missing_file_is_an_io_error() {
		let path = PathBuf::from("/nonexistent/join-graph/doc.json");
		assert!(matches!(read_input(Some(&path)), Err(Error::Io(_))));
	}
}
