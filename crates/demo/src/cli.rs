use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "partial-demo")]
#[command(about = "Apply an updateBook mutation to the demo book")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Mutation JSON, e.g. '{"id":17,"input":{"title":"1984"}}' (read from stdin if omitted)
	pub mutation: Option<String>,

	/// Read the mutation from a file
	#[arg(long, short = 'f', value_name = "PATH", conflicts_with = "mutation")]
	pub file: Option<PathBuf>,

	/// TOML config file
	#[arg(long, short = 'c', value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Reject input keys that name no field
	#[arg(long)]
	pub strict: bool,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,
}
