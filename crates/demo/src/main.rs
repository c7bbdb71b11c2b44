//! Book update demo.
//!
//! Reads an `updateBook` mutation, applies it to the seeded book through a
//! presence-aware updater and prints the result as JSON.

mod book;
mod cli;
mod config;

use std::io::Read;

use anyhow::Context;
use book::{Book, UpdateBook, book_updater, update_book};
use clap::Parser;
use cli::Cli;
use config::DemoConfig;
use partial_presence::UnknownKeys;
use tracing::info;

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	let config = match &cli.config {
		Some(path) => DemoConfig::load(path)?,
		None => DemoConfig::default(),
	};
	setup_tracing(cli.verbose, config.log.as_deref());

	let mut options = config.presence;
	if cli.strict {
		options.unknown_keys = UnknownKeys::Reject;
	}

	let body = read_mutation(&cli)?;
	let request: UpdateBook = serde_json::from_str(&body).context("mutation is not an updateBook request")?;

	let updater = book_updater()?;
	info!(id = request.id, "applying book update");
	let book = update_book(&updater, Book::seeded(), request, &options)?;

	println!("{}", serde_json::to_string_pretty(&book)?);
	Ok(())
}

fn read_mutation(cli: &Cli) -> anyhow::Result<String> {
	if let Some(mutation) = &cli.mutation {
		return Ok(mutation.clone());
	}
	if let Some(path) = &cli.file {
		return std::fs::read_to_string(path).with_context(|| format!("failed to read mutation {}", path.display()));
	}
	let mut body = String::new();
	std::io::stdin()
		.read_to_string(&mut body)
		.context("failed to read mutation from stdin")?;
	Ok(body)
}

/// `RUST_LOG` wins, then `--verbose`, then the config's `log` filter.
fn setup_tracing(verbose: bool, configured: Option<&str>) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match configured {
		_ if verbose => EnvFilter::new("debug"),
		Some(directives) => EnvFilter::new(directives),
		None => EnvFilter::new("info"),
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
