//! Command-line entry point for PoWo tokens.
//!
//! Computes signing digests, issues tokens with the configured signer and
//! verifies presented tokens against an expected signer.

use clap::{Parser, Subcommand};
use powo_config::Config;
use powo_core::SystemClock;
use std::path::PathBuf;
use std::sync::Arc;

mod commands;

/// Command-line arguments for the PoWo tool.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file. Built-in defaults are used when omitted.
	#[arg(short, long, env = "POWO_CONFIG")]
	config: Option<PathBuf>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the EIP-712 digest and signing request of a message.
	Digest {
		/// Expiry instant, ISO-8601 (e.g. 2099-01-01T00:00:00.000Z)
		#[arg(long)]
		expires: String,
		#[arg(long)]
		gatekeeper_address: String,
		#[arg(long)]
		gatekeeper_url: String,
	},
	/// Issue a token signed by the configured signer.
	Issue {
		/// Defaults to token.gatekeeper_address from the configuration
		#[arg(long)]
		gatekeeper_address: Option<String>,
		/// Defaults to token.gatekeeper_url from the configuration
		#[arg(long)]
		gatekeeper_url: Option<String>,
	},
	/// Verify a signed token. Exits non-zero when the token is invalid.
	Verify {
		/// Token JSON file, or "-" for stdin
		#[arg(long, default_value = "-")]
		token: String,
		/// Address the token must be signed by
		#[arg(long)]
		signer: String,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	// Logs go to stderr so stdout stays machine-readable
	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	run(args).await
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
	let config = match &args.config {
		Some(path) => {
			let path = path
				.to_str()
				.ok_or_else(|| format!("Config path is not valid UTF-8: {}", path.display()))?;
			Config::from_file(path).await?
		},
		None => Config::default(),
	};
	tracing::debug!(
		domain = %config.domain.name,
		chain_id = config.domain.chain_id,
		"Loaded configuration"
	);

	let clock = Arc::new(SystemClock);

	match args.command {
		Command::Digest {
			expires,
			gatekeeper_address,
			gatekeeper_url,
		} => {
			let output =
				commands::digest(&config, &expires, &gatekeeper_address, &gatekeeper_url)?;
			println!("{}", serde_json::to_string_pretty(&output)?);
		},
		Command::Issue {
			gatekeeper_address,
			gatekeeper_url,
		} => {
			let token = commands::issue(
				&config,
				gatekeeper_address.as_deref(),
				gatekeeper_url.as_deref(),
				clock,
			)
			.await?;
			println!("{}", serde_json::to_string_pretty(&token)?);
		},
		Command::Verify { token, signer } => {
			let token_json = commands::read_token_source(&token).await?;
			let verification = commands::verify(&config, &token_json, &signer, clock)?;
			println!(
				"{}",
				serde_json::to_string_pretty(&commands::verification_report(&verification))?
			);
			commands::ensure_valid(&verification)?;
		},
	}

	Ok(())
}
