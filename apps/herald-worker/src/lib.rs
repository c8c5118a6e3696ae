use std::{path::PathBuf, sync::Arc};

use clap::{
	Parser, Subcommand,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::EnvFilter;

use herald_config::Config;
use herald_feed::RssFetcher;
use herald_service::{
	ClusterReport, ClusterService, ClusterStore, HttpEmbedding, IssueStore, PgStore, pipeline,
};
use herald_storage::{db::Db, models::Issue};

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

#[derive(Debug, Parser)]
#[command(
	version = VERSION,
	rename_all = "kebab",
	styles = styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Fetch every feed, store the new articles, cluster them, and print the issues.
	Run,
	/// Cluster the articles that have no issue yet.
	Cluster,
	/// Print every issue, most recently updated first.
	Issues,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = herald_config::load(&args.config)?;

	init_tracing(&config);

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema(config.storage.vector_dim).await?;

	let store = Arc::new(PgStore::new(db));

	match args.command {
		Command::Run => {
			let service = cluster_service(&config, store)?;
			let fetcher = Arc::new(RssFetcher::new(&config.ingest)?);
			let sources = herald_feed::sources(&config.ingest);

			tracing::info!(sources = sources.len(), "Starting ingestion round.");

			let report = pipeline::run_pipeline(
				fetcher,
				sources,
				config.ingest.workers as usize,
				&service,
			)
			.await?;

			println!("scraped={} saved={}", report.scraped, report.saved);
			print_report(&report.clustered);
			print_issues(&report.issues)?;
		},
		Command::Cluster => {
			let service = cluster_service(&config, store)?;
			let report = service.run().await?;

			print_report(&report);
		},
		Command::Issues => print_issues(&store.list_issues().await?)?,
	}

	Ok(())
}

fn cluster_service(
	config: &Config,
	store: Arc<dyn ClusterStore>,
) -> color_eyre::Result<ClusterService> {
	let embedding = Arc::new(HttpEmbedding::new(&config.providers.embedding)?);

	Ok(ClusterService::new(config, embedding, store))
}

fn print_report(report: &ClusterReport) {
	println!(
		"processed={} merged={} created={} failed={}",
		report.processed, report.merged, report.created, report.failed
	);
}

fn print_issues(issues: &[Issue]) -> color_eyre::Result<()> {
	for issue in issues {
		println!(
			"{}\t{}\t{}\t{}",
			issue.id,
			issue.article_count,
			issue.updated_at.format(&Rfc3339)?,
			issue.title
		);
	}

	Ok(())
}

fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

fn init_tracing(config: &Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn cli_definition_is_consistent() {
		Args::command().debug_assert();
	}

	#[test]
	fn parses_subcommand_and_config() {
		let args = Args::try_parse_from(["herald-worker", "-c", "herald.toml", "cluster"])
			.expect("Failed to parse arguments.");

		assert_eq!(args.config, PathBuf::from("herald.toml"));
		assert!(matches!(args.command, Command::Cluster));
	}
}
