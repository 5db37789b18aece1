use std::{io::Write, path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    load_settings, load_settings_from, parse_year_input, CatalogClient, CatalogView,
    ClientSettings, FetchController, FilterChange, FilterState,
};
use shared::domain::CategoryFilter;
use tracing_subscriber::EnvFilter;

mod browse;
mod render;

#[derive(Parser, Debug)]
#[command(name = "catalog", about = "Browse the finance AI use case paper catalog")]
struct Cli {
    /// Catalog API base url; overrides settings and environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Settings file; defaults to ./catalog.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of papers matching the filters.
    List(FilterArgs),
    /// Print every field of a single paper.
    Show { paper_id: String },
    /// Check that the catalog API is reachable.
    Health,
    /// Interactive search loop.
    Browse(FilterArgs),
}

#[derive(Args, Debug)]
struct FilterArgs {
    #[arg(long, short = 'q', default_value = "")]
    search: String,
    #[arg(long, default_value = "All")]
    function: String,
    #[arg(long, default_value = "All")]
    technique: String,
    #[arg(long, default_value = "All")]
    industry: String,
    #[arg(long, default_value = "All")]
    stage: String,
    /// Lower year bound; empty for none.
    #[arg(long, default_value = "2018")]
    year_from: String,
    /// Upper year bound; empty for none.
    #[arg(long, default_value = "2025")]
    year_to: String,
    #[arg(long, default_value_t = 1)]
    page: u32,
}

impl FilterArgs {
    fn into_filters(self, settings: &ClientSettings) -> Result<FilterState> {
        let mut filters = FilterState::with_paging(settings.page_size, settings.order.clone());
        filters.apply(FilterChange::Search(self.search));
        filters.apply(FilterChange::Function(
            CategoryFilter::parse_label(&self.function).context("invalid --function")?,
        ));
        filters.apply(FilterChange::Technique(
            CategoryFilter::parse_label(&self.technique).context("invalid --technique")?,
        ));
        filters.apply(FilterChange::Industry(
            CategoryFilter::parse_label(&self.industry).context("invalid --industry")?,
        ));
        filters.apply(FilterChange::Stage(
            CategoryFilter::parse_label(&self.stage).context("invalid --stage")?,
        ));
        filters.apply(FilterChange::YearFrom(parse_year_input(&self.year_from)));
        filters.apply(FilterChange::YearTo(parse_year_input(&self.year_to)));
        filters.apply(FilterChange::Page(self.page));
        Ok(filters)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings(),
    };
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    let client = Arc::new(CatalogClient::from_settings(&settings)?);
    tracing::debug!(base_url = %client.base_url(), "catalog client ready");

    match cli.command {
        Command::List(args) => {
            let filters = args.into_filters(&settings)?;
            let controller = FetchController::mount(client, filters);
            let state = controller.settled().await;
            render::render_view(&mut std::io::stdout().lock(), &CatalogView::from_state(&state))?;
            if let Some(error) = state.error {
                bail!("catalog request failed with status {}", error.status_code);
            }
        }
        Command::Show { paper_id } => {
            let paper = client
                .get_paper(&paper_id)
                .await
                .with_context(|| format!("failed to load paper '{paper_id}'"))?;
            render::render_paper(&mut std::io::stdout().lock(), &paper)?;
        }
        Command::Health => {
            let health = client.health().await.context("catalog health check failed")?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}: ok={} status={}", client.base_url(), health.ok, health.status)?;
            if !health.ok {
                bail!("catalog reported unhealthy status '{}'", health.status);
            }
        }
        Command::Browse(args) => {
            let filters = args.into_filters(&settings)?;
            browse::run(FetchController::mount(client, filters)).await?;
        }
    }

    Ok(())
}
