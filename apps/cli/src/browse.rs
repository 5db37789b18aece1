//! Interactive browse loop: reads commands from stdin and drives the fetch
//! controller, re-rendering whenever a request settles.

use std::io::Write;

use anyhow::{bail, Context, Result};
use client_core::{
    parse_year_input, CatalogView, ControllerEvent, FetchController, FetchState, FilterChange,
};
use shared::domain::CategoryFilter;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};

use crate::render::{render_filters, render_view};

const HELP: &str = "\
commands:
  search [text]                  full-text search (empty clears)
  function|technique|industry|stage <label|All>
  from [year] / to [year]        year bounds (empty clears)
  next | prev | page <n>         pagination
  reset                          clear all filters
  retry                          re-issue the last request
  filters                        show current filters
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Change(FilterChange),
    Next,
    Previous,
    Retry,
    Reset,
    ShowFilters,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<BrowseCommand> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "search" | "s" => BrowseCommand::Change(FilterChange::Search(rest.to_string())),
        "function" => BrowseCommand::Change(FilterChange::Function(
            CategoryFilter::parse_label(rest)?,
        )),
        "technique" => BrowseCommand::Change(FilterChange::Technique(
            CategoryFilter::parse_label(rest)?,
        )),
        "industry" => BrowseCommand::Change(FilterChange::Industry(
            CategoryFilter::parse_label(rest)?,
        )),
        "stage" => BrowseCommand::Change(FilterChange::Stage(CategoryFilter::parse_label(rest)?)),
        "from" => BrowseCommand::Change(FilterChange::YearFrom(parse_year_input(rest))),
        "to" => BrowseCommand::Change(FilterChange::YearTo(parse_year_input(rest))),
        "page" => {
            let page = rest
                .parse::<u32>()
                .with_context(|| format!("invalid page number '{rest}'"))?;
            BrowseCommand::Change(FilterChange::Page(page))
        }
        "next" | "n" => BrowseCommand::Next,
        "prev" | "p" => BrowseCommand::Previous,
        "retry" => BrowseCommand::Retry,
        "reset" => BrowseCommand::Reset,
        "filters" => BrowseCommand::ShowFilters,
        "help" | "?" => BrowseCommand::Help,
        "quit" | "exit" | "q" => BrowseCommand::Quit,
        "" => bail!("empty command"),
        other => bail!("unknown command '{other}'; type `help`"),
    };
    Ok(command)
}

pub async fn run(controller: FetchController) -> Result<()> {
    let mut events = controller.subscribe();
    let renderer = tokio::spawn(async move {
        loop {
            let state = match events.recv().await {
                Ok(ControllerEvent::Started { .. }) => continue,
                Ok(ControllerEvent::Loaded { response, .. }) => FetchState {
                    data: Some(response),
                    ..FetchState::default()
                },
                Ok(ControllerEvent::Failed { error, .. }) => FetchState {
                    error: Some(error),
                    ..FetchState::default()
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "renderer lagged behind controller events");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let mut stdout = std::io::stdout().lock();
            let _ = render_view(&mut stdout, &CatalogView::from_state(&state));
            let _ = stdout.flush();
        }
    });

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        match command {
            BrowseCommand::Quit => break,
            BrowseCommand::Help => println!("{HELP}"),
            BrowseCommand::ShowFilters => {
                render_filters(&mut std::io::stdout().lock(), &controller.filters())?;
            }
            BrowseCommand::Retry => controller.retry(),
            BrowseCommand::Reset => {
                if !controller.reset_filters() {
                    println!("filters already at defaults");
                }
            }
            BrowseCommand::Change(change) => {
                if !controller.apply(change) {
                    println!("filters unchanged");
                }
            }
            BrowseCommand::Next => step_page(&controller, true),
            BrowseCommand::Previous => step_page(&controller, false),
        }
    }

    controller.unmount();
    renderer.abort();
    Ok(())
}

/// Follows the pagination control offered by the current view, if any.
fn step_page(controller: &FetchController, forward: bool) {
    let snapshot = controller.snapshot();
    let action = match CatalogView::from_state(&snapshot) {
        CatalogView::Results { pagination, .. } if forward => pagination.next,
        CatalogView::Results { pagination, .. } => pagination.previous,
        _ => None,
    };
    match action {
        Some(action) => controller.dispatch(action),
        None => println!("no such page"),
    }
}
