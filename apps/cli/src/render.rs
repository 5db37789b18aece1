use std::io::{self, Write};

use client_core::{CatalogView, FilterState};
use shared::protocol::Paper;

const SUMMARY_PREVIEW_CHARS: usize = 160;

pub fn render_view(out: &mut impl Write, view: &CatalogView<'_>) -> io::Result<()> {
    match view {
        CatalogView::Idle => Ok(()),
        CatalogView::Loading => writeln!(out, "Loading papers..."),
        CatalogView::Failed {
            status_code,
            message,
            ..
        } => {
            writeln!(out, "Error loading papers ({status_code}): {message}")?;
            writeln!(out, "  type `retry` to try again")
        }
        CatalogView::Empty { .. } => {
            writeln!(out, "No papers found matching your filters.")?;
            writeln!(out, "  type `reset` to clear all filters")
        }
        CatalogView::Results {
            summary,
            papers,
            pagination,
        } => {
            writeln!(out, "{summary}")?;
            writeln!(out)?;
            for (offset, paper) in papers.iter().enumerate() {
                render_list_entry(out, offset + 1, paper)?;
            }
            let mut controls = Vec::new();
            if pagination.previous.is_some() {
                controls.push("`prev`");
            }
            if pagination.next.is_some() {
                controls.push("`next`");
            }
            if !controls.is_empty() {
                writeln!(
                    out,
                    "Page {} of {}: {}",
                    pagination.page,
                    pagination.total_pages,
                    controls.join(" ")
                )?;
            }
            Ok(())
        }
    }
}

fn render_list_entry(out: &mut impl Write, index: usize, paper: &Paper) -> io::Result<()> {
    let year = paper.year.map(|y| format!(" ({y})")).unwrap_or_default();
    writeln!(out, "[{index}] {}{year}", paper.title)?;
    if !paper.authors.is_empty() {
        writeln!(out, "    {}", paper.authors)?;
    }
    let tags = paper.tags();
    if !tags.is_empty() {
        writeln!(out, "    tags: {}", tags.join(", "))?;
    }
    if !paper.summary.is_empty() {
        writeln!(out, "    {}", preview(&paper.summary, SUMMARY_PREVIEW_CHARS))?;
    }
    writeln!(out, "    id: {}", paper.id)
}

pub fn render_paper(out: &mut impl Write, paper: &Paper) -> io::Result<()> {
    writeln!(out, "{}", paper.title)?;
    let fields = [
        ("Authors", paper.authors.clone()),
        ("Year", paper.year.map(|y| y.to_string()).unwrap_or_default()),
        ("Venue", paper.venue.clone()),
        ("Link", paper.link.clone()),
        ("DOI", paper.doi.clone()),
        (
            "Open access",
            if paper.is_open_access() { "yes" } else { "no" }.to_string(),
        ),
        ("Function", paper.function.clone()),
        ("Technique", paper.technique.clone()),
        ("Industry", paper.industry.clone()),
        ("Stage", paper.stage.clone()),
        ("Modality", paper.modality.clone()),
        ("Summary", paper.summary.clone()),
        ("Use case", paper.use_case.clone()),
        ("Dataset", paper.dataset.clone()),
        ("Model", paper.model.clone()),
        ("Results", paper.results.clone()),
        ("Business impact", paper.business_impact.clone()),
        ("Source evidence", paper.source_evidence.clone()),
    ];
    for (label, value) in fields {
        if !value.trim().is_empty() {
            writeln!(out, "  {label}: {value}")?;
        }
    }
    Ok(())
}

pub fn render_filters(out: &mut impl Write, filters: &FilterState) -> io::Result<()> {
    let year = |y: Option<i32>| y.map(|y| y.to_string()).unwrap_or_else(|| "-".into());
    writeln!(
        out,
        "search='{}' function={} technique={} industry={} stage={} years={}..{} page={}",
        filters.search,
        filters.function,
        filters.technique,
        filters.industry,
        filters.stage,
        year(filters.year_from),
        year(filters.year_to),
        filters.page
    )
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head.trim_end())
    } else {
        head
    }
}
