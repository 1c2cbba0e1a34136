//! Text rendering of summary pages and detail payloads.

use crate::detail::DetailPayload;
use crate::error::DetailError;
use crate::summary::SummaryPage;
use std::borrow::Cow;
use std::fmt::Write as _;

/// Render a summary page as a markdown table.
///
/// `token` is the session token detail requests must carry; it is appended
/// when given.
pub fn render_summary(page: &SummaryPage<'_>, token: Option<&str>) -> String {
    let mut output = String::from("# Module Usage\n\n");

    let filter = page.query.tier.map_or("All", |tier| tier.label());
    let _ = writeln!(
        output,
        "Filter: {} | Sort: {} {}",
        filter,
        page.query.sort.as_param(),
        page.query.direction.as_param()
    );
    if let Some(search) = &page.query.search {
        let _ = writeln!(output, "Search: \"{}\"", search);
    }
    output.push('\n');

    if page.total_items == 0 {
        output.push_str("No modules found.\n");
    } else if page.items.is_empty() {
        let _ = writeln!(
            output,
            "Page {} is past the end ({} pages).",
            page.page, page.total_pages
        );
    } else {
        output.push_str("| Module Name | Usage Count | Pages |\n");
        output.push_str("|---|---:|---:|\n");
        for record in &page.items {
            let _ = writeln!(
                output,
                "| {} | {} | {} |",
                table_cell(record.name.as_str()),
                record.count,
                record.page_count()
            );
        }
    }

    let _ = writeln!(
        output,
        "\n{} modules, page {} of {}",
        page.total_items,
        page.page,
        page.total_pages.max(1)
    );

    if let Some(token) = token {
        let _ = writeln!(output, "Security token for module details: {}", token);
    }

    output
}

/// Escape a value for a markdown table cell.
fn table_cell(value: &str) -> Cow<'_, str> {
    if value.contains('|') {
        Cow::Owned(value.replace('|', "\\|"))
    } else {
        Cow::Borrowed(value)
    }
}

/// Render a detail payload as plain text.
///
/// Titles and links arrive HTML-escaped for the wire and are decoded for the terminal.
pub fn render_details(payload: &DetailPayload) -> String {
    let mut output = format!(
        "The \"{}\" widget is used {} times across {} unique posts:\n",
        payload.module, payload.count, payload.unique_pages
    );

    if payload.pages.is_empty() {
        output.push_str("  (no published pages or posts)\n");
    }
    for page in &payload.pages {
        let title = html_escape::decode_html_entities(&page.title);
        let title = if title.is_empty() { Cow::Borrowed("(no title)") } else { title };
        let link = html_escape::decode_html_entities(&page.link);
        let _ = writeln!(output, "  - #{} {}: {}", page.id, title, link);
    }
    output
}

/// Render a detail failure as plain text, with suggestions when there are any.
pub fn render_detail_error(error: &DetailError) -> String {
    match error.suggestions() {
        [] => error.to_string(),
        suggestions => format!("{}. Did you mean: {}?", error, suggestions.join(", ")),
    }
}
