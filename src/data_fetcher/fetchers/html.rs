//! Table extraction helpers shared by the HTML fetchers.

use scraper::{ElementRef, Html, Selector};

use crate::error::AppError;

pub(crate) fn parse_selector(selector: &str, url: &str) -> Result<Selector, AppError> {
    Selector::parse(selector)
        .map_err(|e| AppError::html_parse(format!("invalid selector '{selector}': {e:?}"), url))
}

/// Normalized text of every `<td>` cell of a row
pub(crate) fn row_cells(row: ElementRef<'_>, cell_selector: &Selector) -> Vec<String> {
    row.select(cell_selector)
        .map(|cell| {
            cell.text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Cell text at `index`, `None` if the row is too short or the cell is blank
pub(crate) fn cell(cells: &[String], index: usize) -> Option<&str> {
    cells
        .get(index)
        .map(String::as_str)
        .filter(|text| !text.is_empty())
}

/// Rows matched by `row_selector`, each as its cell texts plus a short raw
/// fragment for logging. Rows without any `<td>` (header rows) are dropped.
pub(crate) fn table_rows(
    html: &str,
    row_selector: &str,
    url: &str,
) -> Result<Vec<(Vec<String>, String)>, AppError> {
    let document = Html::parse_document(html);
    let rows = parse_selector(row_selector, url)?;
    let cells = parse_selector("td", url)?;

    Ok(document
        .select(&rows)
        .map(|row| {
            let fragment: String = row.html().chars().take(200).collect();
            (row_cells(row, &cells), fragment)
        })
        .filter(|(cells, _)| !cells.is_empty())
        .collect())
}
