//! Projection of transcript entries onto styled lines.
//!
//! All entry text is plain text: it is sanitised and placed into spans
//! verbatim, never parsed as markup.

use querychat_engine::{EntryKind, Role, RowSet, TranscriptEntry, NO_RESULTS_TEXT};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::text::{fit_to_width, sanitize, visual_width, wrap_text};
use crate::theme::Theme;

/// Indentation of message bodies under their header line.
const BODY_INDENT: &str = "  ";

/// Gutter in front of query lines.
const QUERY_GUTTER: &str = "  sql \u{2502} ";

/// Narrowest a table column is squeezed to.
const MIN_COLUMN_WIDTH: usize = 3;

/// Separator between table cells.
const CELL_SEPARATOR: &str = " \u{2502} ";

/// Build the lines for one entry, followed by a blank spacer line.
pub fn entry_lines(entry: &TranscriptEntry, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = match &entry.kind {
        EntryKind::UserMessage(text) => message_lines(Role::User, text, entry, width, theme),
        EntryKind::AssistantMessage(text) => {
            message_lines(Role::Assistant, text, entry, width, theme)
        }
        EntryKind::QueryBlock(sql) => query_lines(sql, width, theme),
        EntryKind::ResultTable(rows) => table_lines(rows, width, theme),
        EntryKind::ResultEmpty => vec![Line::from(Span::styled(
            format!("{BODY_INDENT}{NO_RESULTS_TEXT}"),
            Style::default()
                .fg(theme.muted)
                .add_modifier(Modifier::ITALIC),
        ))],
    };
    lines.push(Line::default());
    lines
}

fn message_lines(
    role: Role,
    text: &str,
    entry: &TranscriptEntry,
    width: usize,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let (symbol, color) = match role {
        Role::User => ("\u{203a}", theme.user),     // ›
        Role::Assistant => ("\u{25cf}", theme.assistant), // ●
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{symbol} "), Style::default().fg(color)),
        Span::styled(
            role.label().to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", entry.time_str()), Style::default().fg(theme.muted)),
    ])];

    let body_width = width.saturating_sub(BODY_INDENT.len());
    for line in wrap_text(&sanitize(text), body_width) {
        lines.push(Line::from(vec![
            Span::raw(BODY_INDENT),
            Span::styled(line, Style::default().fg(theme.text)),
        ]));
    }
    lines
}

fn query_lines(sql: &str, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let body_width = width.saturating_sub(visual_width(QUERY_GUTTER));
    wrap_text(&sanitize(sql), body_width)
        .into_iter()
        .map(|line| {
            Line::from(vec![
                Span::styled(QUERY_GUTTER, Style::default().fg(theme.muted)),
                Span::styled(line, theme.code()),
            ])
        })
        .collect()
}

fn table_lines(rows: &RowSet, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let header: Vec<String> = rows.header().iter().map(|h| single_line(h)).collect();
    let body: Vec<Vec<String>> = rows
        .rows()
        .iter()
        .map(|row| row.iter().map(|cell| single_line(cell)).collect())
        .collect();

    let available = width.saturating_sub(BODY_INDENT.len());
    let widths = column_widths(&header, &body, available);

    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(table_row(&header, &widths, theme.header(), theme));
    lines.push(Line::from(vec![
        Span::raw(BODY_INDENT),
        Span::styled(
            widths
                .iter()
                .map(|w| "\u{2500}".repeat(*w))
                .collect::<Vec<_>>()
                .join("\u{2500}\u{253c}\u{2500}"),
            Style::default().fg(theme.border),
        ),
    ]));
    for row in &body {
        lines.push(table_row(row, &widths, Style::default().fg(theme.text), theme));
    }
    lines
}

/// Cell text on one row: line breaks become spaces.
fn single_line(text: &str) -> String {
    sanitize(&text.replace(['\r', '\n'], " "))
}

fn table_row(cells: &[String], widths: &[usize], style: Style, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::raw(BODY_INDENT)];
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            spans.push(Span::styled(CELL_SEPARATOR, Style::default().fg(theme.border)));
        }
        spans.push(Span::styled(fit_to_width(cell, *width), style));
    }
    Line::from(spans)
}

/// Natural column widths, shrunk widest-first until the row fits.
pub fn column_widths(header: &[String], body: &[Vec<String>], available: usize) -> Vec<usize> {
    let mut widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| {
            body.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| visual_width(cell))
                .chain(std::iter::once(visual_width(name)))
                .max()
                .unwrap_or(0)
                .max(1)
        })
        .collect();

    let separators = visual_width(CELL_SEPARATOR) * widths.len().saturating_sub(1);
    let budget = available.saturating_sub(separators);

    while widths.iter().sum::<usize>() > budget {
        let Some(widest) = widths
            .iter_mut()
            .filter(|w| **w > MIN_COLUMN_WIDTH)
            .max_by_key(|w| **w)
        else {
            break;
        };
        *widest -= 1;
    }

    widths
}
