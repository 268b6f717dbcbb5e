//! Plain-text rendering of records for the terminal.

use std::time::Duration;

use crate::dynamodb::{Column, FieldType, Item};

/// Milliseconds with two decimals, e.g. `12.34 ms`.
pub fn format_latency(latency: Duration) -> String {
    format!("{:.2} ms", latency.as_secs_f64() * 1000.0)
}

/// Renders items as an aligned table with one row per item.
///
/// Cells for attributes an item does not carry are left blank. Number columns
/// are right-aligned.
pub fn render_table(items: &[Item], columns: &[Column]) -> String {
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            columns
                .iter()
                .map(|column| {
                    item.display_value(column.attribute_name())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.attribute_name().len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(columns.iter().zip(&widths))
            .map(|(cell, (column, &width))| match column.field_type() {
                FieldType::Number => format!("{cell:>width$}"),
                FieldType::String => format!("{cell:<width$}"),
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let header = format_row(columns.iter().map(|c| c.to_string()).collect());
    let rule = widths
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<_>>()
        .join("-+-");

    let mut out = vec![header, rule];
    out.extend(rows.into_iter().map(format_row));
    out.join("\n")
}

/// Renders one item as `name: value` lines, in column order.
///
/// Only columns present on the item are shown.
pub fn render_record(item: &Item, columns: &[Column]) -> String {
    columns
        .iter()
        .filter_map(|column| {
            item.display_value(column.attribute_name())
                .map(|value| format!("{column}: {value}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
