//! Plain-text rendering of a combination set.

use std::fmt::Write;

use skuforge_variants::{CombinationSet, Variant};

const HEADERS: [&str; 7] = ["VARIANT", "SKU", "SLUG", "PRICE", "OFFER", "QTY", "WEIGHT"];

/// `2499` -> `24.99`.
pub fn money(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

fn row(variant: &Variant) -> [String; 7] {
    let title = if variant.key().is_empty() {
        "(base)".to_string()
    } else {
        variant.key().to_string()
    };
    let sku = if variant.sku_manually_edited() {
        format!("{}*", variant.sku())
    } else {
        variant.sku().to_string()
    };

    [
        title,
        sku,
        variant.slug().to_string(),
        money(variant.price()),
        variant.offer_price().map(money).unwrap_or_default(),
        variant.quantity().to_string(),
        variant.weight().map(|g| format!("{g}g")).unwrap_or_default(),
    ]
}

/// One line per variant in combination order; manual SKUs are marked with `*`.
pub fn table(set: &CombinationSet) -> String {
    if set.is_empty() {
        return "no variants\n".to_string();
    }

    let rows: Vec<[String; 7]> = set.iter().map(row).collect();
    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header = HEADERS.map(String::from);
    for cells in std::iter::once(&header).chain(&rows) {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}
