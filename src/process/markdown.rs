//! Markdown rendering of synthesized content
//!
//! Headings become `#` lines sized by level, tables become GFM pipe tables,
//! lists keep their ordering style and forms are summarized as bullets.

use crate::extract::{heading_level, FormData, FormMethod, ListData, ListType, TableData};
use crate::process::synthesizer::ProcessedContent;

/// Renders processed content as one Markdown document
pub fn format_markdown(processed: &ProcessedContent) -> String {
    let mut blocks: Vec<String> = Vec::new();

    if let Some(text) = &processed.text_content {
        for (tag, texts) in text.hierarchy.iter() {
            let prefix = heading_level(tag).map(|level| "#".repeat(usize::from(level)));
            for text in texts {
                match &prefix {
                    Some(hashes) => blocks.push(format!("{} {}", hashes, text)),
                    None => blocks.push(text.clone()),
                }
            }
        }
    }

    blocks.extend(
        processed
            .tables
            .iter()
            .map(table_to_markdown)
            .filter(|t| !t.is_empty()),
    );
    blocks.extend(
        processed
            .lists
            .iter()
            .map(list_to_markdown)
            .filter(|l| !l.is_empty()),
    );
    blocks.extend(processed.forms.iter().map(form_to_markdown));

    let mut md = blocks.join("\n\n");
    if !md.is_empty() {
        md.push('\n');
    }
    md
}

/// Formats a table as a GFM pipe table
///
/// A table without headers promotes its first row to the header. Short rows
/// are padded with empty cells to the widest row.
pub fn table_to_markdown(table: &TableData) -> String {
    let (header, rows): (&[String], &[Vec<String>]) = if !table.headers.is_empty() {
        (&table.headers, &table.rows)
    } else if let Some((first, rest)) = table.rows.split_first() {
        (first, rest)
    } else {
        return String::new();
    };

    let width = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let mut md = String::new();
    md.push_str(&table_row(header, width));
    md.push('\n');
    md.push_str(&format!("|{}", " --- |".repeat(width)));
    for row in rows {
        md.push('\n');
        md.push_str(&table_row(row, width));
    }
    md
}

fn table_row(cells: &[String], width: usize) -> String {
    let mut line = String::from("|");
    for i in 0..width {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        line.push_str(&format!(" {} |", cell.replace('|', "\\|")));
    }
    line
}

pub fn list_to_markdown(list: &ListData) -> String {
    list.items
        .iter()
        .enumerate()
        .map(|(i, item)| match list.list_type {
            ListType::Ordered => format!("{}. {}", i + 1, item),
            ListType::Unordered => format!("- {}", item),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn form_to_markdown(form: &FormData) -> String {
    let method = match form.method {
        FormMethod::Get => "GET",
        FormMethod::Post => "POST",
    };
    let action = if form.action.is_empty() {
        "(current page)"
    } else {
        form.action.as_str()
    };

    let mut md = format!("**Form** `{} {}`", method, action);
    for field in &form.fields {
        let label = [&field.name, &field.id]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(String::as_str)
            .unwrap_or("(unnamed)");
        md.push_str(&format!("\n- {}: `{}`", field.kind, label));
        if field.required {
            md.push_str(" (required)");
        }
    }
    md
}
