//! Structured sub-extraction: tables, lists and forms
//!
//! Each structure becomes one content item whose payload keeps its shape
//! (rows, list entries, form fields) instead of flattened text.

use crate::extract::metadata::element_metadata;
use crate::extract::text::sanitize_text;
use crate::extract::types::{
    Content, ContentItem, ContentKind, FormData, FormField, FormMethod, ListData, ListType,
    TableData,
};
use crate::extract::{compile_selector, IgnoreRules};
use scraper::{ElementRef, Html};

/// Extracts every table, list and form in document order of each group
pub(crate) fn extract_structured(
    document: &Html,
    source_url: &str,
    ignore: &IgnoreRules,
) -> Vec<ContentItem> {
    let mut items = Vec::new();
    items.extend(extract_tables(document, source_url, ignore));
    items.extend(extract_lists(document, source_url, ignore));
    items.extend(extract_forms(document, source_url, ignore));
    items
}

fn element_text(element: &ElementRef<'_>) -> String {
    sanitize_text(&element.text().collect::<String>())
}

fn extract_tables(document: &Html, source_url: &str, ignore: &IgnoreRules) -> Vec<ContentItem> {
    let (Some(table_sel), Some(th_sel), Some(tr_sel), Some(td_sel)) = (
        compile_selector("table"),
        compile_selector("th"),
        compile_selector("tr"),
        compile_selector("td"),
    ) else {
        return Vec::new();
    };

    document
        .select(&table_sel)
        .filter(|table| !ignore.covers(table))
        .map(|table| {
            let headers = table.select(&th_sel).map(|th| element_text(&th)).collect();

            // Header-only rows have no td cells and are dropped
            let rows = table
                .select(&tr_sel)
                .map(|tr| {
                    tr.select(&td_sel)
                        .map(|td| element_text(&td))
                        .collect::<Vec<_>>()
                })
                .filter(|row| !row.is_empty())
                .collect();

            ContentItem {
                kind: ContentKind::Table,
                content: Content::Table(TableData { headers, rows }),
                metadata: element_metadata(&table),
                source_url: source_url.to_string(),
            }
        })
        .collect()
}

fn extract_lists(document: &Html, source_url: &str, ignore: &IgnoreRules) -> Vec<ContentItem> {
    let (Some(list_sel), Some(li_sel)) = (compile_selector("ul, ol"), compile_selector("li"))
    else {
        return Vec::new();
    };

    document
        .select(&list_sel)
        .filter(|list| !ignore.covers(list))
        .map(|list| {
            let list_type = if list.value().name() == "ol" {
                ListType::Ordered
            } else {
                ListType::Unordered
            };
            let items = list.select(&li_sel).map(|li| element_text(&li)).collect();

            ContentItem {
                kind: ContentKind::List,
                content: Content::List(ListData { list_type, items }),
                metadata: element_metadata(&list),
                source_url: source_url.to_string(),
            }
        })
        .collect()
}

fn extract_forms(document: &Html, source_url: &str, ignore: &IgnoreRules) -> Vec<ContentItem> {
    let (Some(form_sel), Some(field_sel)) = (
        compile_selector("form"),
        compile_selector("input, select, textarea"),
    ) else {
        return Vec::new();
    };

    document
        .select(&form_sel)
        .filter(|form| !ignore.covers(form))
        .map(|form| {
            let value = form.value();
            let fields = form
                .select(&field_sel)
                .map(|field| {
                    let attrs = field.value();
                    FormField {
                        kind: attrs
                            .attr("type")
                            .unwrap_or_else(|| attrs.name())
                            .to_string(),
                        name: attrs.attr("name").unwrap_or_default().to_string(),
                        id: attrs.attr("id").unwrap_or_default().to_string(),
                        required: attrs.attr("required").is_some(),
                    }
                })
                .collect();

            ContentItem {
                kind: ContentKind::Form,
                content: Content::Form(FormData {
                    action: value.attr("action").unwrap_or_default().to_string(),
                    method: FormMethod::from_attr(value.attr("method")),
                    fields,
                }),
                metadata: element_metadata(&form),
                source_url: source_url.to_string(),
            }
        })
        .collect()
}
