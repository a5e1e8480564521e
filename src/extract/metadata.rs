use crate::extract::types::ElementMetadata;
use scraper::ElementRef;

/// Captures tag, classes, id, remaining attributes and parent tag of an element
pub fn element_metadata(element: &ElementRef<'_>) -> ElementMetadata {
    let value = element.value();

    let attributes = value
        .attrs()
        .filter(|(name, _)| *name != "class" && *name != "id")
        .map(|(name, val)| (name.to_string(), val.to_string()))
        .collect();

    let parent_tag = element
        .parent()
        .and_then(ElementRef::wrap)
        .map(|parent| parent.value().name().to_string());

    ElementMetadata {
        tag: value.name().to_string(),
        classes: value.classes().map(str::to_string).collect(),
        id: value.id().map(str::to_string),
        attributes,
        parent_tag,
        relevance: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first<'a>(document: &'a Html, css: &str) -> ElementRef<'a> {
        let selector = Selector::parse(css).unwrap();
        document.select(&selector).next().unwrap()
    }

    #[test]
    fn test_metadata_fields() {
        let document = Html::parse_document(
            r#"<div><p id="intro" class="lead big" data-x="1" lang="en">Hi</p></div>"#,
        );
        let metadata = element_metadata(&first(&document, "p"));

        assert_eq!(metadata.tag, "p");
        assert!(metadata.classes.contains("lead"));
        assert!(metadata.classes.contains("big"));
        assert_eq!(metadata.id.as_deref(), Some("intro"));
        assert_eq!(metadata.attributes.get("data-x").map(String::as_str), Some("1"));
        assert_eq!(metadata.attributes.get("lang").map(String::as_str), Some("en"));
        assert!(!metadata.attributes.contains_key("class"));
        assert!(!metadata.attributes.contains_key("id"));
        assert_eq!(metadata.parent_tag.as_deref(), Some("div"));
        assert_eq!(metadata.relevance, None);
    }

    #[test]
    fn test_root_has_no_parent_tag() {
        let document = Html::parse_document("<html><body></body></html>");
        let metadata = element_metadata(&first(&document, "html"));

        assert_eq!(metadata.tag, "html");
        assert_eq!(metadata.parent_tag, None);
    }

    #[test]
    fn test_element_without_attributes() {
        let document = Html::parse_document("<body><h2>Title</h2></body>");
        let metadata = element_metadata(&first(&document, "h2"));

        assert!(metadata.classes.is_empty());
        assert_eq!(metadata.id, None);
        assert!(metadata.attributes.is_empty());
        assert_eq!(metadata.parent_tag.as_deref(), Some("body"));
    }
}
