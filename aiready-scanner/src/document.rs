use scraper::{ElementRef, Html};
use std::collections::HashMap;

/// Elements whose text never reaches a reader.
const INVISIBLE_CONTAINERS: [&str; 3] = ["script", "style", "template"];

/// Attributes of one element, keyed by lower-cased attribute name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagAttributes {
    attrs: HashMap<String, String>,
}

impl TagAttributes {
    pub fn new<I, K, V>(attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            attrs: attrs
                .into_iter()
                .map(|(k, v)| (k.into().to_ascii_lowercase(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Attribute value equals `expected`, ignoring ASCII case and surrounding whitespace.
    pub fn attr_is(&self, name: &str, expected: &str) -> bool {
        self.get(name)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case(expected))
    }

    /// Attribute holds a whitespace-separated token list containing `token`.
    pub fn attr_has_token(&self, name: &str, token: &str) -> bool {
        self.get(name).is_some_and(|v| {
            v.split_ascii_whitespace()
                .any(|t| t.eq_ignore_ascii_case(token))
        })
    }
}

pub trait DocumentQuery {
    /// Every element named `tag`, in document order.
    fn elements(&self, tag: &str) -> Vec<TagAttributes>;

    /// Trimmed text content of the first element named `tag`.
    fn first_text(&self, tag: &str) -> Option<String>;

    /// Character count of the page's visible text.
    fn visible_text_len(&self) -> usize;

    fn has_tag(&self, tag: &str) -> bool {
        !self.elements(tag).is_empty()
    }
}

/// A page parsed with html5ever through `scraper`.
///
/// Parsing never fails: malformed markup is repaired by the parser and an empty
/// string simply yields a skeleton `<html><head></head><body></body></html>`.
pub struct ParsedDocument {
    html: Html,
}

impl ParsedDocument {
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    fn named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(move |el| el.value().name().eq_ignore_ascii_case(tag))
    }
}

impl DocumentQuery for ParsedDocument {
    fn elements(&self, tag: &str) -> Vec<TagAttributes> {
        self.named(tag)
            .map(|el| TagAttributes::new(el.value().attrs()))
            .collect()
    }

    fn first_text(&self, tag: &str) -> Option<String> {
        self.named(tag)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }

    fn visible_text_len(&self) -> usize {
        self.html
            .tree
            .root()
            .descendants()
            .filter_map(|node| {
                let text = node.value().as_text()?;
                let hidden = node.ancestors().any(|parent| {
                    parent
                        .value()
                        .as_element()
                        .is_some_and(|el| INVISIBLE_CONTAINERS.contains(&el.name()))
                });
                (!hidden).then(|| text.trim().chars().count())
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elements_in_document_order() {
        let doc = ParsedDocument::parse(
            r#"<html><head>
                <meta name="description" content="first">
                <meta property="og:title" content="second">
            </head><body></body></html>"#,
        );

        let metas = doc.elements("meta");
        assert_eq!(metas.len(), 2);
        assert_eq!(metas[0].get("content"), Some("first"));
        assert_eq!(metas[1].get("property"), Some("og:title"));
    }

    #[test]
    fn test_visible_text_skips_scripts_and_styles() {
        let doc = ParsedDocument::parse(
            r#"<html><head><style>body { color: red; }</style></head>
            <body><p>  hello  </p><script>var x = 1;</script><p>world</p></body></html>"#,
        );

        assert_eq!(doc.visible_text_len(), "helloworld".len());
    }

    #[test]
    fn test_first_text_is_trimmed() {
        let doc = ParsedDocument::parse("<title>\n  Docs  \n</title>");
        assert_eq!(doc.first_text("title"), Some("Docs".to_string()));
        assert_eq!(doc.first_text("h1"), None);
    }

    #[test]
    fn test_empty_and_garbage_input() {
        for source in ["", "<<<>>>", "<div><span></div>"] {
            let doc = ParsedDocument::parse(source);
            assert!(!doc.has_tag("main"));
            assert!(doc.elements("meta").is_empty());
        }
    }

    #[test]
    fn test_attr_token_matching() {
        let attrs = TagAttributes::new([("REL", "alternate Canonical")]);
        assert!(attrs.attr_has_token("rel", "canonical"));
        assert!(!attrs.attr_is("rel", "canonical"));
    }
}
