//! Read-only document views the extractor harvests from.
//!
//! Any host that can enumerate headings, code regions, a main-content
//! region and the active selection can drive extraction through
//! [`DocumentView`]. Two views are provided: [`HtmlDocument`] parses
//! markup with `scraper`, [`DocumentSnapshot`] carries pre-harvested data.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A `<meta>` tag as found on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaTag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    pub content: String,
}

impl MetaTag {
    /// The key a tag is recorded under: `name`, else `property`.
    pub fn key(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.property.as_deref())
            .filter(|k| !k.is_empty())
    }
}

/// Read-only view of a structured page.
///
/// Texts are returned raw, in document order; the extractor trims and
/// filters them.
pub trait DocumentView {
    /// Document title, if any.
    fn title(&self) -> Option<String>;

    /// All `<meta>` tags carrying a name or property.
    fn meta_tags(&self) -> Vec<MetaTag>;

    /// Heading texts.
    fn headings(&self) -> Vec<String>;

    /// Code region texts.
    fn code_blocks(&self) -> Vec<String>;

    /// Paragraph texts inside the main-content region, or `None` when the
    /// page has no such region.
    fn main_paragraphs(&self) -> Option<Vec<String>>;

    /// The active text selection.
    fn selection(&self) -> Option<String>;
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("head > title"));
static META: LazyLock<Selector> = LazyLock::new(|| selector("meta[name], meta[property]"));
static HEADINGS: LazyLock<Selector> = LazyLock::new(|| selector("h1, h2, h3"));
static CODE: LazyLock<Selector> = LazyLock::new(|| selector("pre code, .highlight, .code-block"));
static MAIN: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"article, main, [role="main"], .content, #content"#));
static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| selector("p"));

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// A parsed HTML page plus the host-supplied selection.
pub struct HtmlDocument {
    html: Html,
    selection: Option<String>,
}

impl HtmlDocument {
    /// Parse a full HTML document.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
            selection: None,
        }
    }

    /// Attach the text the user currently has selected.
    pub fn with_selection(mut self, selection: impl Into<String>) -> Self {
        self.selection = Some(selection.into());
        self
    }
}

impl DocumentView for HtmlDocument {
    fn title(&self) -> Option<String> {
        self.html
            .select(&TITLE)
            .next()
            .map(|el| text_of(el).trim().to_string())
            .filter(|t| !t.is_empty())
    }

    fn meta_tags(&self) -> Vec<MetaTag> {
        self.html
            .select(&META)
            .map(|el| {
                let attrs = el.value();
                MetaTag {
                    name: attrs.attr("name").map(str::to_string),
                    property: attrs.attr("property").map(str::to_string),
                    content: attrs.attr("content").unwrap_or_default().to_string(),
                }
            })
            .collect()
    }

    fn headings(&self) -> Vec<String> {
        self.html.select(&HEADINGS).map(text_of).collect()
    }

    fn code_blocks(&self) -> Vec<String> {
        self.html.select(&CODE).map(text_of).collect()
    }

    fn main_paragraphs(&self) -> Option<Vec<String>> {
        let main = self.html.select(&MAIN).next()?;
        Some(main.select(&PARAGRAPH).map(text_of).collect())
    }

    fn selection(&self) -> Option<String> {
        self.selection.clone()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Pre-harvested page data, as a host without an HTML parser would send it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub meta: Vec<MetaTag>,
    #[serde(default)]
    pub headings: Vec<String>,
    #[serde(default)]
    pub code_blocks: Vec<String>,
    #[serde(default)]
    pub main_content: Option<Vec<String>>,
    #[serde(default)]
    pub selection: Option<String>,
}

impl DocumentView for DocumentSnapshot {
    fn title(&self) -> Option<String> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    fn meta_tags(&self) -> Vec<MetaTag> {
        self.meta.clone()
    }

    fn headings(&self) -> Vec<String> {
        self.headings.clone()
    }

    fn code_blocks(&self) -> Vec<String> {
        self.code_blocks.clone()
    }

    fn main_paragraphs(&self) -> Option<Vec<String>> {
        self.main_content.clone()
    }

    fn selection(&self) -> Option<String> {
        self.selection.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head>
        <title>  Issue #42 · user/repo  </title>
        <meta name="description" content="A bug report">
        <meta property="og:title" content="Issue 42">
        <meta charset="utf-8">
    </head><body>
        <nav><p>This navigation paragraph sits outside the main region entirely.</p></nav>
        <h1>Crash on start</h1>
        <h4>ignored level</h4>
        <h2>Steps</h2>
        <main>
            <p>Short.</p>
            <pre><code>fn main() {}</code></pre>
            <div class="highlight">let x = 1;</div>
        </main>
    </body></html>"#;

    #[test]
    fn html_title_is_trimmed() {
        let doc = HtmlDocument::parse(PAGE);
        assert_eq!(doc.title().as_deref(), Some("Issue #42 · user/repo"));
        assert_eq!(HtmlDocument::parse("<html><body></body></html>").title(), None);
    }

    #[test]
    fn html_title_ignores_svg_titles() {
        let icon_only = r#"<html><head></head><body>
            <svg><title>Close icon</title></svg>
        </body></html>"#;
        assert_eq!(HtmlDocument::parse(icon_only).title(), None);

        let both = r#"<html><head><title>Real page</title></head><body>
            <svg><title>Close icon</title></svg>
        </body></html>"#;
        assert_eq!(HtmlDocument::parse(both).title().as_deref(), Some("Real page"));
    }

    #[test]
    fn html_meta_tags_need_name_or_property() {
        let doc = HtmlDocument::parse(PAGE);
        let tags = doc.meta_tags();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].key(), Some("description"));
        assert_eq!(tags[1].key(), Some("og:title"));
    }

    #[test]
    fn html_headings_are_h1_to_h3_in_order() {
        let doc = HtmlDocument::parse(PAGE);
        assert_eq!(doc.headings(), vec!["Crash on start", "Steps"]);
    }

    #[test]
    fn html_code_blocks_match_all_code_selectors() {
        let doc = HtmlDocument::parse(PAGE);
        assert_eq!(doc.code_blocks(), vec!["fn main() {}", "let x = 1;"]);
    }

    #[test]
    fn html_main_paragraphs_only_from_main_region() {
        let doc = HtmlDocument::parse(PAGE);
        assert_eq!(doc.main_paragraphs(), Some(vec!["Short.".to_string()]));

        let bare = HtmlDocument::parse("<html><body><p>loose paragraph</p></body></html>");
        assert_eq!(bare.main_paragraphs(), None);
    }

    #[test]
    fn first_main_region_in_document_order_wins() {
        let html = r#"<html><body>
            <div id="content"><p>from content div</p></div>
            <article><p>from article</p></article>
        </body></html>"#;
        let doc = HtmlDocument::parse(html);
        assert_eq!(doc.main_paragraphs(), Some(vec!["from content div".to_string()]));
    }

    #[test]
    fn selection_comes_from_host() {
        let doc = HtmlDocument::parse(PAGE);
        assert_eq!(doc.selection(), None);
        let doc = doc.with_selection("picked text");
        assert_eq!(doc.selection().as_deref(), Some("picked text"));
    }

    #[test]
    fn snapshot_deserializes_with_defaults() {
        let snap: DocumentSnapshot = serde_json::from_str(
            r#"{"title":"  ","headings":["Intro"],"codeBlocks":["x"],"meta":[{"property":"og:description","content":"d"}]}"#,
        )
        .expect("deserialize snapshot");
        assert_eq!(snap.title(), None);
        assert_eq!(snap.headings(), vec!["Intro"]);
        assert_eq!(snap.code_blocks(), vec!["x"]);
        assert_eq!(snap.main_paragraphs(), None);
        assert_eq!(snap.meta_tags()[0].key(), Some("og:description"));
    }
}
