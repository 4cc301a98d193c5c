use crate::document::{DocumentQuery, ParsedDocument};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SEMANTIC_TAGS: [&str; 6] = ["header", "nav", "main", "article", "section", "footer"];

/// Visible text must be strictly longer than this to count as substantial.
pub const MIN_TEXT_LENGTH: usize = 500;

/// Pages strictly smaller than this get full performance marks.
pub const PAGE_SIZE_BUDGET: usize = 50_000;

pub const MAX_SCORE: f64 = 100.0;

pub const REC_SEMANTIC_TAGS: &str =
    "Use semantic HTML tags like <header>, <nav>, <main>, <article>, <section>, <footer>.";
pub const REC_TEXT_CONTENT: &str = "Increase meaningful text content on the page.";
pub const REC_TITLE: &str = "Add a descriptive, non-empty <title> tag.";
pub const REC_META_DESCRIPTION: &str = "Add a <meta name='description'> tag summarizing the page.";
pub const REC_OPEN_GRAPH: &str =
    "Add Open Graph tags (<meta property='og:title'> and <meta property='og:description'>).";
pub const REC_PAGE_SIZE: &str =
    "Reduce the page size below 50KB so it can be fetched and parsed quickly.";
pub const REC_NOINDEX: &str =
    "Remove 'noindex' from the robots meta tag so the page can be indexed.";
pub const REC_CANONICAL: &str = "Add a <link rel='canonical'> tag pointing at the preferred URL.";
pub const REC_JSON_LD: &str =
    "Add structured data using JSON-LD to help AI understand your content.";
pub const REC_HEADINGS: &str = "Add <h1> or <h2> headings to outline the page content.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ContentStructure,
    MetadataQuality,
    Performance,
    Crawlability,
    AiFriendliness,
}

impl Category {
    pub const WEIGHT: f64 = 0.20;

    /// Evaluation order.
    pub const ALL: [Category; 5] = [
        Category::ContentStructure,
        Category::MetadataQuality,
        Category::Performance,
        Category::Crawlability,
        Category::AiFriendliness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ContentStructure => "content_structure",
            Category::MetadataQuality => "metadata_quality",
            Category::Performance => "performance",
            Category::Crawlability => "crawlability",
            Category::AiFriendliness => "ai_friendliness",
        }
    }

    /// Points this category adds to the aggregate for the given satisfied fraction.
    pub fn contribution(fraction: f64) -> f64 {
        fraction * MAX_SCORE * Self::WEIGHT
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Breakdown = BTreeMap<Category, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageAnalysis {
    pub score: f64,
    pub breakdown: Breakdown,
    pub recommendations: Vec<String>,
}

/// Running tally for one category: fraction earned plus failed-check advice.
struct CategoryTally<'a> {
    fraction: f64,
    recommendations: &'a mut Vec<String>,
}

impl<'a> CategoryTally<'a> {
    fn new(recommendations: &'a mut Vec<String>) -> Self {
        Self {
            fraction: 0.0,
            recommendations,
        }
    }

    fn award(&mut self, share: f64) {
        self.fraction += share;
    }

    fn recommend(&mut self, recommendation: &str) {
        self.recommendations.push(recommendation.to_string());
    }

    fn check(&mut self, passed: bool, share: f64, recommendation: &str) {
        if passed {
            self.award(share);
        } else {
            self.recommend(recommendation);
        }
    }
}

/// Parse `html` and score it. `raw_byte_length` is the size of the body as
/// received, which may differ from `html.len()` after lossy decoding.
pub fn analyze(html: &str, raw_byte_length: usize) -> PageAnalysis {
    let document = ParsedDocument::parse(html);
    analyze_document(&document, raw_byte_length)
}

/// Each failed check appends one recommendation, in category order.
pub fn analyze_document<D: DocumentQuery + ?Sized>(doc: &D, raw_byte_length: usize) -> PageAnalysis {
    let mut breakdown = Breakdown::new();
    let mut recommendations = Vec::new();

    for category in Category::ALL {
        let mut tally = CategoryTally::new(&mut recommendations);
        match category {
            Category::ContentStructure => content_structure(doc, &mut tally),
            Category::MetadataQuality => metadata_quality(doc, &mut tally),
            Category::Performance => performance(raw_byte_length, &mut tally),
            Category::Crawlability => crawlability(doc, &mut tally),
            Category::AiFriendliness => ai_friendliness(doc, &mut tally),
        }
        breakdown.insert(category, Category::contribution(tally.fraction));
    }

    let score = breakdown.values().sum::<f64>().min(MAX_SCORE);

    PageAnalysis {
        score,
        breakdown,
        recommendations,
    }
}

fn content_structure<D: DocumentQuery + ?Sized>(doc: &D, tally: &mut CategoryTally) {
    let semantic = SEMANTIC_TAGS.iter().any(|tag| doc.has_tag(tag));
    tally.check(semantic, 0.5, REC_SEMANTIC_TAGS);
    tally.check(doc.visible_text_len() > MIN_TEXT_LENGTH, 0.5, REC_TEXT_CONTENT);
}

fn metadata_quality<D: DocumentQuery + ?Sized>(doc: &D, tally: &mut CategoryTally) {
    let title = doc.first_text("title").is_some_and(|t| !t.is_empty());
    tally.check(title, 0.3, REC_TITLE);

    let metas = doc.elements("meta");
    let description = metas.iter().any(|m| m.attr_is("name", "description"));
    tally.check(description, 0.3, REC_META_DESCRIPTION);

    let og_title = metas.iter().any(|m| m.attr_is("property", "og:title"));
    let og_description = metas.iter().any(|m| m.attr_is("property", "og:description"));
    tally.check(og_title && og_description, 0.4, REC_OPEN_GRAPH);
}

fn performance(raw_byte_length: usize, tally: &mut CategoryTally) {
    if raw_byte_length < PAGE_SIZE_BUDGET {
        tally.award(1.0);
    } else {
        // Oversized pages still earn half.
        tally.award(0.5);
        tally.recommend(REC_PAGE_SIZE);
    }
}

fn crawlability<D: DocumentQuery + ?Sized>(doc: &D, tally: &mut CategoryTally) {
    let noindex = doc.elements("meta").iter().any(|m| {
        m.attr_is("name", "robots")
            && m.get("content")
                .is_some_and(|c| c.to_ascii_lowercase().contains("noindex"))
    });
    tally.check(!noindex, 0.5, REC_NOINDEX);

    let canonical = doc
        .elements("link")
        .iter()
        .any(|l| l.attr_has_token("rel", "canonical"));
    tally.check(canonical, 0.5, REC_CANONICAL);
}

fn ai_friendliness<D: DocumentQuery + ?Sized>(doc: &D, tally: &mut CategoryTally) {
    let json_ld = doc
        .elements("script")
        .iter()
        .any(|s| s.attr_is("type", "application/ld+json"));
    tally.check(json_ld, 0.6, REC_JSON_LD);
    tally.check(doc.has_tag("h1") || doc.has_tag("h2"), 0.4, REC_HEADINGS);
}
