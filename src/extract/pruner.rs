//! Removal of non-article chrome from a cloned article subtree.
//!
//! Passes run in a fixed order and each one sees the tree left by the
//! previous pass. Every pass collects its candidates before it removes
//! anything and skips candidates that an earlier removal already took out.

use tracing::debug;

use crate::dom::{Document, NodeId};

/// Elements whose presence marks a subtree as article body.
const CONTENT_TAGS: &[&str] = &[
    "h2", "h3", "h4", "h5", "h6", "ul", "ol", "pre", "blockquote", "figure", "table",
];

/// A paragraph must be strictly longer than this to count as body text.
pub const MIN_PARAGRAPH_CHARS: usize = 50;

/// Containers with at least this much text are never treated as chrome.
pub const MAX_CHROME_TEXT_CHARS: usize = 200;

const PROMOTIONAL_PHRASES: &[&str] = &[
    "sign up",
    "subscribe",
    "get started",
    "open in app",
    "free trial",
    "more from",
    "recommended from",
];

#[derive(Debug, Clone, Copy)]
enum Matcher {
    Tag(&'static str),
    AttrEquals(&'static str, &'static str),
    AttrContains(&'static str, &'static str),
}

impl Matcher {
    fn matches(self, doc: &Document, id: NodeId) -> bool {
        match self {
            Matcher::Tag(tag) => doc.is_tag(id, tag),
            Matcher::AttrEquals(attr, value) => doc.attr(id, attr) == Some(value),
            Matcher::AttrContains(attr, needle) => {
                doc.attr(id, attr).is_some_and(|v| v.contains(needle))
            }
        }
    }
}

const DENYLIST: &[Matcher] = &[
    Matcher::Tag("h1"),
    Matcher::Tag("button"),
    Matcher::Tag("svg"),
    Matcher::AttrEquals("role", "button"),
    Matcher::Tag("aside"),
    Matcher::AttrContains("data-testid", "response"),
    Matcher::AttrContains("data-testid", "clap"),
    Matcher::AttrContains("aria-label", "clap"),
    Matcher::AttrContains("aria-label", "responses"),
];

/// How many nodes each pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub denylisted: usize,
    pub bylines: usize,
    pub empty_containers: usize,
    pub promotional: usize,
    pub rounds: usize,
}

impl PruneReport {
    pub fn total(&self) -> usize {
        self.denylisted + self.bylines + self.empty_containers + self.promotional
    }

    fn absorb(&mut self, other: PruneReport) {
        self.denylisted += other.denylisted;
        self.bylines += other.bylines;
        self.empty_containers += other.empty_containers;
        self.promotional += other.promotional;
    }
}

/// Prunes the subtree below `root` in place. `root` itself is never removed.
///
/// The pass sequence repeats until a round removes nothing, so pruning an
/// already pruned tree is a no-op.
pub fn prune(doc: &mut Document, root: NodeId) -> PruneReport {
    let mut report = PruneReport::default();
    loop {
        let round = PruneReport {
            denylisted: remove_denylisted(doc, root),
            bylines: remove_bylines(doc, root),
            empty_containers: remove_empty_containers(doc, root),
            promotional: remove_promotional(doc, root),
            rounds: 0,
        };
        report.rounds += 1;
        debug!(
            "Prune round {}: {} denylisted, {} bylines, {} empty containers, {} promotional",
            report.rounds, round.denylisted, round.bylines, round.empty_containers, round.promotional
        );
        report.absorb(round);
        if round.total() == 0 {
            return report;
        }
    }
}

/// True if the subtree at `node` (the node included) holds a structural
/// content element or a paragraph longer than [`MIN_PARAGRAPH_CHARS`].
pub fn has_article_content(doc: &Document, node: NodeId) -> bool {
    std::iter::once(node)
        .chain(doc.descendant_elements(node))
        .any(|n| match doc.tag_name(n) {
            Some("p") => trimmed_len(&doc.text_content(n)) > MIN_PARAGRAPH_CHARS,
            Some(tag) => CONTENT_TAGS.contains(&tag),
            None => false,
        })
}

fn trimmed_len(text: &str) -> usize {
    text.trim().chars().count()
}

fn is_profile_link(doc: &Document, id: NodeId) -> bool {
    doc.is_tag(id, "a")
        && doc
            .attr(id, "href")
            .is_some_and(|href| href.contains("source=post_page") || href.starts_with("/@"))
}

fn is_promotional(text: &str) -> bool {
    let lower = text.to_lowercase();
    PROMOTIONAL_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

fn remove_denylisted(doc: &mut Document, root: NodeId) -> usize {
    let mut removed = 0;
    for &matcher in DENYLIST {
        let matches: Vec<NodeId> = doc
            .descendant_elements(root)
            .filter(|&n| matcher.matches(doc, n))
            .collect();
        for node in matches {
            if doc.is_attached_to(node, root) {
                doc.detach(node);
                removed += 1;
            }
        }
    }
    removed
}

/// Removes the largest content-free wrapper around each profile link.
fn remove_bylines(doc: &mut Document, root: NodeId) -> usize {
    let links: Vec<NodeId> = doc
        .descendant_elements(root)
        .filter(|&n| is_profile_link(doc, n))
        .collect();

    let mut removed = 0;
    for link in links {
        if !doc.is_attached_to(link, root) {
            continue;
        }
        let mut target = link;
        let mut parent = doc.parent(link);
        while let Some(candidate) = parent {
            if candidate == root || has_article_content(doc, candidate) {
                break;
            }
            target = candidate;
            parent = doc.parent(candidate);
        }
        doc.detach(target);
        removed += 1;
    }
    removed
}

/// Visits `div`/`section` deepest-last-first so a parent is judged only
/// after its child containers have been settled.
fn remove_empty_containers(doc: &mut Document, root: NodeId) -> usize {
    let containers = doc.find_all(root, &["div", "section"]);

    let mut removed = 0;
    for &container in containers.iter().rev() {
        if !doc.is_attached_to(container, root) {
            continue;
        }
        if has_article_content(doc, container) || doc.find_first(container, "img").is_some() {
            continue;
        }
        if trimmed_len(&doc.text_content(container)) < MAX_CHROME_TEXT_CHARS {
            doc.detach(container);
            removed += 1;
        }
    }
    removed
}

fn remove_promotional(doc: &mut Document, root: NodeId) -> usize {
    let candidates = doc.find_all(root, &["div", "section", "p"]);

    let mut removed = 0;
    for candidate in candidates {
        if !doc.is_attached_to(candidate, root) {
            continue;
        }
        let text = doc.text_content(candidate);
        let text = text.trim();
        if text.chars().count() < MAX_CHROME_TEXT_CHARS && is_promotional(text) {
            doc.detach(candidate);
            removed += 1;
        }
    }
    removed
}
