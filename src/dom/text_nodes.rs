/*!
 * Extraction of translatable text nodes.
 *
 * Page-wide retranslation needs every text node a user can actually read:
 * nothing inside `script`, `style` or `noscript`, and nothing that is only
 * whitespace. The traversal is a capability behind `TextExtractor` so the
 * filtering rules can be swapped and tested without a browser.
 */

use super::{DocumentTree, NodeId, NodeKind};

/// Tags whose whole subtree is never translated
pub const DEFAULT_SKIPPED_TAGS: [&str; 3] = ["script", "style", "noscript"];

/// Strategy for finding the text nodes of a subtree that should be translated
pub trait TextExtractor: Send + Sync {
    /// Text nodes under `scope`, in document order
    fn extract(&self, doc: &dyn DocumentTree, scope: NodeId) -> Vec<NodeId>;
}

/// Collects non-blank text nodes outside of skipped subtrees
#[derive(Debug, Clone)]
pub struct VisibleTextExtractor {
    skipped_tags: Vec<String>,
}

impl Default for VisibleTextExtractor {
    fn default() -> Self {
        Self {
            skipped_tags: DEFAULT_SKIPPED_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl VisibleTextExtractor {
    /// Extractor skipping the given tags instead of the defaults
    pub fn with_skipped_tags(tags: &[&str]) -> Self {
        Self {
            skipped_tags: tags.iter().map(|t| t.to_ascii_lowercase()).collect(),
        }
    }

    fn is_skipped(&self, doc: &dyn DocumentTree, node: NodeId) -> bool {
        doc.tag_name(node)
            .is_some_and(|tag| self.skipped_tags.iter().any(|s| s == tag))
    }
}

impl TextExtractor for VisibleTextExtractor {
    fn extract(&self, doc: &dyn DocumentTree, scope: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![scope];

        while let Some(node) = stack.pop() {
            match doc.kind(node) {
                NodeKind::Text => {
                    if doc.node_text(node).is_some_and(|t| !t.trim().is_empty()) {
                        found.push(node);
                    }
                }
                NodeKind::Element => {
                    if self.is_skipped(doc, node) {
                        continue;
                    }
                    stack.extend(doc.children(node).into_iter().rev());
                }
                NodeKind::Comment => {}
            }
        }

        found
    }
}
