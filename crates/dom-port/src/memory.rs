use std::collections::HashMap;
use std::fmt;

use ego_tree::NodeId as TreeId;
use parking_lot::Mutex;
use scraper::node::Text;
use scraper::{ElementRef, Html, Node, Selector, StrTendril};
use tracing::debug;

use calmfeed_core_types::NodeId;

use crate::document::Document;
use crate::errors::DomError;
use crate::style::InlineStyle;

/// The parsed tree plus the bookkeeping the port needs on top of it.
///
/// ego_tree never frees a node, so a handle handed out once keeps pointing at
/// the same node after it is detached and is never given to another node.
struct Inner {
    html: Html,
    handles: Vec<TreeId>,
    by_tree: HashMap<TreeId, NodeId>,
    styles: HashMap<TreeId, InlineStyle>,
}

impl Inner {
    fn new(html: Html) -> Self {
        let root = html.tree.root().id();
        let mut inner = Self {
            html,
            handles: Vec::new(),
            by_tree: HashMap::new(),
            styles: HashMap::new(),
        };
        inner.handle(root);
        inner
    }

    fn root_id(&self) -> TreeId {
        self.html.tree.root().id()
    }

    fn handle(&mut self, id: TreeId) -> NodeId {
        if let Some(&node) = self.by_tree.get(&id) {
            return node;
        }
        let node = NodeId(self.handles.len() as u64);
        self.handles.push(id);
        self.by_tree.insert(id, node);
        node
    }

    fn tree_id(&self, node: NodeId) -> Option<TreeId> {
        let idx = usize::try_from(node.0).ok()?;
        self.handles.get(idx).copied()
    }

    fn attached(&self, id: TreeId) -> bool {
        let root = self.root_id();
        self.html
            .tree
            .get(id)
            .is_some_and(|node| node.id() == root || node.ancestors().any(|up| up.id() == root))
    }

    fn live(&self, node: NodeId) -> Result<TreeId, DomError> {
        let id = self.tree_id(node).ok_or(DomError::UnknownNode(node))?;
        if self.attached(id) {
            Ok(id)
        } else {
            Err(DomError::Detached(node))
        }
    }

    fn live_element(&self, node: NodeId) -> Result<TreeId, DomError> {
        let id = self.live(node)?;
        match self.html.tree.get(id).and_then(ElementRef::wrap) {
            Some(_) => Ok(id),
            None => Err(DomError::NotAnElement(node)),
        }
    }

    fn element(&self, node: NodeId) -> Option<ElementRef<'_>> {
        let id = self.tree_id(node)?;
        ElementRef::wrap(self.html.tree.get(id)?)
    }

    /// Inline style after any mutation made through the port.
    fn style(&self, node: NodeId) -> Option<InlineStyle> {
        let element = self.element(node)?;
        if let Some(style) = self.styles.get(&element.id()) {
            return Some(style.clone());
        }
        Some(
            element
                .value()
                .attr("style")
                .map(InlineStyle::parse)
                .unwrap_or_default(),
        )
    }

    fn select(&self, scope: TreeId, selector: &Selector) -> Vec<TreeId> {
        let Some(scope) = self.html.tree.get(scope) else {
            return Vec::new();
        };
        if let Some(element) = ElementRef::wrap(scope) {
            return element.select(selector).map(|hit| hit.id()).collect();
        }
        // The document node is not an element, so its top-level elements are
        // candidates too.
        let mut out = Vec::new();
        for top in scope.children().filter_map(ElementRef::wrap) {
            if selector.matches(&top) {
                out.push(top.id());
            }
            out.extend(top.select(selector).map(|hit| hit.id()));
        }
        out
    }
}

/// Mutable document backed by a `scraper` (html5ever) tree.
///
/// Queries go through `scraper::Selector`. Style writes live in a side table
/// keyed by tree node; detaching and rewriting text edit the tree itself, so
/// tests can simulate a page re-rendering under the moderation loop.
pub struct MemoryDocument {
    inner: Mutex<Inner>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MemoryDocument")
            .field("handles", &inner.handles.len())
            .field("styled", &inner.styles.len())
            .finish()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::new(Html::new_document())),
        }
    }

    pub fn from_html(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        if !parsed.errors.is_empty() {
            debug!(errors = parsed.errors.len(), "html parsed with recoverable errors");
        }
        Self {
            inner: Mutex::new(Inner::new(parsed)),
        }
    }

    /// Replaces every child of `node` with a single text node.
    pub fn replace_text(&self, node: NodeId, text: &str) -> Result<(), DomError> {
        let mut inner = self.inner.lock();
        let id = inner.live_element(node)?;
        let children: Vec<TreeId> = inner
            .html
            .tree
            .get(id)
            .map(|parent| parent.children().map(|child| child.id()).collect())
            .unwrap_or_default();
        for child in children {
            if let Some(mut child) = inner.html.tree.get_mut(child) {
                child.detach();
            }
        }
        if let Some(mut parent) = inner.html.tree.get_mut(id) {
            parent.append(Node::Text(Text {
                text: StrTendril::from_slice(text),
            }));
        }
        Ok(())
    }

    /// Removes `node` and its subtree from the tree. Handles stay unique.
    pub fn detach(&self, node: NodeId) -> Result<(), DomError> {
        let mut inner = self.inner.lock();
        let id = inner.live(node)?;
        if id == inner.root_id() {
            return Err(DomError::NotAnElement(node));
        }
        if let Some(mut detached) = inner.html.tree.get_mut(id) {
            detached.detach();
        }
        Ok(())
    }

    /// First attached element carrying `name="value"`, in document order.
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        let mut inner = self.inner.lock();
        let found = inner
            .html
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().attr(name) == Some(value))
            .map(|element| element.id())?;
        Some(inner.handle(found))
    }
}

impl Document for MemoryDocument {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let mut inner = self.inner.lock();
        let Ok(scope) = inner.live(scope) else {
            return Vec::new();
        };
        let hits = inner.select(scope, selector);
        hits.into_iter().map(|id| inner.handle(id)).collect()
    }

    fn text_content(&self, node: NodeId) -> String {
        let inner = self.inner.lock();
        let Some(node) = inner.tree_id(node).and_then(|id| inner.html.tree.get(id)) else {
            return String::new();
        };
        node.descendants()
            .filter_map(|descendant| descendant.value().as_text())
            .map(|text| &**text)
            .collect()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let inner = self.inner.lock();
        let element = inner.element(node)?;
        if name.eq_ignore_ascii_case("style") && inner.styles.contains_key(&element.id()) {
            return inner.style(node).map(|style| style.serialize());
        }
        element.value().attr(name).map(str::to_string)
    }

    fn style_property(&self, node: NodeId, name: &str) -> Option<String> {
        let inner = self.inner.lock();
        inner.style(node)?.get(name).map(str::to_string)
    }

    fn set_style_property(&self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let mut inner = self.inner.lock();
        let id = inner.live_element(node)?;
        let mut style = inner.style(node).unwrap_or_default();
        style.set(name, value);
        inner.styles.insert(id, style);
        Ok(())
    }

    fn is_attached(&self, node: NodeId) -> bool {
        let inner = self.inner.lock();
        inner.tree_id(node).is_some_and(|id| inner.attached(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_selector;

    const PAGE: &str = r#"<html><body>
        <div id="a"><span><h4>Header</h4></span>
            <span><div><div style="text-align: start">first</div></div></span>
        </div>
        <div id="b" style="background: url('x;y.png')"><p>other <b>bold</b></p></div>
    </body></html>"#;

    fn selector(source: &str) -> Selector {
        parse_selector(source).expect("selector")
    }

    #[test]
    fn from_html_supports_scoped_queries() {
        let doc = MemoryDocument::from_html(PAGE);
        let a = doc.find_by_attribute("id", "a").unwrap();
        let headers = doc.query_all(a, &selector("span h4"));
        assert_eq!(headers.len(), 1);
        assert_eq!(doc.text_content(headers[0]), "Header");

        let bodies = doc.query_all(a, &selector("span div div"));
        assert_eq!(bodies.len(), 1);
        assert_eq!(
            doc.style_property(bodies[0], "text-align").as_deref(),
            Some("start")
        );
    }

    #[test]
    fn scoped_query_excludes_scope_but_sees_outer_ancestors() {
        let doc = MemoryDocument::from_html(PAGE);
        let a = doc.find_by_attribute("id", "a").unwrap();
        let divs = doc.query_all(a, &selector("body div"));
        assert!(!divs.contains(&a));
        assert_eq!(divs.len(), 2);
    }

    #[test]
    fn root_query_covers_the_html_element() {
        let doc = MemoryDocument::from_html(PAGE);
        assert_eq!(doc.query_all(doc.root(), &selector("html")).len(), 1);
        assert_eq!(doc.query_all(doc.root(), &selector("body > div")).len(), 2);
    }

    #[test]
    fn handles_are_stable_across_queries() {
        let doc = MemoryDocument::from_html(PAGE);
        let first = doc.query_all(doc.root(), &selector("div"));
        let second = doc.query_all(doc.root(), &selector("div"));
        assert_eq!(first, second);
        assert_eq!(doc.find_by_attribute("id", "a"), first.first().copied());
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let doc = MemoryDocument::from_html(PAGE);
        let b = doc.find_by_attribute("id", "b").unwrap();
        assert_eq!(doc.text_content(b), "other bold");
    }

    #[test]
    fn style_mutation_keeps_existing_declarations() {
        let doc = MemoryDocument::from_html(PAGE);
        let b = doc.find_by_attribute("id", "b").unwrap();
        assert_eq!(
            doc.attribute(b, "style").as_deref(),
            Some("background: url('x;y.png')")
        );
        doc.set_style_property(b, "filter", "blur(2px)").unwrap();
        assert_eq!(doc.style_property(b, "filter").as_deref(), Some("blur(2px)"));
        assert_eq!(
            doc.attribute(b, "style").as_deref(),
            Some("background: url('x;y.png'); filter: blur(2px);")
        );
    }

    #[test]
    fn detach_hides_subtree_and_rejects_mutation() {
        let doc = MemoryDocument::from_html(PAGE);
        let a = doc.find_by_attribute("id", "a").unwrap();
        let header = doc.query_first(a, &selector("h4")).unwrap();
        doc.detach(a).unwrap();
        assert!(!doc.is_attached(a));
        assert!(!doc.is_attached(header));
        assert!(matches!(
            doc.set_style_property(a, "filter", "blur(2px)"),
            Err(DomError::Detached(_))
        ));
        assert!(doc.query_all(doc.root(), &selector("h4")).is_empty());
        assert!(doc.query_all(a, &selector("h4")).is_empty());
    }

    #[test]
    fn replace_text_rewrites_children() {
        let doc = MemoryDocument::from_html(PAGE);
        let b = doc.find_by_attribute("id", "b").unwrap();
        let bold = doc.query_first(b, &selector("b")).unwrap();
        doc.replace_text(b, "new").unwrap();
        assert_eq!(doc.text_content(b), "new");
        assert!(!doc.is_attached(bold));
        assert!(doc.is_attached(b));
    }

    #[test]
    fn unknown_handles_are_reported() {
        let doc = MemoryDocument::new();
        assert!(!doc.is_attached(NodeId(99)));
        assert!(matches!(
            doc.detach(NodeId(99)),
            Err(DomError::UnknownNode(_))
        ));
        assert!(doc.query_all(doc.root(), &selector("div")).is_empty());
    }

    #[test]
    fn invalid_selector_keeps_source() {
        let err = parse_selector("div[").unwrap_err();
        assert!(matches!(err, DomError::InvalidSelector { ref selector, .. } if selector == "div["));
    }
}
