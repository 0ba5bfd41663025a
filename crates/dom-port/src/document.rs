use std::sync::Arc;

use calmfeed_core_types::NodeId;

use scraper::Selector;

use crate::errors::DomError;

/// Parses a CSS selector, keeping the source text in the error.
pub fn parse_selector(source: &str) -> Result<Selector, DomError> {
    Selector::parse(source).map_err(|err| DomError::InvalidSelector {
        selector: source.to_string(),
        reason: err.to_string(),
    })
}

/// Query and mutation capability over a live host document.
///
/// Implementations use interior mutability: the host owns the tree and the
/// moderation loop only holds a handle to it.
pub trait Document: Send + Sync {
    /// The document node; scoping a query to it searches the whole tree.
    fn root(&self) -> NodeId;

    /// Elements under `scope` (excluding `scope` itself) matching `selector`,
    /// in document order. Ancestors above `scope` count towards the match, as
    /// with a browser's `querySelectorAll`. Detached scopes match nothing.
    fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId>;

    fn query_first(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.query_all(scope, selector).into_iter().next()
    }

    /// Concatenated text of every descendant text node.
    fn text_content(&self, node: NodeId) -> String;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Value of an inline style property, by CSS name (`text-align`).
    fn style_property(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_style_property(&self, node: NodeId, name: &str, value: &str) -> Result<(), DomError>;

    /// False once the node has been removed from the tree (or never existed).
    fn is_attached(&self, node: NodeId) -> bool;
}

impl<D> Document for Arc<D>
where
    D: Document + ?Sized,
{
    fn root(&self) -> NodeId {
        (**self).root()
    }

    fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        (**self).query_all(scope, selector)
    }

    fn query_first(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        (**self).query_first(scope, selector)
    }

    fn text_content(&self, node: NodeId) -> String {
        (**self).text_content(node)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        (**self).attribute(node, name)
    }

    fn style_property(&self, node: NodeId, name: &str) -> Option<String> {
        (**self).style_property(node, name)
    }

    fn set_style_property(&self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        (**self).set_style_property(node, name, value)
    }

    fn is_attached(&self, node: NodeId) -> bool {
        (**self).is_attached(node)
    }
}

/// Where the document is being shown. Adapters are routed on the host name.
pub trait HostContext: Send + Sync {
    fn host(&self) -> String;
}

#[derive(Clone, Debug)]
pub struct StaticHost(pub String);

impl StaticHost {
    pub fn new(host: impl Into<String>) -> Self {
        Self(host.into())
    }
}

impl HostContext for StaticHost {
    fn host(&self) -> String {
        self.0.clone()
    }
}
