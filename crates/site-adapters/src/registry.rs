use std::sync::Arc;

use tracing::debug;

use calmfeed_core_types::ContentEntity;
use dom_port::Document;

use crate::adapter::SiteAdapter;
use crate::errors::AdapterError;
use crate::facebook::FacebookAdapter;

/// Ordered adapter list; the first adapter whose `matches` accepts the host
/// handles the page.
#[derive(Clone, Default)]
pub struct SiteAdapterRegistry {
    adapters: Vec<Arc<dyn SiteAdapter>>,
}

impl SiteAdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in site.
    pub fn with_defaults() -> Result<Self, AdapterError> {
        let mut registry = Self::new();
        registry.register(Arc::new(FacebookAdapter::new()?));
        Ok(registry)
    }

    pub fn register(&mut self, adapter: Arc<dyn SiteAdapter>) {
        self.adapters.push(adapter);
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    pub fn select(&self, host: &str) -> Option<Arc<dyn SiteAdapter>> {
        self.adapters
            .iter()
            .find(|adapter| adapter.matches(host))
            .cloned()
    }

    /// Entities for `host`, or nothing when no adapter knows the site.
    pub fn extract(&self, host: &str, document: &dyn Document) -> Vec<ContentEntity> {
        match self.select(host) {
            Some(adapter) => {
                debug!(host, adapter = adapter.name(), "extracting content");
                adapter.extract(document)
            }
            None => {
                debug!(host, "no site adapter for host; idling");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for SiteAdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.adapters.iter().map(|adapter| adapter.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calmfeed_core_types::{Author, NodeId};
    use dom_port::MemoryDocument;

    struct FixedAdapter {
        name: &'static str,
        host: &'static str,
    }

    impl SiteAdapter for FixedAdapter {
        fn name(&self) -> &str {
            self.name
        }

        fn matches(&self, host: &str) -> bool {
            host.contains(self.host)
        }

        fn extract(&self, _document: &dyn Document) -> Vec<ContentEntity> {
            vec![ContentEntity::new(Author::new("", self.name), "", NodeId(1))]
        }
    }

    #[test]
    fn defaults_route_facebook() {
        let registry = SiteAdapterRegistry::with_defaults().unwrap();
        assert_eq!(registry.len(), 1);
        let adapter = registry.select("www.facebook.com").unwrap();
        assert_eq!(adapter.name(), "facebook");
    }

    #[test]
    fn unsupported_host_yields_nothing() {
        let registry = SiteAdapterRegistry::with_defaults().unwrap();
        let doc = MemoryDocument::from_html("<html><body><div>hello</div></body></html>");
        assert!(registry.select("example.org").is_none());
        assert!(registry.extract("example.org", &doc).is_empty());
    }

    #[test]
    fn first_matching_adapter_wins() {
        let mut registry = SiteAdapterRegistry::new();
        registry.register(Arc::new(FixedAdapter {
            name: "first",
            host: "example",
        }));
        registry.register(Arc::new(FixedAdapter {
            name: "second",
            host: "example.org",
        }));
        let doc = MemoryDocument::new();
        let entities = registry.extract("www.example.org", &doc);
        assert_eq!(entities[0].author.user_name, "first");
    }
}
