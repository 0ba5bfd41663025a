use std::sync::Arc;

use calmfeed_core_types::ContentEntity;
use dom_port::Document;

/// Extraction strategy for one site.
///
/// `extract` is eager and returns entities in document order. A candidate that
/// does not fit the site's patterns is skipped, never reported as an error.
pub trait SiteAdapter: Send + Sync {
    fn name(&self) -> &str;

    fn matches(&self, host: &str) -> bool;

    fn extract(&self, document: &dyn Document) -> Vec<ContentEntity>;
}

impl<A> SiteAdapter for Arc<A>
where
    A: SiteAdapter + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn matches(&self, host: &str) -> bool {
        (**self).matches(host)
    }

    fn extract(&self, document: &dyn Document) -> Vec<ContentEntity> {
        (**self).extract(document)
    }
}
