use tracing::{debug, info};

use calmfeed_core_types::{ContentEntity, Verdict, VerdictKind};
use dom_port::Document;

use crate::applier::{ActionApplier, ApplyOutcome};
use crate::errors::ApplyError;

pub const DEFAULT_SUPPRESSION_FILTER: &str = "blur(2px)";

const FILTER_PROPERTY: &str = "filter";

/// Blocks content by blurring its node through the inline `filter` style.
/// The node stays in the document and can be restored by clearing the style.
#[derive(Clone, Debug)]
pub struct StyleSuppressor {
    filter: String,
}

impl StyleSuppressor {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }
}

impl Default for StyleSuppressor {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPRESSION_FILTER)
    }
}

impl ActionApplier for StyleSuppressor {
    fn apply(
        &self,
        document: &dyn Document,
        entity: &ContentEntity,
        verdict: &Verdict,
    ) -> Result<ApplyOutcome, ApplyError> {
        match verdict.kind {
            VerdictKind::Allow => {
                debug!(node = %entity.node, user_name = %entity.author.user_name, "allowing content");
                Ok(ApplyOutcome::Untouched)
            }
            VerdictKind::Block => {
                if !document.is_attached(entity.node) {
                    return Err(ApplyError::Detached(entity.node));
                }
                let current = document.style_property(entity.node, FILTER_PROPERTY);
                if current.as_deref() == Some(self.filter.as_str()) {
                    debug!(node = %entity.node, "content already suppressed");
                    return Ok(ApplyOutcome::AlreadySuppressed);
                }
                document.set_style_property(entity.node, FILTER_PROPERTY, &self.filter)?;
                info!(
                    node = %entity.node,
                    user_id = %entity.author.user_id,
                    user_name = %entity.author.user_name,
                    verdict = %verdict,
                    "suppressed content"
                );
                Ok(ApplyOutcome::Suppressed)
            }
        }
    }
}
