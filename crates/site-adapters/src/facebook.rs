use tracing::{debug, trace};
use url::Url;

use calmfeed_core_types::{Author, ContentEntity, NodeId};
use dom_port::{parse_selector, Document, Selector};

use crate::adapter::SiteAdapter;
use crate::errors::AdapterError;

const HOST_MARKER: &str = "facebook.com";
const USER_PATH_MARKER: &str = "facebook.com/";
const BASE_URL: &str = "https://www.facebook.com/";

/// Facebook wraps every feed item this deep in anonymous divs.
const CANDIDATE_DEPTH: usize = 20;

/// `body div div ... div`, one `div` per wrapper level.
fn candidate_selector() -> String {
    let mut selector = String::from("body");
    for _ in 0..CANDIDATE_DEPTH {
        selector.push_str(" div");
    }
    selector
}

/// Poster shapes, tried in order: plain header, profile poster, poster nested
/// inside a group or shared post.
const POSTER_PATTERNS: [&str; 3] = [
    "span h4",
    "span h4 span a strong span",
    "span h4 div span a strong span",
];

const HEADER: &str = "span h4, span h3";
const POSTER_LINK: &str = "a";
const POSTER_NAME: &str = "strong span";
const GROUP_NAME: &str = "a span";
const BODY_FRAGMENT: &str = "span div div";

/// The renderer marks post body paragraphs with `text-align: start`.
const BODY_ALIGN: &str = "start";

/// Structural extractor for facebook.com feeds.
///
/// The markup has no stable semantic hooks, so everything here is keyed on
/// nesting shape. Overlapping candidates can produce overlapping entities.
#[derive(Debug)]
pub struct FacebookAdapter {
    candidate: Selector,
    poster_patterns: Vec<Selector>,
    header: Selector,
    poster_link: Selector,
    poster_name: Selector,
    group_name: Selector,
    body_fragment: Selector,
    base: Url,
}

impl FacebookAdapter {
    pub fn new() -> Result<Self, AdapterError> {
        let poster_patterns = POSTER_PATTERNS
            .iter()
            .map(|pattern| parse_selector(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            candidate: parse_selector(&candidate_selector())?,
            poster_patterns,
            header: parse_selector(HEADER)?,
            poster_link: parse_selector(POSTER_LINK)?,
            poster_name: parse_selector(POSTER_NAME)?,
            group_name: parse_selector(GROUP_NAME)?,
            body_fragment: parse_selector(BODY_FRAGMENT)?,
            base: Url::parse(BASE_URL).map_err(|err| AdapterError::BaseUrl(err.to_string()))?,
        })
    }

    fn has_poster(&self, document: &dyn Document, candidate: NodeId) -> bool {
        self.poster_patterns.iter().enumerate().any(|(idx, pattern)| {
            let hit = document.query_first(candidate, pattern).is_some();
            if hit {
                trace!(%candidate, pattern = idx, "poster pattern matched");
            }
            hit
        })
    }

    fn author(&self, document: &dyn Document, header: NodeId) -> Author {
        let user_id = document
            .query_first(header, &self.poster_link)
            .and_then(|link| document.attribute(link, "href"))
            .map(|href| self.user_id_from_href(&href))
            .unwrap_or_default();

        let user_name = document
            .query_first(header, &self.poster_name)
            .or_else(|| document.query_first(header, &self.group_name))
            .map(|node| document.text_content(node))
            .unwrap_or_default();

        Author::new(user_id, user_name)
    }

    /// Path segment after `facebook.com/` up to the query string.
    fn user_id_from_href(&self, href: &str) -> String {
        let absolute = match Url::parse(href) {
            Ok(url) => url,
            Err(_) => match self.base.join(href) {
                Ok(url) => url,
                Err(_) => return String::new(),
            },
        };
        let full = absolute.as_str();
        let Some(start) = full.find(USER_PATH_MARKER) else {
            return String::new();
        };
        let rest = &full[start + USER_PATH_MARKER.len()..];
        match rest.find('?') {
            Some(end) => rest[..end].to_string(),
            None => rest.to_string(),
        }
    }

    fn body_text(&self, document: &dyn Document, candidate: NodeId) -> String {
        document
            .query_all(candidate, &self.body_fragment)
            .into_iter()
            .filter(|&fragment| {
                document
                    .style_property(fragment, "text-align")
                    .is_some_and(|align| align.eq_ignore_ascii_case(BODY_ALIGN))
            })
            .map(|fragment| document.text_content(fragment))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl SiteAdapter for FacebookAdapter {
    fn name(&self) -> &str {
        "facebook"
    }

    fn matches(&self, host: &str) -> bool {
        host.to_ascii_lowercase().contains(HOST_MARKER)
    }

    fn extract(&self, document: &dyn Document) -> Vec<ContentEntity> {
        let candidates = document.query_all(document.root(), &self.candidate);
        let mut entities = Vec::new();
        for candidate in candidates {
            if !self.has_poster(document, candidate) {
                continue;
            }
            let Some(header) = document.query_first(candidate, &self.header) else {
                continue;
            };
            let author = self.author(document, header);
            let text = self.body_text(document, candidate);
            trace!(%candidate, user_id = %author.user_id, user_name = %author.user_name, "extracted post");
            entities.push(ContentEntity::new(author, text, candidate));
        }
        debug!(count = entities.len(), "facebook extraction finished");
        entities
    }
}
