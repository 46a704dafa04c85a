use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::PipelineStep;
use crate::constants::LINK_PLACEHOLDER;
use crate::error::Result;
use crate::table::MessageTable;

/// `<a ...>...</a>` elements, shortest match, across line breaks
static ANCHOR_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"<a[\S\s]*?</a>").unwrap());

/// Bare http(s) URLs running to the next whitespace
static BARE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bhttps?://\S+").unwrap());

/// Which kind of link a masking pass replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Anchor,
    BareUrl,
}

impl LinkKind {
    pub fn pattern(&self) -> &'static Regex {
        match self {
            LinkKind::Anchor => &*ANCHOR_LINK,
            LinkKind::BareUrl => &*BARE_URL,
        }
    }
}

pub struct MaskLinksStep {
    kind: LinkKind,
}

impl MaskLinksStep {
    pub fn new(kind: LinkKind) -> Self {
        Self { kind }
    }
}

impl PipelineStep for MaskLinksStep {
    fn step_name(&self) -> &'static str {
        match self.kind {
            LinkKind::Anchor => "mask_anchor_links",
            LinkKind::BareUrl => "mask_bare_links",
        }
    }

    fn snapshot_label(&self) -> String {
        match self.kind {
            LinkKind::Anchor => "replaced_type1_links".to_string(),
            LinkKind::BareUrl => "replaced_type2_links".to_string(),
        }
    }

    fn apply(&self, mut table: MessageTable) -> Result<MessageTable> {
        info!("Replacing links ({:?})...", self.kind);
        let body = table.body_column()?;
        let pattern = self.kind.pattern();
        table.map_text(body, |text| match pattern.replace_all(text, LINK_PLACEHOLDER) {
            Cow::Borrowed(_) => None,
            Cow::Owned(masked) => Some(masked),
        });
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(kind: LinkKind, body: &str) -> String {
        let table = MessageTable::from_text_rows(&["body"], &[vec![body]]);
        MaskLinksStep::new(kind).apply(table).unwrap().text(0, 0).into_owned()
    }

    #[test]
    fn test_anchor_links_are_masked_non_greedily() {
        assert_eq!(
            mask(
                LinkKind::Anchor,
                "try <a href=\"http://a.org\">this</a> or <a\nhref=\"http://b.org\">that</a>."
            ),
            "try LINK_REPLACE or LINK_REPLACE."
        );
    }

    #[test]
    fn test_bare_urls_are_masked_up_to_whitespace() {
        assert_eq!(
            mask(LinkKind::BareUrl, "go to http://lib.example.edu/find?q=1 now, or https://x.org"),
            "go to LINK_REPLACE now, or LINK_REPLACE"
        );
    }

    #[test]
    fn test_urls_inside_words_are_left_alone() {
        assert_eq!(mask(LinkKind::BareUrl, "xhttp://nope"), "xhttp://nope");
    }
}
