use std::borrow::Cow;

use tracing::info;

use super::PipelineStep;
use crate::error::Result;
use crate::table::MessageTable;

/// Decodes named and numeric HTML character references in message bodies.
/// Markup itself is left alone so the anchor-link mask can still find it.
pub struct DecodeHtmlEntitiesStep;

impl PipelineStep for DecodeHtmlEntitiesStep {
    fn step_name(&self) -> &'static str {
        "decode_html_entities"
    }

    fn snapshot_label(&self) -> String {
        "unescaped".to_string()
    }

    fn apply(&self, mut table: MessageTable) -> Result<MessageTable> {
        info!("Decoding HTML entities...");
        let body = table.body_column()?;
        table.map_text(body, |text| match html_escape::decode_html_entities(text) {
            Cow::Borrowed(_) => None,
            Cow::Owned(decoded) => Some(decoded),
        });
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(body: &str) -> String {
        let table = MessageTable::from_text_rows(&["body"], &[vec![body]]);
        let out = DecodeHtmlEntitiesStep.apply(table).unwrap();
        out.text(0, 0).into_owned()
    }

    #[test]
    fn test_decodes_named_and_numeric_references() {
        assert_eq!(decode("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode("it&#39;s &quot;here&quot;"), "it's \"here\"");
        assert_eq!(decode("caf&#xE9;"), "café");
    }

    #[test]
    fn test_markup_is_preserved() {
        assert_eq!(
            decode("see <a href=\"http://x.org\">x&lt;1&gt;</a>"),
            "see <a href=\"http://x.org\">x<1></a>"
        );
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(decode("nothing to do"), "nothing to do");
    }
}
