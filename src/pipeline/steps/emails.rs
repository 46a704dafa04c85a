use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use super::PipelineStep;
use crate::constants::EMAIL_PLACEHOLDER;
use crate::error::Result;
use crate::table::MessageTable;

/// RFC 5322 local part (dot-atom or quoted string) followed by either a
/// masked link, which is how auto-linked domains look after the link passes,
/// or a plain dotted domain.
static EMAIL_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?:[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*",
        r#"|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")"#,
        r"@(?:LINK_REPLACE",
        r"|[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)+)",
    ))
    .unwrap()
});

/// Replaces e-mail addresses with a placeholder token
pub struct MaskEmailsStep;

impl PipelineStep for MaskEmailsStep {
    fn step_name(&self) -> &'static str {
        "mask_emails"
    }

    fn snapshot_label(&self) -> String {
        "labeled_emails".to_string()
    }

    fn apply(&self, mut table: MessageTable) -> Result<MessageTable> {
        info!("Replacing e-mails...");
        let body = table.body_column()?;
        table.map_text(body, |text| match EMAIL_ADDRESS.replace_all(text, EMAIL_PLACEHOLDER) {
            Cow::Borrowed(_) => None,
            Cow::Owned(masked) => Some(masked),
        });
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(body: &str) -> String {
        let table = MessageTable::from_text_rows(&["body"], &[vec![body]]);
        MaskEmailsStep.apply(table).unwrap().text(0, 0).into_owned()
    }

    #[test]
    fn test_masks_addresses_with_masked_domains() {
        assert_eq!(mask("write to ask.desk@LINK_REPLACE today"), "write to EMAIL_ADDRESS today");
    }

    #[test]
    fn test_masks_plain_addresses() {
        assert_eq!(
            mask("mail j.doe+lib@library.example.edu or \"odd.name\"@x.org"),
            "mail EMAIL_ADDRESS or EMAIL_ADDRESS"
        );
    }

    #[test]
    fn test_leaves_lone_at_signs() {
        assert_eq!(mask("meet @ 5pm, cost 3@each"), "meet @ 5pm, cost 3@each");
    }
}
