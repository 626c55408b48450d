//! Generated Apex artifacts and the parser that reads them back.
//!
//! [`render`] produces the helper class, trigger and test class bodies;
//! [`parse`] reconstructs [`TriggerMetadata`] from a trigger body. The two
//! halves share the constants below: the url marker/terminator pair and the
//! position of the sobject on the trigger's first line. Change them together
//! and bump [`TEMPLATE_VERSION`].
//!
//! [`TriggerMetadata`]: forcehook_types::webhook::TriggerMetadata

pub mod parse;
pub mod render;

pub use parse::parse_trigger;
pub use render::{render_helper_class, render_test_class, render_trigger, ApexArtifacts};

/// Version stamped into every generated trigger.
pub const TEMPLATE_VERSION: u32 = 1;

/// Name of the shared helper class every webhook trigger calls into.
pub const HELPER_CLASS_NAME: &str = "Webhook";

/// Triggers whose name ends with this suffix are treated as webhooks.
pub const WEBHOOK_TRIGGER_SUFFIX: &str = "WebhookTrigger";

/// Appended to the webhook name to form the remote-site entry name.
pub const REMOTE_SITE_SUFFIX: &str = "RemoteSiteSetting";

/// Opens the callback url literal inside a trigger body.
pub(crate) const URL_MARKER: &str = "String url = '";

/// Closes the callback url literal.
pub(crate) const URL_TERMINATOR: &str = "';";

/// `trigger <Name> on <SObject> (...)`: sobject is the fourth space-separated token.
pub(crate) const SOBJECT_TOKEN_INDEX: usize = 3;

/// Whether a trigger name marks a generated webhook.
pub fn is_webhook_trigger(name: &str) -> bool {
    name.ends_with(WEBHOOK_TRIGGER_SUFFIX)
}

/// Remote-site allowlist entry name for a webhook.
pub fn remote_site_name(webhook_name: &str) -> String {
    format!("{webhook_name}{REMOTE_SITE_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use forcehook_types::error::WebhookError;
    use forcehook_types::webhook::{TriggerEvent, TriggerMetadata};

    use super::*;

    fn order_sync() -> TriggerMetadata {
        TriggerMetadata::new(
            "OrderSync",
            "Order",
            vec![TriggerEvent::AfterInsert, TriggerEvent::AfterUpdate],
            "https://example.com/hook",
        )
        .unwrap()
    }

    #[test]
    fn order_sync_scenario() {
        let meta = order_sync();
        let body = render_trigger(&meta);

        assert_eq!(
            body.lines().next().unwrap(),
            "trigger OrderSync on Order (after insert, after update)"
        );
        assert!(body.contains("String url = 'https://example.com/hook';"));

        let parsed = parse_trigger("OrderSync", &body).unwrap();
        assert_eq!(parsed, meta);
    }

    #[test]
    fn round_trip_preserves_event_order_and_url() {
        let cases = [
            TriggerMetadata::new(
                "AccountWebhookTrigger",
                "Account",
                vec![TriggerEvent::AfterDelete, TriggerEvent::BeforeInsert],
                "http://localhost:9000/accounts?source=sf&x=1",
            )
            .unwrap(),
            TriggerMetadata::new(
                "InvoiceWebhookTrigger",
                "Invoice__c",
                TriggerEvent::ALL.to_vec(),
                "https://hooks.example.org/a/b/c",
            )
            .unwrap(),
            TriggerMetadata::new(
                "LeadWebhookTrigger",
                "Lead",
                vec![TriggerEvent::AfterUndelete],
                "https://example.com",
            )
            .unwrap(),
        ];

        for meta in cases {
            let parsed = parse_trigger(&meta.name, &render_trigger(&meta)).unwrap();
            assert_eq!(parsed, meta);
        }
    }

    #[test]
    fn round_trip_uses_declared_name() {
        let meta = order_sync();
        let parsed = parse_trigger("RenamedWebhookTrigger", &render_trigger(&meta)).unwrap();
        assert_eq!(parsed.name, "RenamedWebhookTrigger");
        assert_eq!(parsed.sobject, meta.sobject);
    }

    #[test]
    fn test_class_targets_same_sobject_and_url() {
        let meta = order_sync();
        let test_body = render_test_class(&meta);
        assert!(test_body.contains("public class OrderSync"));
        assert!(test_body.contains("mock('Order')"));
        assert!(test_body.contains("'https://example.com/hook'"));
    }

    #[test]
    fn artifacts_are_deterministic() {
        let meta = order_sync();
        assert_eq!(ApexArtifacts::render(&meta), ApexArtifacts::render(&meta));
        assert_eq!(render_helper_class(), render_helper_class());
    }

    #[test]
    fn suffix_and_remote_site_names() {
        assert!(is_webhook_trigger("FooWebhookTrigger"));
        assert!(!is_webhook_trigger("FooTrigger"));
        assert!(!is_webhook_trigger("WebhookTriggerFoo"));
        assert_eq!(remote_site_name("OrderSync"), "OrderSyncRemoteSiteSetting");
    }

    #[test]
    fn rendered_body_without_url_does_not_parse() {
        let body = render_trigger(&order_sync()).replace(URL_MARKER, "String endpoint = '");
        assert!(matches!(
            parse_trigger("OrderSync", &body),
            Err(WebhookError::Parse { .. })
        ));
    }
}
