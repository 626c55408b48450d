//! Apex source generation.
//!
//! All functions are pure: the same metadata always yields byte-identical
//! bodies.

use forcehook_types::webhook::{TriggerEvent, TriggerMetadata};

use super::{HELPER_CLASS_NAME, TEMPLATE_VERSION, URL_MARKER, URL_TERMINATOR};

/// The three bodies submitted when provisioning one webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApexArtifacts {
    pub helper_class: String,
    pub trigger: String,
    pub test_class: String,
}

impl ApexArtifacts {
    pub fn render(meta: &TriggerMetadata) -> Self {
        Self {
            helper_class: render_helper_class(),
            trigger: render_trigger(meta),
            test_class: render_test_class(meta),
        }
    }
}

const HELPER_CLASS: &str = r#"public class Webhook implements HttpCalloutMock {

    public static HttpRequest request;
    public static HttpResponse response;

    public HTTPResponse respond(HTTPRequest req) {
        request = req;
        response = new HttpResponse();
        response.setStatusCode(200);
        return response;
    }

    public static String jsonContent(List<Object> triggerNew, List<Object> triggerOld) {
        String newObjects = '[]';
        if (triggerNew != null) {
            newObjects = JSON.serialize(triggerNew);
        }

        String oldObjects = '[]';
        if (triggerOld != null) {
            oldObjects = JSON.serialize(triggerOld);
        }

        String userId = JSON.serialize(UserInfo.getUserId());

        String content = '{"new": ' + newObjects + ', "old": ' + oldObjects + ', "userId": ' + userId + '}';
        return content;
    }

    @future(callout=true)
    public static void callout(String url, String content) {

        if (Test.isRunningTest()) {
            Test.setMock(HttpCalloutMock.class, new Webhook());
        }

        Http h = new Http();

        HttpRequest req = new HttpRequest();
        req.setEndpoint(url);
        req.setMethod('POST');
        req.setHeader('Content-Type', 'application/json');
        req.setBody(content);

        h.send(req);
    }

}
"#;

/// Body of the shared helper class. Parameter-free.
pub fn render_helper_class() -> String {
    HELPER_CLASS.to_string()
}

/// Event clause list as it appears in the trigger header.
fn event_clauses(events: &[TriggerEvent]) -> String {
    events
        .iter()
        .map(|e| e.clause())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Trigger body. The first line is `trigger <name> on <sobject> (<events>)`.
pub fn render_trigger(meta: &TriggerMetadata) -> String {
    format!(
        "trigger {name} on {sobject} ({events})\n\
         {{\n\
         \n    \
         {URL_MARKER}{url}{URL_TERMINATOR}\n\
         \n    \
         String content = {HELPER_CLASS_NAME}.jsonContent(Trigger.new, Trigger.old);\n\
         \n    \
         {HELPER_CLASS_NAME}.callout(url, content);\n\
         \n\
         }}\n\
         \n\
         // generated by forcehook, template v{TEMPLATE_VERSION}\n",
        name = meta.name,
        sobject = meta.sobject,
        events = event_clauses(&meta.events),
        url = meta.url,
    )
}

const TEST_MOCK_FACTORY: &str = r#"    static SObject mock(String sobjectName) {
        SObjectType t = Schema.getGlobalDescribe().get(sobjectName);

        SObject o = t.newSobject();

        Map<String, Schema.SObjectField> m = t.getDescribe().fields.getMap();

        for (String fieldName : m.keySet()) {
            DescribeFieldResult f = m.get(fieldName).getDescribe();
            if (!f.isNillable() && f.isCreateable() && !f.isDefaultedOnCreate()) {
                if (f.getType() == DisplayType.Boolean) {
                    o.put(f.getName(), false);
                }
                else if (f.getType() == DisplayType.Currency) {
                    o.put(f.getName(), 0);
                }
                else if (f.getType() == DisplayType.Date) {
                    o.put(f.getName(), Date.today());
                }
                else if (f.getType() == DisplayType.DateTime) {
                    o.put(f.getName(), System.now());
                }
                else if (f.getType() == DisplayType.Double) {
                    o.put(f.getName(), 0.0);
                }
                else if (f.getType() == DisplayType.Email) {
                    o.put(f.getName(), 'foo@foo.com');
                }
                else if (f.getType() == DisplayType.Integer) {
                    o.put(f.getName(), 0);
                }
                else if (f.getType() == DisplayType.Percent) {
                    o.put(f.getName(), 0);
                }
                else if (f.getType() == DisplayType.Phone) {
                    o.put(f.getName(), '555-555-1212');
                }
                else if (f.getType() == DisplayType.String) {
                    o.put(f.getName(), 'TEST');
                }
                else if (f.getType() == DisplayType.TextArea) {
                    o.put(f.getName(), 'TEST');
                }
                else if (f.getType() == DisplayType.Time) {
                    o.put(f.getName(), System.now().time());
                }
                else if (f.getType() == DisplayType.URL) {
                    o.put(f.getName(), 'http://foo.com');
                }
                else if (f.getType() == DisplayType.PickList) {
                    o.put(f.getName(), f.getPicklistValues()[0].getValue());
                }
            }
        }
        return o;
    }
"#;

/// DML statements that fire every declared event at least once.
///
/// A record always has to be inserted first; delete precedes undelete.
fn test_dml(events: &[TriggerEvent]) -> (Vec<&'static str>, Vec<&'static str>) {
    let fires = |pred: fn(TriggerEvent) -> bool| events.iter().any(|e| pred(*e));

    let mut setup = Vec::new();
    let mut exercised = Vec::new();

    if fires(TriggerEvent::is_insert) {
        exercised.push("insert o;");
    } else {
        setup.push("insert o;");
    }
    if fires(TriggerEvent::is_update) {
        exercised.push("update o;");
    }
    if fires(TriggerEvent::is_delete) || fires(TriggerEvent::is_undelete) {
        exercised.push("delete o;");
    }
    if fires(TriggerEvent::is_undelete) {
        exercised.push("undelete o;");
    }

    (setup, exercised)
}

/// Test class body covering the generated trigger.
pub fn render_test_class(meta: &TriggerMetadata) -> String {
    let (setup, exercised) = test_dml(&meta.events);
    let indent = |stmts: Vec<&str>| {
        stmts
            .into_iter()
            .map(|s| format!("        {s}\n"))
            .collect::<String>()
    };

    format!(
        "@isTest\n\
         public class {name} {{\n\
         \n\
         {factory}\
         \n    \
         @isTest static void test{name}() {{\n        \
         SObject o = mock('{sobject}');\n\
         {setup}\
         \n        \
         Test.startTest();\n\
         {exercised}\
         \x20       Test.stopTest();\n\
         \n        \
         System.assertEquals(200, {helper}.response.getStatusCode());\n        \
         System.assertEquals('{url}', {helper}.request.getEndpoint());\n\
         \n        \
         Map<String, Object> payload = (Map<String, Object>) JSON.deserializeUntyped({helper}.request.getBody());\n        \
         System.assertNotEquals(null, payload.get('userId'));\n    \
         }}\n\
         \n\
         }}\n",
        name = meta.name,
        factory = TEST_MOCK_FACTORY,
        sobject = meta.sobject,
        setup = indent(setup),
        exercised = indent(exercised),
        helper = HELPER_CLASS_NAME,
        url = meta.url,
    )
}
