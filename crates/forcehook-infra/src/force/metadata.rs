//! Metadata SOAP API support for remote-site allowlist entries.
//!
//! The tooling REST API cannot create `RemoteSiteSetting` records, so this
//! one call goes through `createMetadata`. Only the handful of elements the
//! client reads are extracted from the response; there is no general XML
//! parser here.

use forcehook_types::error::PlatformError;

use super::types::DUPLICATE_VALUE;

/// Escape text for inclusion in an XML element.
pub fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn xml_unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// `createMetadata` envelope for an active remote site with protocol
/// security left on.
pub fn create_remote_site_envelope(session_id: &str, name: &str, url: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:met="http://soap.sforce.com/2006/04/metadata">
  <soapenv:Header>
    <met:SessionHeader>
      <met:sessionId>{session_id}</met:sessionId>
    </met:SessionHeader>
  </soapenv:Header>
  <soapenv:Body>
    <met:createMetadata>
      <met:metadata xsi:type="met:RemoteSiteSetting">
        <met:fullName>{name}</met:fullName>
        <met:disableProtocolSecurity>false</met:disableProtocolSecurity>
        <met:isActive>true</met:isActive>
        <met:url>{url}</met:url>
      </met:metadata>
    </met:createMetadata>
  </soapenv:Body>
</soapenv:Envelope>
"#,
        session_id = xml_escape(session_id),
        name = xml_escape(name),
        url = xml_escape(url),
    )
}

/// Text content of the first `<tag>...</tag>` element.
fn element_text<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open)? + open.len();
    let end = xml[start..].find(&close)? + start;
    Some(xml[start..end].trim())
}

/// Interpret a `createMetadata` response body.
///
/// A SOAP fault or a result with `<success>false</success>` becomes an
/// error carrying the platform's message text. A `DUPLICATE_VALUE` status
/// code is reported as [`PlatformError::Duplicate`].
pub fn interpret_create_response(body: &str) -> Result<(), PlatformError> {
    if let Some(fault) = element_text(body, "faultstring") {
        return Err(PlatformError::Upstream(xml_unescape(fault)));
    }

    match element_text(body, "success") {
        Some("true") => Ok(()),
        Some(_) => {
            let message = element_text(body, "message")
                .map(xml_unescape)
                .unwrap_or_else(|| "remote site creation failed".to_string());
            if element_text(body, "statusCode") == Some(DUPLICATE_VALUE) {
                Err(PlatformError::Duplicate(message))
            } else {
                Err(PlatformError::Upstream(message))
            }
        }
        None => Err(PlatformError::Upstream(
            "unrecognized createMetadata response".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_escapes_values() {
        let xml = create_remote_site_envelope("00D!tok<en>", "OrderSyncRemoteSiteSetting", "https://h.io/?a=1&b=2");
        assert!(xml.contains("<met:sessionId>00D!tok&lt;en&gt;</met:sessionId>"));
        assert!(xml.contains("<met:fullName>OrderSyncRemoteSiteSetting</met:fullName>"));
        assert!(xml.contains("<met:url>https://h.io/?a=1&amp;b=2</met:url>"));
        assert!(xml.contains(r#"xsi:type="met:RemoteSiteSetting""#));
    }

    #[test]
    fn success_response() {
        let body = r#"<soapenv:Envelope><soapenv:Body><createMetadataResponse><result>
            <fullName>XRemoteSiteSetting</fullName><success>true</success>
            </result></createMetadataResponse></soapenv:Body></soapenv:Envelope>"#;
        assert!(interpret_create_response(body).is_ok());
    }

    #[test]
    fn failure_response_keeps_message() {
        let body = r#"<result><errors><message>Invalid URL &amp; stuff</message>
            <statusCode>FIELD_INTEGRITY_EXCEPTION</statusCode></errors>
            <success>false</success></result>"#;
        assert_eq!(
            interpret_create_response(body),
            Err(PlatformError::Upstream("Invalid URL & stuff".to_string()))
        );
    }

    #[test]
    fn duplicate_response() {
        let body = r#"<result><errors><message>already exists</message>
            <statusCode>DUPLICATE_VALUE</statusCode></errors><success>false</success></result>"#;
        assert_eq!(
            interpret_create_response(body),
            Err(PlatformError::Duplicate("already exists".to_string()))
        );
    }

    #[test]
    fn soap_fault() {
        let body = r#"<soapenv:Fault><faultcode>sf:INVALID_SESSION_ID</faultcode>
            <faultstring>INVALID_SESSION_ID: Invalid Session ID found in SessionHeader</faultstring></soapenv:Fault>"#;
        match interpret_create_response(body) {
            Err(PlatformError::Upstream(msg)) => assert!(msg.starts_with("INVALID_SESSION_ID")),
            other => panic!("expected upstream error, got {other:?}"),
        }
    }
}
