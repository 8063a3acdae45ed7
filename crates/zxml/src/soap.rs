//! SOAP envelope rendering
//!
//! Wraps a value tree in `Envelope/Header/Body/Response`. Sequence items are
//! written without a wrapping element of their own.

use tracing::debug;

use crate::encode::{ItemTags, TreeWalker};
use crate::error::Result;
use crate::value::Value;
use crate::xml::writer::XmlWriter;

/// Namespace bound to the envelope prefix
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

pub const DEFAULT_SOAP_TAG: &str = "soap";
pub const DEFAULT_SERVICE_ENDPOINT: &str = "http://tempuri.org/";
pub const DEFAULT_SERVICE_NAME: &str = "tns";

/// Envelope tag names and namespace declarations, all derived from the
/// envelope prefix, the service endpoint and the service name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoapSchema {
    soap_tag: String,
    service_endpoint: String,
    service_name: String,
    envelope_tag: String,
    header_tag: String,
    body_tag: String,
    response_tag: String,
    namespaces: [(String, String); 2],
}

impl Default for SoapSchema {
    fn default() -> Self {
        Self::new(
            DEFAULT_SOAP_TAG,
            DEFAULT_SERVICE_ENDPOINT,
            DEFAULT_SERVICE_NAME,
        )
    }
}

impl SoapSchema {
    pub fn new(
        soap_tag: impl Into<String>,
        service_endpoint: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        let soap_tag = soap_tag.into();
        let service_endpoint = service_endpoint.into();
        let service_name = service_name.into();

        Self {
            envelope_tag: format!("{soap_tag}:Envelope"),
            header_tag: format!("{soap_tag}:Header"),
            body_tag: format!("{soap_tag}:Body"),
            response_tag: format!("{service_name}:Response"),
            namespaces: [
                (format!("xmlns:{soap_tag}"), SOAP_ENVELOPE_NS.to_string()),
                (format!("xmlns:{service_name}"), service_endpoint.clone()),
            ],
            soap_tag,
            service_endpoint,
            service_name,
        }
    }

    pub fn soap_tag(&self) -> &str {
        &self.soap_tag
    }

    pub fn service_endpoint(&self) -> &str {
        &self.service_endpoint
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn envelope_tag(&self) -> &str {
        &self.envelope_tag
    }

    pub fn header_tag(&self) -> &str {
        &self.header_tag
    }

    pub fn body_tag(&self) -> &str {
        &self.body_tag
    }

    pub fn response_tag(&self) -> &str {
        &self.response_tag
    }

    /// `xmlns:*` attributes placed on the envelope, in emission order
    pub fn namespace_attrs(&self) -> [(&str, &str); 2] {
        let [(soap_key, soap_ns), (service_key, service_ns)] = &self.namespaces;
        [
            (soap_key.as_str(), soap_ns.as_str()),
            (service_key.as_str(), service_ns.as_str()),
        ]
    }
}

/// Renders value trees as SOAP response envelopes
#[derive(Clone, Debug, Default)]
pub struct SoapRenderer {
    schema: SoapSchema,
}

impl SoapRenderer {
    pub const MEDIA_TYPE: &'static str = "text/xml";
    pub const CHARSET: &'static str = "utf-8";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(schema: SoapSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &SoapSchema {
        &self.schema
    }

    /// Replace the envelope prefix, endpoint and service name together
    pub fn set_schema_attrs(
        &mut self,
        soap_tag: impl Into<String>,
        service_endpoint: impl Into<String>,
        service_name: impl Into<String>,
    ) {
        self.schema = SoapSchema::new(soap_tag, service_endpoint, service_name);
    }

    /// Serialize `value` inside a SOAP envelope.
    ///
    /// Null, empty text, an empty sequence and an empty mapping all render
    /// as empty text.
    pub fn render(&self, value: &Value) -> Result<String> {
        if value.is_empty_like() {
            return Ok(String::new());
        }

        let schema = &self.schema;
        debug!(
            envelope = schema.envelope_tag(),
            response = schema.response_tag(),
            "rendering soap envelope"
        );

        let mut writer = XmlWriter::with_capacity(512);
        writer.start_document();
        writer.start_element(schema.envelope_tag(), &schema.namespace_attrs())?;
        writer.empty_element(schema.header_tag(), &[])?;
        writer.start_element(schema.body_tag(), &[])?;
        writer.start_element(schema.response_tag(), &[])?;

        TreeWalker::new(ItemTags::Bare).write(&mut writer, value, schema.response_tag())?;

        writer.end_element(schema.response_tag());
        writer.end_element(schema.body_tag());
        writer.end_element(schema.envelope_tag());

        let output = writer.end_document();
        debug!(bytes = output.len(), "rendered soap envelope");
        Ok(output)
    }
}

/// Render inside an envelope built from the default schema
pub fn to_soap_string(value: &Value) -> Result<String> {
    SoapRenderer::new().render(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Mapping, Sequence};

    #[test]
    fn test_schema_derivation() {
        let schema = SoapSchema::new("env", "http://example.com/svc", "svc");
        assert_eq!(schema.envelope_tag(), "env:Envelope");
        assert_eq!(schema.header_tag(), "env:Header");
        assert_eq!(schema.body_tag(), "env:Body");
        assert_eq!(schema.response_tag(), "svc:Response");
        assert_eq!(
            schema.namespace_attrs(),
            [
                ("xmlns:env", SOAP_ENVELOPE_NS),
                ("xmlns:svc", "http://example.com/svc"),
            ]
        );
    }

    #[test]
    fn test_set_schema_attrs_replaces_everything() {
        let mut renderer = SoapRenderer::new();
        renderer.set_schema_attrs("s", "urn:orders", "ord");
        assert_eq!(renderer.schema(), &SoapSchema::new("s", "urn:orders", "ord"));
        assert_eq!(renderer.schema().service_endpoint(), "urn:orders");
    }

    #[test]
    fn test_empty_values_render_nothing() -> Result<()> {
        assert_eq!(to_soap_string(&Value::Null)?, "");
        assert_eq!(to_soap_string(&Value::Mapping(Mapping::new()))?, "");
        assert_eq!(to_soap_string(&Value::Sequence(Sequence::new()))?, "");
        assert_eq!(to_soap_string(&Value::text(""))?, "");
        Ok(())
    }

    #[test]
    fn test_sequence_items_are_bare() -> Result<()> {
        let value = Value::from(vec![
            Value::from(Mapping::from([("id", "1")])),
            Value::from(Mapping::from([("id", "2")])),
        ]);
        let output = to_soap_string(&value)?;
        assert!(output.contains("<tns:Response><id>1</id><id>2</id></tns:Response>"));
        Ok(())
    }
}
