//! Conversion between [`Metadata`] and CPHD XML documents.

use crate::metadata::Metadata;
use crate::types::{CphdError, CphdResult};
use crate::xml::element::Element;
use crate::xml::field_codec::{XmlCodec, XmlNode};
use std::sync::Arc;

/// Root element name of a CPHD document
pub const CPHD_ROOT: &str = "CPHD";

/// Namespace of CPHD 1.0 documents
pub const CPHD_URI: &str = "urn:CPHD:1.0.0";

/// Schema validation hook. Implementations report one message per finding.
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, xml: &str, namespace: &str) -> Result<(), Vec<String>>;
}

/// Encodes and decodes whole metadata documents
#[derive(Clone, Default)]
pub struct CphdXmlControl {
    validator: Option<Arc<dyn SchemaValidator>>,
}

impl std::fmt::Debug for CphdXmlControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CphdXmlControl")
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl CphdXmlControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(validator: Option<Arc<dyn SchemaValidator>>) -> Self {
        Self { validator }
    }

    /// Build the document tree for `metadata`
    pub fn encode(&self, metadata: &Metadata) -> CphdResult<Element> {
        let mut root = Element::new(CPHD_ROOT);
        root.set_namespace(CPHD_URI);
        metadata.encode(&mut root)?;
        Ok(root)
    }

    /// Read metadata from a document tree
    pub fn decode(&self, root: &Element) -> CphdResult<Metadata> {
        if root.name() != CPHD_ROOT {
            return Err(CphdError::InvalidFormat(format!(
                "root element is <{}>, expected <{}>",
                root.name(),
                CPHD_ROOT
            )));
        }
        match root.namespace() {
            Some(uri) if uri != CPHD_URI => {
                return Err(CphdError::UnsupportedVersion(format!("namespace {}", uri)))
            }
            None => log::warn!("CPHD root has no namespace, assuming {}", CPHD_URI),
            _ => {}
        }
        Metadata::decode(&XmlNode::root(root))
    }

    pub fn to_xml_string(&self, metadata: &Metadata) -> CphdResult<String> {
        let xml = self.encode(metadata)?.to_xml_string()?;
        self.validate(&xml)?;
        log::debug!("Encoded CPHD metadata ({} bytes)", xml.len());
        Ok(xml)
    }

    pub fn from_xml_str(&self, xml: &str) -> CphdResult<Metadata> {
        self.validate(xml)?;
        let root = Element::parse_str(xml)?;
        self.decode(&root)
    }

    pub fn from_xml_bytes(&self, bytes: &[u8]) -> CphdResult<Metadata> {
        let xml = std::str::from_utf8(bytes)
            .map_err(|e| CphdError::XmlParsing(format!("XML block is not UTF-8: {}", e)))?;
        self.from_xml_str(xml)
    }

    fn validate(&self, xml: &str) -> CphdResult<()> {
        let Some(validator) = &self.validator else {
            return Ok(());
        };
        validator.validate(xml, CPHD_URI).map_err(|findings| {
            for finding in &findings {
                log::error!("Schema validation: {}", finding);
            }
            CphdError::SchemaValidation(findings.join("; "))
        })
    }
}
