pub mod control;
pub mod element;
pub mod field_codec;

pub use control::{CphdXmlControl, SchemaValidator, CPHD_ROOT, CPHD_URI};
pub use element::Element;
pub use field_codec::{XmlCodec, XmlNode, XmlValue};
