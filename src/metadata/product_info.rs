use crate::types::{CphdResult, Parameter};
use crate::xml::{Element, XmlCodec, XmlNode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance of the product
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductInfo {
    pub profile: Option<String>,
    pub creation_info: Vec<CreationInfo>,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreationInfo {
    pub application: Option<String>,
    pub date_time: DateTime<Utc>,
    pub site: Option<String>,
    pub parameters: Vec<Parameter>,
}

impl XmlCodec for CreationInfo {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_optional_value("Application", &self.application);
        element.add_value("DateTime", &self.date_time);
        element.add_optional_value("Site", &self.site);
        element.add_parameters("Parameter", &self.parameters);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            application: node.optional_value("Application")?,
            date_time: node.required_value("DateTime")?,
            site: node.optional_value("Site")?,
            parameters: node.parameters("Parameter")?,
        })
    }
}

impl XmlCodec for ProductInfo {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_optional_value("Profile", &self.profile);
        element.add_list("CreationInfo", &self.creation_info)?;
        element.add_parameters("Parameter", &self.parameters);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            profile: node.optional_value("Profile")?,
            creation_info: node.list("CreationInfo")?,
            parameters: node.parameters("Parameter")?,
        })
    }
}
