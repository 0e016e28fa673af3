use crate::enums::{CollectType, RadarModeType};
use crate::types::{CphdResult, Parameter};
use crate::xml::{Element, XmlCodec, XmlNode};
use serde::{Deserialize, Serialize};

/// Identification of the collection and its handling markings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionId {
    pub collector_name: String,
    pub illuminator_name: Option<String>,
    pub core_name: String,
    pub collect_type: Option<CollectType>,
    pub radar_mode: RadarModeType,
    pub radar_mode_id: Option<String>,
    pub classification: String,
    pub release_info: String,
    pub country_codes: Vec<String>,
    pub parameters: Vec<Parameter>,
}

impl CollectionId {
    pub fn new(collector_name: impl Into<String>, core_name: impl Into<String>) -> Self {
        Self {
            collector_name: collector_name.into(),
            illuminator_name: None,
            core_name: core_name.into(),
            collect_type: None,
            radar_mode: RadarModeType::Spotlight,
            radar_mode_id: None,
            classification: "UNCLASSIFIED".to_string(),
            release_info: "UNRESTRICTED".to_string(),
            country_codes: Vec::new(),
            parameters: Vec::new(),
        }
    }
}

/// Comma-separated country code list, no trailing separator
pub fn join_country_codes(codes: &[String]) -> String {
    codes.join(",")
}

pub fn split_country_codes(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

impl XmlCodec for CollectionId {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("CollectorName", &self.collector_name);
        element.add_optional_value("IlluminatorName", &self.illuminator_name);
        element.add_value("CoreName", &self.core_name);
        element.add_optional_value("CollectType", &self.collect_type);

        let radar_mode = element.new_child("RadarMode");
        radar_mode.add_value("ModeType", &self.radar_mode);
        radar_mode.add_optional_value("ModeID", &self.radar_mode_id);

        element.add_value("Classification", &self.classification);
        element.add_value("ReleaseInfo", &self.release_info);
        if !self.country_codes.is_empty() {
            element.add_value("CountryCode", &join_country_codes(&self.country_codes));
        }
        element.add_parameters("Parameter", &self.parameters);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let radar_mode = node.required("RadarMode")?;
        let country_codes = node
            .optional_value::<String>("CountryCode")?
            .map(|text| split_country_codes(&text))
            .unwrap_or_default();

        Ok(Self {
            collector_name: node.required_value("CollectorName")?,
            illuminator_name: node.optional_value("IlluminatorName")?,
            core_name: node.required_value("CoreName")?,
            collect_type: node.optional_value("CollectType")?,
            radar_mode: radar_mode.required_value("ModeType")?,
            radar_mode_id: radar_mode.optional_value("ModeID")?,
            classification: node.required_value("Classification")?,
            release_info: node.required_value("ReleaseInfo")?,
            country_codes,
            parameters: node.parameters("Parameter")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_code_join() {
        assert_eq!(join_country_codes(&["US".to_string()]), "US");
        assert_eq!(
            join_country_codes(&["US".to_string(), "GB".to_string(), "AU".to_string()]),
            "US,GB,AU"
        );
        assert_eq!(split_country_codes("US, GB,"), vec!["US", "GB"]);
        assert!(split_country_codes("").is_empty());
    }

    #[test]
    fn test_round_trip_with_single_country() {
        let mut id = CollectionId::new("Sensor-1", "CORE_0001");
        id.country_codes = vec!["US".to_string()];
        id.radar_mode_id = Some("SPOT-A".to_string());

        let mut element = Element::new("CollectionID");
        id.encode(&mut element).unwrap();
        assert_eq!(element.first_and_only("CountryCode").unwrap().text(), "US");

        let decoded = CollectionId::decode(&XmlNode::root(&element)).unwrap();
        assert_eq!(decoded, id);
    }
}
