use crate::types::{CphdResult, Parameter};
use crate::xml::{Element, XmlCodec, XmlNode};
use serde::{Deserialize, Serialize};

/// Descriptions of the support arrays stored in the support block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SupportArray {
    pub iaz_arrays: Vec<SupportArrayParameter>,
    pub ant_gain_phase: Vec<SupportArrayParameter>,
    pub added_support_arrays: Vec<AddedSupportArray>,
}

/// Sampling grid shared by every support array kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayGrid {
    pub element_format: String,
    pub x0: f64,
    pub y0: f64,
    pub x_ss: f64,
    pub y_ss: f64,
}

/// Support array identified by number (IAZ and antenna gain/phase)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportArrayParameter {
    pub identifier: u64,
    pub grid: ArrayGrid,
}

/// User-defined support array identified by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddedSupportArray {
    pub identifier: String,
    pub grid: ArrayGrid,
    pub x_units: String,
    pub y_units: String,
    pub z_units: String,
    pub parameters: Vec<Parameter>,
}

/// Kind of a support array entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportArrayKind {
    IazArray,
    AntGainPhase,
    Added,
}

impl SupportArrayKind {
    pub fn tag(&self) -> &'static str {
        match self {
            SupportArrayKind::IazArray => "IAZArray",
            SupportArrayKind::AntGainPhase => "AntGainPhase",
            SupportArrayKind::Added => "AddedSupportArray",
        }
    }
}

impl SupportArray {
    pub fn is_empty(&self) -> bool {
        self.iaz_arrays.is_empty() && self.ant_gain_phase.is_empty() && self.added_support_arrays.is_empty()
    }

    /// Find the entry whose identifier matches a Data support-array identifier
    pub fn find(&self, identifier: &str) -> Option<(SupportArrayKind, &ArrayGrid)> {
        if let Some(grid) = find_numbered(&self.iaz_arrays, identifier) {
            return Some((SupportArrayKind::IazArray, grid));
        }
        if let Some(grid) = find_numbered(&self.ant_gain_phase, identifier) {
            return Some((SupportArrayKind::AntGainPhase, grid));
        }
        self.added_support_arrays
            .iter()
            .find(|a| a.identifier == identifier)
            .map(|a| (SupportArrayKind::Added, &a.grid))
    }
}

fn find_numbered<'a>(list: &'a [SupportArrayParameter], identifier: &str) -> Option<&'a ArrayGrid> {
    list.iter()
        .find(|p| p.identifier.to_string() == identifier)
        .map(|p| &p.grid)
}

impl ArrayGrid {
    fn encode_into(&self, element: &mut Element) {
        element.add_value("ElementFormat", &self.element_format);
        element.add_value("X0", &self.x0);
        element.add_value("Y0", &self.y0);
        element.add_value("XSS", &self.x_ss);
        element.add_value("YSS", &self.y_ss);
    }

    fn decode_from(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            element_format: node.required_value("ElementFormat")?,
            x0: node.required_value("X0")?,
            y0: node.required_value("Y0")?,
            x_ss: node.required_value("XSS")?,
            y_ss: node.required_value("YSS")?,
        })
    }
}

impl XmlCodec for SupportArrayParameter {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Identifier", &self.identifier);
        self.grid.encode_into(element);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self { identifier: node.required_value("Identifier")?, grid: ArrayGrid::decode_from(node)? })
    }
}

impl XmlCodec for AddedSupportArray {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Identifier", &self.identifier);
        self.grid.encode_into(element);
        element.add_value("XUnits", &self.x_units);
        element.add_value("YUnits", &self.y_units);
        element.add_value("ZUnits", &self.z_units);
        element.add_parameters("Parameter", &self.parameters);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            identifier: node.required_value("Identifier")?,
            grid: ArrayGrid::decode_from(node)?,
            x_units: node.required_value("XUnits")?,
            y_units: node.required_value("YUnits")?,
            z_units: node.required_value("ZUnits")?,
            parameters: node.parameters("Parameter")?,
        })
    }
}

impl XmlCodec for SupportArray {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_list(SupportArrayKind::IazArray.tag(), &self.iaz_arrays)?;
        element.add_list(SupportArrayKind::AntGainPhase.tag(), &self.ant_gain_phase)?;
        element.add_list(SupportArrayKind::Added.tag(), &self.added_support_arrays)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            iaz_arrays: node.list(SupportArrayKind::IazArray.tag())?,
            ant_gain_phase: node.list(SupportArrayKind::AntGainPhase.tag())?,
            added_support_arrays: node.list(SupportArrayKind::Added.tag())?,
        })
    }
}
