use crate::types::{CphdResult, Poly2D};
use crate::xml::{Element, XmlCodec, XmlNode};
use serde::{Deserialize, Serialize};

/// Center-of-dwell and dwell-duration polynomials over the image area
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dwell {
    pub cod_times: Vec<CodTime>,
    pub dwell_times: Vec<DwellTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodTime {
    pub identifier: String,
    pub cod_time_poly: Poly2D,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DwellTime {
    pub identifier: String,
    pub dwell_time_poly: Poly2D,
}

impl XmlCodec for CodTime {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Identifier", &self.identifier);
        element.add_child("CODTimePoly", &self.cod_time_poly)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            identifier: node.required_value("Identifier")?,
            cod_time_poly: node.required_child("CODTimePoly")?,
        })
    }
}

impl XmlCodec for DwellTime {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Identifier", &self.identifier);
        element.add_child("DwellTimePoly", &self.dwell_time_poly)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            identifier: node.required_value("Identifier")?,
            dwell_time_poly: node.required_child("DwellTimePoly")?,
        })
    }
}

impl XmlCodec for Dwell {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("NumCODTimes", &self.cod_times.len());
        element.add_list("CODTime", &self.cod_times)?;
        element.add_value("NumDwellTimes", &self.dwell_times.len());
        element.add_list("DwellTime", &self.dwell_times)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let cod_times = node.list("CODTime")?;
        node.check_count("NumCODTimes", cod_times.len())?;
        let dwell_times = node.list("DwellTime")?;
        node.check_count("NumDwellTimes", dwell_times.len())?;
        Ok(Self { cod_times, dwell_times })
    }
}
