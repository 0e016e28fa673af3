use crate::enums::{DomainType, PhaseSgn};
use crate::types::CphdResult;
use crate::xml::{Element, XmlCodec, XmlNode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Collection-wide parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Global {
    pub domain_type: DomainType,
    pub sgn: PhaseSgn,
    pub timeline: Timeline,
    pub fx_band: FxBand,
    pub toa_swath: ToaSwath,
    pub tropo_parameters: Option<TropoParameters>,
    pub iono_parameters: Option<IonoParameters>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub collection_start: DateTime<Utc>,
    pub rcv_collection_start: Option<DateTime<Utc>>,
    /// Earliest transmit time, seconds after collection start
    pub tx_time1: f64,
    /// Latest transmit time, seconds after collection start
    pub tx_time2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FxBand {
    pub fx_min: f64,
    pub fx_max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ToaSwath {
    pub toa_min: f64,
    pub toa_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TropoParameters {
    /// Refractivity at the surface
    pub n0: f64,
    /// Reference height: "IARP" or "ZERO"
    pub ref_height: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IonoParameters {
    pub tecv: f64,
    pub f2_height: Option<f64>,
}

impl XmlCodec for Timeline {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("CollectionStart", &self.collection_start);
        element.add_optional_value("RcvCollectionStart", &self.rcv_collection_start);
        element.add_value("TxTime1", &self.tx_time1);
        element.add_value("TxTime2", &self.tx_time2);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            collection_start: node.required_value("CollectionStart")?,
            rcv_collection_start: node.optional_value("RcvCollectionStart")?,
            tx_time1: node.required_value("TxTime1")?,
            tx_time2: node.required_value("TxTime2")?,
        })
    }
}

impl XmlCodec for FxBand {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("FxMin", &self.fx_min);
        element.add_value("FxMax", &self.fx_max);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self { fx_min: node.required_value("FxMin")?, fx_max: node.required_value("FxMax")? })
    }
}

impl XmlCodec for ToaSwath {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("TOAMin", &self.toa_min);
        element.add_value("TOAMax", &self.toa_max);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self { toa_min: node.required_value("TOAMin")?, toa_max: node.required_value("TOAMax")? })
    }
}

impl XmlCodec for TropoParameters {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("N0", &self.n0);
        element.add_value("RefHeight", &self.ref_height);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self { n0: node.required_value("N0")?, ref_height: node.required_value("RefHeight")? })
    }
}

impl XmlCodec for IonoParameters {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("TECV", &self.tecv);
        element.add_optional_value("F2Height", &self.f2_height);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self { tecv: node.required_value("TECV")?, f2_height: node.optional_value("F2Height")? })
    }
}

impl XmlCodec for Global {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("DomainType", &self.domain_type);
        element.add_value("SGN", &self.sgn);
        element.add_child("Timeline", &self.timeline)?;
        element.add_child("FxBand", &self.fx_band)?;
        element.add_child("TOASwath", &self.toa_swath)?;
        element.add_optional_child("TropoParameters", &self.tropo_parameters)?;
        element.add_optional_child("IonoParameters", &self.iono_parameters)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            domain_type: node.required_value("DomainType")?,
            sgn: node.required_value("SGN")?,
            timeline: node.required_child("Timeline")?,
            fx_band: node.required_child("FxBand")?,
            toa_swath: node.required_child("TOASwath")?,
            tropo_parameters: node.optional_child("TropoParameters")?,
            iono_parameters: node.optional_child("IonoParameters")?,
        })
    }
}
