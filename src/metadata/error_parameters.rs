//! Error statistics for the collection geometry and sensor.

use crate::enums::FrameType;
use crate::types::{CphdResult, Parameter};
use crate::xml::{Element, XmlCodec, XmlNode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ErrorParameters {
    Monostatic(MonostaticErrors),
    Bistatic(BistaticErrors),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonostaticErrors {
    pub pos_vel_err: PosVelErr,
    pub radar_sensor: RadarSensorError,
    pub tropo_error: Option<TropoError>,
    pub iono_error: Option<IonoError>,
    pub added_parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BistaticErrors {
    pub tx_platform: PlatformErrors,
    pub rcv_platform: PlatformErrors,
    pub added_parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformErrors {
    pub pos_vel_err: PosVelErr,
    pub radar_sensor: BistaticRadarSensor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BistaticRadarSensor {
    pub clock_freq_sf: Option<f64>,
    pub collection_start_time: f64,
}

/// Position and velocity error standard deviations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosVelErr {
    pub frame: FrameType,
    pub p1: f64,
    pub p2: f64,
    pub p3: f64,
    pub v1: f64,
    pub v2: f64,
    pub v3: f64,
    pub corr_coefs: Option<CorrCoefs>,
    pub position_decorr: Option<Decorr>,
}

/// Correlation coefficients between the six position/velocity components
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CorrCoefs {
    pub p1p2: f64,
    pub p1p3: f64,
    pub p1v1: f64,
    pub p1v2: f64,
    pub p1v3: f64,
    pub p2p3: f64,
    pub p2v1: f64,
    pub p2v2: f64,
    pub p2v3: f64,
    pub p3v1: f64,
    pub p3v2: f64,
    pub p3v3: f64,
    pub v1v2: f64,
    pub v1v3: f64,
    pub v2v3: f64,
}

const CORR_COEF_TAGS: [&str; 15] = [
    "P1P2", "P1P3", "P1V1", "P1V2", "P1V3", "P2P3", "P2V1", "P2V2", "P2V3", "P3V1", "P3V2",
    "P3V3", "V1V2", "V1V3", "V2V3",
];

impl CorrCoefs {
    /// Values in the fixed element order
    pub fn values(&self) -> [f64; 15] {
        [
            self.p1p2, self.p1p3, self.p1v1, self.p1v2, self.p1v3, self.p2p3, self.p2v1,
            self.p2v2, self.p2v3, self.p3v1, self.p3v2, self.p3v3, self.v1v2, self.v1v3,
            self.v2v3,
        ]
    }

    pub fn from_values(v: [f64; 15]) -> Self {
        Self {
            p1p2: v[0],
            p1p3: v[1],
            p1v1: v[2],
            p1v2: v[3],
            p1v3: v[4],
            p2p3: v[5],
            p2v1: v[6],
            p2v2: v[7],
            p2v3: v[8],
            p3v1: v[9],
            p3v2: v[10],
            p3v3: v[11],
            v1v2: v[12],
            v1v3: v[13],
            v2v3: v[14],
        }
    }
}

/// Exponential decorrelation of an error term
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decorr {
    pub corr_coef_zero: f64,
    pub decorr_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarSensorError {
    pub range_bias: f64,
    pub clock_freq_sf: Option<f64>,
    pub collection_start_time: Option<f64>,
    pub range_bias_decorr: Option<Decorr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TropoError {
    pub tropo_range_vertical: Option<f64>,
    pub tropo_range_slant: Option<f64>,
    pub tropo_range_decorr: Option<Decorr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IonoError {
    pub iono_range_vertical: f64,
    pub iono_range_rate_vertical: Option<f64>,
    pub iono_rg_rg_rate_cc: Option<f64>,
    pub iono_range_vert_decorr: Option<Decorr>,
}

impl XmlCodec for Decorr {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("CorrCoefZero", &self.corr_coef_zero);
        element.add_value("DecorrRate", &self.decorr_rate);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            corr_coef_zero: node.required_value("CorrCoefZero")?,
            decorr_rate: node.required_value("DecorrRate")?,
        })
    }
}

impl XmlCodec for CorrCoefs {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        for (tag, value) in CORR_COEF_TAGS.iter().zip(self.values()) {
            element.add_value(tag, &value);
        }
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let mut values = [0.0; 15];
        for (slot, tag) in values.iter_mut().zip(CORR_COEF_TAGS) {
            *slot = node.required_value(tag)?;
        }
        Ok(Self::from_values(values))
    }
}

impl XmlCodec for PosVelErr {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Frame", &self.frame);
        element.add_value("P1", &self.p1);
        element.add_value("P2", &self.p2);
        element.add_value("P3", &self.p3);
        element.add_value("V1", &self.v1);
        element.add_value("V2", &self.v2);
        element.add_value("V3", &self.v3);
        element.add_optional_child("CorrCoefs", &self.corr_coefs)?;
        element.add_optional_child("PositionDecorr", &self.position_decorr)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            frame: node.required_value("Frame")?,
            p1: node.required_value("P1")?,
            p2: node.required_value("P2")?,
            p3: node.required_value("P3")?,
            v1: node.required_value("V1")?,
            v2: node.required_value("V2")?,
            v3: node.required_value("V3")?,
            corr_coefs: node.optional_child("CorrCoefs")?,
            position_decorr: node.optional_child("PositionDecorr")?,
        })
    }
}

impl XmlCodec for RadarSensorError {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("RangeBias", &self.range_bias);
        element.add_optional_value("ClockFreqSF", &self.clock_freq_sf);
        element.add_optional_value("CollectionStartTime", &self.collection_start_time);
        element.add_optional_child("RangeBiasDecorr", &self.range_bias_decorr)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            range_bias: node.required_value("RangeBias")?,
            clock_freq_sf: node.optional_value("ClockFreqSF")?,
            collection_start_time: node.optional_value("CollectionStartTime")?,
            range_bias_decorr: node.optional_child("RangeBiasDecorr")?,
        })
    }
}

impl XmlCodec for TropoError {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_optional_value("TropoRangeVertical", &self.tropo_range_vertical);
        element.add_optional_value("TropoRangeSlant", &self.tropo_range_slant);
        element.add_optional_child("TropoRangeDecorr", &self.tropo_range_decorr)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            tropo_range_vertical: node.optional_value("TropoRangeVertical")?,
            tropo_range_slant: node.optional_value("TropoRangeSlant")?,
            tropo_range_decorr: node.optional_child("TropoRangeDecorr")?,
        })
    }
}

impl XmlCodec for IonoError {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("IonoRangeVertical", &self.iono_range_vertical);
        element.add_optional_value("IonoRangeRateVertical", &self.iono_range_rate_vertical);
        element.add_optional_value("IonoRgRgRateCC", &self.iono_rg_rg_rate_cc);
        element.add_optional_child("IonoRangeVertDecorr", &self.iono_range_vert_decorr)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            iono_range_vertical: node.required_value("IonoRangeVertical")?,
            iono_range_rate_vertical: node.optional_value("IonoRangeRateVertical")?,
            iono_rg_rg_rate_cc: node.optional_value("IonoRgRgRateCC")?,
            iono_range_vert_decorr: node.optional_child("IonoRangeVertDecorr")?,
        })
    }
}

impl XmlCodec for BistaticRadarSensor {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_optional_value("ClockFreqSF", &self.clock_freq_sf);
        element.add_value("CollectionStartTime", &self.collection_start_time);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            clock_freq_sf: node.optional_value("ClockFreqSF")?,
            collection_start_time: node.required_value("CollectionStartTime")?,
        })
    }
}

impl XmlCodec for PlatformErrors {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_child("PosVelErr", &self.pos_vel_err)?;
        element.add_child("RadarSensor", &self.radar_sensor)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            pos_vel_err: node.required_child("PosVelErr")?,
            radar_sensor: node.required_child("RadarSensor")?,
        })
    }
}

impl XmlCodec for MonostaticErrors {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_child("PosVelErr", &self.pos_vel_err)?;
        element.add_child("RadarSensor", &self.radar_sensor)?;
        element.add_optional_child("TropoError", &self.tropo_error)?;
        element.add_optional_child("IonoError", &self.iono_error)?;
        element.add_wrapped_parameters("AddedParameters", "Parameter", &self.added_parameters);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            pos_vel_err: node.required_child("PosVelErr")?,
            radar_sensor: node.required_child("RadarSensor")?,
            tropo_error: node.optional_child("TropoError")?,
            iono_error: node.optional_child("IonoError")?,
            added_parameters: node.wrapped_parameters("AddedParameters", "Parameter")?,
        })
    }
}

impl XmlCodec for BistaticErrors {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_child("TxPlatform", &self.tx_platform)?;
        element.add_child("RcvPlatform", &self.rcv_platform)?;
        element.add_wrapped_parameters("AddedParameters", "Parameter", &self.added_parameters);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            tx_platform: node.required_child("TxPlatform")?,
            rcv_platform: node.required_child("RcvPlatform")?,
            added_parameters: node.wrapped_parameters("AddedParameters", "Parameter")?,
        })
    }
}

impl XmlCodec for ErrorParameters {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        match self {
            ErrorParameters::Monostatic(mono) => element.add_child("Monostatic", mono)?,
            ErrorParameters::Bistatic(bi) => element.add_child("Bistatic", bi)?,
        };
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        match node.choice(&["Monostatic", "Bistatic"])? {
            ("Monostatic", mono) => Ok(ErrorParameters::Monostatic(mono.decode()?)),
            (_, bi) => Ok(ErrorParameters::Bistatic(bi.decode()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corr_coefs_order() {
        let coefs = CorrCoefs::from_values(std::array::from_fn(|i| i as f64 / 100.0));
        let mut element = Element::new("CorrCoefs");
        coefs.encode(&mut element).unwrap();
        assert_eq!(element.children()[0].name(), "P1P2");
        assert_eq!(element.children()[14].name(), "V2V3");
        assert_eq!(element.first_and_only("P3V3").unwrap().text(), "0.11");
        assert_eq!(CorrCoefs::decode(&XmlNode::root(&element)).unwrap(), coefs);
    }
}
