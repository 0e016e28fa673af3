//! Per-channel signal parameters.

use crate::enums::PolarizationType;
use crate::metadata::scene_coordinates::AreaType;
use crate::types::{CphdError, CphdResult, Parameter};
use crate::xml::{Element, XmlCodec, XmlNode};
use serde::{Deserialize, Serialize};

/// Minimum number of points in a noise profile
pub const MIN_NOISE_PROFILE_POINTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub ref_ch_id: String,
    pub fx_fixed_cphd: bool,
    pub toa_fixed_cphd: bool,
    pub srp_fixed_cphd: bool,
    pub parameters: Vec<ChannelParameter>,
    pub added_parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelParameter {
    pub identifier: String,
    pub ref_vector_index: u64,
    pub fx_fixed: bool,
    pub toa_fixed: bool,
    pub srp_fixed: bool,
    pub signal_normal: Option<bool>,
    pub polarization: Polarization,
    pub fx_c: f64,
    pub fx_bw: f64,
    pub fx_bw_noise: Option<f64>,
    pub toa_saved: f64,
    pub toa_extended: Option<ToaExtended>,
    pub dwell_times: DwellTimes,
    pub image_area: Option<AreaType>,
    pub antenna: Option<ChannelAntenna>,
    pub tx_rcv: Option<ChannelTxRcv>,
    pub tgt_ref_level: Option<TgtRefLevel>,
    pub noise_level: Option<NoiseLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Polarization {
    pub tx_pol: PolarizationType,
    pub rcv_pol: PolarizationType,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToaExtended {
    pub toa_ext_saved: f64,
    pub lfm_eclipse: Option<LfmEclipse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LfmEclipse {
    pub fx_early_low: f64,
    pub fx_early_high: f64,
    pub fx_late_low: f64,
    pub fx_late_high: f64,
}

/// References into the Dwell section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DwellTimes {
    pub cod_id: String,
    pub dwell_id: String,
}

/// References into the Antenna section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAntenna {
    pub tx_apc_id: String,
    pub tx_apat_id: String,
    pub rcv_apc_id: String,
    pub rcv_apat_id: String,
}

/// References into the TxRcv section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelTxRcv {
    pub tx_wf_id: Vec<String>,
    pub rcv_id: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TgtRefLevel {
    pub pt_ref: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseLevel {
    pub pn_ref: f64,
    /// Noise bandwidth ratio, in (0, 1]
    pub bn_ref: f64,
    /// Empty when no profile is given; otherwise `Fx` strictly increases
    pub fx_noise_profile: Vec<NoisePoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoisePoint {
    pub fx: f64,
    pub pn: f64,
}

impl NoiseLevel {
    /// Check the BNRef range and the profile shape; errors are relative to NoiseLevel
    pub fn validate(&self) -> CphdResult<()> {
        if !(self.bn_ref > 0.0 && self.bn_ref <= 1.0) {
            return Err(CphdError::invalid_value(
                "BNRef",
                format!("{} is outside (0, 1]", self.bn_ref),
            ));
        }
        if self.fx_noise_profile.is_empty() {
            return Ok(());
        }
        if self.fx_noise_profile.len() < MIN_NOISE_PROFILE_POINTS {
            return Err(CphdError::invalid_value(
                "FxNoiseProfile",
                format!(
                    "needs at least {} points, found {}",
                    MIN_NOISE_PROFILE_POINTS,
                    self.fx_noise_profile.len()
                ),
            ));
        }
        for (i, pair) in self.fx_noise_profile.windows(2).enumerate() {
            if pair[1].fx <= pair[0].fx {
                return Err(CphdError::OrderingViolation {
                    path: format!("FxNoiseProfile/Point[{}]/Fx", i + 2),
                    reason: format!(
                        "Fx must strictly increase, {} follows {}",
                        pair[1].fx, pair[0].fx
                    ),
                });
            }
        }
        Ok(())
    }
}

impl XmlCodec for NoisePoint {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Fx", &self.fx);
        element.add_value("PN", &self.pn);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self { fx: node.required_value("Fx")?, pn: node.required_value("PN")? })
    }
}

impl XmlCodec for NoiseLevel {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        self.validate()?;
        element.add_value("PNRef", &self.pn_ref);
        element.add_value("BNRef", &self.bn_ref);
        if !self.fx_noise_profile.is_empty() {
            element
                .new_child("FxNoiseProfile")
                .add_list("Point", &self.fx_noise_profile)?;
        }
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let fx_noise_profile = match node.optional("FxNoiseProfile")? {
            Some(profile) => profile.list("Point")?,
            None => Vec::new(),
        };
        let level = Self {
            pn_ref: node.required_value("PNRef")?,
            bn_ref: node.required_value("BNRef")?,
            fx_noise_profile,
        };
        level.validate().map_err(|e| relocate(e, node))?;
        Ok(level)
    }
}

/// Re-root an error raised against relative paths under `node`
fn relocate(err: CphdError, node: &XmlNode<'_>) -> CphdError {
    if node.path().is_empty() {
        err
    } else {
        err.within(node.path())
    }
}

impl XmlCodec for ToaExtended {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("TOAExtSaved", &self.toa_ext_saved);
        if let Some(lfm) = &self.lfm_eclipse {
            let eclipse = element.new_child("LFMEclipse");
            eclipse.add_value("FxEarlyLow", &lfm.fx_early_low);
            eclipse.add_value("FxEarlyHigh", &lfm.fx_early_high);
            eclipse.add_value("FxLateLow", &lfm.fx_late_low);
            eclipse.add_value("FxLateHigh", &lfm.fx_late_high);
        }
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let lfm_eclipse = match node.optional("LFMEclipse")? {
            Some(lfm) => Some(LfmEclipse {
                fx_early_low: lfm.required_value("FxEarlyLow")?,
                fx_early_high: lfm.required_value("FxEarlyHigh")?,
                fx_late_low: lfm.required_value("FxLateLow")?,
                fx_late_high: lfm.required_value("FxLateHigh")?,
            }),
            None => None,
        };
        Ok(Self { toa_ext_saved: node.required_value("TOAExtSaved")?, lfm_eclipse })
    }
}

impl XmlCodec for ChannelParameter {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Identifier", &self.identifier);
        element.add_value("RefVectorIndex", &self.ref_vector_index);
        element.add_value("FXFixed", &self.fx_fixed);
        element.add_value("TOAFixed", &self.toa_fixed);
        element.add_value("SRPFixed", &self.srp_fixed);
        element.add_optional_value("SignalNormal", &self.signal_normal);

        let pol = element.new_child("Polarization");
        pol.add_value("TxPol", &self.polarization.tx_pol);
        pol.add_value("RcvPol", &self.polarization.rcv_pol);

        element.add_value("FxC", &self.fx_c);
        element.add_value("FxBW", &self.fx_bw);
        element.add_optional_value("FxBWNoise", &self.fx_bw_noise);
        element.add_value("TOASaved", &self.toa_saved);
        element.add_optional_child("TOAExtended", &self.toa_extended)?;

        let dwell = element.new_child("DwellTimes");
        dwell.add_value("CODId", &self.dwell_times.cod_id);
        dwell.add_value("DwellId", &self.dwell_times.dwell_id);

        element.add_optional_child("ImageArea", &self.image_area)?;

        if let Some(antenna) = &self.antenna {
            let ant = element.new_child("Antenna");
            ant.add_value("TxAPCId", &antenna.tx_apc_id);
            ant.add_value("TxAPATId", &antenna.tx_apat_id);
            ant.add_value("RcvAPCId", &antenna.rcv_apc_id);
            ant.add_value("RcvAPATId", &antenna.rcv_apat_id);
        }

        if let Some(tx_rcv) = &self.tx_rcv {
            let tr = element.new_child("TxRcv");
            tr.add_values("TxWFId", &tx_rcv.tx_wf_id);
            tr.add_values("RcvId", &tx_rcv.rcv_id);
        }

        if let Some(level) = &self.tgt_ref_level {
            element.new_child("TgtRefLevel").add_value("PTRef", &level.pt_ref);
        }
        element.add_optional_child("NoiseLevel", &self.noise_level)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let pol = node.required("Polarization")?;
        let dwell = node.required("DwellTimes")?;

        let antenna = match node.optional("Antenna")? {
            Some(ant) => Some(ChannelAntenna {
                tx_apc_id: ant.required_value("TxAPCId")?,
                tx_apat_id: ant.required_value("TxAPATId")?,
                rcv_apc_id: ant.required_value("RcvAPCId")?,
                rcv_apat_id: ant.required_value("RcvAPATId")?,
            }),
            None => None,
        };
        let tx_rcv = match node.optional("TxRcv")? {
            Some(tr) => Some(ChannelTxRcv {
                tx_wf_id: tr.value_list("TxWFId")?,
                rcv_id: tr.value_list("RcvId")?,
            }),
            None => None,
        };
        let tgt_ref_level = match node.optional("TgtRefLevel")? {
            Some(level) => Some(TgtRefLevel { pt_ref: level.required_value("PTRef")? }),
            None => None,
        };

        Ok(Self {
            identifier: node.required_value("Identifier")?,
            ref_vector_index: node.required_value("RefVectorIndex")?,
            fx_fixed: node.required_value("FXFixed")?,
            toa_fixed: node.required_value("TOAFixed")?,
            srp_fixed: node.required_value("SRPFixed")?,
            signal_normal: node.optional_value("SignalNormal")?,
            polarization: Polarization {
                tx_pol: pol.required_value("TxPol")?,
                rcv_pol: pol.required_value("RcvPol")?,
            },
            fx_c: node.required_value("FxC")?,
            fx_bw: node.required_value("FxBW")?,
            fx_bw_noise: node.optional_value("FxBWNoise")?,
            toa_saved: node.required_value("TOASaved")?,
            toa_extended: node.optional_child("TOAExtended")?,
            dwell_times: DwellTimes {
                cod_id: dwell.required_value("CODId")?,
                dwell_id: dwell.required_value("DwellId")?,
            },
            image_area: node.optional_child("ImageArea")?,
            antenna,
            tx_rcv,
            tgt_ref_level,
            noise_level: node.optional_child("NoiseLevel")?,
        })
    }
}

impl XmlCodec for Channel {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("RefChId", &self.ref_ch_id);
        element.add_value("FXFixedCPHD", &self.fx_fixed_cphd);
        element.add_value("TOAFixedCPHD", &self.toa_fixed_cphd);
        element.add_value("SRPFixedCPHD", &self.srp_fixed_cphd);
        element.add_list("Parameters", &self.parameters)?;
        element.add_wrapped_parameters("AddedParameters", "Parameter", &self.added_parameters);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            ref_ch_id: node.required_value("RefChId")?,
            fx_fixed_cphd: node.required_value("FXFixedCPHD")?,
            toa_fixed_cphd: node.required_value("TOAFixedCPHD")?,
            srp_fixed_cphd: node.required_value("SRPFixedCPHD")?,
            parameters: node.list("Parameters")?,
            added_parameters: node.wrapped_parameters("AddedParameters", "Parameter")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(points: &[(f64, f64)], bn_ref: f64) -> NoiseLevel {
        NoiseLevel {
            pn_ref: -40.0,
            bn_ref,
            fx_noise_profile: points.iter().map(|&(fx, pn)| NoisePoint { fx, pn }).collect(),
        }
    }

    #[test]
    fn test_noise_profile_ordering() {
        assert!(level(&[(1.0, 0.0), (2.0, 0.0)], 0.8).validate().is_ok());

        let err = level(&[(1.0, 0.0), (1.0, 0.0)], 0.8).validate().unwrap_err();
        assert!(matches!(err, CphdError::OrderingViolation { .. }));

        let err = level(&[(1.0, 0.0)], 0.8).validate().unwrap_err();
        assert!(matches!(err, CphdError::InvalidFieldValue { .. }));
    }

    #[test]
    fn test_bn_ref_range() {
        assert!(level(&[], 1.0).validate().is_ok());
        assert!(level(&[], 0.0).validate().is_err());
        assert!(level(&[], 1.5).validate().is_err());
    }

    #[test]
    fn test_decode_error_path() {
        let doc = Element::parse_str(
            "<Channel><Parameters><NoiseLevel><PNRef>1</PNRef><BNRef>2</BNRef></NoiseLevel></Parameters>\
             <Parameters><NoiseLevel><PNRef>1</PNRef><BNRef>3</BNRef></NoiseLevel></Parameters></Channel>",
        )
        .unwrap();
        let root = XmlNode::root(&doc);
        let second = &root.all("Parameters")[1];
        let err = second.required_child::<NoiseLevel>("NoiseLevel").unwrap_err();
        assert_eq!(err.path(), Some("Parameters[2]/NoiseLevel/BNRef"));
    }
}
