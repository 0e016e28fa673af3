use crate::types::{CphdResult, Poly1D, Poly2D, PolyXYZ, Vector3};
use crate::xml::{Element, XmlCodec, XmlNode};
use serde::{Deserialize, Serialize};

/// Antenna coordinate frames, phase centers and beam patterns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Antenna {
    pub ant_coord_frames: Vec<AntCoordFrame>,
    pub ant_phase_centers: Vec<AntPhaseCenter>,
    pub ant_patterns: Vec<AntPattern>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntCoordFrame {
    pub identifier: String,
    pub x_axis_poly: PolyXYZ,
    pub y_axis_poly: PolyXYZ,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntPhaseCenter {
    pub identifier: String,
    pub acf_id: String,
    pub apc_xyz: Vector3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntPattern {
    pub identifier: String,
    pub freq_zero: f64,
    pub gain_zero: Option<f64>,
    pub eb_freq_shift: Option<bool>,
    pub ml_freq_dilation: Option<bool>,
    pub gain_bs_poly: Option<Poly1D>,
    pub eb: ElectricalBoresight,
    pub array: GainPhasePoly,
    pub element: GainPhasePoly,
    pub gain_phase_arrays: Vec<GainPhaseArray>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricalBoresight {
    pub dcx_poly: Poly1D,
    pub dcy_poly: Poly1D,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainPhasePoly {
    pub gain_poly: Poly2D,
    pub phase_poly: Poly2D,
}

/// Reference from a pattern to gain/phase support arrays at one frequency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainPhaseArray {
    pub freq: f64,
    pub array_id: String,
    pub element_id: Option<String>,
}

impl XmlCodec for AntCoordFrame {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Identifier", &self.identifier);
        element.add_child("XAxisPoly", &self.x_axis_poly)?;
        element.add_child("YAxisPoly", &self.y_axis_poly)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            identifier: node.required_value("Identifier")?,
            x_axis_poly: node.required_child("XAxisPoly")?,
            y_axis_poly: node.required_child("YAxisPoly")?,
        })
    }
}

impl XmlCodec for AntPhaseCenter {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Identifier", &self.identifier);
        element.add_value("ACFId", &self.acf_id);
        element.add_child("APCXYZ", &self.apc_xyz)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            identifier: node.required_value("Identifier")?,
            acf_id: node.required_value("ACFId")?,
            apc_xyz: node.required_child("APCXYZ")?,
        })
    }
}

impl XmlCodec for ElectricalBoresight {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_child("DCXPoly", &self.dcx_poly)?;
        element.add_child("DCYPoly", &self.dcy_poly)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self { dcx_poly: node.required_child("DCXPoly")?, dcy_poly: node.required_child("DCYPoly")? })
    }
}

impl XmlCodec for GainPhasePoly {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_child("GainPoly", &self.gain_poly)?;
        element.add_child("PhasePoly", &self.phase_poly)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            gain_poly: node.required_child("GainPoly")?,
            phase_poly: node.required_child("PhasePoly")?,
        })
    }
}

impl XmlCodec for GainPhaseArray {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Freq", &self.freq);
        element.add_value("ArrayId", &self.array_id);
        element.add_optional_value("ElementId", &self.element_id);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            freq: node.required_value("Freq")?,
            array_id: node.required_value("ArrayId")?,
            element_id: node.optional_value("ElementId")?,
        })
    }
}

impl XmlCodec for AntPattern {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Identifier", &self.identifier);
        element.add_value("FreqZero", &self.freq_zero);
        element.add_optional_value("GainZero", &self.gain_zero);
        element.add_optional_value("EBFreqShift", &self.eb_freq_shift);
        element.add_optional_value("MLFreqDilation", &self.ml_freq_dilation);
        element.add_optional_child("GainBSPoly", &self.gain_bs_poly)?;
        element.add_child("EB", &self.eb)?;
        element.add_child("Array", &self.array)?;
        element.add_child("Element", &self.element)?;
        element.add_list("GainPhaseArray", &self.gain_phase_arrays)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            identifier: node.required_value("Identifier")?,
            freq_zero: node.required_value("FreqZero")?,
            gain_zero: node.optional_value("GainZero")?,
            eb_freq_shift: node.optional_value("EBFreqShift")?,
            ml_freq_dilation: node.optional_value("MLFreqDilation")?,
            gain_bs_poly: node.optional_child("GainBSPoly")?,
            eb: node.required_child("EB")?,
            array: node.required_child("Array")?,
            element: node.required_child("Element")?,
            gain_phase_arrays: node.list("GainPhaseArray")?,
        })
    }
}

impl XmlCodec for Antenna {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("NumACFs", &self.ant_coord_frames.len());
        element.add_value("NumAPCs", &self.ant_phase_centers.len());
        element.add_value("NumAntPats", &self.ant_patterns.len());
        element.add_list("AntCoordFrame", &self.ant_coord_frames)?;
        element.add_list("AntPhaseCenter", &self.ant_phase_centers)?;
        element.add_list("AntPattern", &self.ant_patterns)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let antenna = Self {
            ant_coord_frames: node.list("AntCoordFrame")?,
            ant_phase_centers: node.list("AntPhaseCenter")?,
            ant_patterns: node.list("AntPattern")?,
        };
        node.check_count("NumACFs", antenna.ant_coord_frames.len())?;
        node.check_count("NumAPCs", antenna.ant_phase_centers.len())?;
        node.check_count("NumAntPats", antenna.ant_patterns.len())?;
        Ok(antenna)
    }
}
