use crate::enums::SideOfTrack;
use crate::types::{CphdResult, Vector3};
use crate::xml::{Element, XmlCodec, XmlNode};
use serde::{Deserialize, Serialize};

/// Collection geometry at the reference vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceGeometry {
    pub srp: Srp,
    pub reference_time: f64,
    pub srp_cod_time: f64,
    pub srp_dwell_time: f64,
    pub geometry: CollectionGeometry,
}

/// Stabilization reference point in ECF and image area coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Srp {
    pub ecf: Vector3,
    pub iac: Vector3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CollectionGeometry {
    Monostatic(Monostatic),
    Bistatic(Bistatic),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monostatic {
    pub arp_pos: Vector3,
    pub arp_vel: Vector3,
    pub side_of_track: SideOfTrack,
    pub slant_range: f64,
    pub ground_range: f64,
    pub doppler_cone_angle: f64,
    pub graze_angle: f64,
    pub incidence_angle: f64,
    pub azimuth_angle: f64,
    pub twist_angle: f64,
    pub slope_angle: f64,
    pub layover_angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bistatic {
    pub azimuth_angle: f64,
    pub azimuth_angle_rate: f64,
    pub bistatic_angle: f64,
    pub bistatic_angle_rate: f64,
    pub graze_angle: f64,
    pub twist_angle: f64,
    pub slope_angle: f64,
    pub layover_angle: f64,
    pub tx_platform: PlatformParams,
    pub rcv_platform: PlatformParams,
}

/// Geometry of one platform of a bistatic pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformParams {
    pub time: f64,
    pub pos: Vector3,
    pub vel: Vector3,
    pub side_of_track: SideOfTrack,
    pub slant_range: f64,
    pub ground_range: f64,
    pub doppler_cone_angle: f64,
    pub graze_angle: f64,
    pub incidence_angle: f64,
    pub azimuth_angle: f64,
}

impl XmlCodec for Srp {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_child("ECF", &self.ecf)?;
        element.add_child("IAC", &self.iac)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self { ecf: node.required_child("ECF")?, iac: node.required_child("IAC")? })
    }
}

impl XmlCodec for Monostatic {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_child("ARPPos", &self.arp_pos)?;
        element.add_child("ARPVel", &self.arp_vel)?;
        element.add_value("SideOfTrack", &self.side_of_track);
        element.add_value("SlantRange", &self.slant_range);
        element.add_value("GroundRange", &self.ground_range);
        element.add_value("DopplerConeAngle", &self.doppler_cone_angle);
        element.add_value("GrazeAngle", &self.graze_angle);
        element.add_value("IncidenceAngle", &self.incidence_angle);
        element.add_value("AzimuthAngle", &self.azimuth_angle);
        element.add_value("TwistAngle", &self.twist_angle);
        element.add_value("SlopeAngle", &self.slope_angle);
        element.add_value("LayoverAngle", &self.layover_angle);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            arp_pos: node.required_child("ARPPos")?,
            arp_vel: node.required_child("ARPVel")?,
            side_of_track: node.required_value("SideOfTrack")?,
            slant_range: node.required_value("SlantRange")?,
            ground_range: node.required_value("GroundRange")?,
            doppler_cone_angle: node.required_value("DopplerConeAngle")?,
            graze_angle: node.required_value("GrazeAngle")?,
            incidence_angle: node.required_value("IncidenceAngle")?,
            azimuth_angle: node.required_value("AzimuthAngle")?,
            twist_angle: node.required_value("TwistAngle")?,
            slope_angle: node.required_value("SlopeAngle")?,
            layover_angle: node.required_value("LayoverAngle")?,
        })
    }
}

impl XmlCodec for PlatformParams {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Time", &self.time);
        element.add_child("Pos", &self.pos)?;
        element.add_child("Vel", &self.vel)?;
        element.add_value("SideOfTrack", &self.side_of_track);
        element.add_value("SlantRange", &self.slant_range);
        element.add_value("GroundRange", &self.ground_range);
        element.add_value("DopplerConeAngle", &self.doppler_cone_angle);
        element.add_value("GrazeAngle", &self.graze_angle);
        element.add_value("IncidenceAngle", &self.incidence_angle);
        element.add_value("AzimuthAngle", &self.azimuth_angle);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            time: node.required_value("Time")?,
            pos: node.required_child("Pos")?,
            vel: node.required_child("Vel")?,
            side_of_track: node.required_value("SideOfTrack")?,
            slant_range: node.required_value("SlantRange")?,
            ground_range: node.required_value("GroundRange")?,
            doppler_cone_angle: node.required_value("DopplerConeAngle")?,
            graze_angle: node.required_value("GrazeAngle")?,
            incidence_angle: node.required_value("IncidenceAngle")?,
            azimuth_angle: node.required_value("AzimuthAngle")?,
        })
    }
}

impl XmlCodec for Bistatic {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("AzimuthAngle", &self.azimuth_angle);
        element.add_value("AzimuthAngleRate", &self.azimuth_angle_rate);
        element.add_value("BistaticAngle", &self.bistatic_angle);
        element.add_value("BistaticAngleRate", &self.bistatic_angle_rate);
        element.add_value("GrazeAngle", &self.graze_angle);
        element.add_value("TwistAngle", &self.twist_angle);
        element.add_value("SlopeAngle", &self.slope_angle);
        element.add_value("LayoverAngle", &self.layover_angle);
        element.add_child("TxPlatform", &self.tx_platform)?;
        element.add_child("RcvPlatform", &self.rcv_platform)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            azimuth_angle: node.required_value("AzimuthAngle")?,
            azimuth_angle_rate: node.required_value("AzimuthAngleRate")?,
            bistatic_angle: node.required_value("BistaticAngle")?,
            bistatic_angle_rate: node.required_value("BistaticAngleRate")?,
            graze_angle: node.required_value("GrazeAngle")?,
            twist_angle: node.required_value("TwistAngle")?,
            slope_angle: node.required_value("SlopeAngle")?,
            layover_angle: node.required_value("LayoverAngle")?,
            tx_platform: node.required_child("TxPlatform")?,
            rcv_platform: node.required_child("RcvPlatform")?,
        })
    }
}

impl XmlCodec for ReferenceGeometry {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_child("SRP", &self.srp)?;
        element.add_value("ReferenceTime", &self.reference_time);
        element.add_value("SRPCODTime", &self.srp_cod_time);
        element.add_value("SRPDwellTime", &self.srp_dwell_time);
        match &self.geometry {
            CollectionGeometry::Monostatic(mono) => element.add_child("Monostatic", mono)?,
            CollectionGeometry::Bistatic(bi) => element.add_child("Bistatic", bi)?,
        };
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let geometry = match node.choice(&["Monostatic", "Bistatic"])? {
            ("Monostatic", mono) => CollectionGeometry::Monostatic(mono.decode()?),
            (_, bi) => CollectionGeometry::Bistatic(bi.decode()?),
        };
        Ok(Self {
            srp: node.required_child("SRP")?,
            reference_time: node.required_value("ReferenceTime")?,
            srp_cod_time: node.required_value("SRPCODTime")?,
            srp_dwell_time: node.required_value("SRPDwellTime")?,
            geometry,
        })
    }
}
