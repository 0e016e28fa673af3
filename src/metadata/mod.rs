//! CPHD metadata model, one module per XML section.
//!
//! Every section type implements [`XmlCodec`], so the document as a whole is
//! encoded and decoded by walking the sections in schema order.

pub mod antenna;
pub mod channel;
pub mod collection_id;
pub mod data;
pub mod dwell;
pub mod error_parameters;
pub mod geo_info;
pub mod global;
pub mod match_info;
pub mod product_info;
pub mod pvp;
pub mod reference_geometry;
pub mod scene_coordinates;
pub mod support_array;
pub mod tx_rcv;

pub use antenna::Antenna;
pub use channel::Channel;
pub use collection_id::CollectionId;
pub use data::Data;
pub use dwell::Dwell;
pub use error_parameters::ErrorParameters;
pub use geo_info::GeoInfo;
pub use global::Global;
pub use match_info::MatchInfo;
pub use product_info::ProductInfo;
pub use pvp::Pvp;
pub use reference_geometry::ReferenceGeometry;
pub use scene_coordinates::SceneCoordinates;
pub use support_array::SupportArray;
pub use tx_rcv::TxRcv;

use crate::types::CphdResult;
use crate::xml::{Element, XmlCodec, XmlNode};
use serde::{Deserialize, Serialize};

/// Complete CPHD metadata document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub collection_id: CollectionId,
    pub global: Global,
    pub scene_coordinates: SceneCoordinates,
    pub data: Data,
    pub channel: Channel,
    pub pvp: Pvp,
    pub support_array: Option<SupportArray>,
    pub dwell: Dwell,
    pub reference_geometry: ReferenceGeometry,
    pub antenna: Option<Antenna>,
    pub tx_rcv: Option<TxRcv>,
    pub error_parameters: Option<ErrorParameters>,
    pub product_info: Option<ProductInfo>,
    pub geo_info: Vec<GeoInfo>,
    pub match_info: Option<MatchInfo>,
}

impl Metadata {
    /// Checks that span several sections
    pub fn validate(&self) -> CphdResult<()> {
        let needed = self.pvp.required_bytes()?;
        if needed > self.data.num_bytes_pvp {
            return Err(crate::types::CphdError::invalid_value(
                "Data/NumBytesPVP",
                format!(
                    "{} bytes cannot hold the PVP layout, which spans {} bytes",
                    self.data.num_bytes_pvp, needed
                ),
            ));
        }
        Ok(())
    }
}

impl XmlCodec for Metadata {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        self.validate()?;
        element.add_child("CollectionID", &self.collection_id)?;
        element.add_child("Global", &self.global)?;
        element.add_child("SceneCoordinates", &self.scene_coordinates)?;
        element.add_child("Data", &self.data)?;
        element.add_child("Channel", &self.channel)?;
        element.add_child("PVP", &self.pvp)?;
        element.add_optional_child("SupportArray", &self.support_array)?;
        element.add_child("Dwell", &self.dwell)?;
        element.add_child("ReferenceGeometry", &self.reference_geometry)?;
        element.add_optional_child("Antenna", &self.antenna)?;
        element.add_optional_child("TxRcv", &self.tx_rcv)?;
        element.add_optional_child("ErrorParameters", &self.error_parameters)?;
        element.add_optional_child("ProductInfo", &self.product_info)?;
        element.add_list("GeoInfo", &self.geo_info)?;
        element.add_optional_child("MatchInfo", &self.match_info)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let metadata = Self {
            collection_id: node.required_child("CollectionID")?,
            global: node.required_child("Global")?,
            scene_coordinates: node.required_child("SceneCoordinates")?,
            data: node.required_child("Data")?,
            channel: node.required_child("Channel")?,
            pvp: node.required_child("PVP")?,
            support_array: node.optional_child("SupportArray")?,
            dwell: node.required_child("Dwell")?,
            reference_geometry: node.required_child("ReferenceGeometry")?,
            antenna: node.optional_child("Antenna")?,
            tx_rcv: node.optional_child("TxRcv")?,
            error_parameters: node.optional_child("ErrorParameters")?,
            product_info: node.optional_child("ProductInfo")?,
            geo_info: node.list("GeoInfo")?,
            match_info: node.optional_child("MatchInfo")?,
        };
        metadata.validate()?;
        Ok(metadata)
    }
}
