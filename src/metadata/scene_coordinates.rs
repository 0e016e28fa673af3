use crate::enums::EarthModelType;
use crate::types::{CphdResult, LatLon, LatLonAlt, LatLonCorners, LineSample, Vector2, Vector3};
use crate::xml::{Element, XmlCodec, XmlNode};
use serde::{Deserialize, Serialize};

/// Minimum vertex count of any closed polygon
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Scene geometry: reference point, surface and image area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneCoordinates {
    pub earth_model: EarthModelType,
    pub iarp: Iarp,
    pub reference_surface: ReferenceSurface,
    pub image_area: AreaType,
    pub image_area_corners: LatLonCorners,
    pub extended_area: Option<AreaType>,
    pub image_grid: Option<ImageGrid>,
}

/// Image area reference point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Iarp {
    pub ecf: Vector3,
    pub llh: LatLonAlt,
}

/// Reference surface, either a plane or a constant height surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReferenceSurface {
    Planar { u_iax: Vector3, u_iay: Vector3 },
    Hae { u_iax: LatLon, u_iay: LatLon },
}

/// Rectangle in image area coordinates with an optional bounding polygon
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AreaType {
    pub x1y1: Vector2,
    pub x2y2: Vector2,
    /// Empty when the area has no polygon
    pub polygon: Vec<Vector2>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGrid {
    pub identifier: Option<String>,
    pub iarp_location: LineSample,
    pub iax_extent: IaxExtent,
    pub iay_extent: IayExtent,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IaxExtent {
    pub line_spacing: f64,
    pub first_line: i64,
    pub num_lines: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IayExtent {
    pub sample_spacing: f64,
    pub first_sample: i64,
    pub num_samples: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub identifier: String,
    pub start_line: i64,
    pub start_sample: i64,
    pub end_line: i64,
    pub end_sample: i64,
    /// Empty when the segment has no polygon
    pub polygon: Vec<LineSample>,
}

impl XmlCodec for Iarp {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_child("ECF", &self.ecf)?;
        element.add_child("LLH", &self.llh)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self { ecf: node.required_child("ECF")?, llh: node.required_child("LLH")? })
    }
}

impl XmlCodec for ReferenceSurface {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        match self {
            ReferenceSurface::Planar { u_iax, u_iay } => {
                let planar = element.new_child("Planar");
                planar.add_child("uIAX", u_iax)?;
                planar.add_child("uIAY", u_iay)?;
            }
            ReferenceSurface::Hae { u_iax, u_iay } => {
                let hae = element.new_child("HAE");
                hae.add_child("uIAXLL", u_iax)?;
                hae.add_child("uIAYLL", u_iay)?;
            }
        }
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        match node.choice(&["Planar", "HAE"])? {
            ("Planar", planar) => Ok(ReferenceSurface::Planar {
                u_iax: planar.required_child("uIAX")?,
                u_iay: planar.required_child("uIAY")?,
            }),
            (_, hae) => Ok(ReferenceSurface::Hae {
                u_iax: hae.required_child("uIAXLL")?,
                u_iay: hae.required_child("uIAYLL")?,
            }),
        }
    }
}

impl XmlCodec for AreaType {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_child("X1Y1", &self.x1y1)?;
        element.add_child("X2Y2", &self.x2y2)?;
        element.add_optional_polygon("Polygon", "Vertex", &self.polygon, MIN_POLYGON_VERTICES)
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            x1y1: node.required_child("X1Y1")?,
            x2y2: node.required_child("X2Y2")?,
            polygon: node.polygon("Polygon", "Vertex", MIN_POLYGON_VERTICES)?,
        })
    }
}

impl XmlCodec for Segment {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Identifier", &self.identifier);
        element.add_value("StartLine", &self.start_line);
        element.add_value("StartSample", &self.start_sample);
        element.add_value("EndLine", &self.end_line);
        element.add_value("EndSample", &self.end_sample);
        element.add_optional_polygon("SegmentPolygon", "SV", &self.polygon, MIN_POLYGON_VERTICES)
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            identifier: node.required_value("Identifier")?,
            start_line: node.required_value("StartLine")?,
            start_sample: node.required_value("StartSample")?,
            end_line: node.required_value("EndLine")?,
            end_sample: node.required_value("EndSample")?,
            polygon: node.polygon("SegmentPolygon", "SV", MIN_POLYGON_VERTICES)?,
        })
    }
}

impl XmlCodec for ImageGrid {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_optional_value("Identifier", &self.identifier);
        element.add_child("IARPLocation", &self.iarp_location)?;

        let x = element.new_child("IAXExtent");
        x.add_value("LineSpacing", &self.iax_extent.line_spacing);
        x.add_value("FirstLine", &self.iax_extent.first_line);
        x.add_value("NumLines", &self.iax_extent.num_lines);

        let y = element.new_child("IAYExtent");
        y.add_value("SampleSpacing", &self.iay_extent.sample_spacing);
        y.add_value("FirstSample", &self.iay_extent.first_sample);
        y.add_value("NumSamples", &self.iay_extent.num_samples);

        if !self.segments.is_empty() {
            let list = element.new_child("SegmentList");
            list.add_value("NumSegments", &self.segments.len());
            list.add_list("Segment", &self.segments)
                .map_err(|e| e.within("SegmentList"))?;
        }
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let x = node.required("IAXExtent")?;
        let y = node.required("IAYExtent")?;
        let segments = match node.optional("SegmentList")? {
            Some(list) => {
                let segments = list.list("Segment")?;
                list.check_count("NumSegments", segments.len())?;
                segments
            }
            None => Vec::new(),
        };

        Ok(Self {
            identifier: node.optional_value("Identifier")?,
            iarp_location: node.required_child("IARPLocation")?,
            iax_extent: IaxExtent {
                line_spacing: x.required_value("LineSpacing")?,
                first_line: x.required_value("FirstLine")?,
                num_lines: x.required_value("NumLines")?,
            },
            iay_extent: IayExtent {
                sample_spacing: y.required_value("SampleSpacing")?,
                first_sample: y.required_value("FirstSample")?,
                num_samples: y.required_value("NumSamples")?,
            },
            segments,
        })
    }
}

impl XmlCodec for SceneCoordinates {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("EarthModel", &self.earth_model);
        element.add_child("IARP", &self.iarp)?;
        element.add_child("ReferenceSurface", &self.reference_surface)?;
        element.add_child("ImageArea", &self.image_area)?;
        element.add_child("ImageAreaCornerPoints", &self.image_area_corners)?;
        element.add_optional_child("ExtendedArea", &self.extended_area)?;
        element.add_optional_child("ImageGrid", &self.image_grid)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            earth_model: node.required_value("EarthModel")?,
            iarp: node.required_child("IARP")?,
            reference_surface: node.required_child("ReferenceSurface")?,
            image_area: node.required_child("ImageArea")?,
            image_area_corners: node.required_child("ImageAreaCornerPoints")?,
            extended_area: node.optional_child("ExtendedArea")?,
            image_grid: node.optional_child("ImageGrid")?,
        })
    }
}
