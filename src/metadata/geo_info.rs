//! Recursive geographic annotations.

use crate::types::{CphdError, CphdResult, LatLon, Parameter};
use crate::xml::{Element, XmlCodec, XmlNode};
use serde::{Deserialize, Serialize};

/// Minimum endpoints of a line
pub const MIN_LINE_POINTS: usize = 2;
/// Minimum vertices of a polygon
pub const MIN_POLYGON_POINTS: usize = 3;

/// Named geographic feature with points, lines, polygons and nested features
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoInfo {
    pub name: String,
    pub desc: Vec<Parameter>,
    pub points: Vec<LatLon>,
    pub lines: Vec<Vec<LatLon>>,
    pub polygons: Vec<Vec<LatLon>>,
    pub geo_info: Vec<GeoInfo>,
}

impl GeoInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Depth of the nested tree, 1 for a leaf
    pub fn depth(&self) -> usize {
        1 + self.geo_info.iter().map(GeoInfo::depth).max().unwrap_or(0)
    }
}

impl XmlCodec for GeoInfo {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.set_attribute("name", self.name.clone());
        element.add_parameters("Desc", &self.desc);
        for point in &self.points {
            element.add_child("Point", point)?;
        }
        for (i, line) in self.lines.iter().enumerate() {
            element
                .add_polygon("Line", "Endpoint", line, MIN_LINE_POINTS)
                .map_err(|e| relabel(e, "Line", i))?;
        }
        for (i, polygon) in self.polygons.iter().enumerate() {
            element
                .add_polygon("Polygon", "Vertex", polygon, MIN_POLYGON_POINTS)
                .map_err(|e| relabel(e, "Polygon", i))?;
        }
        element.add_list("GeoInfo", &self.geo_info)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let name = node
            .attribute("name")
            .ok_or_else(|| node.invalid("GeoInfo has no name attribute"))?
            .to_string();

        let mut points = Vec::new();
        for point in node.all("Point") {
            points.push(point.decode()?);
        }
        let mut lines = Vec::new();
        for line in node.all("Line") {
            lines.push(line.vertices("Endpoint", MIN_LINE_POINTS)?);
        }
        let mut polygons = Vec::new();
        for polygon in node.all("Polygon") {
            polygons.push(polygon.vertices("Vertex", MIN_POLYGON_POINTS)?);
        }

        Ok(Self {
            name,
            desc: node.parameters("Desc")?,
            points,
            lines,
            polygons,
            geo_info: node.list("GeoInfo")?,
        })
    }
}

/// Give the leading `tag` of an error path its 1-based position
fn relabel(err: CphdError, tag: &str, index: usize) -> CphdError {
    err.map_path(|path| match path.strip_prefix(tag) {
        Some(rest) => format!("{}[{}]{}", tag, index + 1, rest),
        None => path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> GeoInfo {
        let mut leaf = GeoInfo::new("leaf");
        leaf.points.push(LatLon::new(10.0, 20.0));

        let mut middle = GeoInfo::new("middle");
        middle.lines.push(vec![LatLon::new(0.0, 0.0), LatLon::new(1.0, 1.0)]);
        middle.geo_info.push(leaf);

        let mut root = GeoInfo::new("root");
        root.desc.push(Parameter::new("kind", "site"));
        root.polygons.push(vec![
            LatLon::new(0.0, 0.0),
            LatLon::new(0.0, 1.0),
            LatLon::new(1.0, 1.0),
        ]);
        root.geo_info.push(middle);
        root
    }

    #[test]
    fn test_nested_round_trip() {
        let geo = nested();
        assert_eq!(geo.depth(), 3);

        let mut element = Element::new("GeoInfo");
        geo.encode(&mut element).unwrap();
        let decoded = GeoInfo::decode(&XmlNode::root(&element)).unwrap();
        assert_eq!(decoded, geo);
        // Points of the leaf must not surface at the root
        assert!(decoded.points.is_empty());
    }

    #[test]
    fn test_short_line_rejected() {
        let mut geo = GeoInfo::new("bad");
        geo.lines.push(vec![LatLon::new(0.0, 0.0), LatLon::new(1.0, 1.0)]);
        geo.lines.push(vec![LatLon::new(0.0, 0.0)]);

        let mut element = Element::new("GeoInfo");
        let err = geo.encode(&mut element).unwrap_err();
        assert!(matches!(err, CphdError::InsufficientVertices { required: 2, found: 1, .. }));
        assert_eq!(err.path(), Some("Line[2]"));
    }
}
