//! Reusable encode/decode patterns shared by every metadata section.
//!
//! Leaf text goes through [`XmlValue`], composite structures through
//! [`XmlCodec`]. Decoding walks the tree with an [`XmlNode`] cursor that
//! remembers its element path so that errors can name the offending field.

use crate::types::{
    CphdError, CphdResult, LatLon, LatLonAlt, LatLonCorners, LineSample, Parameter, Poly1D,
    Poly2D, PolyXYZ, Vector2, Vector3,
};
use crate::xml::element::Element;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Scalar that maps to and from element character data
pub trait XmlValue: Sized {
    /// Whether surrounding whitespace is stripped before parsing
    const TRIMMED: bool = true;

    fn to_xml_text(&self) -> String;
    fn from_xml_text(text: &str) -> Result<Self, String>;
}

/// Composite structure encoded as the content of one element
pub trait XmlCodec: Sized {
    /// Populate `element` (already created and named by the caller)
    fn encode(&self, element: &mut Element) -> CphdResult<()>;
    fn decode(node: &XmlNode<'_>) -> CphdResult<Self>;
}

impl XmlValue for String {
    const TRIMMED: bool = false;

    fn to_xml_text(&self) -> String {
        self.clone()
    }

    fn from_xml_text(text: &str) -> Result<Self, String> {
        Ok(text.to_string())
    }
}

impl XmlValue for f64 {
    fn to_xml_text(&self) -> String {
        if self.is_infinite() {
            return if *self > 0.0 { "INF".to_string() } else { "-INF".to_string() };
        }
        // Debug keeps the shortest representation that reads back exactly
        format!("{:?}", self)
    }

    fn from_xml_text(text: &str) -> Result<Self, String> {
        match text {
            "INF" => Ok(f64::INFINITY),
            "-INF" => Ok(f64::NEG_INFINITY),
            _ => text
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a floating point number", text)),
        }
    }
}

macro_rules! integer_value {
    ($($ty:ty),+) => {
        $(
            impl XmlValue for $ty {
                fn to_xml_text(&self) -> String {
                    self.to_string()
                }

                fn from_xml_text(text: &str) -> Result<Self, String> {
                    text.parse::<$ty>()
                        .map_err(|_| format!("'{}' is not a valid {}", text, stringify!($ty)))
                }
            }
        )+
    };
}

integer_value!(u64, i64, usize);

impl XmlValue for bool {
    fn to_xml_text(&self) -> String {
        self.to_string()
    }

    fn from_xml_text(text: &str) -> Result<Self, String> {
        match text {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(format!("'{}' is not a boolean", text)),
        }
    }
}

impl XmlValue for DateTime<Utc> {
    fn to_xml_text(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    fn from_xml_text(text: &str) -> Result<Self, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(|_| format!("'{}' is not an xs:dateTime", text))
    }
}

/// Read cursor over an element that tracks its path from the document root
#[derive(Debug, Clone)]
pub struct XmlNode<'a> {
    element: &'a Element,
    path: String,
}

impl<'a> XmlNode<'a> {
    /// Cursor at the document root; paths below it omit the root name
    pub fn root(element: &'a Element) -> Self {
        Self { element, path: String::new() }
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn child_path(&self, tag: &str) -> String {
        if self.path.is_empty() {
            tag.to_string()
        } else {
            format!("{}/{}", self.path, tag)
        }
    }

    fn at(&self, element: &'a Element, path: String) -> XmlNode<'a> {
        XmlNode { element, path }
    }

    /// Error naming this node
    pub fn invalid(&self, reason: impl Into<String>) -> CphdError {
        CphdError::invalid_value(self.path.clone(), reason)
    }

    /// Trimmed character data
    pub fn text(&self) -> &'a str {
        self.element.text().trim()
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.element.attribute(name)
    }

    /// Exactly one child `tag`
    pub fn required(&self, tag: &str) -> CphdResult<XmlNode<'a>> {
        self.optional(tag)?
            .ok_or_else(|| CphdError::MissingElement { path: self.child_path(tag) })
    }

    /// At most one child `tag`
    pub fn optional(&self, tag: &str) -> CphdResult<Option<XmlNode<'a>>> {
        let mut matches = self.element.children_named(tag);
        let first = matches.next();
        if matches.next().is_some() {
            return Err(CphdError::DuplicateElement { path: self.child_path(tag) });
        }
        Ok(first.map(|e| self.at(e, self.child_path(tag))))
    }

    /// Every child `tag` in document order, with 1-based positional paths
    pub fn all(&self, tag: &str) -> Vec<XmlNode<'a>> {
        self.element
            .children_named(tag)
            .enumerate()
            .map(|(i, e)| self.at(e, format!("{}[{}]", self.child_path(tag), i + 1)))
            .collect()
    }

    pub fn value<T: XmlValue>(&self) -> CphdResult<T> {
        let text = if T::TRIMMED { self.text() } else { self.element.text() };
        T::from_xml_text(text).map_err(|reason| self.invalid(reason))
    }

    pub fn required_value<T: XmlValue>(&self, tag: &str) -> CphdResult<T> {
        self.required(tag)?.value()
    }

    pub fn optional_value<T: XmlValue>(&self, tag: &str) -> CphdResult<Option<T>> {
        self.optional(tag)?.map(|n| n.value()).transpose()
    }

    pub fn decode<T: XmlCodec>(&self) -> CphdResult<T> {
        T::decode(self)
    }

    pub fn required_child<T: XmlCodec>(&self, tag: &str) -> CphdResult<T> {
        self.required(tag)?.decode()
    }

    pub fn optional_child<T: XmlCodec>(&self, tag: &str) -> CphdResult<Option<T>> {
        self.optional(tag)?.map(|n| n.decode()).transpose()
    }

    /// Indexed list: document order is authoritative, `index` attributes are advisory
    pub fn list<T: XmlCodec>(&self, tag: &str) -> CphdResult<Vec<T>> {
        self.all(tag).iter().map(|n| n.decode()).collect()
    }

    pub fn value_list<T: XmlValue>(&self, tag: &str) -> CphdResult<Vec<T>> {
        self.all(tag).iter().map(|n| n.value()).collect()
    }

    /// Compare a `Num*` count element with the number of list entries actually present
    pub fn check_count(&self, count_tag: &str, actual: usize) -> CphdResult<()> {
        if let Some(declared) = self.optional_value::<u64>(count_tag)? {
            if declared != actual as u64 {
                log::warn!(
                    "{} declares {} entries but {} are present; using the elements",
                    self.child_path(count_tag),
                    declared,
                    actual
                );
            }
        }
        Ok(())
    }

    fn check_size_attribute(&self, actual: usize) {
        if let Some(size) = self.attribute("size") {
            if size.trim().parse::<usize>().ok() != Some(actual) {
                log::warn!(
                    "{} has size=\"{}\" but {} children; using the children",
                    self.path,
                    size,
                    actual
                );
            }
        }
    }

    /// Exactly one of `tags` must be present
    pub fn choice(&self, tags: &[&'static str]) -> CphdResult<(&'static str, XmlNode<'a>)> {
        let mut present = Vec::new();
        for tag in tags {
            if let Some(node) = self.optional(tag)? {
                present.push((*tag, node));
            }
        }
        if present.len() != 1 {
            return Err(CphdError::AmbiguousOrMissingChoice {
                path: self.path.clone(),
                options: tags.join(", "),
                found: present.len(),
            });
        }
        Ok(present.remove(0))
    }

    /// Vertices `vertex_tag` of this polygon container, at least `min` of them
    pub fn vertices<T: XmlCodec>(&self, vertex_tag: &str, min: usize) -> CphdResult<Vec<T>> {
        let nodes = self.all(vertex_tag);
        self.check_size_attribute(nodes.len());
        if nodes.len() < min {
            return Err(CphdError::InsufficientVertices {
                path: self.path.clone(),
                required: min,
                found: nodes.len(),
            });
        }
        nodes.iter().map(|n| n.decode()).collect()
    }

    /// Optional polygon container `tag`; absent decodes to an empty list
    pub fn polygon<T: XmlCodec>(&self, tag: &str, vertex_tag: &str, min: usize) -> CphdResult<Vec<T>> {
        match self.optional(tag)? {
            Some(container) => container.vertices(vertex_tag, min),
            None => Ok(Vec::new()),
        }
    }

    /// `<tag name="..">value</tag>` entries
    pub fn parameters(&self, tag: &str) -> CphdResult<Vec<Parameter>> {
        self.all(tag)
            .iter()
            .map(|n| {
                let name = n
                    .attribute("name")
                    .ok_or_else(|| n.invalid("parameter has no name attribute"))?;
                Ok(Parameter::new(name, n.element().text()))
            })
            .collect()
    }

    /// Parameters nested inside an optional wrapper element
    pub fn wrapped_parameters(&self, wrapper: &str, tag: &str) -> CphdResult<Vec<Parameter>> {
        match self.optional(wrapper)? {
            Some(node) => node.parameters(tag),
            None => Ok(Vec::new()),
        }
    }
}

impl Element {
    pub fn add_value<T: XmlValue>(&mut self, tag: &str, value: &T) -> &mut Element {
        self.push_child(Element::with_text(tag, value.to_xml_text()))
    }

    pub fn add_optional_value<T: XmlValue>(&mut self, tag: &str, value: &Option<T>) {
        if let Some(v) = value {
            self.add_value(tag, v);
        }
    }

    pub fn add_values<T: XmlValue>(&mut self, tag: &str, values: &[T]) {
        for value in values {
            self.add_value(tag, value);
        }
    }

    /// Encode `value` into a new child `tag`; errors gain `tag` in their path
    pub fn add_child<T: XmlCodec>(&mut self, tag: &str, value: &T) -> CphdResult<&mut Element> {
        let mut child = Element::new(tag);
        value.encode(&mut child).map_err(|e| e.within(tag))?;
        Ok(self.push_child(child))
    }

    pub fn add_optional_child<T: XmlCodec>(&mut self, tag: &str, value: &Option<T>) -> CphdResult<()> {
        if let Some(v) = value {
            self.add_child(tag, v)?;
        }
        Ok(())
    }

    /// One sibling per item, without index attributes
    pub fn add_list<T: XmlCodec>(&mut self, tag: &str, items: &[T]) -> CphdResult<()> {
        for (i, item) in items.iter().enumerate() {
            let mut child = Element::new(tag);
            item.encode(&mut child)
                .map_err(|e| e.within(&format!("{}[{}]", tag, i + 1)))?;
            self.push_child(child);
        }
        Ok(())
    }

    /// One sibling per item with a 1-based `index` attribute
    pub fn add_indexed_list<T: XmlCodec>(&mut self, tag: &str, items: &[T]) -> CphdResult<()> {
        for (i, item) in items.iter().enumerate() {
            let mut child = Element::new(tag);
            child.set_attribute("index", (i + 1).to_string());
            item.encode(&mut child)
                .map_err(|e| e.within(&format!("{}[{}]", tag, i + 1)))?;
            self.push_child(child);
        }
        Ok(())
    }

    /// Polygon container `tag` with `size` and indexed `vertex_tag` children
    pub fn add_polygon<T: XmlCodec>(
        &mut self,
        tag: &str,
        vertex_tag: &str,
        vertices: &[T],
        min: usize,
    ) -> CphdResult<()> {
        if vertices.len() < min {
            return Err(CphdError::InsufficientVertices {
                path: tag.to_string(),
                required: min,
                found: vertices.len(),
            });
        }
        let mut container = Element::new(tag);
        container.set_attribute("size", vertices.len().to_string());
        container
            .add_indexed_list(vertex_tag, vertices)
            .map_err(|e| e.within(tag))?;
        self.push_child(container);
        Ok(())
    }

    /// Polygon that is omitted entirely when it has no vertices
    pub fn add_optional_polygon<T: XmlCodec>(
        &mut self,
        tag: &str,
        vertex_tag: &str,
        vertices: &[T],
        min: usize,
    ) -> CphdResult<()> {
        if vertices.is_empty() {
            return Ok(());
        }
        self.add_polygon(tag, vertex_tag, vertices, min)
    }

    pub fn add_parameters(&mut self, tag: &str, parameters: &[Parameter]) {
        for parameter in parameters {
            self.add_value(tag, &parameter.value)
                .set_attribute("name", parameter.name.clone());
        }
    }

    /// Parameters inside a wrapper element that is omitted when empty
    pub fn add_wrapped_parameters(&mut self, wrapper: &str, tag: &str, parameters: &[Parameter]) {
        if !parameters.is_empty() {
            self.new_child(wrapper).add_parameters(tag, parameters);
        }
    }
}

impl XmlCodec for Vector2 {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("X", &self.x);
        element.add_value("Y", &self.y);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Vector2::new(node.required_value("X")?, node.required_value("Y")?))
    }
}

impl XmlCodec for Vector3 {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("X", &self.x);
        element.add_value("Y", &self.y);
        element.add_value("Z", &self.z);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Vector3::new(
            node.required_value("X")?,
            node.required_value("Y")?,
            node.required_value("Z")?,
        ))
    }
}

impl XmlCodec for LatLon {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Lat", &self.lat);
        element.add_value("Lon", &self.lon);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(LatLon::new(node.required_value("Lat")?, node.required_value("Lon")?))
    }
}

impl XmlCodec for LatLonAlt {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Lat", &self.lat);
        element.add_value("Lon", &self.lon);
        element.add_value("HAE", &self.hae);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(LatLonAlt::new(
            node.required_value("Lat")?,
            node.required_value("Lon")?,
            node.required_value("HAE")?,
        ))
    }
}

impl XmlCodec for LineSample {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Line", &self.line);
        element.add_value("Sample", &self.sample);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(LineSample::new(node.required_value("Line")?, node.required_value("Sample")?))
    }
}

/// Corner tag of the fixed four-point footprint
pub const CORNER_TAG: &str = "IACP";

impl XmlCodec for LatLonCorners {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_indexed_list(CORNER_TAG, &self.corners())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let corners: Vec<LatLon> = node.vertices(CORNER_TAG, 4)?;
        let corners: [LatLon; 4] = corners.try_into().map_err(|v: Vec<LatLon>| {
            node.invalid(format!("footprint has {} corners, expected exactly 4", v.len()))
        })?;
        Ok(LatLonCorners::from_corners(corners))
    }
}

/// Highest polynomial exponent accepted on decode
pub const MAX_POLY_EXPONENT: usize = 64;

fn exponent(node: &XmlNode<'_>, name: &str) -> CphdResult<usize> {
    let text = node
        .attribute(name)
        .ok_or_else(|| node.invalid(format!("coefficient has no {} attribute", name)))?;
    let exponent = text
        .trim()
        .parse::<usize>()
        .map_err(|_| node.invalid(format!("{}=\"{}\" is not a non-negative integer", name, text)))?;
    if exponent > MAX_POLY_EXPONENT {
        return Err(node.invalid(format!(
            "{}={} exceeds the maximum exponent {}",
            name, exponent, MAX_POLY_EXPONENT
        )));
    }
    Ok(exponent)
}

impl XmlCodec for Poly1D {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        if !self.is_set() {
            return Err(CphdError::invalid_value("", "polynomial is unset (order -1)"));
        }
        element.set_attribute("order1", self.order().to_string());
        for (i, coef) in self.coefs.iter().enumerate() {
            element.add_value("Coef", coef).set_attribute("exponent1", i.to_string());
        }
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let mut terms = Vec::new();
        for coef in node.all("Coef") {
            terms.push((exponent(&coef, "exponent1")?, coef.value::<f64>()?));
        }
        let order = terms
            .iter()
            .map(|(e, _)| *e)
            .max()
            .ok_or_else(|| node.invalid("polynomial has no coefficients"))?;

        let mut coefs: Vec<Option<f64>> = vec![None; order + 1];
        for (e, value) in terms {
            if coefs[e].replace(value).is_some() {
                return Err(node.invalid(format!("exponent {} appears more than once", e)));
            }
        }
        Ok(Poly1D::new(coefs.into_iter().map(|c| c.unwrap_or(0.0)).collect()))
    }
}

impl XmlCodec for Poly2D {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        if !self.is_set() {
            return Err(CphdError::invalid_value("", "polynomial is unset (order -1)"));
        }
        let cols = self.coefs[0].len();
        if self.coefs.iter().any(|row| row.len() != cols) {
            return Err(CphdError::invalid_value("", "coefficient rows differ in length"));
        }
        element.set_attribute("order1", self.order_x().to_string());
        element.set_attribute("order2", self.order_y().to_string());
        for (i, row) in self.coefs.iter().enumerate() {
            for (j, coef) in row.iter().enumerate() {
                let child = element.add_value("Coef", coef);
                child.set_attribute("exponent1", i.to_string());
                child.set_attribute("exponent2", j.to_string());
            }
        }
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let mut terms = Vec::new();
        for coef in node.all("Coef") {
            terms.push((
                exponent(&coef, "exponent1")?,
                exponent(&coef, "exponent2")?,
                coef.value::<f64>()?,
            ));
        }
        if terms.is_empty() {
            return Err(node.invalid("polynomial has no coefficients"));
        }
        let order_x = terms.iter().map(|t| t.0).max().unwrap_or(0);
        let order_y = terms.iter().map(|t| t.1).max().unwrap_or(0);

        let mut coefs: Vec<Vec<Option<f64>>> = vec![vec![None; order_y + 1]; order_x + 1];
        for (i, j, value) in terms {
            if coefs[i][j].replace(value).is_some() {
                return Err(node.invalid(format!("exponent ({}, {}) appears more than once", i, j)));
            }
        }
        Ok(Poly2D::new(
            coefs
                .into_iter()
                .map(|row| row.into_iter().map(|c| c.unwrap_or(0.0)).collect())
                .collect(),
        ))
    }
}

impl XmlCodec for PolyXYZ {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_child("X", &self.x)?;
        element.add_child("Y", &self.y)?;
        element.add_child("Z", &self.z)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(PolyXYZ {
            x: node.required_child("X")?,
            y: node.required_child("Y")?,
            z: node.required_child("Z")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: XmlCodec>(value: &T) -> T {
        let mut root = Element::new("Root");
        root.add_child("Value", value).unwrap();
        let text = root.to_xml_string().unwrap();
        let parsed = Element::parse_str(&text).unwrap();
        XmlNode::root(&parsed).required_child("Value").unwrap()
    }

    #[test]
    fn test_scalar_text_conversions() {
        assert_eq!(f64::from_xml_text("1e-7").unwrap(), 1e-7);
        assert_eq!(f64::from_xml_text("INF").unwrap(), f64::INFINITY);
        assert_eq!(0.1f64.to_xml_text(), "0.1");
        assert_eq!(3.0f64.to_xml_text(), "3.0");
        assert!(bool::from_xml_text("1").unwrap());
        assert!(bool::from_xml_text("yes").is_err());
        assert!(u64::from_xml_text("-3").is_err());

        let dt = DateTime::<Utc>::from_xml_text("2020-01-03T17:08:15.123456Z").unwrap();
        assert_eq!(dt.to_xml_text(), "2020-01-03T17:08:15.123456Z");
        let naive = DateTime::<Utc>::from_xml_text("2020-01-03T17:08:15").unwrap();
        assert_eq!(naive.to_xml_text(), "2020-01-03T17:08:15Z");
        let fine = DateTime::<Utc>::from_xml_text("2023-11-14T22:13:20.123456789Z").unwrap();
        assert_eq!(fine.to_xml_text(), "2023-11-14T22:13:20.123456789Z");
        assert_eq!(DateTime::<Utc>::from_xml_text(&fine.to_xml_text()).unwrap(), fine);
    }

    #[test]
    fn test_polynomials() {
        let p1 = Poly1D::new(vec![1.5, 0.0, -2.25]);
        assert_eq!(round_trip(&p1), p1);

        let p2 = Poly2D::new(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 0.0]]);
        assert_eq!(round_trip(&p2), p2);

        let xyz = PolyXYZ {
            x: Poly1D::new(vec![1.0]),
            y: Poly1D::new(vec![0.0, 1.0]),
            z: Poly1D::new(vec![0.0, 0.0, 1.0]),
        };
        assert_eq!(round_trip(&xyz), xyz);
    }

    #[test]
    fn test_unset_polynomial_is_never_written() {
        let mut root = Element::new("Root");
        let err = root.add_child("GainBSPoly", &Poly1D::default()).unwrap_err();
        assert!(matches!(err, CphdError::InvalidFieldValue { ref path, .. } if path == "GainBSPoly"));
        assert!(root.children().is_empty());
    }

    #[test]
    fn test_sparse_polynomial_fills_zeros() {
        let doc = Element::parse_str(
            r#"<P order1="1"><Coef exponent1="3">2.0</Coef><Coef exponent1="0">1.0</Coef></P>"#,
        )
        .unwrap();
        let poly: Poly1D = XmlNode::root(&doc).decode().unwrap();
        assert_eq!(poly.coefs, vec![1.0, 0.0, 0.0, 2.0]);

        let dup = Element::parse_str(
            r#"<P><Coef exponent1="0">1.0</Coef><Coef exponent1="0">2.0</Coef></P>"#,
        )
        .unwrap();
        assert!(XmlNode::root(&dup).decode::<Poly1D>().is_err());
    }

    #[test]
    fn test_huge_exponents_are_rejected() {
        for exponent in ["18446744073709551615", "4000000000", "65"] {
            let doc = Element::parse_str(&format!(
                r#"<P><Coef exponent1="{}">1.0</Coef></P>"#,
                exponent
            ))
            .unwrap();
            let err = XmlNode::root(&doc).decode::<Poly1D>().unwrap_err();
            assert!(matches!(err, CphdError::InvalidFieldValue { .. }));

            let doc = Element::parse_str(&format!(
                r#"<P><Coef exponent1="0" exponent2="{}">1.0</Coef></P>"#,
                exponent
            ))
            .unwrap();
            assert!(XmlNode::root(&doc).decode::<Poly2D>().is_err());
        }

        let doc = Element::parse_str(r#"<P><Coef exponent1="64">1.0</Coef></P>"#).unwrap();
        let poly: Poly1D = XmlNode::root(&doc).decode().unwrap();
        assert_eq!(poly.coefs.len(), 65);
    }

    #[test]
    fn test_choice_and_paths() {
        let doc = Element::parse_str("<R><A><X>1</X></A><B/></R>").unwrap();
        let root = XmlNode::root(&doc);
        let err = root.choice(&["A", "B"]).unwrap_err();
        assert!(matches!(err, CphdError::AmbiguousOrMissingChoice { found: 2, .. }));
        let err = root.choice(&["C", "D"]).unwrap_err();
        assert!(matches!(err, CphdError::AmbiguousOrMissingChoice { found: 0, .. }));

        let (tag, node) = root.choice(&["A", "C"]).unwrap();
        assert_eq!(tag, "A");
        let err = node.required_value::<f64>("Y").unwrap_err();
        assert_eq!(err.path(), Some("A/Y"));
    }

    #[test]
    fn test_polygon_minimum_and_forged_size() {
        let doc = Element::parse_str(
            r#"<R><Polygon size="99">
                 <Vertex index="7"><X>0</X><Y>0</Y></Vertex>
                 <Vertex index="1"><X>1</X><Y>0</Y></Vertex>
                 <Vertex index="3"><X>1</X><Y>1</Y></Vertex>
               </Polygon></R>"#,
        )
        .unwrap();
        let root = XmlNode::root(&doc);
        let vertices: Vec<Vector2> = root.polygon("Polygon", "Vertex", 3).unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[0], Vector2::new(0.0, 0.0));
        assert_eq!(vertices[2], Vector2::new(1.0, 1.0));

        let err = root.polygon::<Vector2>("Polygon", "Vertex", 4).unwrap_err();
        assert!(matches!(err, CphdError::InsufficientVertices { required: 4, found: 3, .. }));

        let mut out = Element::new("R");
        let err = out
            .add_polygon("Polygon", "Vertex", &vertices[..2], 3)
            .unwrap_err();
        assert!(matches!(err, CphdError::InsufficientVertices { found: 2, .. }));
    }

    #[test]
    fn test_footprint_has_four_corners() {
        let corners = LatLonCorners::from_corners([
            LatLon::new(1.0, 1.0),
            LatLon::new(1.0, 2.0),
            LatLon::new(0.0, 2.0),
            LatLon::new(0.0, 1.0),
        ]);
        let mut root = Element::new("R");
        root.add_child("ImageAreaCornerPoints", &corners).unwrap();
        let footprint = root.first_and_only("ImageAreaCornerPoints").unwrap();
        let indices: Vec<_> = footprint
            .children_named(CORNER_TAG)
            .filter_map(|c| c.attribute("index"))
            .collect();
        assert_eq!(indices, vec!["1", "2", "3", "4"]);
        assert_eq!(round_trip(&corners), corners);

        let three = Element::parse_str(
            "<F><IACP><Lat>0</Lat><Lon>0</Lon></IACP><IACP><Lat>0</Lat><Lon>1</Lon></IACP>\
             <IACP><Lat>1</Lat><Lon>1</Lon></IACP></F>",
        )
        .unwrap();
        let err = XmlNode::root(&three).decode::<LatLonCorners>().unwrap_err();
        assert!(matches!(err, CphdError::InsufficientVertices { required: 4, found: 3, .. }));
    }

    #[test]
    fn test_parameters() {
        let params = vec![Parameter::new("a", "1"), Parameter::new("b", "two")];
        let mut root = Element::new("R");
        root.add_parameters("Parameter", &params);
        assert_eq!(XmlNode::root(&root).parameters("Parameter").unwrap(), params);

        let nameless = Element::parse_str("<R><Parameter>x</Parameter></R>").unwrap();
        assert!(XmlNode::root(&nameless).parameters("Parameter").is_err());
    }
}
