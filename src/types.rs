use ndarray::Array2;
use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Complex-valued signal sample (I + jQ)
pub type SarComplex = Complex<f32>;

/// 2D complex signal array (vector x sample)
pub type SignalArray = Array2<SarComplex>;

/// Two-component vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Three-component vector, typically ECF meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Geodetic latitude/longitude in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Geodetic position with height above the ellipsoid (HAE, meters)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLonAlt {
    pub lat: f64,
    pub lon: f64,
    pub hae: f64,
}

impl LatLonAlt {
    pub fn new(lat: f64, lon: f64, hae: f64) -> Self {
        Self { lat, lon, hae }
    }
}

/// Image grid line/sample pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LineSample {
    pub line: f64,
    pub sample: f64,
}

impl LineSample {
    pub fn new(line: f64, sample: f64) -> Self {
        Self { line, sample }
    }
}

/// Fixed four-corner footprint, clockwise from upper left
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLonCorners {
    pub upper_left: LatLon,
    pub upper_right: LatLon,
    pub lower_right: LatLon,
    pub lower_left: LatLon,
}

impl LatLonCorners {
    /// Corners in serialization order (UL, UR, LR, LL)
    pub fn corners(&self) -> [LatLon; 4] {
        [self.upper_left, self.upper_right, self.lower_right, self.lower_left]
    }

    pub fn from_corners(corners: [LatLon; 4]) -> Self {
        let [upper_left, upper_right, lower_right, lower_left] = corners;
        Self { upper_left, upper_right, lower_right, lower_left }
    }
}

/// One-dimensional polynomial, `coefs[i]` multiplies `x^i`.
///
/// An empty coefficient list is the unset polynomial (order -1).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Poly1D {
    pub coefs: Vec<f64>,
}

impl Poly1D {
    pub fn new(coefs: Vec<f64>) -> Self {
        Self { coefs }
    }

    /// Polynomial order, -1 when unset
    pub fn order(&self) -> isize {
        self.coefs.len() as isize - 1
    }

    pub fn is_set(&self) -> bool {
        !self.coefs.is_empty()
    }

    /// Evaluate with Horner's rule
    pub fn eval(&self, x: f64) -> f64 {
        self.coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }
}

/// Two-dimensional polynomial, `coefs[i][j]` multiplies `x^i * y^j`.
///
/// Rows must all have the same length. No rows means unset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Poly2D {
    pub coefs: Vec<Vec<f64>>,
}

impl Poly2D {
    pub fn new(coefs: Vec<Vec<f64>>) -> Self {
        Self { coefs }
    }

    /// Order in x, -1 when unset
    pub fn order_x(&self) -> isize {
        self.coefs.len() as isize - 1
    }

    /// Order in y, -1 when unset
    pub fn order_y(&self) -> isize {
        self.coefs.first().map_or(-1, |row| row.len() as isize - 1)
    }

    pub fn is_set(&self) -> bool {
        self.coefs.first().map_or(false, |row| !row.is_empty())
    }

    pub fn eval(&self, x: f64, y: f64) -> f64 {
        self.coefs
            .iter()
            .rev()
            .fold(0.0, |acc, row| acc * x + row.iter().rev().fold(0.0, |a, c| a * y + c))
    }
}

/// Vector-valued polynomial with one `Poly1D` per ECF component
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolyXYZ {
    pub x: Poly1D,
    pub y: Poly1D,
    pub z: Poly1D,
}

impl PolyXYZ {
    pub fn eval(&self, t: f64) -> Vector3 {
        Vector3::new(self.x.eval(t), self.y.eval(t), self.z.eval(t))
    }
}

/// Free-form named parameter
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Error types for CPHD encoding and decoding
#[derive(Debug, thiserror::Error)]
pub enum CphdError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("XML parsing error: {0}")]
    XmlParsing(String),

    #[error("XML serialization error: {0}")]
    XmlSerialization(String),

    #[error("Missing required element: {path}")]
    MissingElement { path: String },

    #[error("Element occurs more than once: {path}")]
    DuplicateElement { path: String },

    #[error("Expected exactly one of [{options}] at {path}, found {found}")]
    AmbiguousOrMissingChoice { path: String, options: String, found: usize },

    #[error("{path} needs at least {required} vertices, found {found}")]
    InsufficientVertices { path: String, required: usize, found: usize },

    #[error("Invalid value at {path}: {reason}")]
    InvalidFieldValue { path: String, reason: String },

    #[error("Ordering violation at {path}: {reason}")]
    OrderingViolation { path: String, reason: String },

    #[error("Unknown header key: {0}")]
    UnknownHeaderKey(String),

    #[error("Incomplete header: {0}")]
    IncompleteHeader(String),

    #[error("Header offsets did not converge after {iterations} iterations")]
    OffsetResolution { iterations: usize },

    #[error("Schema validation failed: {0}")]
    SchemaValidation(String),

    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),
}

impl CphdError {
    pub fn invalid_value(path: impl Into<String>, reason: impl Into<String>) -> Self {
        CphdError::InvalidFieldValue { path: path.into(), reason: reason.into() }
    }

    /// Element path for errors raised against a specific element
    pub fn path(&self) -> Option<&str> {
        match self {
            CphdError::MissingElement { path }
            | CphdError::DuplicateElement { path }
            | CphdError::AmbiguousOrMissingChoice { path, .. }
            | CphdError::InsufficientVertices { path, .. }
            | CphdError::InvalidFieldValue { path, .. }
            | CphdError::OrderingViolation { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Prefix the element path with `parent`. Errors without a path pass through.
    pub fn within(self, parent: &str) -> Self {
        self.map_path(|path| {
            if path.is_empty() {
                parent.to_string()
            } else {
                format!("{}/{}", parent, path)
            }
        })
    }

    /// Rewrite the element path of path-carrying errors
    pub fn map_path(mut self, f: impl FnOnce(&str) -> String) -> Self {
        match &mut self {
            CphdError::MissingElement { path }
            | CphdError::DuplicateElement { path }
            | CphdError::AmbiguousOrMissingChoice { path, .. }
            | CphdError::InsufficientVertices { path, .. }
            | CphdError::InvalidFieldValue { path, .. }
            | CphdError::OrderingViolation { path, .. } => *path = f(path),
            _ => {}
        }
        self
    }
}

/// Result type for CPHD operations
pub type CphdResult<T> = Result<T, CphdError>;
