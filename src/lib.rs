//! cphd: reader and writer for Compensated Phase History Data files
//!
//! A CPHD file is a plain-text header followed by an XML metadata block and
//! binary support, per-vector parameter (PVP) and signal blocks. This crate
//! models the metadata as typed Rust structures, encodes and decodes the XML
//! with path-aware error reporting, and reads and writes the binary container.

pub mod enums;
pub mod io;
pub mod metadata;
pub mod types;
pub mod xml;

#[cfg(feature = "python")]
mod python;

// Re-export main types and functions for easier access
pub use types::{
    CphdError, CphdResult, LatLon, LatLonAlt, Parameter, Poly1D, Poly2D, PolyXYZ, SarComplex,
    SignalArray, Vector2, Vector3,
};

pub use io::{
    BlockPayloads, CphdReader, CphdReaderConfig, CphdWriter, CphdWriterConfig, FileHeader, PvpBlock,
    SignalBlock, SupportBlock,
};
pub use metadata::Metadata;
pub use xml::{CphdXmlControl, SchemaValidator};
