//! CPHD file reader
//!
//! The header and XML metadata are read when the reader is opened; the binary
//! blocks are read on demand.

use crate::io::default_num_threads;
use crate::io::file_header::FileHeader;
use crate::io::pvp_block::PvpBlock;
use crate::io::read_range;
use crate::io::signal_block::SignalBlock;
use crate::io::support_block::{SupportArrayData, SupportBlock};
use crate::metadata::Metadata;
use crate::types::{CphdError, CphdResult, SignalArray};
use crate::xml::{CphdXmlControl, SchemaValidator};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::sync::Arc;

/// Reader settings
#[derive(Clone)]
pub struct CphdReaderConfig {
    /// Workers used to split blocks into channels and arrays
    pub num_threads: usize,
    pub validator: Option<Arc<dyn SchemaValidator>>,
}

impl Default for CphdReaderConfig {
    fn default() -> Self {
        Self { num_threads: default_num_threads(), validator: None }
    }
}

impl std::fmt::Debug for CphdReaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CphdReaderConfig")
            .field("num_threads", &self.num_threads)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl CphdReaderConfig {
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads.max(1);
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = Some(validator);
        self
    }
}

pub struct CphdReader<R: Read + Seek> {
    stream: R,
    config: CphdReaderConfig,
    header: FileHeader,
    xml: String,
    metadata: Metadata,
    pvp: Option<PvpBlock>,
}

impl<R: Read + Seek> std::fmt::Debug for CphdReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CphdReader")
            .field("config", &self.config)
            .field("xml_len", &self.xml.len())
            .field("pvp_loaded", &self.pvp.is_some())
            .finish_non_exhaustive()
    }
}

impl CphdReader<BufReader<File>> {
    pub fn from_file<P: AsRef<Path>>(path: P, config: CphdReaderConfig) -> CphdResult<Self> {
        let path = path.as_ref();
        log::info!("Opening CPHD file: {}", path.display());
        let file = File::open(path)?;
        Self::new(BufReader::new(file), config)
    }
}

impl<R: Read + Seek> CphdReader<R> {
    /// Read the header and metadata from `stream`
    pub fn new(mut stream: R, config: CphdReaderConfig) -> CphdResult<Self> {
        let header = FileHeader::read(&mut stream)?;
        let bytes = read_range(&mut stream, header.xml_block_byte_offset(), header.xml_block_size())?;
        let xml = String::from_utf8(bytes)
            .map_err(|e| CphdError::XmlParsing(format!("XML block is not UTF-8: {}", e)))?;

        let control = CphdXmlControl::with_validator(config.validator.clone());
        let metadata = control.from_xml_str(&xml)?;

        let expected_support = metadata.data.support_block_size()?;
        if expected_support > 0 && !header.has_support_block() {
            return Err(CphdError::IncompleteHeader(format!(
                "metadata declares {} bytes of support arrays but the header has no support block",
                expected_support
            )));
        }

        log::info!(
            "Read CPHD {} metadata: {} channel(s), {} support array(s), {}",
            header.version(),
            metadata.data.channels.len(),
            metadata.data.support_arrays.len(),
            metadata.data.signal_array_format
        );
        Ok(Self { stream, config, header, xml, metadata, pvp: None })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// XML block as stored
    pub fn xml(&self) -> &str {
        &self.xml
    }

    pub fn num_channels(&self) -> usize {
        self.metadata.data.channels.len()
    }

    /// PVP arrays of every channel, loaded on first use
    pub fn pvp_block(&mut self) -> CphdResult<&PvpBlock> {
        let block = match self.pvp.take() {
            Some(block) => block,
            None => PvpBlock::load(&mut self.stream, &self.header, &self.metadata.data, self.config.num_threads)?,
        };
        Ok(self.pvp.insert(block))
    }

    fn support_block(&self) -> CphdResult<SupportBlock> {
        if !self.header.has_support_block() {
            return Err(CphdError::InvalidFormat("file has no support block".to_string()));
        }
        SupportBlock::new(&self.header, &self.metadata.data)
    }

    pub fn read_support_array(&mut self, identifier: &str) -> CphdResult<SupportArrayData> {
        let block = self.support_block()?;
        block.read(&mut self.stream, identifier)
    }

    /// Every support array keyed by identifier; empty when the file has none
    pub fn read_support_arrays(&mut self) -> CphdResult<BTreeMap<String, SupportArrayData>> {
        if !self.header.has_support_block() {
            return Ok(BTreeMap::new());
        }
        let block = self.support_block()?;
        block.read_all(&mut self.stream, self.config.num_threads)
    }

    /// Stored bytes of one channel's signal array
    pub fn read_signal_bytes(&mut self, channel: usize) -> CphdResult<Vec<u8>> {
        let block = SignalBlock::new(&self.header, &self.metadata.data)?;
        block.read_channel_bytes(&mut self.stream, channel)
    }

    /// Decoded signal array of one uncompressed channel
    pub fn read_signal(&mut self, channel: usize) -> CphdResult<SignalArray> {
        let block = SignalBlock::new(&self.header, &self.metadata.data)?;
        block.read_channel(&mut self.stream, channel)
    }

    /// Give the stream back
    pub fn into_inner(self) -> R {
        self.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_not_a_cphd_file() {
        let err = CphdReader::new(Cursor::new(b"SICD/1.0\n\x0c\n".to_vec()), CphdReaderConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, CphdError::InvalidFormat(_)));
    }

    #[test]
    fn test_truncated_xml_block() {
        let mut header = FileHeader::new("UNCLASSIFIED", "UNRESTRICTED");
        header.set(1000, 0, 216, 8).unwrap();
        let mut bytes = header.to_string().into_bytes();
        bytes.extend_from_slice(b"<CPHD/>");
        let err = CphdReader::new(Cursor::new(bytes), CphdReaderConfig::default()).err().unwrap();
        assert!(matches!(err, CphdError::InvalidFormat(_)));
    }

    #[test]
    fn test_config_builders() {
        let config = CphdReaderConfig::default().with_num_threads(0);
        assert_eq!(config.num_threads, 1);
        assert!(config.validator.is_none());
    }
}
