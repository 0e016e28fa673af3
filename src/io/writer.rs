//! CPHD file writer

use crate::io::default_num_threads;
use crate::io::file_header::{FileHeader, LINE_TERMINATOR, SECTION_TERMINATOR};
use crate::io::pvp_block::PvpBlock;
use crate::io::signal_block;
use crate::metadata::Metadata;
use crate::types::{CphdError, CphdResult, SignalArray};
use crate::xml::{CphdXmlControl, SchemaValidator};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// Writer settings
#[derive(Clone)]
pub struct CphdWriterConfig {
    pub num_threads: usize,
    pub validator: Option<Arc<dyn SchemaValidator>>,
}

impl Default for CphdWriterConfig {
    fn default() -> Self {
        Self { num_threads: default_num_threads(), validator: None }
    }
}

impl std::fmt::Debug for CphdWriterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CphdWriterConfig")
            .field("num_threads", &self.num_threads)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl CphdWriterConfig {
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads.max(1);
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = Some(validator);
        self
    }
}

/// Binary blocks that follow the XML, already laid out per the Data section
#[derive(Debug, Clone, Copy)]
pub struct BlockPayloads<'a> {
    pub support: Option<&'a [u8]>,
    pub pvp: &'a [u8],
    pub signal: &'a [u8],
}

pub struct CphdWriter<W: Write> {
    stream: W,
    config: CphdWriterConfig,
}

impl CphdWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P, config: CphdWriterConfig) -> CphdResult<Self> {
        let path = path.as_ref();
        log::info!("Creating CPHD file: {}", path.display());
        Ok(Self::new(BufWriter::new(File::create(path)?), config))
    }
}

impl<W: Write> CphdWriter<W> {
    pub fn new(stream: W, config: CphdWriterConfig) -> Self {
        Self { stream, config }
    }

    pub fn config(&self) -> &CphdWriterConfig {
        &self.config
    }

    /// Write a complete file and return the header that was written
    pub fn write(&mut self, metadata: &Metadata, payloads: &BlockPayloads<'_>) -> CphdResult<FileHeader> {
        let control = CphdXmlControl::with_validator(self.config.validator.clone());
        let xml = control.to_xml_string(metadata)?;
        let support = payloads.support.unwrap_or_default();

        check_payloads(metadata, support, payloads)?;

        let collection = &metadata.collection_id;
        let mut header = FileHeader::new(collection.classification.clone(), collection.release_info.clone());
        header.set(xml.len() as u64, support.len() as u64, payloads.pvp.len() as u64, payloads.signal.len() as u64)?;
        header.validate()?;

        let terminator = [SECTION_TERMINATOR as u8, LINE_TERMINATOR as u8];
        header.write(&mut self.stream)?;
        self.stream.write_all(xml.as_bytes())?;
        self.stream.write_all(&terminator)?;
        self.stream.write_all(support)?;
        self.stream.write_all(payloads.pvp)?;
        self.stream.write_all(payloads.signal)?;
        self.stream.flush()?;

        log::info!(
            "Wrote CPHD file: XML {} bytes, support {} bytes, PVP {} bytes, signal {} bytes",
            xml.len(),
            support.len(),
            payloads.pvp.len(),
            payloads.signal.len()
        );
        Ok(header)
    }

    /// Encode PVP and signal arrays per the Data section, then write the file.
    /// Signal channels are encoded on `num_threads` workers.
    pub fn write_arrays(
        &mut self,
        metadata: &Metadata,
        support: Option<&[u8]>,
        pvp: &PvpBlock,
        signals: &[SignalArray],
    ) -> CphdResult<FileHeader> {
        let pvp_bytes = pvp.to_bytes(&metadata.data)?;
        let signal_bytes = signal_block::encode_block(&metadata.data, signals, self.config.num_threads)?;
        self.write(metadata, &BlockPayloads { support, pvp: &pvp_bytes, signal: &signal_bytes })
    }

    pub fn into_inner(self) -> W {
        self.stream
    }
}

fn check_payloads(metadata: &Metadata, support: &[u8], payloads: &BlockPayloads<'_>) -> CphdResult<()> {
    if payloads.pvp.is_empty() {
        return Err(CphdError::IncompleteHeader("PVP block is empty".to_string()));
    }
    if payloads.signal.is_empty() {
        return Err(CphdError::IncompleteHeader("signal block is empty".to_string()));
    }

    let data = &metadata.data;
    let expected = [
        ("Data/SupportArray", data.support_block_size()?, support.len()),
        ("Data/NumBytesPVP", data.pvp_block_size()?, payloads.pvp.len()),
        ("Data/Channel", data.signal_block_size()?, payloads.signal.len()),
    ];
    for (path, needed, given) in expected {
        if needed != given as u64 {
            return Err(CphdError::invalid_value(
                path,
                format!("layout needs a {}-byte block but {} bytes were given", needed, given),
            ));
        }
    }
    Ok(())
}
