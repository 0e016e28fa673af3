//! Plain-text key/value header at the start of every CPHD file.

use crate::types::{CphdError, CphdResult};
use regex::Regex;
use std::fmt;
use std::io::{Read, Seek, SeekFrom, Write};

/// File type tag of the first header line
pub const FILE_TYPE: &str = "CPHD";
/// Version written by default and the only one read
pub const DEFAULT_VERSION: &str = "1.0";
pub const KVP_DELIMITER: &str = " := ";
pub const LINE_TERMINATOR: char = '\n';
pub const SECTION_TERMINATOR: char = '\x0c';
/// Section terminator plus line terminator
pub const SECTION_TERMINATOR_LEN: u64 = 2;

const HEADER_CHUNK: usize = 1024;
const MAX_HEADER_BYTES: usize = 64 * 1024;
/// Bound on the offset resolution loop
pub const MAX_OFFSET_ITERATIONS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    version: String,
    xml_block_size: u64,
    xml_block_byte_offset: u64,
    support_block_size: u64,
    support_block_byte_offset: u64,
    pvp_block_size: u64,
    pvp_block_byte_offset: u64,
    signal_block_size: u64,
    signal_block_byte_offset: u64,
    classification: String,
    release_info: String,
}

impl Default for FileHeader {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            xml_block_size: 0,
            xml_block_byte_offset: 0,
            support_block_size: 0,
            support_block_byte_offset: 0,
            pvp_block_size: 0,
            pvp_block_byte_offset: 0,
            signal_block_size: 0,
            signal_block_byte_offset: 0,
            classification: String::new(),
            release_info: String::new(),
        }
    }
}

impl FileHeader {
    pub fn new(classification: impl Into<String>, release_info: impl Into<String>) -> Self {
        Self {
            classification: classification.into(),
            release_info: release_info.into(),
            ..Default::default()
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }
    pub fn xml_block_size(&self) -> u64 {
        self.xml_block_size
    }
    pub fn xml_block_byte_offset(&self) -> u64 {
        self.xml_block_byte_offset
    }
    pub fn support_block_size(&self) -> u64 {
        self.support_block_size
    }
    pub fn support_block_byte_offset(&self) -> u64 {
        self.support_block_byte_offset
    }
    pub fn pvp_block_size(&self) -> u64 {
        self.pvp_block_size
    }
    pub fn pvp_block_byte_offset(&self) -> u64 {
        self.pvp_block_byte_offset
    }
    pub fn signal_block_size(&self) -> u64 {
        self.signal_block_size
    }
    pub fn signal_block_byte_offset(&self) -> u64 {
        self.signal_block_byte_offset
    }
    pub fn classification(&self) -> &str {
        &self.classification
    }
    pub fn release_info(&self) -> &str {
        &self.release_info
    }

    pub fn has_support_block(&self) -> bool {
        self.support_block_size > 0
    }

    pub fn set_classification(&mut self, classification: impl Into<String>) {
        self.classification = classification.into();
    }

    pub fn set_release_info(&mut self, release_info: impl Into<String>) {
        self.release_info = release_info.into();
    }

    /// Check whether `stream` starts with the CPHD file type; the position is restored
    pub fn is_cphd<R: Read + Seek>(stream: &mut R) -> CphdResult<bool> {
        let start = stream.stream_position()?;
        let mut magic = [0u8; 4];
        let matched = match stream.read_exact(&mut magic) {
            Ok(()) => magic == *FILE_TYPE.as_bytes(),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => false,
            Err(e) => return Err(e.into()),
        };
        stream.seek(SeekFrom::Start(start))?;
        Ok(matched)
    }

    /// Parse the header at the start of `stream`
    pub fn read<R: Read + Seek>(stream: &mut R) -> CphdResult<Self> {
        stream.seek(SeekFrom::Start(0))?;
        let text = Self::block_read(stream)?;

        let mut lines = text.split(LINE_TERMINATOR);
        let first = lines.next().unwrap_or_default();
        let version_line = Regex::new(r"^CPHD/(\d+\.\d+(?:\.\d+)?)$")
            .map_err(|e| CphdError::Processing(format!("Regex error: {}", e)))?;
        let version = version_line
            .captures(first.trim_end_matches('\r'))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                CphdError::InvalidFormat(format!("not a CPHD file, first line is '{}'", first))
            })?;
        if version != DEFAULT_VERSION {
            return Err(CphdError::UnsupportedVersion(format!("CPHD/{}", version)));
        }

        let mut header = FileHeader { version, ..Default::default() };
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) = line
                .split_once(":=")
                .ok_or_else(|| CphdError::InvalidFormat(format!("malformed header line '{}'", line)))?;
            header.assign(key.trim(), value.trim())?;
        }

        header.validate()?;
        log::debug!("Read CPHD header: {:?}", header);
        Ok(header)
    }

    /// Header text up to, not including, the section terminator
    fn block_read<R: Read>(stream: &mut R) -> CphdResult<String> {
        let terminator = [SECTION_TERMINATOR as u8, LINE_TERMINATOR as u8];
        let mut bytes = Vec::with_capacity(HEADER_CHUNK);
        let mut chunk = [0u8; HEADER_CHUNK];
        let mut searched = 0;

        loop {
            if let Some(pos) = bytes[searched..]
                .windows(terminator.len())
                .position(|w| w == terminator)
            {
                bytes.truncate(searched + pos);
                break;
            }
            searched = bytes.len().saturating_sub(terminator.len() - 1);
            if bytes.len() >= MAX_HEADER_BYTES {
                return Err(CphdError::InvalidFormat(format!(
                    "no header section terminator in the first {} bytes",
                    MAX_HEADER_BYTES
                )));
            }
            let n = stream.read(&mut chunk)?;
            if n == 0 {
                return Err(CphdError::InvalidFormat(
                    "file ended before the header section terminator".to_string(),
                ));
            }
            bytes.extend_from_slice(&chunk[..n]);
        }

        String::from_utf8(bytes)
            .map_err(|e| CphdError::InvalidFormat(format!("header is not text: {}", e)))
    }

    fn assign(&mut self, key: &str, value: &str) -> CphdResult<()> {
        let number = || {
            value.parse::<u64>().map_err(|_| {
                CphdError::InvalidFormat(format!("{} has non-numeric value '{}'", key, value))
            })
        };
        match key {
            "XML_BLOCK_SIZE" => self.xml_block_size = number()?,
            "XML_BLOCK_BYTE_OFFSET" => self.xml_block_byte_offset = number()?,
            "SUPPORT_BLOCK_SIZE" => self.support_block_size = number()?,
            "SUPPORT_BLOCK_BYTE_OFFSET" => self.support_block_byte_offset = number()?,
            "PVP_BLOCK_SIZE" => self.pvp_block_size = number()?,
            "PVP_BLOCK_BYTE_OFFSET" => self.pvp_block_byte_offset = number()?,
            "SIGNAL_BLOCK_SIZE" => self.signal_block_size = number()?,
            "SIGNAL_BLOCK_BYTE_OFFSET" => self.signal_block_byte_offset = number()?,
            "CLASSIFICATION" => self.classification = value.to_string(),
            "RELEASE_INFO" => self.release_info = value.to_string(),
            _ => return Err(CphdError::UnknownHeaderKey(key.to_string())),
        }
        Ok(())
    }

    /// Every required field must be set
    pub fn validate(&self) -> CphdResult<()> {
        let mut missing = Vec::new();
        for (name, value) in [
            ("XML_BLOCK_SIZE", self.xml_block_size),
            ("XML_BLOCK_BYTE_OFFSET", self.xml_block_byte_offset),
            ("PVP_BLOCK_SIZE", self.pvp_block_size),
            ("PVP_BLOCK_BYTE_OFFSET", self.pvp_block_byte_offset),
            ("SIGNAL_BLOCK_SIZE", self.signal_block_size),
            ("SIGNAL_BLOCK_BYTE_OFFSET", self.signal_block_byte_offset),
        ] {
            if value == 0 {
                missing.push(name);
            }
        }
        if self.has_support_block() && self.support_block_byte_offset == 0 {
            missing.push("SUPPORT_BLOCK_BYTE_OFFSET");
        }
        if self.classification.is_empty() {
            missing.push("CLASSIFICATION");
        }
        if self.release_info.is_empty() {
            missing.push("RELEASE_INFO");
        }
        if !missing.is_empty() {
            return Err(CphdError::IncompleteHeader(format!("missing {}", missing.join(", "))));
        }
        Ok(())
    }

    /// Set block sizes and resolve every offset; returns the header size
    pub fn set(&mut self, xml_size: u64, support_size: u64, pvp_size: u64, signal_size: u64) -> CphdResult<u64> {
        self.xml_block_size = xml_size;
        self.support_block_size = support_size;
        self.pvp_block_size = pvp_size;
        self.signal_block_size = signal_size;
        self.resolve_offsets()
    }

    pub fn resolve_offsets(&mut self) -> CphdResult<u64> {
        self.resolve_offsets_bounded(MAX_OFFSET_ITERATIONS)
    }

    /// Offsets depend on the header size, which depends on the digits of the
    /// offsets. Iterate until the size stops changing.
    pub(crate) fn resolve_offsets_bounded(&mut self, max_iterations: usize) -> CphdResult<u64> {
        for iteration in 1..=max_iterations {
            let header_size = self.size();
            self.xml_block_byte_offset = header_size + SECTION_TERMINATOR_LEN;
            let after_xml = offset_after(offset_after(self.xml_block_byte_offset, self.xml_block_size)?, SECTION_TERMINATOR_LEN)?;
            if self.has_support_block() {
                self.support_block_byte_offset = after_xml;
                self.pvp_block_byte_offset = offset_after(after_xml, self.support_block_size)?;
            } else {
                self.support_block_byte_offset = 0;
                self.pvp_block_byte_offset = after_xml;
            }
            self.signal_block_byte_offset = offset_after(self.pvp_block_byte_offset, self.pvp_block_size)?;
            offset_after(self.signal_block_byte_offset, self.signal_block_size)?;

            if self.size() == header_size {
                log::debug!("Header offsets resolved after {} iteration(s), header is {} bytes", iteration, header_size);
                return Ok(header_size);
            }
        }
        Err(CphdError::OffsetResolution { iterations: max_iterations })
    }

    /// Header length in bytes, excluding the section terminator
    pub fn size(&self) -> u64 {
        self.body().len() as u64
    }

    fn body(&self) -> String {
        let mut out = format!("{}/{}{}", FILE_TYPE, self.version, LINE_TERMINATOR);
        let mut kvp = |key: &str, value: &dyn fmt::Display| {
            out.push_str(&format!("{}{}{}{}", key, KVP_DELIMITER, value, LINE_TERMINATOR));
        };
        kvp("XML_BLOCK_SIZE", &self.xml_block_size);
        kvp("XML_BLOCK_BYTE_OFFSET", &self.xml_block_byte_offset);
        if self.has_support_block() {
            kvp("SUPPORT_BLOCK_SIZE", &self.support_block_size);
            kvp("SUPPORT_BLOCK_BYTE_OFFSET", &self.support_block_byte_offset);
        }
        kvp("PVP_BLOCK_SIZE", &self.pvp_block_size);
        kvp("PVP_BLOCK_BYTE_OFFSET", &self.pvp_block_byte_offset);
        kvp("SIGNAL_BLOCK_SIZE", &self.signal_block_size);
        kvp("SIGNAL_BLOCK_BYTE_OFFSET", &self.signal_block_byte_offset);
        kvp("CLASSIFICATION", &self.classification);
        kvp("RELEASE_INFO", &self.release_info);
        out
    }

    pub fn write<W: Write>(&self, stream: &mut W) -> CphdResult<()> {
        stream.write_all(self.to_string().as_bytes())?;
        Ok(())
    }
}

fn offset_after(offset: u64, size: u64) -> CphdResult<u64> {
    offset.checked_add(size).ok_or_else(|| {
        CphdError::InvalidFormat(format!("block of {} bytes at offset {} overflows the file size", size, offset))
    })
}

impl fmt::Display for FileHeader {
    /// Full header text including the terminating section line
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.body(), SECTION_TERMINATOR, LINE_TERMINATOR)
    }
}
