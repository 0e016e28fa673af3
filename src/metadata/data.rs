use crate::enums::SignalArrayFormat;
use crate::types::{CphdError, CphdResult};
use crate::xml::{Element, XmlCodec, XmlNode};
use serde::{Deserialize, Serialize};

/// Size of one PVP word in bytes
pub const PVP_WORD_SIZE: u64 = 8;

/// Layout of the binary blocks that follow the XML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data {
    pub signal_array_format: SignalArrayFormat,
    /// Bytes per PVP set, always a whole number of 8-byte words
    pub num_bytes_pvp: u64,
    pub channels: Vec<DataChannel>,
    pub signal_compression_id: Option<String>,
    pub support_arrays: Vec<DataSupportArray>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataChannel {
    pub identifier: String,
    pub num_vectors: u64,
    pub num_samples: u64,
    pub signal_array_byte_offset: u64,
    pub pvp_array_byte_offset: u64,
    pub compressed_signal_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSupportArray {
    pub identifier: String,
    pub num_rows: u64,
    pub num_cols: u64,
    pub bytes_per_element: u64,
    pub array_byte_offset: u64,
}

impl DataSupportArray {
    /// Bytes of the array; a product that overflows is an invalid descriptor
    pub fn size(&self) -> CphdResult<u64> {
        self.num_rows
            .checked_mul(self.num_cols)
            .and_then(|n| n.checked_mul(self.bytes_per_element))
            .ok_or_else(|| {
                overflow(
                    "Data/SupportArray",
                    format!(
                        "array '{}' of {} x {} x {} bytes",
                        self.identifier, self.num_rows, self.num_cols, self.bytes_per_element
                    ),
                )
            })
    }

    /// First byte past the array, relative to the support block
    pub fn end(&self) -> CphdResult<u64> {
        self.array_byte_offset.checked_add(self.size()?).ok_or_else(|| {
            overflow(
                "Data/SupportArray",
                format!("array '{}' at offset {}", self.identifier, self.array_byte_offset),
            )
        })
    }
}

fn overflow(path: impl Into<String>, what: String) -> CphdError {
    CphdError::invalid_value(path, format!("{} overflows a 64-bit byte count", what))
}

fn indexed(tag: &str, index: usize) -> impl FnOnce(&str) -> String {
    let path = format!("Data/{}[{}]", tag, index + 1);
    move |_: &str| path
}

impl Data {
    /// Lay out channels and support arrays back to back in declaration order
    pub fn new(
        signal_array_format: SignalArrayFormat,
        num_bytes_pvp: u64,
        channels: &[(&str, u64, u64)],
    ) -> Self {
        let mut data = Self {
            signal_array_format,
            num_bytes_pvp,
            channels: Vec::new(),
            signal_compression_id: None,
            support_arrays: Vec::new(),
        };
        let mut signal_offset = 0;
        let mut pvp_offset = 0;
        for (identifier, num_vectors, num_samples) in channels {
            data.channels.push(DataChannel {
                identifier: identifier.to_string(),
                num_vectors: *num_vectors,
                num_samples: *num_samples,
                signal_array_byte_offset: signal_offset,
                pvp_array_byte_offset: pvp_offset,
                compressed_signal_size: None,
            });
            let signal_size = num_vectors
                .saturating_mul(*num_samples)
                .saturating_mul(signal_array_format.bytes_per_sample() as u64);
            signal_offset = signal_offset.saturating_add(signal_size);
            pvp_offset = pvp_offset.saturating_add(num_vectors.saturating_mul(num_bytes_pvp));
        }
        data
    }

    /// Append a support array placed after the existing ones
    pub fn add_support_array(
        &mut self,
        identifier: &str,
        num_rows: u64,
        num_cols: u64,
        bytes_per_element: u64,
    ) -> CphdResult<()> {
        let array_byte_offset = self.support_block_size()?;
        let array = DataSupportArray {
            identifier: identifier.to_string(),
            num_rows,
            num_cols,
            bytes_per_element,
            array_byte_offset,
        };
        array.end().map_err(|e| e.map_path(indexed("SupportArray", self.support_arrays.len())))?;
        self.support_arrays.push(array);
        Ok(())
    }

    pub fn channel(&self, index: usize) -> CphdResult<&DataChannel> {
        self.channels.get(index).ok_or_else(|| {
            CphdError::InvalidFormat(format!(
                "channel {} requested but only {} present",
                index,
                self.channels.len()
            ))
        })
    }

    pub fn support_array(&self, identifier: &str) -> CphdResult<&DataSupportArray> {
        self.support_arrays
            .iter()
            .find(|a| a.identifier == identifier)
            .ok_or_else(|| CphdError::InvalidFormat(format!("no support array '{}'", identifier)))
    }

    pub fn is_compressed(&self) -> bool {
        self.signal_compression_id.is_some()
    }

    /// Bytes of one channel's PVP array
    pub fn pvp_array_size(&self, channel: usize) -> CphdResult<u64> {
        let ch = self.channel(channel)?;
        ch.num_vectors.checked_mul(self.num_bytes_pvp).ok_or_else(|| {
            overflow(
                format!("Data/Channel[{}]/NumVectors", channel + 1),
                format!("{} vectors of {} bytes", ch.num_vectors, self.num_bytes_pvp),
            )
        })
    }

    /// Bytes of one channel's signal array as stored
    pub fn signal_array_size(&self, channel: usize) -> CphdResult<u64> {
        let ch = self.channel(channel)?;
        if self.is_compressed() {
            return ch.compressed_signal_size.ok_or_else(|| {
                CphdError::invalid_value(
                    format!("Data/Channel[{}]/CompressedSignalSize", channel + 1),
                    "compressed signal without a compressed size",
                )
            });
        }
        let bytes_per_sample = self.signal_array_format.bytes_per_sample() as u64;
        ch.num_vectors
            .checked_mul(ch.num_samples)
            .and_then(|n| n.checked_mul(bytes_per_sample))
            .ok_or_else(|| {
                overflow(
                    format!("Data/Channel[{}]", channel + 1),
                    format!(
                        "{} vectors of {} samples of {} bytes",
                        ch.num_vectors, ch.num_samples, bytes_per_sample
                    ),
                )
            })
    }

    /// Extent of the PVP block implied by the channel table
    pub fn pvp_block_size(&self) -> CphdResult<u64> {
        let mut size = 0;
        for (i, c) in self.channels.iter().enumerate() {
            let end = c
                .pvp_array_byte_offset
                .checked_add(self.pvp_array_size(i)?)
                .ok_or_else(|| {
                    overflow(
                        format!("Data/Channel[{}]/PVPArrayByteOffset", i + 1),
                        format!("PVP array at offset {}", c.pvp_array_byte_offset),
                    )
                })?;
            size = size.max(end);
        }
        Ok(size)
    }

    /// Extent of the signal block implied by the channel table
    pub fn signal_block_size(&self) -> CphdResult<u64> {
        let mut size = 0;
        for i in 0..self.channels.len() {
            size = size.max(self.signal_array_end(i)?);
        }
        Ok(size)
    }

    fn signal_array_end(&self, channel: usize) -> CphdResult<u64> {
        let ch = self.channel(channel)?;
        ch.signal_array_byte_offset
            .checked_add(self.signal_array_size(channel)?)
            .ok_or_else(|| {
                overflow(
                    format!("Data/Channel[{}]/SignalArrayByteOffset", channel + 1),
                    format!("signal array at offset {}", ch.signal_array_byte_offset),
                )
            })
    }

    pub fn support_block_size(&self) -> CphdResult<u64> {
        let mut size = 0;
        for (i, array) in self.support_arrays.iter().enumerate() {
            let end = array.end().map_err(|e| e.map_path(indexed("SupportArray", i)))?;
            size = size.max(end);
        }
        Ok(size)
    }

    /// Every block extent must be representable; compressed channels without a size are skipped
    fn check_extents(&self) -> CphdResult<()> {
        self.pvp_block_size()?;
        self.support_block_size()?;
        for (i, c) in self.channels.iter().enumerate() {
            if self.is_compressed() && c.compressed_signal_size.is_none() {
                continue;
            }
            self.signal_array_end(i)?;
        }
        Ok(())
    }
}

fn check_num_bytes_pvp(value: u64) -> Result<(), String> {
    if value % PVP_WORD_SIZE != 0 {
        return Err(format!("{} is not a multiple of {}", value, PVP_WORD_SIZE));
    }
    Ok(())
}

impl XmlCodec for DataChannel {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Identifier", &self.identifier);
        element.add_value("NumVectors", &self.num_vectors);
        element.add_value("NumSamples", &self.num_samples);
        element.add_value("SignalArrayByteOffset", &self.signal_array_byte_offset);
        element.add_value("PVPArrayByteOffset", &self.pvp_array_byte_offset);
        element.add_optional_value("CompressedSignalSize", &self.compressed_signal_size);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            identifier: node.required_value("Identifier")?,
            num_vectors: node.required_value("NumVectors")?,
            num_samples: node.required_value("NumSamples")?,
            signal_array_byte_offset: node.required_value("SignalArrayByteOffset")?,
            pvp_array_byte_offset: node.required_value("PVPArrayByteOffset")?,
            compressed_signal_size: node.optional_value("CompressedSignalSize")?,
        })
    }
}

impl XmlCodec for DataSupportArray {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Identifier", &self.identifier);
        element.add_value("NumRows", &self.num_rows);
        element.add_value("NumCols", &self.num_cols);
        element.add_value("BytesPerElement", &self.bytes_per_element);
        element.add_value("ArrayByteOffset", &self.array_byte_offset);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            identifier: node.required_value("Identifier")?,
            num_rows: node.required_value("NumRows")?,
            num_cols: node.required_value("NumCols")?,
            bytes_per_element: node.required_value("BytesPerElement")?,
            array_byte_offset: node.required_value("ArrayByteOffset")?,
        })
    }
}

impl XmlCodec for Data {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        check_num_bytes_pvp(self.num_bytes_pvp)
            .map_err(|reason| CphdError::invalid_value("NumBytesPVP", reason))?;

        element.add_value("SignalArrayFormat", &self.signal_array_format);
        element.add_value("NumBytesPVP", &self.num_bytes_pvp);
        element.add_value("NumCPHDChannels", &self.channels.len());
        element.add_optional_value("SignalCompressionID", &self.signal_compression_id);
        element.add_list("Channel", &self.channels)?;
        element.add_value("NumSupportArrays", &self.support_arrays.len());
        element.add_list("SupportArray", &self.support_arrays)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let num_bytes_pvp_node = node.required("NumBytesPVP")?;
        let num_bytes_pvp: u64 = num_bytes_pvp_node.value()?;
        check_num_bytes_pvp(num_bytes_pvp).map_err(|reason| num_bytes_pvp_node.invalid(reason))?;

        let channels = node.list("Channel")?;
        node.check_count("NumCPHDChannels", channels.len())?;
        let support_arrays = node.list("SupportArray")?;
        node.check_count("NumSupportArrays", support_arrays.len())?;

        let data = Self {
            signal_array_format: node.required_value("SignalArrayFormat")?,
            num_bytes_pvp,
            channels,
            signal_compression_id: node.optional_value("SignalCompressionID")?,
            support_arrays,
        };
        data.check_extents()?;
        Ok(data)
    }
}
