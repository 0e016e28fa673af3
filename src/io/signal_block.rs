//! Signal block: one complex sample array per channel.

use crate::enums::SignalArrayFormat;
use crate::io::file_header::FileHeader;
use crate::io::{absolute_offset, byte_range, map_with_workers, read_range, to_usize};
use crate::metadata::data::Data;
use crate::types::{CphdError, CphdResult, SarComplex, SignalArray};
use num_traits::{AsPrimitive, NumCast};
use std::io::{Read, Seek};

/// Location of the signal block and its channel table
#[derive(Debug, Clone)]
pub struct SignalBlock {
    offset: u64,
    size: u64,
    data: Data,
}

impl SignalBlock {
    pub fn new(header: &FileHeader, data: &Data) -> CphdResult<Self> {
        let needed = data.signal_block_size()?;
        if header.signal_block_size() < needed {
            return Err(CphdError::InvalidFormat(format!(
                "signal block is {} bytes but the channel table needs {}",
                header.signal_block_size(),
                needed
            )));
        }
        Ok(Self {
            offset: header.signal_block_byte_offset(),
            size: header.signal_block_size(),
            data: data.clone(),
        })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Stored bytes of one channel, compressed or not
    pub fn read_channel_bytes<R: Read + Seek>(&self, stream: &mut R, channel: usize) -> CphdResult<Vec<u8>> {
        let descriptor = self.data.channel(channel)?;
        let len = self.data.signal_array_size(channel)?;
        let offset = absolute_offset(self.offset, descriptor.signal_array_byte_offset, "signal array")?;
        read_range(stream, offset, len)
    }

    /// Decode one uncompressed channel into a vector x sample array
    pub fn read_channel<R: Read + Seek>(&self, stream: &mut R, channel: usize) -> CphdResult<SignalArray> {
        if let Some(id) = &self.data.signal_compression_id {
            return Err(CphdError::Processing(format!(
                "signal is compressed ({}), only raw bytes can be read",
                id
            )));
        }
        let descriptor = self.data.channel(channel)?;
        let shape = (
            to_usize(descriptor.num_vectors, "signal vectors")?,
            to_usize(descriptor.num_samples, "signal samples")?,
        );
        let bytes = self.read_channel_bytes(stream, channel)?;

        let start = std::time::Instant::now();
        let array = decode(&bytes, self.data.signal_array_format, shape)?;
        log::debug!(
            "Decoded channel {} ({}x{} {}) in {:?}",
            descriptor.identifier,
            shape.0,
            shape.1,
            self.data.signal_array_format,
            start.elapsed()
        );
        Ok(array)
    }
}

fn complex<T: AsPrimitive<f32>>(re: T, im: T) -> SarComplex {
    SarComplex::new(re.as_(), im.as_())
}

fn sample(c: &[u8], format: SignalArrayFormat) -> SarComplex {
    match format {
        SignalArrayFormat::Ci2 => complex(c[0] as i8, c[1] as i8),
        SignalArrayFormat::Ci4 => complex(
            i16::from_be_bytes([c[0], c[1]]),
            i16::from_be_bytes([c[2], c[3]]),
        ),
        SignalArrayFormat::Cf8 => complex(
            f32::from_be_bytes([c[0], c[1], c[2], c[3]]),
            f32::from_be_bytes([c[4], c[5], c[6], c[7]]),
        ),
    }
}

/// Decode big-endian samples of `format` into an array of `shape`
pub fn decode(bytes: &[u8], format: SignalArrayFormat, shape: (usize, usize)) -> CphdResult<SignalArray> {
    let width = format.bytes_per_sample();
    let needed = shape.0.checked_mul(shape.1).and_then(|n| n.checked_mul(width));
    if needed != Some(bytes.len()) {
        return Err(CphdError::InvalidFormat(format!(
            "{} bytes cannot hold {}x{} {} samples",
            bytes.len(),
            shape.0,
            shape.1,
            format
        )));
    }

    #[cfg(feature = "parallel")]
    let samples: Vec<SarComplex> = {
        use rayon::prelude::*;
        bytes.par_chunks_exact(width).map(|c| sample(c, format)).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let samples: Vec<SarComplex> = bytes.chunks_exact(width).map(|c| sample(c, format)).collect();

    SignalArray::from_shape_vec(shape, samples)
        .map_err(|e| CphdError::Processing(format!("Shape error: {}", e)))
}

fn integer<T: NumCast>(value: f32, format: SignalArrayFormat) -> CphdResult<T> {
    <T as NumCast>::from(value.round()).ok_or_else(|| {
        CphdError::Processing(format!("sample component {} does not fit in {}", value, format))
    })
}

/// Encode `array` row by row as big-endian samples of `format`
pub fn encode(array: &SignalArray, format: SignalArrayFormat) -> CphdResult<Vec<u8>> {
    let mut bytes = Vec::with_capacity(array.len() * format.bytes_per_sample());
    for value in array.iter() {
        match format {
            SignalArrayFormat::Ci2 => {
                bytes.push(integer::<i8>(value.re, format)? as u8);
                bytes.push(integer::<i8>(value.im, format)? as u8);
            }
            SignalArrayFormat::Ci4 => {
                bytes.extend_from_slice(&integer::<i16>(value.re, format)?.to_be_bytes());
                bytes.extend_from_slice(&integer::<i16>(value.im, format)?.to_be_bytes());
            }
            SignalArrayFormat::Cf8 => {
                bytes.extend_from_slice(&value.re.to_be_bytes());
                bytes.extend_from_slice(&value.im.to_be_bytes());
            }
        }
    }
    Ok(bytes)
}

/// Encode one array per channel into a signal block laid out per `data`.
/// Channels are encoded across `num_threads` workers.
pub fn encode_block(data: &Data, arrays: &[SignalArray], num_threads: usize) -> CphdResult<Vec<u8>> {
    if let Some(id) = &data.signal_compression_id {
        return Err(CphdError::Processing(format!(
            "signal is compressed ({}), only raw bytes can be written",
            id
        )));
    }
    if arrays.len() != data.channels.len() {
        return Err(CphdError::InvalidFormat(format!(
            "{} signal arrays for {} channels",
            arrays.len(),
            data.channels.len()
        )));
    }
    for (array, channel) in arrays.iter().zip(&data.channels) {
        let (rows, cols) = array.dim();
        if rows as u64 != channel.num_vectors || cols as u64 != channel.num_samples {
            return Err(CphdError::InvalidFormat(format!(
                "signal array of channel {} is {}x{}, its descriptor says {}x{}",
                channel.identifier, rows, cols, channel.num_vectors, channel.num_samples
            )));
        }
    }

    let mut block = vec![0u8; to_usize(data.signal_block_size()?, "signal block")?];
    let format = data.signal_array_format;
    let encoded = map_with_workers(arrays.iter().collect(), num_threads, |array| encode(array, format))?;
    for (bytes, channel) in encoded.iter().zip(&data.channels) {
        let range = byte_range(channel.signal_array_byte_offset, bytes.len() as u64, "signal array")?;
        block[range].copy_from_slice(bytes);
    }
    Ok(block)
}
