//! Per-vector parameter block: one array of fixed-size PVP sets per channel.

use crate::io::file_header::FileHeader;
use crate::io::{byte_range, map_with_workers, read_range, to_usize};
use crate::metadata::data::{Data, PVP_WORD_SIZE};
use crate::metadata::pvp::PvpType;
use crate::types::{CphdError, CphdResult, Vector3};
use ndarray::Array1;
use std::io::{Read, Seek};

/// PVP sets of one channel, stored as big-endian bytes
#[derive(Debug, Clone, PartialEq)]
pub struct PvpArray {
    num_vectors: usize,
    bytes_per_vector: usize,
    data: Vec<u8>,
}

impl PvpArray {
    pub fn zeroed(num_vectors: usize, bytes_per_vector: usize) -> CphdResult<Self> {
        let len = array_len(num_vectors, bytes_per_vector)?;
        Ok(Self { num_vectors, bytes_per_vector, data: vec![0; len] })
    }

    pub fn from_bytes(num_vectors: usize, bytes_per_vector: usize, data: Vec<u8>) -> CphdResult<Self> {
        if data.len() != array_len(num_vectors, bytes_per_vector)? {
            return Err(CphdError::InvalidFormat(format!(
                "PVP array of {} bytes does not hold {} vectors of {} bytes",
                data.len(),
                num_vectors,
                bytes_per_vector
            )));
        }
        Ok(Self { num_vectors, bytes_per_vector, data })
    }

    pub fn num_vectors(&self) -> usize {
        self.num_vectors
    }

    pub fn bytes_per_vector(&self) -> usize {
        self.bytes_per_vector
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Byte range of one parameter of one vector
    fn range(&self, vector: usize, param: &PvpType) -> CphdResult<std::ops::Range<usize>> {
        if vector >= self.num_vectors {
            return Err(CphdError::InvalidFormat(format!(
                "vector {} requested but the channel has {}",
                vector, self.num_vectors
            )));
        }
        let (offset, len) = (param.byte_offset()?, param.byte_len()?);
        let end = offset.checked_add(len).unwrap_or(usize::MAX);
        if end > self.bytes_per_vector {
            return Err(CphdError::InvalidFormat(format!(
                "parameter at word {} spans past the {}-byte PVP set",
                param.offset, self.bytes_per_vector
            )));
        }
        let start = vector * self.bytes_per_vector + offset;
        Ok(start..start + len)
    }

    fn word(&self, vector: usize, param: &PvpType, index: usize) -> CphdResult<[u8; 8]> {
        let range = self.range(vector, param)?;
        let start = word_start(&range, param, index)?;
        let mut word = [0u8; 8];
        word.copy_from_slice(&self.data[start..start + 8]);
        Ok(word)
    }

    fn set_word(&mut self, vector: usize, param: &PvpType, index: usize, word: [u8; 8]) -> CphdResult<()> {
        let range = self.range(vector, param)?;
        let start = word_start(&range, param, index)?;
        self.data[start..start + 8].copy_from_slice(&word);
        Ok(())
    }

    pub fn f64(&self, vector: usize, param: &PvpType) -> CphdResult<f64> {
        Ok(f64::from_be_bytes(self.word(vector, param, 0)?))
    }

    pub fn i64(&self, vector: usize, param: &PvpType) -> CphdResult<i64> {
        Ok(i64::from_be_bytes(self.word(vector, param, 0)?))
    }

    pub fn vector3(&self, vector: usize, param: &PvpType) -> CphdResult<Vector3> {
        Ok(Vector3::new(
            f64::from_be_bytes(self.word(vector, param, 0)?),
            f64::from_be_bytes(self.word(vector, param, 1)?),
            f64::from_be_bytes(self.word(vector, param, 2)?),
        ))
    }

    /// Raw bytes of a parameter, for added parameters of arbitrary format
    pub fn raw(&self, vector: usize, param: &PvpType) -> CphdResult<&[u8]> {
        let range = self.range(vector, param)?;
        Ok(&self.data[range])
    }

    pub fn set_f64(&mut self, vector: usize, param: &PvpType, value: f64) -> CphdResult<()> {
        self.set_word(vector, param, 0, value.to_be_bytes())
    }

    pub fn set_i64(&mut self, vector: usize, param: &PvpType, value: i64) -> CphdResult<()> {
        self.set_word(vector, param, 0, value.to_be_bytes())
    }

    pub fn set_vector3(&mut self, vector: usize, param: &PvpType, value: &Vector3) -> CphdResult<()> {
        self.set_word(vector, param, 0, value.x.to_be_bytes())?;
        self.set_word(vector, param, 1, value.y.to_be_bytes())?;
        self.set_word(vector, param, 2, value.z.to_be_bytes())
    }

    pub fn set_raw(&mut self, vector: usize, param: &PvpType, bytes: &[u8]) -> CphdResult<()> {
        let range = self.range(vector, param)?;
        if bytes.len() != range.len() {
            return Err(CphdError::InvalidFormat(format!(
                "{} bytes given for a {}-byte parameter",
                bytes.len(),
                range.len()
            )));
        }
        self.data[range].copy_from_slice(bytes);
        Ok(())
    }

    /// One scalar parameter across every vector
    pub fn column_f64(&self, param: &PvpType) -> CphdResult<Array1<f64>> {
        let mut column = Array1::zeros(self.num_vectors);
        for (vector, value) in column.iter_mut().enumerate() {
            *value = self.f64(vector, param)?;
        }
        Ok(column)
    }
}

fn array_len(num_vectors: usize, bytes_per_vector: usize) -> CphdResult<usize> {
    num_vectors.checked_mul(bytes_per_vector).ok_or_else(|| {
        CphdError::InvalidFormat(format!(
            "{} PVP vectors of {} bytes overflow the address space",
            num_vectors, bytes_per_vector
        ))
    })
}

/// Start of word `index` of a parameter occupying `range`
fn word_start(range: &std::ops::Range<usize>, param: &PvpType, index: usize) -> CphdResult<usize> {
    let word = PVP_WORD_SIZE as usize;
    if index >= range.len() / word {
        return Err(CphdError::InvalidFormat(format!(
            "parameter at word {} has {} word(s), word {} requested",
            param.offset, param.size, index
        )));
    }
    Ok(range.start + index * word)
}

/// PVP arrays of every channel
#[derive(Debug, Clone, PartialEq)]
pub struct PvpBlock {
    arrays: Vec<PvpArray>,
}

impl PvpBlock {
    /// Zero-filled arrays sized from the channel table
    pub fn new(data: &Data) -> CphdResult<Self> {
        let bytes_per_vector = to_usize(data.num_bytes_pvp, "PVP set")?;
        let arrays = data
            .channels
            .iter()
            .map(|c| PvpArray::zeroed(to_usize(c.num_vectors, "PVP array")?, bytes_per_vector))
            .collect::<CphdResult<_>>()?;
        Ok(Self { arrays })
    }

    /// Read the whole block once and split it by channel across `num_threads` workers
    pub fn load<R: Read + Seek>(
        stream: &mut R,
        header: &FileHeader,
        data: &Data,
        num_threads: usize,
    ) -> CphdResult<Self> {
        let expected = data.pvp_block_size()?;
        if header.pvp_block_size() < expected {
            return Err(CphdError::InvalidFormat(format!(
                "PVP block is {} bytes but the channel table needs {}",
                header.pvp_block_size(),
                expected
            )));
        }

        let start = std::time::Instant::now();
        let block = read_range(stream, header.pvp_block_byte_offset(), expected)?;
        let bytes_per_vector = to_usize(data.num_bytes_pvp, "PVP set")?;

        let layout = data
            .channels
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let range = byte_range(c.pvp_array_byte_offset, data.pvp_array_size(i)?, "PVP array")?;
                Ok((range, to_usize(c.num_vectors, "PVP array")?))
            })
            .collect::<CphdResult<Vec<_>>>()?;
        let arrays = map_with_workers(layout, num_threads, |(range, num_vectors)| {
            let offset = range.start;
            let bytes = block.get(range).ok_or_else(|| {
                CphdError::InvalidFormat(format!("PVP array at {} runs past the block", offset))
            })?;
            PvpArray::from_bytes(num_vectors, bytes_per_vector, bytes.to_vec())
        })?;

        log::debug!(
            "Loaded PVP block: {} channel(s), {} bytes in {:?}",
            arrays.len(),
            expected,
            start.elapsed()
        );
        Ok(Self { arrays })
    }

    pub fn num_channels(&self) -> usize {
        self.arrays.len()
    }

    pub fn channel(&self, index: usize) -> CphdResult<&PvpArray> {
        self.arrays
            .get(index)
            .ok_or_else(|| CphdError::InvalidFormat(format!("no PVP array for channel {}", index)))
    }

    pub fn channel_mut(&mut self, index: usize) -> CphdResult<&mut PvpArray> {
        self.arrays
            .get_mut(index)
            .ok_or_else(|| CphdError::InvalidFormat(format!("no PVP array for channel {}", index)))
    }

    /// Lay the arrays out at the offsets given by the channel table
    pub fn to_bytes(&self, data: &Data) -> CphdResult<Vec<u8>> {
        if self.arrays.len() != data.channels.len() {
            return Err(CphdError::InvalidFormat(format!(
                "{} PVP arrays for {} channels",
                self.arrays.len(),
                data.channels.len()
            )));
        }
        let mut block = vec![0u8; to_usize(data.pvp_block_size()?, "PVP block")?];
        for (array, channel) in self.arrays.iter().zip(&data.channels) {
            if array.num_vectors as u64 != channel.num_vectors
                || array.bytes_per_vector as u64 != data.num_bytes_pvp
            {
                return Err(CphdError::InvalidFormat(format!(
                    "PVP array of channel {} does not match its descriptor",
                    channel.identifier
                )));
            }
            let range = byte_range(channel.pvp_array_byte_offset, array.data.len() as u64, "PVP array")?;
            block[range].copy_from_slice(&array.data);
        }
        Ok(block)
    }
}
