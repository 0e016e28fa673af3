//! Support block: support arrays laid out by the Data section.

use crate::io::file_header::FileHeader;
use crate::io::{absolute_offset, byte_range, map_with_workers, read_range, to_usize};
use crate::metadata::data::{Data, DataSupportArray};
use crate::types::{CphdError, CphdResult};
use ndarray::Array2;
use std::collections::BTreeMap;
use std::io::{Read, Seek};

/// Raw contents of one support array, row-major big-endian elements
#[derive(Debug, Clone, PartialEq)]
pub struct SupportArrayData {
    pub identifier: String,
    pub num_rows: usize,
    pub num_cols: usize,
    pub bytes_per_element: usize,
    pub data: Vec<u8>,
}

impl SupportArrayData {
    fn from_descriptor(descriptor: &DataSupportArray, data: Vec<u8>) -> CphdResult<Self> {
        Ok(Self {
            identifier: descriptor.identifier.clone(),
            num_rows: to_usize(descriptor.num_rows, "support array rows")?,
            num_cols: to_usize(descriptor.num_cols, "support array columns")?,
            bytes_per_element: to_usize(descriptor.bytes_per_element, "support array element")?,
            data,
        })
    }

    pub fn element(&self, row: usize, col: usize) -> CphdResult<&[u8]> {
        if row >= self.num_rows || col >= self.num_cols {
            return Err(CphdError::InvalidFormat(format!(
                "element ({}, {}) outside the {}x{} support array {}",
                row, col, self.num_rows, self.num_cols, self.identifier
            )));
        }
        let start = (row * self.num_cols + col) * self.bytes_per_element;
        Ok(&self.data[start..start + self.bytes_per_element])
    }

    /// Interpret single-float elements, as in IAZ arrays
    pub fn to_f32_array(&self) -> CphdResult<Array2<f32>> {
        if self.bytes_per_element != 4 {
            return Err(CphdError::InvalidFormat(format!(
                "support array {} has {}-byte elements, not F4",
                self.identifier, self.bytes_per_element
            )));
        }
        let values: Vec<f32> = self
            .data
            .chunks_exact(4)
            .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Array2::from_shape_vec((self.num_rows, self.num_cols), values)
            .map_err(|e| CphdError::Processing(format!("Shape error: {}", e)))
    }

    /// Interpret gain/phase pairs of single floats
    pub fn to_gain_phase(&self) -> CphdResult<(Array2<f32>, Array2<f32>)> {
        if self.bytes_per_element != 8 {
            return Err(CphdError::InvalidFormat(format!(
                "support array {} has {}-byte elements, not a gain/phase pair",
                self.identifier, self.bytes_per_element
            )));
        }
        let shape = (self.num_rows, self.num_cols);
        let mut gain = Array2::zeros(shape);
        let mut phase = Array2::zeros(shape);
        for (i, c) in self.data.chunks_exact(8).enumerate() {
            let index = (i / self.num_cols, i % self.num_cols);
            gain[index] = f32::from_be_bytes([c[0], c[1], c[2], c[3]]);
            phase[index] = f32::from_be_bytes([c[4], c[5], c[6], c[7]]);
        }
        Ok((gain, phase))
    }
}

/// Location of the support block and its array table
#[derive(Debug, Clone)]
pub struct SupportBlock {
    offset: u64,
    size: u64,
    arrays: Vec<DataSupportArray>,
}

impl SupportBlock {
    pub fn new(header: &FileHeader, data: &Data) -> CphdResult<Self> {
        let needed = data.support_block_size()?;
        if header.support_block_size() < needed {
            return Err(CphdError::InvalidFormat(format!(
                "support block is {} bytes but the array table needs {}",
                header.support_block_size(),
                needed
            )));
        }
        Ok(Self {
            offset: header.support_block_byte_offset(),
            size: header.support_block_size(),
            arrays: data.support_arrays.clone(),
        })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.arrays.iter().map(|a| a.identifier.as_str())
    }

    fn descriptor(&self, identifier: &str) -> CphdResult<&DataSupportArray> {
        self.arrays
            .iter()
            .find(|a| a.identifier == identifier)
            .ok_or_else(|| CphdError::InvalidFormat(format!("no support array '{}'", identifier)))
    }

    pub fn read<R: Read + Seek>(&self, stream: &mut R, identifier: &str) -> CphdResult<SupportArrayData> {
        let descriptor = self.descriptor(identifier)?;
        let offset = absolute_offset(self.offset, descriptor.array_byte_offset, "support array")?;
        let bytes = read_range(stream, offset, descriptor.size()?)?;
        log::debug!("Read support array {} ({} bytes)", identifier, bytes.len());
        SupportArrayData::from_descriptor(descriptor, bytes)
    }

    /// Read the block once and split it into arrays across `num_threads` workers
    pub fn read_all<R: Read + Seek>(
        &self,
        stream: &mut R,
        num_threads: usize,
    ) -> CphdResult<BTreeMap<String, SupportArrayData>> {
        let block = read_range(stream, self.offset, self.size)?;
        let arrays = map_with_workers(self.arrays.iter().collect(), num_threads, |descriptor| {
            let range = byte_range(descriptor.array_byte_offset, descriptor.size()?, "support array")?;
            let bytes = block.get(range).ok_or_else(|| {
                CphdError::InvalidFormat(format!(
                    "support array {} runs past the block",
                    descriptor.identifier
                ))
            })?;
            SupportArrayData::from_descriptor(descriptor, bytes.to_vec())
        })?;
        Ok(arrays.into_iter().map(|a| (a.identifier.clone(), a)).collect())
    }

    /// Build the support block payload from the bytes of each declared array
    pub fn assemble(data: &Data, arrays: &BTreeMap<String, Vec<u8>>) -> CphdResult<Vec<u8>> {
        let mut block = vec![0u8; to_usize(data.support_block_size()?, "support block")?];
        for descriptor in &data.support_arrays {
            let bytes = arrays.get(&descriptor.identifier).ok_or_else(|| {
                CphdError::InvalidFormat(format!("no bytes for support array '{}'", descriptor.identifier))
            })?;
            let size = descriptor.size()?;
            if bytes.len() as u64 != size {
                return Err(CphdError::InvalidFormat(format!(
                    "support array {} has {} bytes, its descriptor needs {}",
                    descriptor.identifier,
                    bytes.len(),
                    size
                )));
            }
            let range = byte_range(descriptor.array_byte_offset, size, "support array")?;
            block[range].copy_from_slice(bytes);
        }
        if let Some(extra) = arrays.keys().find(|k| data.support_array(k).is_err()) {
            log::warn!("Ignoring bytes for undeclared support array '{}'", extra);
        }
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::SignalArrayFormat;
    use std::io::Cursor;

    fn layout() -> Data {
        let mut data = Data::new(SignalArrayFormat::Cf8, 216, &[("A", 1, 1)]);
        data.add_support_array("IAZ", 2, 2, 4).unwrap();
        data.add_support_array("GAIN", 1, 2, 8).unwrap();
        data
    }

    #[test]
    fn test_assemble_and_split() {
        let data = layout();
        let iaz: Vec<u8> = [1.0f32, 2.0, 3.0, 4.0].iter().flat_map(|v| v.to_be_bytes()).collect();
        let gain: Vec<u8> = [0.5f32, 0.1, 0.25, 0.2].iter().flat_map(|v| v.to_be_bytes()).collect();
        let mut arrays = BTreeMap::new();
        arrays.insert("IAZ".to_string(), iaz);
        arrays.insert("GAIN".to_string(), gain);
        let block = SupportBlock::assemble(&data, &arrays).unwrap();
        assert_eq!(block.len(), 32);

        let mut header = FileHeader::new("UNCLASSIFIED", "UNRESTRICTED");
        header.set(10, block.len() as u64, 216, 8).unwrap();
        let mut file = vec![0u8; header.support_block_byte_offset() as usize];
        file.extend_from_slice(&block);
        let mut cursor = Cursor::new(file);

        let support = SupportBlock::new(&header, &data).unwrap();
        let all = support.read_all(&mut cursor, 2).unwrap();
        assert_eq!(all.len(), 2);
        let iaz = all["IAZ"].to_f32_array().unwrap();
        assert_eq!(iaz[[1, 0]], 3.0);
        let (g, p) = support.read(&mut cursor, "GAIN").unwrap().to_gain_phase().unwrap();
        assert_eq!(g[[0, 1]], 0.25);
        assert_eq!(p[[0, 0]], 0.1);
    }

    #[test]
    fn test_assemble_rejects_wrong_size() {
        let data = layout();
        let mut arrays = BTreeMap::new();
        arrays.insert("IAZ".to_string(), vec![0u8; 15]);
        arrays.insert("GAIN".to_string(), vec![0u8; 16]);
        assert!(SupportBlock::assemble(&data, &arrays).is_err());
        arrays.remove("IAZ");
        assert!(SupportBlock::assemble(&data, &arrays).is_err());
    }
}
