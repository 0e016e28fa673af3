//! Readers and writers for the CPHD container.

pub mod file_header;
pub mod pvp_block;
pub mod reader;
pub mod signal_block;
pub mod support_block;
pub mod writer;

pub use file_header::FileHeader;
pub use pvp_block::{PvpArray, PvpBlock};
pub use reader::{CphdReader, CphdReaderConfig};
pub use signal_block::SignalBlock;
pub use support_block::{SupportArrayData, SupportBlock};
pub use writer::{BlockPayloads, CphdWriter, CphdWriterConfig};

use crate::types::{CphdError, CphdResult};

/// One worker per available core
pub(crate) fn default_num_threads() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Apply `f` to every item on a pool of `num_threads` workers. The first
/// failure aborts the whole map.
pub(crate) fn map_with_workers<T, U, F>(items: Vec<T>, num_threads: usize, f: F) -> CphdResult<Vec<U>>
where
    T: Send,
    U: Send,
    F: Fn(T) -> CphdResult<U> + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        if num_threads > 1 && items.len() > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build()
                .map_err(|e| CphdError::Processing(format!("Failed to build worker pool: {}", e)))?;
            log::debug!("Splitting {} items across {} workers", items.len(), num_threads);
            return pool.install(|| items.into_par_iter().map(&f).collect());
        }
    }

    #[cfg(not(feature = "parallel"))]
    let _ = num_threads;

    items.into_iter().map(f).collect()
}

/// Largest buffer reserved up front; longer reads grow as bytes arrive
const READ_RESERVE: usize = 64 * 1024 * 1024;

/// Read exactly `len` bytes starting at `offset`
pub(crate) fn read_range<R>(stream: &mut R, offset: u64, len: u64) -> CphdResult<Vec<u8>>
where
    R: std::io::Read + std::io::Seek,
{
    use std::io::{Read, SeekFrom};

    let expected = to_usize(len, "block")?;
    stream.seek(SeekFrom::Start(offset))?;
    let mut buffer = Vec::with_capacity(expected.min(READ_RESERVE));
    (&mut *stream).take(len).read_to_end(&mut buffer)?;
    if buffer.len() != expected {
        return Err(CphdError::InvalidFormat(format!(
            "file ends inside the {} bytes at offset {}",
            len, offset
        )));
    }
    Ok(buffer)
}

/// Byte count or offset from the file as an in-memory index
pub(crate) fn to_usize(value: u64, what: &str) -> CphdResult<usize> {
    usize::try_from(value)
        .map_err(|_| CphdError::InvalidFormat(format!("{} of {} bytes does not fit in memory", what, value)))
}

/// `start..start + len` as in-memory indices, failing instead of wrapping
pub(crate) fn byte_range(start: u64, len: u64, what: &str) -> CphdResult<std::ops::Range<usize>> {
    let end = start
        .checked_add(len)
        .ok_or_else(|| CphdError::InvalidFormat(format!("{} at {} + {} bytes overflows", what, start, len)))?;
    Ok(to_usize(start, what)?..to_usize(end, what)?)
}

/// Absolute file offset of a range inside a block
pub(crate) fn absolute_offset(block_offset: u64, relative: u64, what: &str) -> CphdResult<u64> {
    block_offset.checked_add(relative).ok_or_else(|| {
        CphdError::InvalidFormat(format!("{} at {} past block offset {} overflows", what, relative, block_offset))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_map_with_workers_keeps_order() {
        let items: Vec<u64> = (0..32).collect();
        for threads in [1, 4] {
            let doubled = map_with_workers(items.clone(), threads, |x| Ok(x * 2)).unwrap();
            assert_eq!(doubled, (0..32).map(|x| x * 2).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_map_with_workers_aborts_on_failure() {
        let items: Vec<u64> = (0..16).collect();
        let result = map_with_workers(items, 4, |x| {
            if x == 7 {
                Err(CphdError::Processing("worker failed".to_string()))
            } else {
                Ok(x)
            }
        });
        assert!(matches!(result, Err(CphdError::Processing(_))));
    }

    #[test]
    fn test_read_range_short_file() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3, 4]);
        assert_eq!(read_range(&mut cursor, 1, 2).unwrap(), vec![2, 3]);
        assert!(matches!(read_range(&mut cursor, 2, 8), Err(CphdError::InvalidFormat(_))));
        // A huge declared size on a tiny stream fails without reserving it
        assert!(matches!(read_range(&mut cursor, 0, 1 << 60), Err(CphdError::InvalidFormat(_))));
    }

    #[test]
    fn test_ranges_do_not_wrap() {
        assert_eq!(byte_range(4, 8, "array").unwrap(), 4..12);
        assert!(byte_range(u64::MAX, 1, "array").is_err());
        assert!(absolute_offset(u64::MAX - 1, 2, "array").is_err());
        assert_eq!(absolute_offset(10, 2, "array").unwrap(), 12);
    }
}
