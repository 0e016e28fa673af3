//! Python bindings

use crate::io::{CphdReader, CphdReaderConfig};
use crate::CphdError;
use numpy::{IntoPyArray, PyArray2};
use num_complex::Complex32;
use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::fs::File;
use std::io::BufReader;

fn to_py_err(err: CphdError) -> PyErr {
    match err {
        CphdError::Io(e) => PyIOError::new_err(e.to_string()),
        other if other.path().is_some() => PyValueError::new_err(other.to_string()),
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

/// Python module definition
#[pymodule]
fn _cphd(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyCphdReader>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}

/// Python wrapper for CphdReader
#[pyclass(name = "CphdReader")]
struct PyCphdReader {
    inner: CphdReader<BufReader<File>>,
}

#[pymethods]
impl PyCphdReader {
    #[new]
    #[pyo3(signature = (path, num_threads = None))]
    fn new(path: String, num_threads: Option<usize>) -> PyResult<Self> {
        let mut config = CphdReaderConfig::default();
        if let Some(n) = num_threads {
            config = config.with_num_threads(n);
        }
        let inner = CphdReader::from_file(&path, config).map_err(to_py_err)?;
        Ok(PyCphdReader { inner })
    }

    #[getter]
    fn version(&self) -> String {
        self.inner.header().version().to_string()
    }

    #[getter]
    fn classification(&self) -> String {
        self.inner.header().classification().to_string()
    }

    #[getter]
    fn release_info(&self) -> String {
        self.inner.header().release_info().to_string()
    }

    #[getter]
    fn core_name(&self) -> String {
        self.inner.metadata().collection_id.core_name.clone()
    }

    #[getter]
    fn collector_name(&self) -> String {
        self.inner.metadata().collection_id.collector_name.clone()
    }

    #[getter]
    fn signal_array_format(&self) -> String {
        self.inner.metadata().data.signal_array_format.to_string()
    }

    /// (identifier, num_vectors, num_samples) per channel
    #[getter]
    fn channels(&self) -> Vec<(String, u64, u64)> {
        self.inner
            .metadata()
            .data
            .channels
            .iter()
            .map(|c| (c.identifier.clone(), c.num_vectors, c.num_samples))
            .collect()
    }

    fn metadata_xml(&self) -> String {
        self.inner.xml().to_string()
    }

    fn read_signal<'py>(&mut self, py: Python<'py>, channel: usize) -> PyResult<&'py PyArray2<Complex32>> {
        let array = self.inner.read_signal(channel).map_err(to_py_err)?;
        Ok(array.into_pyarray(py))
    }

    fn __repr__(&self) -> String {
        let metadata = self.inner.metadata();
        format!(
            "CphdReader(core_name='{}', channels={}, format={})",
            metadata.collection_id.core_name,
            metadata.data.channels.len(),
            metadata.data.signal_array_format
        )
    }
}
