//! PyO3 wrapper for Port
//!
//! Exposes snapshot decoding, encoding and the tick loop to Python.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::orchestrator::{Port as RustPort, PortConfig, TickResult};

/// Python wrapper for Rust Port
///
/// # Example (from Python)
///
/// ```python
/// from port_simulator_core_rs import Port
///
/// port = Port.decode(open("brisbane.txt").read())
/// for _ in range(60):
///     result = port.elapse_one_minute()
/// print(port.time(), port.fingerprint())
/// ```
#[pyclass(name = "Port", unsendable)]
pub struct PyPort {
    inner: RustPort,
}

#[pymethods]
impl PyPort {
    /// Create an empty port from a JSON configuration string
    ///
    /// Raises ValueError if the configuration is malformed or invalid.
    #[staticmethod]
    fn from_json(config: &str) -> PyResult<Self> {
        let inner = PortConfig::from_json(config)
            .and_then(|config| RustPort::from_config(&config))
            .map_err(|e| PyErr::new::<PyValueError, _>(format!("Failed to create port: {}", e)))?;

        Ok(PyPort { inner })
    }

    /// Rebuild a port from an encoded snapshot
    ///
    /// Raises ValueError naming the offending line if decoding fails.
    #[staticmethod]
    fn decode(snapshot: &str) -> PyResult<Self> {
        let inner = RustPort::decode(snapshot)
            .map_err(|e| PyErr::new::<PyValueError, _>(format!("Failed to decode port: {}", e)))?;

        Ok(PyPort { inner })
    }

    /// Encode the complete port state
    fn encode(&self) -> String {
        self.inner.encode()
    }

    /// SHA256 hex digest of the encoded state
    fn fingerprint(&self) -> String {
        self.inner.fingerprint()
    }

    /// Advance the simulation by one minute
    ///
    /// Returns a dict with `minute`, `docked` (`(imo, quay_id)` or None),
    /// `cargo_unloaded` and `movements_processed`.
    fn elapse_one_minute(&mut self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        let result = self.inner.elapse_one_minute();
        tick_result_to_py(py, &result)
    }

    /// Current simulation minute
    fn time(&self) -> u64 {
        self.inner.time()
    }

    fn name(&self) -> String {
        self.inner.name().to_string()
    }

    /// Schedule a movement given in its encoded form
    fn add_movement(&mut self, record: &str) -> PyResult<()> {
        let movement = crate::orchestrator::checkpoint::decode_movement_record(
            record,
            self.inner.registries(),
        )
        .map_err(|e| PyErr::new::<PyValueError, _>(format!("Invalid movement: {}", e)))?;

        self.inner
            .add_movement(movement)
            .map_err(|e| PyErr::new::<PyRuntimeError, _>(format!("Failed to schedule movement: {}", e)))
    }
}

/// Convert TickResult to a Python dict
fn tick_result_to_py(py: Python<'_>, result: &TickResult) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);

    dict.set_item("minute", result.minute)?;
    dict.set_item(
        "docked",
        result.docked.map(|docked| (docked.imo_number, docked.quay_id)),
    )?;
    dict.set_item("cargo_unloaded", result.cargo_unloaded)?;
    dict.set_item("movements_processed", result.movements_processed)?;

    Ok(dict.unbind())
}
