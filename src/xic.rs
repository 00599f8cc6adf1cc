//! Extracted-ion chromatogram (XIC) queries.
//!
//! The `xic` subcommand of ThermoRawFileParser reads its queries from a JSON
//! file holding an array of descriptors:
//!
//! ```json
//! [{"mz": 488.5384, "tolerance": 10, "tolerance_unit": "ppm"},
//!  {"mz": 575.2, "tolerance": 0.01, "tolerance_unit": "amu", "rt_start": 10, "rt_end": 20}]
//! ```
//!
//! Descriptor order is significant to the tool and is kept exactly as given.
//! Tolerance units and filters are validated by the tool, not here.
//!
//! With `--base64` the retention time and intensity vectors come back as
//! base64 strings of little-endian doubles; [`decode_base64_trace`] turns
//! them back into numbers.

use base64::prelude::*;
use byteorder::{LittleEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};

/// One chromatogram to extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XicDescriptor {
    /// Target m/z
    pub mz: f64,
    /// Window half-width, in `tolerance_unit`
    pub tolerance: f64,
    /// Unit identifier understood by the tool (`ppm`, `amu`, `mmu`)
    pub tolerance_unit: String,
    /// Lower retention time bound in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rt_start: Option<f64>,
    /// Upper retention time bound in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rt_end: Option<f64>,
    /// Thermo scan filter restricting which scans contribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_filter: Option<String>,
}

impl XicDescriptor {
    /// Descriptor with an explicit tolerance unit
    pub fn new(mz: f64, tolerance: f64, tolerance_unit: impl Into<String>) -> Self {
        Self {
            mz,
            tolerance,
            tolerance_unit: tolerance_unit.into(),
            rt_start: None,
            rt_end: None,
            scan_filter: None,
        }
    }

    /// Descriptor with a ppm tolerance
    pub fn ppm(mz: f64, tolerance: f64) -> Self {
        Self::new(mz, tolerance, "ppm")
    }

    /// Restrict the trace to a retention time window (minutes)
    pub fn with_rt_window(mut self, start: Option<f64>, end: Option<f64>) -> Self {
        self.rt_start = start;
        self.rt_end = end;
        self
    }

    /// Restrict contributing scans by filter string
    pub fn with_scan_filter(mut self, filter: impl Into<String>) -> Self {
        self.scan_filter = Some(filter.into());
        self
    }

    /// First numeric field that is NaN or infinite.
    ///
    /// JSON has no representation for these; `serde_json` would write `null`.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("mz", Some(self.mz)),
            ("tolerance", Some(self.tolerance)),
            ("rt_start", self.rt_start),
            ("rt_end", self.rt_end),
        ]
        .into_iter()
        .find(|(_, value)| value.map_or(false, |v| !v.is_finite()))
        .map(|(field, _)| field)
    }
}

/// Serialize descriptors into the tool's query document, preserving order.
pub fn serialize_query(descriptors: &[XicDescriptor]) -> serde_json::Result<String> {
    serde_json::to_string(descriptors)
}

/// Read a query document back into descriptors.
pub fn parse_query(text: &str) -> serde_json::Result<Vec<XicDescriptor>> {
    serde_json::from_str(text)
}

/// Errors decoding a base64 trace
#[derive(Debug, thiserror::Error)]
pub enum TraceDecodeError {
    /// Not valid base64
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    /// Byte count is not a whole number of doubles
    #[error("Trace length {0} is not a multiple of 8 bytes")]
    InvalidLength(usize),

    /// Reading the byte buffer failed
    #[error("Trace read error: {0}")]
    ReadError(#[from] std::io::Error),
}

/// Decode one `--base64` vector into little-endian `f64` values.
pub fn decode_base64_trace(encoded: &str) -> Result<Vec<f64>, TraceDecodeError> {
    let trimmed = encoded.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let bytes = BASE64_STANDARD.decode(trimmed)?;
    if bytes.len() % 8 != 0 {
        return Err(TraceDecodeError::InvalidLength(bytes.len()));
    }

    let count = bytes.len() / 8;
    let mut values = Vec::with_capacity(count);
    let mut cursor = std::io::Cursor::new(bytes);
    for _ in 0..count {
        values.push(cursor.read_f64::<LittleEndian>()?);
    }

    Ok(values)
}
