//! Model file pair resolution.
//!
//! A network comes as a topology (the ONNX graph) and its trained weights.
//! Small models ship both in one `.onnx` file, in which case the same path
//! is given twice. Larger models keep weights in an ONNX external data file
//! whose location, relative to the graph's directory, is recorded in the
//! graph itself. ONNX Runtime follows that recorded location, so the weights
//! path given here must be exactly the file the graph points at.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ClassifyError, Result};

/// Topology and weights files of one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    /// ONNX graph file.
    pub topology: PathBuf,
    /// Trained weights: the graph file itself or its external data file.
    pub weights: PathBuf,
}

impl ModelFiles {
    pub fn new(topology: impl Into<PathBuf>, weights: impl Into<PathBuf>) -> Self {
        Self {
            topology: topology.into(),
            weights: weights.into(),
        }
    }

    /// A self-contained `.onnx` file holding graph and weights.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            topology: path.clone(),
            weights: path,
        }
    }

    /// Whether graph and weights are the same file.
    pub fn is_single_file(&self) -> bool {
        match (fs::canonicalize(&self.topology), fs::canonicalize(&self.weights)) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.topology == self.weights,
        }
    }

    /// Check that both files exist, are non-empty, and are laid out so the
    /// runtime can find the weights.
    pub fn validate(&self) -> Result<()> {
        self.check_file(&self.topology, "topology")?;
        if self.is_single_file() {
            return Ok(());
        }
        self.check_file(&self.weights, "weights")?;

        let graph = fs::read(&self.topology).map_err(|e| {
            self.error(format!("topology file {}: {e}", self.topology.display()))
        })?;
        let locations = external_data_locations(&graph);
        if locations.is_empty() {
            return Err(self.error(
                "topology holds its own weights; pass the topology file as weights",
            ));
        }

        let topology_dir = parent_dir(&self.topology);
        let weights = fs::canonicalize(&self.weights).unwrap_or_else(|_| self.weights.clone());
        let mut referenced = false;
        for location in &locations {
            let path = topology_dir.join(location);
            match fs::canonicalize(&path) {
                Ok(resolved) => referenced |= resolved == weights,
                Err(_) => {
                    return Err(self.error(format!(
                        "external data file {} referenced by the topology is missing",
                        path.display()
                    )));
                }
            }
        }
        if !referenced {
            return Err(self.error(format!(
                "weights file is not referenced by the topology (expected one of: {})",
                locations.join(", ")
            )));
        }
        Ok(())
    }

    /// Build a load error naming both files.
    pub(crate) fn error(&self, reason: impl Into<String>) -> ClassifyError {
        ClassifyError::ModelLoad {
            topology: self.topology.clone(),
            weights: self.weights.clone(),
            reason: reason.into(),
        }
    }

    fn check_file(&self, path: &Path, role: &str) -> Result<()> {
        let metadata = fs::metadata(path)
            .map_err(|e| self.error(format!("{role} file {}: {e}", path.display())))?;
        if !metadata.is_file() {
            return Err(self.error(format!("{role} path {} is not a file", path.display())));
        }
        if metadata.len() == 0 {
            return Err(self.error(format!("{role} file {} is empty", path.display())));
        }
        Ok(())
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::canonicalize(&parent).unwrap_or(parent)
}

/// Tag and payload of the `key = "location"` field of an ONNX
/// `StringStringEntryProto`, followed by the tag of its `value` field.
const LOCATION_ENTRY: &[u8] = b"\x0a\x08location\x12";

/// Distinct external data locations recorded in a serialized ONNX graph.
///
/// Scans for `external_data` entries keyed `location` rather than decoding
/// the whole model.
pub fn external_data_locations(graph: &[u8]) -> Vec<String> {
    let mut locations: Vec<String> = Vec::new();
    let mut rest = graph;
    while let Some(start) = find(rest, LOCATION_ENTRY) {
        rest = &rest[start + LOCATION_ENTRY.len()..];
        let Some((len, width)) = read_varint(rest) else {
            break;
        };
        let Some(value) = rest.get(width..width + len) else {
            break;
        };
        if let Ok(location) = std::str::from_utf8(value) {
            if !locations.iter().any(|l| l == location) {
                locations.push(location.to_string());
            }
        }
        rest = &rest[width + len..];
    }
    locations
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Decode a protobuf varint, returning the value and its encoded width.
fn read_varint(bytes: &[u8]) -> Option<(usize, usize)> {
    let mut value = 0usize;
    for (i, &b) in bytes.iter().enumerate().take(10) {
        value |= ((b & 0x7f) as usize) << (7 * i);
        if b & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}
