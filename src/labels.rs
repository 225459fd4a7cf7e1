//! Class label table loading.
//!
//! Label files hold one class per line, in class-id order. Each line may
//! carry a leading token (typically a WordNet synset id) separated from the
//! name by a single space:
//!
//! ```text
//! n01440764 tench, Tinca tinca
//! n01443537 goldfish, Carassius auratus
//! ```
//!
//! Everything after the first space is kept verbatim. A line without any
//! space is taken whole.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{ClassifyError, Result};

/// Extract the class name from one line of a label file.
///
/// Returns `None` for empty lines, which are skipped by the loader.
pub fn parse_label_line(line: &str) -> Option<&str> {
    if line.is_empty() {
        return None;
    }
    Some(match line.find(' ') {
        Some(idx) => &line[idx + 1..],
        None => line,
    })
}

/// Parse every label from a reader, preserving line order.
pub fn parse_labels<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if let Some(name) = parse_label_line(&line) {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// Read the class names from a label file.
pub fn read_class_names(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|_| ClassifyError::LabelsNotFound {
        path: path.to_path_buf(),
    })?;
    let names = parse_labels(BufReader::new(file))?;
    debug!(path = %path.display(), count = names.len(), "loaded class labels");
    Ok(names)
}

/// Ordered class names, indexed by class id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    names: Vec<String>,
}

impl LabelTable {
    /// Load a label table from a file.
    pub fn load(path: &Path) -> Result<Self> {
        read_class_names(path).map(Self::from)
    }

    /// Name for a class id.
    pub fn get(&self, class_id: usize) -> Result<&str> {
        self.names
            .get(class_id)
            .map(String::as_str)
            .ok_or(ClassifyError::Lookup {
                class_id,
                labels: self.names.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl From<Vec<String>> for LabelTable {
    fn from(names: Vec<String>) -> Self {
        Self { names }
    }
}
