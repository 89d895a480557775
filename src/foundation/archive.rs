use serde::{Serialize, de::DeserializeOwned};

use crate::foundation::error::{CameraError, CameraResult};

/// Direction of a [`StateArchive`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveMode {
    Saving,
    Loading,
}

/// Ordered, bidirectional state archive.
///
/// The same `serialize` call sequence is used to save and to load, so callers describe their
/// state layout once. Each call stores or consumes one JSON record.
#[derive(Clone, Debug)]
pub struct StateArchive {
    mode: ArchiveMode,
    records: Vec<serde_json::Value>,
    cursor: usize,
}

impl StateArchive {
    pub fn saving() -> Self {
        Self {
            mode: ArchiveMode::Saving,
            records: Vec::new(),
            cursor: 0,
        }
    }

    pub fn loading(records: Vec<serde_json::Value>) -> Self {
        Self {
            mode: ArchiveMode::Loading,
            records,
            cursor: 0,
        }
    }

    /// Turn a saved archive into a loading one over the same records.
    pub fn into_loading(self) -> Self {
        Self::loading(self.records)
    }

    pub fn from_json_str(s: &str) -> CameraResult<Self> {
        let records: Vec<serde_json::Value> = serde_json::from_str(s)?;
        Ok(Self::loading(records))
    }

    pub fn to_json_string(&self) -> CameraResult<String> {
        Ok(serde_json::to_string(&self.records)?)
    }

    pub fn mode(&self) -> ArchiveMode {
        self.mode
    }

    pub fn is_saving(&self) -> bool {
        self.mode == ArchiveMode::Saving
    }

    pub fn is_loading(&self) -> bool {
        self.mode == ArchiveMode::Loading
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Save `value`, or overwrite it with the next record when loading.
    pub fn serialize<T>(&mut self, value: &mut T) -> CameraResult<()>
    where
        T: Serialize + DeserializeOwned,
    {
        match self.mode {
            ArchiveMode::Saving => {
                self.records.push(serde_json::to_value(&*value)?);
            }
            ArchiveMode::Loading => {
                let record = self.records.get(self.cursor).ok_or_else(|| {
                    CameraError::state(format!("archive exhausted at record {}", self.cursor))
                })?;
                *value = T::deserialize(record)?;
                self.cursor += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/archive.rs"]
mod tests;
