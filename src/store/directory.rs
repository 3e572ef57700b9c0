use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use crate::config::space::MAX_DIMENSION;
use crate::space::types::{Space, SpaceId};

/// Read-only lookup of a space's bounds by id.
pub trait SpaceDirectory: Send + Sync {
    fn get_space(&self, space_id: &str) -> Option<Space>;
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed spaces file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("space '{id}': {reason}")]
    InvalidSpace { id: String, reason: String },
}

/// One entry of the seed file. Either `dimensions: "WxH"` or `width` + `height`.
#[derive(Debug, Clone, Deserialize)]
pub struct SpaceRecord {
    pub id: SpaceId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dimensions: Option<String>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
}

impl SpaceRecord {
    fn into_space(self) -> Result<Space, DirectoryError> {
        let invalid = |reason: &str| DirectoryError::InvalidSpace {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.id.trim().is_empty() {
            return Err(invalid("empty id"));
        }
        let (width, height) = match (&self.dimensions, self.width, self.height) {
            (Some(dims), _, _) => parse_dimensions(dims).ok_or_else(|| invalid("dimensions must look like WxH"))?,
            (None, Some(w), Some(h)) => (w, h),
            _ => return Err(invalid("missing dimensions")),
        };
        if !(1..=MAX_DIMENSION).contains(&width) || !(1..=MAX_DIMENSION).contains(&height) {
            return Err(invalid("width and height must be between 1 and 9999"));
        }
        Ok(Space::new(self.id, width, height))
    }
}

/// Parse the store's `WxH` format (1 to 4 digits per side).
pub fn parse_dimensions(raw: &str) -> Option<(i64, i64)> {
    let (w, h) = raw.trim().split_once('x')?;
    let side = |s: &str| {
        if (1..=4).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit()) {
            s.parse::<i64>().ok()
        } else {
            None
        }
    };
    Some((side(w)?, side(h)?))
}

/// Thread-safe in-process copy of the store's spaces.
#[derive(Default)]
pub struct InMemorySpaceDirectory {
    spaces: RwLock<HashMap<SpaceId, Space>>,
}

impl InMemorySpaceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, DirectoryError> {
        let records: Vec<SpaceRecord> = serde_json::from_str(json)?;
        let directory = Self::new();
        for record in records {
            directory.insert(record)?;
        }
        Ok(directory)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, DirectoryError> {
        let json = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let directory = Self::from_json_str(&json)?;
        info!("[Directory] Loaded {} spaces from {}", directory.len(), path.display());
        Ok(directory)
    }

    /// Validate and store a record, replacing any space with the same id.
    pub fn insert(&self, record: SpaceRecord) -> Result<Space, DirectoryError> {
        let name = record.name.clone().unwrap_or_default();
        let space = record.into_space()?;
        debug!("[Directory] Stored space {} '{}' ({}x{})", space.id, name, space.width, space.height);
        let mut spaces = self.spaces.write().unwrap_or_else(|e| e.into_inner());
        spaces.insert(space.id.clone(), space.clone());
        Ok(space)
    }

    pub fn len(&self) -> usize {
        self.spaces.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SpaceDirectory for InMemorySpaceDirectory {
    fn get_space(&self, space_id: &str) -> Option<Space> {
        let spaces = self.spaces.read().unwrap_or_else(|e| e.into_inner());
        spaces.get(space_id).cloned()
    }
}
