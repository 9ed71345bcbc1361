//! Disk persistence for blocks (one JSON file per block).

use std::fs;
use std::path::PathBuf;

use super::BlockStore;
use crate::blockchain::Block;
use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn block_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("block_{index}.json"))
    }
}

impl BlockStore for JsonFileStore {
    /// Read every `*.json` file in the directory, sorted by block index.
    /// A missing directory is an empty store.
    fn load(&self) -> Result<Vec<Block>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let raw = fs::read_to_string(&path)?;
            let block = serde_json::from_str::<Block>(&raw)
                .map_err(|source| StoreError::Decode { path, source })?;
            out.push(block);
        }
        out.sort_by_key(|b| b.index);
        Ok(out)
    }

    /// Write `block_<index>.json` through a temp file renamed into place.
    fn save(&mut self, block: &Block) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(block).map_err(StoreError::Encode)?;
        let path = self.block_path(block.index);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
