//! Ledger persistence layer
//!
//! Saves and loads a deployment (the token state plus its built-in
//! receivers) as pretty-printed JSON, with rotating backups.

use crate::contract::{ApprovalReceiver, BuiltinReceiver, ContractRegistry};
use crate::core::Address;
use crate::runtime::Runtime;
use crate::token::{Token, DECIMALS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub ledger_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".token_data"),
            ledger_file: "ledger.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Serializable form of a `Runtime`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub saved_at: DateTime<Utc>,
    pub token: Token,
    pub receivers: Vec<(Address, BuiltinReceiver)>,
    pub receiver_nonce: u64,
}

impl LedgerSnapshot {
    /// Capture the runtime; receivers without a built-in form are skipped
    pub fn capture(runtime: &Runtime) -> Self {
        let receivers = runtime.contracts().builtins();
        let skipped = runtime.contracts().count() - receivers.len();
        if skipped > 0 {
            log::warn!("{} custom receiver(s) cannot be persisted", skipped);
        }

        Self {
            saved_at: Utc::now(),
            token: runtime.token().clone(),
            receivers,
            receiver_nonce: runtime.contracts().nonce(),
        }
    }

    /// Rebuild a runtime from the snapshot
    pub fn into_runtime(self) -> Result<Runtime, StorageError> {
        if !self.token.is_conserved() {
            return Err(StorageError::InvalidData(
                "balances do not sum to total supply".to_string(),
            ));
        }
        if self.token.metadata.decimals != DECIMALS {
            return Err(StorageError::InvalidData(format!(
                "unsupported decimals {}, expected {}",
                self.token.metadata.decimals, DECIMALS
            )));
        }

        let mut contracts = ContractRegistry::with_nonce(self.receiver_nonce);
        for (address, kind) in self.receivers {
            let receiver: Rc<dyn ApprovalReceiver> = Rc::new(kind);
            contracts
                .register(address, receiver)
                .map_err(|e| StorageError::InvalidData(e.to_string()))?;
        }

        Ok(Runtime::from_parts(self.token, contracts))
    }
}

/// Ledger storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    fn ledger_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.ledger_file)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.ledger_file, index))
    }

    /// Save the runtime to disk
    pub fn save(&self, runtime: &Runtime) -> Result<(), StorageError> {
        let path = self.ledger_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        // Write to temporary file first
        let temp_path = self.config.data_dir.join("ledger.tmp");
        save_to_file(&LedgerSnapshot::capture(runtime), &temp_path)?;

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        log::debug!("Ledger saved to {:?}", path);
        Ok(())
    }

    /// Load the runtime from disk
    pub fn load(&self) -> Result<Runtime, StorageError> {
        let path = self.ledger_path();
        if !path.exists() {
            return Err(StorageError::InvalidData(
                "Ledger file not found".to_string(),
            ));
        }
        load_from_file(&path)?.into_runtime()
    }

    /// Check if a saved ledger exists
    pub fn exists(&self) -> bool {
        self.ledger_path().exists()
    }

    /// Delete the saved ledger
    pub fn delete(&self) -> Result<(), StorageError> {
        let path = self.ledger_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn rotate_backups(&self) -> Result<(), StorageError> {
        // Delete oldest backup
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        // Shift existing backups
        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }

        Ok(())
    }

    /// Restore from a backup
    pub fn restore_backup(&self, backup_index: usize) -> Result<Runtime, StorageError> {
        let backup_path = self.backup_path(backup_index);

        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }

        load_from_file(&backup_path)?.into_runtime()
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|&i| self.backup_path(i).exists())
            .collect()
    }
}

/// Write a snapshot to an arbitrary path
pub fn save_to_file(snapshot: &LedgerSnapshot, path: &Path) -> Result<(), StorageError> {
    let file = fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, snapshot)?;
    Ok(())
}

/// Read a snapshot from an arbitrary path
pub fn load_from_file(path: &Path) -> Result<LedgerSnapshot, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}
