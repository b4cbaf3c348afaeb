//! In-memory storage adapter.
//!
//! A flat byte image with EEPROM semantics: byte-addressed reads and
//! writes at fixed offsets.  Backs the simulator and every test; the
//! real board implements [`StoragePort`] over the MCU's EEPROM.

use crate::app::ports::StoragePort;
use crate::error::StorageError;

/// Size of the simulated storage area.  The settings record, its version
/// tag, and the diagnostics snapshot all fit well below this.
const STORAGE_SIZE: usize = 128;

pub struct MemStorage {
    bytes: [u8; STORAGE_SIZE],
}

impl MemStorage {
    /// Fresh storage, erased to 0xFF like real EEPROM.
    pub fn new() -> Self {
        Self {
            bytes: [0xFF; STORAGE_SIZE],
        }
    }

    /// Copy of the full image, for idempotence assertions in tests.
    pub fn snapshot(&self) -> [u8; STORAGE_SIZE] {
        self.bytes
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StoragePort for MemStorage {
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        let end = offset.checked_add(buf.len()).ok_or(StorageError::OutOfBounds)?;
        if end > STORAGE_SIZE {
            return Err(StorageError::OutOfBounds);
        }
        buf.copy_from_slice(&self.bytes[offset..end]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        let end = offset.checked_add(data.len()).ok_or(StorageError::OutOfBounds)?;
        if end > STORAGE_SIZE {
            return Err(StorageError::OutOfBounds);
        }
        self.bytes[offset..end].copy_from_slice(data);
        Ok(())
    }
}
