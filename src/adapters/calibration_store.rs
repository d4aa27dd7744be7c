//! Touch calibration persistence on top of any [`StoragePort`].
//!
//! The blob lives under namespace `touch`, key `TouchCalData`.  A store
//! constructed without a backend (NVS failed to initialise) answers every
//! call with [`CalibrationError::StorageUnavailable`], which the boot path
//! treats as "acquire interactively".

use log::{info, warn};

use crate::app::ports::{CalibrationPort, StorageError, StoragePort};
use crate::error::CalibrationError;
use crate::touch::calibration::{CALIBRATION_BLOB_LEN, CalibrationBlob};

pub const CALIBRATION_NAMESPACE: &str = "touch";
pub const CALIBRATION_KEY: &str = "TouchCalData";

/// Read buffer; larger than the blob so an oversized value is detected
/// as corrupt rather than silently cut.
const READ_BUF_LEN: usize = 32;

pub struct NvsCalibrationStore<S: StoragePort> {
    storage: Option<S>,
}

impl<S: StoragePort> NvsCalibrationStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage: Some(storage),
        }
    }

    /// A store with no backend.
    pub fn unavailable() -> Self {
        warn!("calibration store: no storage backend, calibration will not persist");
        Self { storage: None }
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_some()
    }
}

impl<S: StoragePort> CalibrationPort for NvsCalibrationStore<S> {
    fn load(&self) -> Result<CalibrationBlob, CalibrationError> {
        let storage = self.storage.as_ref().ok_or(CalibrationError::StorageUnavailable)?;
        let mut buf = [0u8; READ_BUF_LEN];
        match storage.read(CALIBRATION_NAMESPACE, CALIBRATION_KEY, &mut buf) {
            Ok(len) => CalibrationBlob::from_bytes(&buf[..len]),
            Err(StorageError::NotFound) => Err(CalibrationError::NotFound),
            Err(StorageError::BufferTooSmall) => Err(CalibrationError::Corrupt { len: READ_BUF_LEN + 1 }),
            Err(e) => {
                warn!("calibration store: read failed ({})", e);
                Err(CalibrationError::StorageUnavailable)
            }
        }
    }

    fn save(&mut self, blob: &CalibrationBlob) -> Result<(), CalibrationError> {
        let storage = self.storage.as_mut().ok_or(CalibrationError::StorageUnavailable)?;
        storage
            .write(CALIBRATION_NAMESPACE, CALIBRATION_KEY, blob.as_bytes())
            .map_err(|e| {
                warn!("calibration store: write failed ({})", e);
                CalibrationError::StorageUnavailable
            })?;
        info!("calibration store: saved {} bytes", CALIBRATION_BLOB_LEN);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), CalibrationError> {
        let storage = self.storage.as_mut().ok_or(CalibrationError::StorageUnavailable)?;
        storage
            .delete(CALIBRATION_NAMESPACE, CALIBRATION_KEY)
            .map_err(|e| {
                warn!("calibration store: delete failed ({})", e);
                CalibrationError::StorageUnavailable
            })?;
        info!("calibration store: cleared");
        Ok(())
    }
}
