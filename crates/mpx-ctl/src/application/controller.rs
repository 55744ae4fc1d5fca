//! `SeatController`: one control-tool invocation against the stored setup.
//!
//! Every command follows the same cycle:
//!
//! 1. load `config.json` and `devices.json`,
//! 2. build a fresh `SeatManager` from them (`SeatManager::from_config`),
//! 3. perform the command on the manager,
//! 4. for commands that change state, export the manager back into the two
//!    documents and save them.
//!
//! The registry validates everything; a failed command leaves the stored
//! documents untouched.

use mpx_core::{
    ApplyReport, Device, DeviceId, DeviceMapDocument, DeviceStatus, SeatConfigDocument,
    SeatId, SeatManager, SeatStatus, StatusSnapshot,
};
use tracing::debug;

use super::DocumentRepository;
use crate::error::CtlError;

pub struct SeatController<R: DocumentRepository> {
    repository: R,
    manager: SeatManager,
    config: SeatConfigDocument,
    devices: DeviceMapDocument,
    report: ApplyReport,
}

impl<R: DocumentRepository> SeatController<R> {
    /// Loads the stored documents and builds the registry from them.
    pub fn open(repository: R) -> Result<Self, CtlError> {
        let (config, devices) = repository.load_documents()?;
        let (manager, report) = SeatManager::from_config(&config, &devices)?;
        Ok(Self {
            repository,
            manager,
            config,
            devices,
            report,
        })
    }

    pub fn manager(&self) -> &SeatManager {
        &self.manager
    }

    /// What building the registry from the stored documents did.
    pub fn apply_report(&self) -> &ApplyReport {
        &self.report
    }

    /// The documents as currently stored.
    pub fn documents(&self) -> (&SeatConfigDocument, &DeviceMapDocument) {
        (&self.config, &self.devices)
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn status(&self) -> StatusSnapshot {
        self.manager.status()
    }

    pub fn list_seats(&self) -> Vec<SeatStatus> {
        self.status().seats
    }

    pub fn list_devices(&self) -> Vec<DeviceStatus> {
        self.status().devices
    }

    // ── Commands ─────────────────────────────────────────────────────────────

    pub fn create_seat(&mut self, name: &str) -> Result<SeatId, CtlError> {
        let id = self.manager.create_seat(name)?;
        self.persist()?;
        Ok(id)
    }

    pub fn destroy_seat(&mut self, name: &str) -> Result<(), CtlError> {
        let id = self.manager.get_seat_by_name(name)?.id();
        self.manager.destroy_seat(id)?;
        self.persist()
    }

    /// Registers a device the way a hot-plugged device is handled, so a
    /// matching USB seat rule or the configured hot-plug policy decides its
    /// seat.
    ///
    /// Returns the name of the seat it landed on, if any.
    pub fn register_device(&mut self, device: Device) -> Result<Option<String>, CtlError> {
        let seat = self.manager.hotplug_device(device)?;
        let seat_name = seat
            .map(|seat| self.manager.get_seat(seat).map(|s| s.name().to_string()))
            .transpose()?;
        self.persist()?;
        Ok(seat_name)
    }

    pub fn unregister_device(&mut self, id: &str) -> Result<(), CtlError> {
        self.manager.unregister_device(&DeviceId::new(id))?;
        self.persist()
    }

    pub fn assign_device(&mut self, device: &str, seat_name: &str) -> Result<(), CtlError> {
        let seat = self.manager.get_seat_by_name(seat_name)?.id();
        self.manager.assign_device(&DeviceId::new(device), seat)?;
        self.persist()
    }

    /// Detaches a device from its seat; the device stays registered.
    ///
    /// Returns the name of the seat it was on.
    pub fn unassign_device(&mut self, device: &str) -> Result<Option<String>, CtlError> {
        let id = DeviceId::new(device);
        let previous = self.manager.seat_for_device(&id).map(|s| s.name().to_string());
        self.manager.unassign_device(&id)?;
        self.persist()?;
        Ok(previous)
    }

    fn persist(&mut self) -> Result<(), CtlError> {
        let (config, devices) = self.manager.export_config();
        self.repository.save_documents(&config, &devices)?;
        debug!(
            seats = config.seats.len(),
            mappings = devices.mappings.len(),
            "configuration persisted"
        );
        self.config = config;
        self.devices = devices;
        Ok(())
    }
}
