//! Application layer use cases for the control tool.
//!
//! - **`controller`** – `SeatController`: loads the configuration documents,
//!   builds a `SeatManager` from them, performs one command, and writes the
//!   resulting documents back for commands that change something.
//! - **`simulate`** – runs the built-in scenario library.
//!
//! Nothing here touches the filesystem directly.  Loading and saving go
//! through the [`DocumentRepository`] trait, implemented by the JSON store in
//! `infrastructure::storage`.

pub mod controller;
pub mod simulate;

use mpx_core::{DeviceMapDocument, SeatConfigDocument};

use crate::error::CtlError;

/// Where the two configuration documents are kept.
pub trait DocumentRepository {
    fn load_documents(&self) -> Result<(SeatConfigDocument, DeviceMapDocument), CtlError>;

    fn save_documents(
        &self,
        config: &SeatConfigDocument,
        devices: &DeviceMapDocument,
    ) -> Result<(), CtlError>;
}
