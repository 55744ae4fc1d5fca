//! The seat registry: every state transition in the system goes through here.
//!
//! - **`manager`** – [`SeatManager`] and its operations.
//! - **`bootstrap`** – building a manager from configuration documents.
//! - **`events`** – notifications delivered to registered listeners.
//! - **`error`** – [`SeatError`] and its stable [`ErrorKind`] names.

pub mod bootstrap;
pub mod error;
pub mod events;
pub mod manager;

pub use bootstrap::ApplyReport;
pub use error::{ErrorKind, SeatError};
pub use events::{FocusKind, ListenerId, SeatEvent, SeatEventListener};
pub use manager::{HotplugPolicy, ManagerOptions, SeatManager, UsbSeatRule, DEFAULT_SEAT_NAME};
