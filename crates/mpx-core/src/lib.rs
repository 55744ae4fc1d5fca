//! # mpx-core
//!
//! Bookkeeping layer for multi-pointer (multi-seat) input: which seats exist,
//! which physical devices feed which seat, where each seat's cursor is, what
//! each seat has focused, and which client holds a pointer grab on it.
//!
//! This crate has no I/O.  It does not talk to a display server, open device
//! nodes or touch the filesystem; those jobs belong to the simulator
//! (`mpx-sim`) and the control tool (`mpx-ctl`).
//!
//! # Architecture overview (for beginners)
//!
//! In Wayland a *seat* is one user's bundle of input devices.  Most desktops
//! have exactly one.  With several seats, two people can use two mice on one
//! screen at the same time, each with an independent cursor and focus:
//!
//! ```text
//!   mouse1 ──► seat0 ──► cursor A, focus "terminal"
//!   mouse2 ──► aux   ──► cursor B, focus "browser"
//! ```
//!
//! - **`domain`** – The entities: `Device`, `Seat`, `Grab`, and the geometry
//!   types they use.  Plain data plus validation.
//!
//! - **`registry`** – `SeatManager`, the single owner of all entities.  Every
//!   change (creating a seat, assigning a device, routing a motion event,
//!   taking a grab) is a method call on it, and each call affects exactly one
//!   seat.
//!
//! - **`config`** – The two JSON documents (`config.json`, `devices.json`)
//!   a registry can be built from and exported back to.
//!
//! - **`status`** – A serializable snapshot of the registry for display.

pub mod config;
pub mod domain;
pub mod registry;
pub mod status;

pub use config::{
    ConfigError, DeviceMapDocument, DeviceMapping, GlobalConfig, SeatConfigDocument, SeatEntry,
};
pub use domain::device::{
    parse_usb_identifier, Capabilities, Device, DeviceId, DeviceKind, ParseDeviceKindError,
};
pub use domain::geometry::{Position, Rect};
pub use domain::grab::{ClientId, Grab, GrabMode};
pub use domain::seat::{Seat, SeatId, WindowId, DEFAULT_CURSOR_SIZE};
pub use registry::{
    ApplyReport, ErrorKind, FocusKind, HotplugPolicy, ListenerId, ManagerOptions, SeatError,
    SeatEvent, SeatEventListener, SeatManager, UsbSeatRule, DEFAULT_SEAT_NAME,
};
pub use status::{DeviceStatus, GrabStatus, SeatStatus, StatusSnapshot};
