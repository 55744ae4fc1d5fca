//! # mpx-sim
//!
//! A headless virtual compositor for exercising the `mpx-core` seat registry
//! without a display server or real input hardware.
//!
//! # Architecture overview (for beginners)
//!
//! A real multi-seat compositor receives events from kernel input devices,
//! routes each one to the seat its device belongs to, and delivers it to
//! whichever window that seat has focused.  This crate replays the same flow
//! with synthetic parts:
//!
//! ```text
//!   VirtualDevice ──► VirtualCompositor ──► SeatManager (mpx-core)
//!                         │
//!                         └── windows: hit-testing for per-seat focus
//! ```
//!
//! - **`compositor`** – `VirtualCompositor`: windows, virtual devices, input
//!   dispatch and grab requests.  All seat state lives in its `SeatManager`.
//! - **`virtual_device`** / **`window`** – The synthetic inputs and surfaces.
//! - **`scenario`** – Scripted step lists with expectations, a runner and a
//!   built-in library (`scenario::library`).
//! - **`pump`** – A tokio task that applies events from an mpsc channel to a
//!   shared compositor.
//! - **`render`** / **`summary`** – ASCII and structured views of the state.

pub mod compositor;
pub mod error;
pub mod pump;
pub mod render;
pub mod scenario;
pub mod summary;
pub mod virtual_device;
pub mod window;

pub use compositor::{SimEvent, VirtualCompositor};
pub use error::SimError;
pub use pump::{InputEvent, InputPump, PumpStats};
pub use render::CURSOR_GLYPHS;
pub use scenario::{
    Expectation, Scenario, ScenarioOutcome, ScenarioRunner, Step, StepFailure,
};
pub use summary::{DeviceSummary, SeatSummary, StateSummary, WindowSummary};
pub use virtual_device::{standard_devices, VirtualDevice};
pub use window::Window;
