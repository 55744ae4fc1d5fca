//! Async input pump: feeds device events into a shared compositor.
//!
//! Input producers (one task per device, a replay file, a test) send
//! [`InputEvent`]s through an mpsc channel.  A single task drains the
//! channel and applies each event to the compositor under its mutex, so
//! events from all producers are applied one at a time in arrival order.
//!
//! A failed event is logged and counted, never fatal: one bad device must
//! not stall input for every other seat.

use std::sync::Arc;

use mpx_core::DeviceId;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use crate::compositor::VirtualCompositor;
use crate::error::SimError;

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Motion { device: DeviceId, dx: f64, dy: f64 },
    MoveTo { device: DeviceId, x: f64, y: f64 },
    Button { device: DeviceId, button: u32, pressed: bool },
    Key { device: DeviceId, key: u32, pressed: bool },
}

impl InputEvent {
    pub fn device(&self) -> &DeviceId {
        match self {
            InputEvent::Motion { device, .. }
            | InputEvent::MoveTo { device, .. }
            | InputEvent::Button { device, .. }
            | InputEvent::Key { device, .. } => device,
        }
    }

    fn apply(&self, compositor: &mut VirtualCompositor) -> Result<(), SimError> {
        match self {
            InputEvent::Motion { device, dx, dy } => {
                compositor.dispatch_pointer_motion(device, *dx, *dy)?;
            }
            InputEvent::MoveTo { device, x, y } => {
                compositor.move_pointer_to(device, *x, *y)?;
            }
            InputEvent::Button {
                device,
                button,
                pressed,
            } => {
                compositor.dispatch_pointer_button(device, *button, *pressed)?;
            }
            InputEvent::Key {
                device,
                key,
                pressed,
            } => {
                compositor.dispatch_key(device, *key, *pressed)?;
            }
        }
        Ok(())
    }
}

/// Counts reported when the pump stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub applied: u64,
    pub failed: u64,
}

pub struct InputPump {
    tx: mpsc::Sender<InputEvent>,
    task: JoinHandle<PumpStats>,
}

impl InputPump {
    /// Spawns the pump task on the current tokio runtime.
    ///
    /// `capacity` bounds the channel; senders wait when it is full.
    pub fn spawn(compositor: Arc<Mutex<VirtualCompositor>>, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<InputEvent>(capacity.max(1));

        let task = tokio::spawn(async move {
            let mut stats = PumpStats::default();
            while let Some(event) = rx.recv().await {
                let mut comp = compositor.lock().await;
                match event.apply(&mut comp) {
                    Ok(()) => {
                        stats.applied += 1;
                        debug!(device = %event.device(), "input event applied");
                    }
                    Err(e) => {
                        stats.failed += 1;
                        warn!(device = %event.device(), "input event dropped: {e}");
                    }
                }
            }
            stats
        });

        Self { tx, task }
    }

    /// A new handle for sending events into the pump.
    pub fn sender(&self) -> mpsc::Sender<InputEvent> {
        self.tx.clone()
    }

    /// Closes the pump's own sender and waits for the queue to drain.
    ///
    /// The task only finishes once every sender handed out by
    /// [`sender`](Self::sender) has been dropped as well.
    pub async fn shutdown(self) -> Result<PumpStats, JoinError> {
        drop(self.tx);
        self.task.await
    }
}
