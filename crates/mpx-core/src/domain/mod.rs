//! Entity model for multi-seat input.
//!
//! # What lives here
//!
//! Plain records plus validation predicates, with no behaviour beyond
//! accessors:
//!
//! - **`device`** – a physical input device and its capability set.
//! - **`seat`** – one operator's cursor, focus, grab and device set.
//! - **`grab`** – an exclusive pointer claim scoped to a single seat.
//! - **`geometry`** – positions and rectangles in virtual space.
//!
//! Nothing in this module mutates anything on its own; every state transition
//! goes through [`crate::registry::SeatManager`].

pub mod device;
pub mod geometry;
pub mod grab;
pub mod seat;
