//! Infrastructure layer for the control tool.
//!
//! - **`storage`** – the JSON configuration store on disk.
//! - **`output`** – plain-text rendering of command results for the terminal.
//!
//! **Dependency rule**: this layer may depend on `application`, `mpx_core`
//! and `mpx_sim`, but MUST NOT be imported by `mpx_core` or `mpx_sim`.

pub mod output;
pub mod storage;
