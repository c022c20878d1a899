//! End-to-end flows.
//!
//! Each test builds a complete [`App`](crate::App) over the in-memory
//! adapters, a fixed clock and scripted dice, then drives it only through its
//! public use cases, the way the server binary does.
//!
//! ```bash
//! cargo test -p warbanner-engine --lib e2e_tests
//! ```

mod e2e_helpers;
mod respawn_flow_tests;
mod territory_flow_tests;

pub use e2e_helpers::*;
