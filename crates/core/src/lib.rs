//! `storefront-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! errors, typed identifiers, the clock seam and the state-machine trait.

pub mod clock;
pub mod error;
pub mod id;
pub mod state;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DomainError, DomainResult};
pub use id::{CustomerId, OrderId, ProductId};
pub use state::StateMachine;
