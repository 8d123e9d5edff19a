//! Shopping cart state machine.
//!
//! This crate contains the cart rules (line-item merge by identity, quantity
//! updates, derived total), implemented purely as deterministic domain logic
//! (no IO, no HTTP, no storage).

pub mod cart;
pub mod product;

pub use cart::{Cart, CartCommand, LineItem};
pub use product::Product;
