//! HTTP Header Map.
//!
//! Field names are case-insensitive and stored lowercase. Repeated fields are folded into a
//! single value separated by `", "`, in arrival order.
mod error;
mod iter;
mod map;


pub use error::HeaderError;
pub use iter::Iter;
pub use map::HeaderMap;
