//! The daily log store. The basic idea is:
//!  - There is a directory holding one JSON blob per namespace key.
//!  - Day records live under `YYYY-MM-DD` keys and are created implicitly on
//!    first write.
//!  - Totals and the displayed weight are derived on every read, never stored.

pub mod aggregate;
pub mod entities;
pub mod settings;
pub mod store;
