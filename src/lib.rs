//! Local-first daily nutrition and fitness diary.
//! Day records live in a date-keyed local namespace and are aggregated on
//! every read; a remote backend receives best-effort mirrors of local saves.
//!

pub mod cli;
pub mod diary;
pub mod sync;
pub mod utils;
