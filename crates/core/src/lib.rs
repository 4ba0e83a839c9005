//! Functional core of the campusboard forum service.
//!
//! Everything in this crate is free of network I/O: the single-table key
//! codec, record shapes and their typed decode, the vote state machine, feed
//! ordering, validation, and the storage traits that the imperative shell
//! implements.

pub mod forum;
pub mod storage;
