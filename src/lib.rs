//! Bookstock application library.
//!
//! Holds the application modules mounted by the server binary.

pub mod modules;
