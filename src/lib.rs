//! Client-side sorting for the Mystic scouts' log.
//!
//! A [`session::Session`] watches the host document for the table to be
//! (re)rendered, snapshots its rows, orders them under one of six sort keys
//! and writes the order back onto the page.

pub mod boot;
pub mod comparator;
pub mod controller;
pub mod dom;
pub mod domain;
pub mod host;
pub mod loader;
pub mod panel;
pub mod reproject;
pub mod row;
pub mod session;
pub mod state;
pub mod watcher;

pub use comparator::{SortDirection, SortKey};
pub use domain::{MSError, Message, SortConfig};
pub use session::Session;
