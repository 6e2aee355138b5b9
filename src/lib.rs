//! tagsync
//!
//! Discovers AWS resources carrying a tag and mirrors them into LeanIX as
//! IT Component fact sheets linked to one Application.
//!
//! - [`discovery`] - where resources come from
//! - [`catalog`] - the LeanIX protocol (token, lookup, create, relate)
//! - [`sync`] - the batch run
//! - [`report`] - what a run returns

pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod report;
pub mod sync;

pub use error::{Result, SyncError};
