//! foldmark: a markdown viewer whose headings collapse, with collapse state kept per document.
#![allow(clippy::multiple_crate_versions)]

pub mod app_state;
pub mod collapse_state;
pub mod config;
pub mod error;
pub mod formats;
pub mod heading_id;
pub mod input;
pub mod render;
pub mod section;
pub mod storage;
pub mod ui;

pub use error::{Error, Result};
