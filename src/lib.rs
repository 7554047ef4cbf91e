#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod notify;
pub mod sync;
pub mod view;
