//! HTTP front end for usage queries

pub mod api;
pub mod config;
