//! Seedling - a multi-tenant CMS for a chain of childcare nurseries
//!
//! Each nursery gets its own public content (events, newsletters, photo
//! gallery) managed by its own staff, with chain-wide administration on
//! top. This library provides the storage, service and HTTP layers.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
