//! Employee Churn Prediction Service Library

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod schema;
pub mod service;
pub mod storage;

pub use config::Config;
