//! HTTP API

pub mod dto;
pub mod rest;
