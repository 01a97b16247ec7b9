//! Shared helpers for talking to provider APIs

pub mod http;
