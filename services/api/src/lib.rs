//! The GAKBBUL bookmark dashboard service: store and LLM adapters, configuration,
//! and the HTTP/WebSocket surface driving the core dashboard state machines.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
