#![doc = include_str!("../README.md")]
#![cfg_attr(feature = "doc_cfg", feature(doc_cfg))]
// If this was in Cargo.toml, it would cover the demos as well
#![warn(
    missing_docs,
    clippy::panic_in_result_fn,
    clippy::missing_assert_message,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

#[cfg(not(unix))]
compile_error!("localpoll only supports Unix-like platforms");

#[macro_use]
mod macros;

mod c_wrappers;

pub mod address;
pub mod endpoint;
pub mod error;
pub mod options;
pub mod poll;
pub mod socket;
pub mod sys;

pub use {
    address::{LocalAddress, MAX_PATH_LEN},
    endpoint::Endpoint,
    error::AddressError,
    options::{AcceptorOptions, ConnectorOptions, DEFAULT_BACKLOG},
    poll::{Events, Interest, Poller},
    socket::{Acceptor, Connector, LocalSocket},
    sys::{is_would_block, Attempt, WouldBlockExt},
};

#[cfg(test)]
#[path = "../tests/index.rs"]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects, clippy::indexing_slicing)]
mod tests;
