//! A minimal Modbus-TCP client and typed register map for Schwörer WGT ventilation and heat-pump units.

//! ## Client
//!
//! [`client::ModbusClient`] speaks exactly two requests over one lazily (re)opened TCP connection:
//!
//! - read one holding register (function code 3), and
//! - write one register through "write multiple registers" (function code 16), verified against the device's echo.
//!
//! Every send and receive is bounded by the configured timeout. A timeout or any other failure drops the
//! connection and the next call reconnects; nothing is retried internally.
//!
//! ## Traits
//!
//! The library defines
//!
//! - [`core::RegisterClient`] to abstract single-register access,
//! - [`core::HoldingRegisterMap`] to read (and write) a struct from (to) holding registers, and
//! - [`simulator::HoldingRegisterModel`] and [`simulator::Device`] to simulate a Modbus device.
//!
//! ## Derive macro
//!
//! For convenience it provides derive macros to implement the traits automatically. The derive macros depend on the `modbus` field attribute,
//! which **must** contain `addr` and **can** contain:
//! - `x` - scale factor; multiply the stored value by it to get the actual value, default `1.0`,
//! - `unit` - measurement unit of the actual value,
//! - `access` - `"r"` for read-only registers or `"rw"` (default).
//!
//! Field types have to implement [`codec::Decode`] and [`codec::Encode`].
//! The `modbus_doc` attribute is to create documentation (by adding doc attribute) from `modbus` field attributes information.
//!
//! ## WGT
//!
//! [`address`], [`enums`] and [`wgt`] describe the WGT registers and [`wgt::Wgt`] exposes them as typed values.

extern crate self as wgt_modbus;

/// Register addresses of the WGT
pub mod address;
/// Modbus-TCP client
pub mod client;
/// Utilities for encoding from and decoding to Modbus frames and registers
pub mod codec;
/// Client and device configuration
pub mod config;
/// Core traits to read from and write to Modbus registers
pub mod core;
/// Label tables of enumerated registers
pub mod enums;
mod error;
/// Transaction id bookkeeping
pub mod transaction;
/// Typed access to a WGT unit
pub mod wgt;

/// Traits and utilities to create device simulator (based on tokio-modbus [servers examples](https://github.com/slowtec/tokio-modbus/tree/main/examples))
#[cfg(feature = "simulator")]
pub mod simulator;

pub use async_trait::async_trait;
pub use client::ModbusClient;
pub use config::{ClientConfig, Config};
pub use error::{Error, Result};

pub mod derive {
    /// Re-export.
    pub use wgt_modbus_derive::{modbus_doc, HoldingRegisterMap, HoldingRegisterModel};
}
