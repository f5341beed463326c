#![forbid(unsafe_code)]
//! sluice-io: streaming decoders and encoders.
//!
//! A [`Decoder`] turns pushed bytes into typed [`Batch`]es; an [`Encoder`]
//! renders batches into an output [`ByteBuffer`]. The CSV decoder infers
//! column kinds from its first batch of rows and then parses straight into
//! typed columns.
//!
//! [`Batch`]: sluice_core::batch::Batch
//! [`ByteBuffer`]: sluice_mem::ByteBuffer

pub mod codec;
pub mod csv;
pub mod error;

pub use codec::{Decoder, Encoder};
pub use error::{Error, Result};
