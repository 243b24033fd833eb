//! sealstream-pipeline: streaming driver for the sealstream container
//!
//! Encrypt: source → fixed-size chunks → seal → sink, one chunk in flight.
//! Decrypt: source → records → verify → emit plaintext, failing fast on the
//! first record that does not authenticate.
//!
//! Both directions await every sink write before reading the next chunk, so
//! memory stays bounded by a single chunk regardless of stream length.

pub mod decrypt;
pub mod encrypt;
mod io;
pub mod progress;

pub use decrypt::{decrypt, DecryptedFile};
pub use encrypt::{encrypt, encrypt_with_rng, EncryptedFile};
pub use progress::{ProgressFn, ProgressTracker};

pub use sealstream_core::{SealError, SealResult, Segment, StreamConfig};
pub use sealstream_crypto::{IdentifierToken, MasterKey, NameKey};
