//! sealstream-crypto: AES-256-GCM building blocks for the sealstream container
//!
//! Key hierarchy:
//! ```text
//! Master Key (256-bit, supplied by the caller)
//!   └── Content Key (per-file, random, sealed in the header)
//!       └── Chunk AEAD: AES-256-GCM (key=content_key, nonce=random_96bit, AAD=filename_ct||index_be32)
//! Name Key (per-file, random, handed back to the caller)
//!   └── Filename AEAD: AES-256-GCM (key=name_key, nonce=random_96bit, AAD=context_id)
//! ```
//!
//! The filename ciphertext doubles as the identifier token. Every later layer
//! binds to it through its AAD, so a container cannot be renamed, spliced, or
//! swapped with another file's header without failing authentication.

pub mod aad;
pub mod aead;
pub mod chunk;
pub mod header;
pub mod keys;
pub mod names;

pub use aad::{build_aad, increment_counter_suffix, ChunkAad};
pub use aead::{generate_nonce, open, seal, AuthenticationFailure};
pub use chunk::{open_chunk, seal_chunk, ChunkCodec};
pub use header::{open_header, seal_header, SealedHeader, UnsealedHeader};
pub use keys::{ContentKey, MasterKey, NameKey};
pub use names::{open_filename, seal_filename, split_prefix, IdentifierToken, SealedFilename};

pub use sealstream_core::layout::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};
