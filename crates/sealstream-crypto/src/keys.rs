//! 256-bit key newtypes. All of them zeroize on drop and redact in `Debug`.

use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use sealstream_core::layout::KEY_SIZE;

macro_rules! secret_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Zeroize, ZeroizeOnDrop)]
        pub struct $name {
            bytes: [u8; KEY_SIZE],
        }

        impl $name {
            pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
                Self { bytes }
            }

            pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
                &self.bytes
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("bytes", &"[REDACTED]")
                    .finish()
            }
        }
    };
}

secret_key!(
    /// Caller-supplied key that wraps every content key. Never generated here.
    MasterKey
);

secret_key!(
    /// Per-file key sealing the filename.
    NameKey
);

secret_key!(
    /// Per-file key sealing every chunk; travels only inside the sealed header.
    ContentKey
);

impl NameKey {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from_bytes(random_key(rng))
    }
}

impl ContentKey {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from_bytes(random_key(rng))
    }
}

fn random_key<R: RngCore + CryptoRng>(rng: &mut R) -> [u8; KEY_SIZE] {
    let mut bytes = [0u8; KEY_SIZE];
    rng.fill_bytes(&mut bytes);
    bytes
}
