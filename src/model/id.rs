use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use data_encoding::{DecodeError, HEXLOWER};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw length in bytes of an [`Identity`] or [`ElectionId`].
pub const ID_LENGTH: usize = 32;

/// Failed to parse an identity or election id from its hex form.
#[derive(Debug, Error)]
pub enum ParseIdError {
    #[error(transparent)]
    Encoding(#[from] DecodeError),
    #[error("expected {ID_LENGTH} bytes, got {0}")]
    Length(usize),
}

macro_rules! id_newtype {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(into = "String", try_from = "String")]
        pub struct $name([u8; ID_LENGTH]);

        impl $name {
            /// Generate a fresh random value. This is the caller-side
            /// stand-in for key-pair generation, which is out of scope here.
            pub fn random(mut rng: impl RngCore + CryptoRng) -> Self {
                let mut bytes = [0u8; ID_LENGTH];
                rng.fill_bytes(&mut bytes);
                Self(bytes)
            }

            /// The raw bytes, as fed into key derivation.
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; ID_LENGTH]> for $name {
            fn from(bytes: [u8; ID_LENGTH]) -> Self {
                Self(bytes)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}", HEXLOWER.encode(&self.0))
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bytes = HEXLOWER.decode(s.as_bytes())?;
                let len = bytes.len();
                let bytes: [u8; ID_LENGTH] =
                    bytes.try_into().map_err(|_| ParseIdError::Length(len))?;
                Ok(Self(bytes))
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseIdError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.to_string()
            }
        }
    };
}

id_newtype!(
    /// A participant identity: the opaque public identifier under which an
    /// initiator, applicant, or voter acts. Authentication of the identity
    /// is the transport's job; the ledger only requires that it is stable.
    Identity
);

id_newtype!(
    /// The caller-supplied identifier of one election instance. Distinct
    /// elections share no records and no state.
    ElectionId
);
