#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

/// Defines a UUID-backed identifier newtype.
///
/// All identifiers are generated on the client, so a complete entity tree can be written
/// without waiting for the store to assign keys.
macro_rules! id {
    ($name: ident) => {
        #[derive(
            derive_more::Deref,
            derive_more::Display,
            Debug,
            Default,
            Clone,
            Copy,
            Hash,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
        )]
        pub struct $name(uuid::Uuid);

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            #[must_use]
            pub fn nil() -> Self {
                Self(uuid::Uuid::nil())
            }

            #[must_use]
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<u128> for $name {
            fn from(value: u128) -> Self {
                Self(uuid::Uuid::from_bytes(value.to_be_bytes()))
            }
        }
    };
}

mod backup;
mod category;
mod error;
mod exercise;
mod lock;
mod name;
mod reconcile;
mod service;
mod workout;

pub use backup::*;
pub use category::*;
pub use error::*;
pub use exercise::*;
pub use lock::*;
pub use name::*;
pub use reconcile::*;
pub use service::*;
pub use workout::*;
