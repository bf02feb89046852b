// Copyright (C) 2020-2026  Keyline Tech Ltd.
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! This crate provides types for representing and converting [JSON Web
//! Keys (JWK)][1].
//!
//! [1]: https://datatracker.ietf.org/doc/html/rfc7517
//!
//! # Details
//!
//! The central type is [`Jwk`], the polymorphic representation of a single
//! cryptographic key. A `Jwk` is built from one of three encodings — a
//! direct field mapping, JSON, or a password-protected wrapped envelope
//! (see [`KeySource`] and [`EnvelopeDecrypter`]) — and is immutable once
//! constructed.
//!
//! Each supported key family has a typed view over the `Jwk` which scopes
//! the family-specific operations to that variant:
//!
//! * [`OkpKey`] -- octet key pairs on the Ed25519 (signing) and X25519
//!   (key agreement) curves, per [RFC 8037][2];
//! * [`EcKey`] -- elliptic curve keys on P-256;
//! * [`RsaKey`] -- RSA keys;
//! * [`OctKey`] -- symmetric keys.
//!
//! Canonical [RFC 7638][3] thumbprints are computed by the [`thumbprint`]
//! module over exactly the members reported by [`Jwk::thumbprint_members`];
//! thumbprint equality is the key-identity contract (see [`Jwk::same_key`]).
//!
//! [2]: https://datatracker.ietf.org/doc/html/rfc8037
//! [3]: https://datatracker.ietf.org/doc/html/rfc7638
//!
//! # Examples
//!
//! ## Derive a shared secret between two agreement keys
//!
//! ```
//! use kl_jwk::{OkpCurve, OkpKey};
//!
//! // Our long-term agreement key, and a fresh ephemeral key for the peer.
//! let own = OkpKey::generate(OkpCurve::X25519).unwrap();
//! let peer = own.create_ephemeral_key().unwrap();
//!
//! // Only the peer's public half crosses the wire.
//! let peer_public = OkpKey::try_from(peer.jwk().public_key().unwrap()).unwrap();
//!
//! let shared_secret = own.derive_shared_secret(&peer_public).unwrap();
//! assert_eq!(shared_secret.len(), kl_jwk::SHARED_SECRET_LEN);
//! ```

mod ec;
mod error;
mod key;
mod oct;
mod okp;
mod rsa;
pub mod thumbprint;
mod utils;

pub use ec::*;
pub use error::*;
pub use key::*;
pub use oct::*;
pub use okp::*;
pub use rsa::*;
pub use utils::*;

/// Helper macro with the same syntax as [`serde_json::json`] specialized for
/// constructing JSON objects.
///
/// It will construct a more specific type ([`serde_json::Map<String,Value>`](serde_json::Map))
/// than just [`serde_json::Value`] when constructing an object, and panic if
/// the syntax is valid JSON but not an object.
#[macro_export]
macro_rules! json_object {
    ($stuff:tt) => {
        match ::serde_json::json!($stuff) {
            ::serde_json::Value::Object(o) => o,
            _ => unreachable!("JSON literal wasn't an object"),
        }
    };
}
