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

//! This crate implements [JSON Web Algorithms (JWA)][1] signing and key
//! agreement over the keys of the [`kl_jwk`] crate.
//!
//! [1]: https://datatracker.ietf.org/doc/html/rfc7518
//!
//! # Details
//!
//! Every algorithm is bound to exactly one [`AlgorithmId`] and exposes its
//! capabilities through one of two traits:
//!
//! * [`SignatureAlgorithm`] -- produce/verify a short authentication tag
//!   over caller-provided bytes ([`HmacSha`] for `HS256`/`HS384`/`HS512`,
//!   [`EdDsa`], [`Es256`]);
//! * [`KeyAgreement`] -- derive a shared secret between two compatible keys
//!   ([`EcdhEs`] over X25519).
//!
//! Call sites look implementations up by identifier with
//! [`signature_algorithm`] and [`key_agreement`]; an identifier that does
//! not carry the requested capability yields `None` rather than silently
//! coercing.
//!
//! This crate frames nothing: the byte sequence being signed (e.g. a JWS
//! signing input) is constructed and parsed by the surrounding system.
//!
//! # Examples
//!
//! ## Sign and verify with a looked-up algorithm
//!
//! ```
//! use kl_jwa::signature_algorithm;
//! use kl_jwk::OctKey;
//!
//! let key = OctKey::generate(256).unwrap();
//!
//! let alg = signature_algorithm("HS256".parse().unwrap()).unwrap();
//! let tag = alg.sign(key.jwk(), b"signing input").unwrap();
//! assert!(alg.verify(key.jwk(), b"signing input", &tag).unwrap());
//! ```

mod ecdh_es;
mod ecdsa;
mod eddsa;
mod error;
mod hmac_sha;
mod traits;

pub use ecdh_es::*;
pub use ecdsa::*;
pub use eddsa::*;
pub use error::*;
pub use hmac_sha::*;
// Re-export the `kl-jwk` crate
pub use kl_jwk;
pub use traits::*;
