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

/// Error in algorithm identification.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum AlgorithmError {
    /// Error that occurs when an `alg` token does not name a known
    /// algorithm.
    #[strum(to_string = "Unknown algorithm \"{0}\"")]
    UnknownAlgorithm(String),
}

impl bherror::BhError for AlgorithmError {}

/// Error raised by signature algorithms.
///
/// A non-matching tag is **not** an error; `verify` reports it as
/// `Ok(false)`. These variants cover misuse of the algorithm itself.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum SignatureError {
    /// Error that occurs when the key's type does not fit the algorithm.
    #[strum(to_string = "Wrong key type for this algorithm: {0}")]
    WrongKeyType(String),
    /// Error that occurs when the key's curve does not fit the algorithm.
    #[strum(to_string = "Wrong curve for this algorithm: {0}")]
    WrongCurve(String),
    /// Error that occurs when signing requires a private key but the key is
    /// public.
    #[strum(to_string = "Signing requires a private key")]
    PrivateKeyRequired,
    /// Error that occurs when the key material is below the minimum the
    /// standard requires for the algorithm.
    #[strum(to_string = "Key is too weak for this algorithm: {0}")]
    WeakKey(String),
    /// Error that occurs when the key material cannot be read for this
    /// algorithm.
    #[strum(to_string = "Invalid key for this algorithm: {0}")]
    InvalidKey(String),
    /// Error that occurs when a signature has an impossible shape for the
    /// algorithm, e.g. the wrong length.
    #[strum(to_string = "Malformed signature: {0}")]
    MalformedSignature(String),
    /// Error that occurs when the cryptographic backend unexpectedly failed.
    #[strum(to_string = "Crypto backend failed")]
    CryptoBackend,
}

impl bherror::BhError for SignatureError {}
