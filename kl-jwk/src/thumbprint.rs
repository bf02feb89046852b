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

//! Canonical [RFC 7638][1] JWK thumbprints.
//!
//! A thumbprint is the SHA-256 hash of the canonical JSON serialization of
//! exactly the members reported by [`Jwk::thumbprint_members`]. Use
//! [`jwk_thumbprint_bytes`] for the raw digest, or [`jwk_thumbprint`] for the
//! `base64url`-encoded string form.
//!
//! [1]: <https://www.rfc-editor.org/info/rfc7638>

use bherror::{traits::ForeignError as _, Error, Result};
use serde_json::Map;

use crate::{
    error::KeyDataError,
    key::{Jwk, JwkFields},
    utils::{base64_url_encode, sha256},
};

/// Compute the _JWK SHA-256 Thumbprint_ of the provided key, as raw bytes.
///
/// The input to the hash is the canonical JSON serialization of exactly the
/// fields named by [`Jwk::thumbprint_members`], in that fixed order, with no
/// insignificant whitespace, as per [RFC 7638][1]. In order to obtain a
/// proper thumbprint string, use [`jwk_thumbprint`].
///
/// [1]: <https://www.rfc-editor.org/info/rfc7638>
pub fn jwk_thumbprint_bytes(key: &Jwk) -> Result<[u8; 32], KeyDataError> {
    let mut canonical: JwkFields = Map::new();
    for member in key.thumbprint_members() {
        let value = key.field(member).ok_or_else(|| {
            Error::root(KeyDataError::MissingField(member.to_string()))
        })?;
        if !value.is_string() {
            return Err(Error::root(KeyDataError::MalformedField(member.to_string())));
        }
        canonical.insert(member.to_string(), value.clone());
    }

    // `serde_json`'s compact form emits members in insertion order with no
    // whitespace, which is exactly the canonical serialization.
    let serialized = serde_json::to_string(&canonical)
        .foreign_err(|| KeyDataError::ParsingFailed("JSON serialization failed".to_string()))?;

    Ok(sha256(serialized))
}

/// Compute the _JWK SHA-256 Thumbprint_ of the provided key as a
/// `base64url`-encoded string **without** padding, suitable for use as a
/// `kid` value.
pub fn jwk_thumbprint(key: &Jwk) -> Result<String, KeyDataError> {
    Ok(base64_url_encode(jwk_thumbprint_bytes(key)?))
}
