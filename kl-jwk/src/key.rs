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

use std::str::FromStr;

use bherror::{
    traits::{ErrorContext as _, ForeignBoxed as _, ForeignError as _, PropagateError as _},
    Error, Result,
};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{
    error::{CryptoError, KeyDataError, KeyFormatError},
    utils::{base64_url_decode, BoxError},
};

/// A JSON object holding the field mapping of a single JWK.
///
/// This is the canonical in-memory representation every other key encoding
/// round-trips through. Field insertion order is preserved.
pub type JwkFields = Map<String, Value>;

/// JWK `"kty"` parameter value for octet key pairs, as specified in
/// [RFC8037].
///
/// [RFC8037]: https://datatracker.ietf.org/doc/html/rfc8037#section-2
pub const KEY_TYPE_OKP: &str = "OKP";
/// JWK `"kty"` parameter value for elliptic curve keys, as specified in
/// [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-6.2
pub const KEY_TYPE_EC: &str = "EC";
/// JWK `"kty"` parameter value for RSA keys, as specified in [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-6.3
pub const KEY_TYPE_RSA: &str = "RSA";
/// JWK `"kty"` parameter value for symmetric keys, as specified in
/// [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-6.4
pub const KEY_TYPE_OCT: &str = "oct";

pub(crate) const FIELD_KTY: &str = "kty";
pub(crate) const FIELD_CRV: &str = "crv";
pub(crate) const FIELD_X: &str = "x";
pub(crate) const FIELD_Y: &str = "y";
pub(crate) const FIELD_D: &str = "d";
pub(crate) const FIELD_N: &str = "n";
pub(crate) const FIELD_E: &str = "e";
pub(crate) const FIELD_K: &str = "k";

/// The default key-wrapping algorithm identifier used when importing a
/// password-protected key without an explicit algorithm, as specified in
/// [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-4.8
pub const DEFAULT_KEY_WRAP_ALG: &str = "PBES2-HS256+A128KW";

/// The key-type discriminator of a [`Jwk`], one per supported JWK key
/// family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// Octet key pair holding raw Edwards/Montgomery curve coordinates.
    #[serde(rename = "OKP")]
    Okp,
    /// Elliptic curve (Weierstrass) key.
    #[serde(rename = "EC")]
    Ec,
    /// RSA key.
    #[serde(rename = "RSA")]
    Rsa,
    /// Symmetric (octet sequence) key.
    #[serde(rename = "oct")]
    Oct,
}

impl KeyType {
    /// The fields which must be present for a key of this type to be
    /// well-formed.
    pub(crate) fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Okp => &[FIELD_CRV, FIELD_X],
            Self::Ec => &[FIELD_CRV, FIELD_X, FIELD_Y],
            Self::Rsa => &[FIELD_N, FIELD_E],
            Self::Oct => &[FIELD_K],
        }
    }

    /// The field whose presence makes a key of this type private.
    pub(crate) fn secret_member(&self) -> &'static str {
        match self {
            Self::Oct => FIELD_K,
            _ => FIELD_D,
        }
    }

    /// The field holding the core key material, used for bit-length
    /// computation. The formula is per-variant; see [`Jwk::size_bits`].
    pub(crate) fn material_member(&self) -> &'static str {
        match self {
            Self::Okp | Self::Ec => FIELD_X,
            Self::Rsa => FIELD_N,
            Self::Oct => FIELD_K,
        }
    }

    /// The ordered, minimal set of fields designated by [RFC7638] (and
    /// [RFC8037] for OKP) as identity-defining for thumbprint computation.
    ///
    /// The secret member and the `kid`/`use`/`alg` metadata are excluded by
    /// the standard.
    ///
    /// [RFC7638]: https://datatracker.ietf.org/doc/html/rfc7638#section-3.2
    /// [RFC8037]: https://datatracker.ietf.org/doc/html/rfc8037#section-2
    pub fn thumbprint_members(&self) -> &'static [&'static str] {
        match self {
            Self::Okp => &[FIELD_CRV, FIELD_KTY, FIELD_X],
            Self::Ec => &[FIELD_CRV, FIELD_KTY, FIELD_X, FIELD_Y],
            Self::Rsa => &[FIELD_E, FIELD_KTY, FIELD_N],
            Self::Oct => &[FIELD_K, FIELD_KTY],
        }
    }
}

impl FromStr for KeyType {
    type Err = Error<KeyDataError>;

    fn from_str(value: &str) -> Result<Self, KeyDataError> {
        match value {
            KEY_TYPE_OKP => Ok(KeyType::Okp),
            KEY_TYPE_EC => Ok(KeyType::Ec),
            KEY_TYPE_RSA => Ok(KeyType::Rsa),
            KEY_TYPE_OCT => Ok(KeyType::Oct),
            _ => Err(Error::root(KeyDataError::UnsupportedKeyType(
                value.to_string(),
            ))),
        }
    }
}

impl std::fmt::Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            Self::Okp => KEY_TYPE_OKP,
            Self::Ec => KEY_TYPE_EC,
            Self::Rsa => KEY_TYPE_RSA,
            Self::Oct => KEY_TYPE_OCT,
        };
        f.write_str(token)
    }
}

/// Import format token for a direct field mapping.
pub const KEY_FORMAT_FIELDS: &str = "fields";
/// Import format token for a JSON-encoded field mapping.
pub const KEY_FORMAT_JSON: &str = "json";
/// Import format token for a password-protected wrapped encoding.
pub const KEY_FORMAT_ENCRYPTED: &str = "encrypted";

/// The encoding a [`Jwk`] was imported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyFormat {
    /// A direct in-memory field mapping.
    Fields,
    /// A JSON-encoded field mapping.
    Json,
    /// A password-protected wrapped (JWE) encoding whose decrypted payload
    /// is the JSON encoding.
    Encrypted,
}

impl FromStr for KeyFormat {
    type Err = Error<KeyFormatError>;

    fn from_str(value: &str) -> Result<Self, KeyFormatError> {
        match value {
            KEY_FORMAT_FIELDS => Ok(KeyFormat::Fields),
            KEY_FORMAT_JSON => Ok(KeyFormat::Json),
            KEY_FORMAT_ENCRYPTED => Ok(KeyFormat::Encrypted),
            _ => Err(Error::root(KeyFormatError::UnrecognizedFormat(
                value.to_string(),
            ))),
        }
    }
}

impl std::fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            Self::Fields => KEY_FORMAT_FIELDS,
            Self::Json => KEY_FORMAT_JSON,
            Self::Encrypted => KEY_FORMAT_ENCRYPTED,
        };
        f.write_str(token)
    }
}

/// An external backend capable of decrypting a password-protected key
/// envelope.
///
/// The key layer never depends on a JWE implementation directly; the
/// surrounding system supplies one through this interface. The decrypted
/// payload must be the JSON encoding of the key's field mapping.
pub trait EnvelopeDecrypter {
    /// Decrypts `envelope` using the given `password` and the key-wrapping
    /// algorithm identified by `wrap_alg`, returning the plaintext payload.
    fn decrypt(
        &self,
        envelope: &str,
        password: &[u8],
        wrap_alg: &str,
    ) -> std::result::Result<Vec<u8>, BoxError>;
}

/// One of the recognized key encodings, together with the inputs its import
/// requires.
///
/// This is the dispatching counterpart of [`KeyFormat`]: a [`KeyFormat`]
/// names an encoding, a `KeySource` carries the data in it.
pub enum KeySource<'a> {
    /// A direct field mapping.
    Fields(JwkFields),
    /// A JSON-encoded field mapping.
    Json(&'a str),
    /// A password-protected wrapped encoding.
    Encrypted {
        /// The wrapped envelope, e.g. a JWE compact serialization.
        envelope: &'a str,
        /// The password protecting the envelope.
        password: Option<&'a str>,
        /// The key-wrapping algorithm identifier; defaults to
        /// [`DEFAULT_KEY_WRAP_ALG`].
        wrap_alg: Option<&'a str>,
        /// The collaborator performing the envelope decryption.
        decrypter: Option<&'a dyn EnvelopeDecrypter>,
    },
}

/// A single cryptographic key in JWK form.
///
/// A `Jwk` owns its field mapping exclusively and is immutable once
/// constructed; derivations such as [`Jwk::public_key`] return a *new* key
/// and never share mutable state with the source. This makes a constructed
/// key safe to share across concurrent callers.
///
/// Two `Jwk`s represent the same cryptographic key iff their [RFC7638]
/// thumbprints match; compare them with [`Jwk::same_key`], not by raw field
/// equality.
///
/// [RFC7638]: https://datatracker.ietf.org/doc/html/rfc7638
#[derive(Clone, Deserialize)]
#[serde(try_from = "JwkFields")]
pub struct Jwk {
    kty: KeyType,
    fields: JwkFields,
    format: KeyFormat,
}

impl Jwk {
    /// Builds a key from a direct field mapping.
    ///
    /// The mapping must contain a recognized `kty` and the fields required
    /// by that key type; otherwise the import fails with [`KeyDataError`].
    pub fn from_fields(fields: JwkFields) -> Result<Self, KeyDataError> {
        Self::with_format(fields, KeyFormat::Fields)
    }

    /// Builds a key from its JSON encoding.
    pub fn from_json(json: &str) -> Result<Self, KeyDataError> {
        let value: Value = serde_json::from_str(json)
            .foreign_err(|| KeyDataError::ParsingFailed("invalid JSON".to_string()))?;
        let Value::Object(fields) = value else {
            return Err(Error::root(KeyDataError::NotAJsonObject));
        };
        Self::with_format(fields, KeyFormat::Json)
    }

    /// Builds a key from a password-protected wrapped encoding.
    ///
    /// The envelope is first decrypted through the supplied
    /// [`EnvelopeDecrypter`] using `password` and `wrap_alg` (defaulting to
    /// [`DEFAULT_KEY_WRAP_ALG`]), and the plaintext is then parsed as the
    /// JSON encoding.
    pub fn from_encrypted_json(
        envelope: &str,
        password: &str,
        wrap_alg: Option<&str>,
        decrypter: &dyn EnvelopeDecrypter,
    ) -> Result<Self, KeyFormatError> {
        let wrap_alg = wrap_alg.unwrap_or(DEFAULT_KEY_WRAP_ALG);
        let plaintext = decrypter
            .decrypt(envelope, password.as_bytes(), wrap_alg)
            .foreign_boxed_err(|| KeyFormatError::EnvelopeDecryptionFailed)
            .ctx(|| format!("unwrapping key with {wrap_alg}"))?;
        let json = String::from_utf8(plaintext)
            .foreign_err(|| KeyFormatError::InvalidDecryptedKey)?;

        let mut key =
            Self::from_json(&json).with_err(|| KeyFormatError::InvalidDecryptedKey)?;
        key.format = KeyFormat::Encrypted;
        Ok(key)
    }

    /// Builds a key from any of the recognized encodings.
    ///
    /// This is the format-dispatching constructor; the per-format
    /// constructors ([`Jwk::from_fields`], [`Jwk::from_json`],
    /// [`Jwk::from_encrypted_json`]) are preferable when the encoding is
    /// statically known. The error is type-erased since the possible error
    /// kinds differ per encoding; downcast through [`bherror::ErrorDyn`] if
    /// the kind matters.
    pub fn import(source: KeySource<'_>) -> std::result::Result<Self, bherror::ErrorDyn> {
        match source {
            KeySource::Fields(fields) => Self::from_fields(fields).map_err(Error::erased),
            KeySource::Json(json) => Self::from_json(json).map_err(Error::erased),
            KeySource::Encrypted {
                envelope,
                password,
                wrap_alg,
                decrypter,
            } => {
                let password = password.ok_or_else(|| {
                    Error::root(KeyFormatError::MissingPassword).erased()
                })?;
                let decrypter = decrypter.ok_or_else(|| {
                    Error::root(KeyFormatError::MissingDecrypter).erased()
                })?;
                Self::from_encrypted_json(envelope, password, wrap_alg, decrypter)
                    .map_err(Error::erased)
            }
        }
    }

    /// The shared validating constructor behind every import path.
    fn with_format(fields: JwkFields, format: KeyFormat) -> Result<Self, KeyDataError> {
        let kty = fields
            .get(FIELD_KTY)
            .ok_or_else(|| Error::root(KeyDataError::MissingField(FIELD_KTY.to_string())))?;
        let kty = kty
            .as_str()
            .ok_or_else(|| Error::root(KeyDataError::MalformedField(FIELD_KTY.to_string())))?
            .parse::<KeyType>()?;

        for field in kty.required_fields() {
            let value = fields.get(*field).ok_or_else(|| {
                Error::root(KeyDataError::MissingField(field.to_string()))
            })?;
            if !value.is_string() {
                return Err(Error::root(KeyDataError::MalformedField(field.to_string())));
            }
        }

        // The secret member is optional, but must be a string when present.
        if let Some(secret) = fields.get(kty.secret_member()) {
            if !secret.is_string() {
                return Err(Error::root(KeyDataError::MalformedField(
                    kty.secret_member().to_string(),
                )));
            }
        }

        Ok(Self { kty, fields, format })
    }

    /// Returns the key-type discriminator.
    pub fn kty(&self) -> KeyType {
        self.kty
    }

    /// Returns the encoding this key was imported from.
    pub fn format(&self) -> KeyFormat {
        self.format
    }

    /// Returns the value of the named field, if present.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns the named field as a string slice, if present and a string.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Returns a read-only view of the full field mapping.
    pub fn fields(&self) -> &JwkFields {
        &self.fields
    }

    /// Returns the JSON encoding of this key.
    ///
    /// Round-tripping through [`Jwk::from_json`] is lossless for all
    /// recognized fields.
    pub fn to_json(&self) -> Result<String, KeyDataError> {
        serde_json::to_string(&self.fields)
            .foreign_err(|| KeyDataError::ParsingFailed("JSON serialization failed".to_string()))
    }

    /// Returns `true` iff this key holds no secret component.
    ///
    /// This is the single authoritative public/private predicate; do not
    /// re-derive it from the field mapping elsewhere.
    pub fn is_public(&self) -> bool {
        !self.fields.contains_key(self.kty.secret_member())
    }

    /// Returns a new key holding only the public-safe subset of fields.
    ///
    /// The secret component is never included, even when called on a
    /// private key. Symmetric keys have no public counterpart and fail with
    /// [`CryptoError::NoPublicCounterpart`].
    pub fn public_key(&self) -> Result<Self, CryptoError> {
        if self.kty == KeyType::Oct {
            return Err(Error::root(CryptoError::NoPublicCounterpart));
        }

        let secret = self.kty.secret_member();
        let fields: JwkFields = self
            .fields
            .iter()
            .filter(|(name, _)| name.as_str() != secret)
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        Ok(Self {
            kty: self.kty,
            fields,
            format: self.format,
        })
    }

    /// Returns the key's bit length, computed from its core material field
    /// (`x` for OKP and EC, `n` for RSA, `k` for oct).
    pub fn size_bits(&self) -> Result<usize, KeyDataError> {
        let member = self.kty.material_member();
        let material = self.decoded_field(member)?;
        Ok(material.len() * 8)
    }

    /// Returns the ordered member names designated as identity-defining for
    /// thumbprint computation; see [`KeyType::thumbprint_members`].
    pub fn thumbprint_members(&self) -> &'static [&'static str] {
        self.kty.thumbprint_members()
    }

    /// Returns `true` iff `self` and `other` are the same cryptographic
    /// key, i.e. their [RFC7638] thumbprints match.
    ///
    /// Field insertion order and optional metadata (`kid`, `use`, `alg`) do
    /// not affect the outcome.
    ///
    /// [RFC7638]: https://datatracker.ietf.org/doc/html/rfc7638
    pub fn same_key(&self, other: &Jwk) -> Result<bool, KeyDataError> {
        let own = crate::thumbprint::jwk_thumbprint_bytes(self)?;
        let theirs = crate::thumbprint::jwk_thumbprint_bytes(other)?;
        Ok(own == theirs)
    }

    /// Fetches the named field and decodes it from base64url.
    pub(crate) fn decoded_field(&self, name: &str) -> Result<Vec<u8>, KeyDataError> {
        let value = self
            .field_str(name)
            .ok_or_else(|| Error::root(KeyDataError::MissingField(name.to_string())))?;
        base64_url_decode(value)
            .foreign_err(|| KeyDataError::MalformedField(name.to_string()))
            .ctx(|| format!("decoding field \"{name}\" from base64url"))
    }
}

impl TryFrom<JwkFields> for Jwk {
    type Error = Error<KeyDataError>;

    fn try_from(fields: JwkFields) -> Result<Self, KeyDataError> {
        Self::with_format(fields, KeyFormat::Fields)
    }
}

impl Serialize for Jwk {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

// Secret material must not leak through `Debug` output.
impl std::fmt::Debug for Jwk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secret = self.kty.secret_member();
        let mut map = f.debug_map();
        for (name, value) in &self.fields {
            if name.as_str() == secret {
                map.entry(name, &"<redacted>");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}
