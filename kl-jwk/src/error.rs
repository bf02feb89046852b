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

/// Error in the encoding a key is imported from.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum KeyFormatError {
    /// Error that occurs when the requested import format is not one of the
    /// recognized values.
    #[strum(to_string = "Unrecognized key import format \"{0}\"")]
    UnrecognizedFormat(String),
    /// Error that occurs when an encrypted key is imported without a password.
    #[strum(to_string = "Password required to import an encrypted key")]
    MissingPassword,
    /// Error that occurs when an encrypted key is imported without an
    /// envelope decrypter.
    #[strum(to_string = "Envelope decrypter required to import an encrypted key")]
    MissingDecrypter,
    /// Error that occurs when the encrypted key envelope cannot be decrypted.
    #[strum(to_string = "Encrypted key envelope decryption failed")]
    EnvelopeDecryptionFailed,
    /// Error that occurs when the decrypted envelope payload is not a valid
    /// JWK.
    #[strum(to_string = "Decrypted key envelope does not contain a valid JWK")]
    InvalidDecryptedKey,
}

impl bherror::BhError for KeyFormatError {}

/// Error in the fields or material of a key.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum KeyDataError {
    /// Error that occurs when key parsing failed.
    #[strum(to_string = "Key parsing failed: {0}")]
    ParsingFailed(String),
    /// Error that occurs when the parsed key encoding is not a JSON object.
    #[strum(to_string = "Key encoding is not a JSON object")]
    NotAJsonObject,
    /// Error that occurs when a required key field is absent.
    #[strum(to_string = "Missing required key field \"{0}\"")]
    MissingField(String),
    /// Error that occurs when a key field is present but malformed.
    #[strum(to_string = "Malformed key field \"{0}\"")]
    MalformedField(String),
    /// Error that occurs when key material decodes to zero bytes.
    #[strum(to_string = "Empty key material in field \"{0}\"")]
    EmptyMaterial(String),
    /// Error that occurs when key material has the wrong length.
    #[strum(to_string = "Key field \"{0}\" must decode to {1} bytes, got {2}")]
    InvalidMaterialLength(String, usize, usize),
    /// Error that occurs when the `kty` value is not a recognized key type.
    #[strum(to_string = "Unsupported key type \"{0}\"")]
    UnsupportedKeyType(String),
    /// Error that occurs when a key of one type is used where another type
    /// was required.
    #[strum(to_string = "Expected a key of type \"{0}\", got \"{1}\"")]
    UnexpectedKeyType(String, String),
    /// Error that occurs when the `crv` value is not supported by the
    /// key-type variant.
    #[strum(to_string = "Unsupported curve \"{0}\"")]
    UnsupportedCurve(String),
}

impl bherror::BhError for KeyDataError {}

/// Cryptographic error raised by key operations.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum CryptoError {
    /// Error that occurs when the curve does not support the requested
    /// capability.
    #[strum(to_string = "Unsupported curve \"{0}\"")]
    UnsupportedCurve(String),
    /// Error that occurs when an operation requires a private key but the
    /// key is public.
    #[strum(to_string = "Operation requires a private key")]
    PrivateKeyRequired,
    /// Error that occurs when an operation requires a public key but the
    /// key is private.
    #[strum(to_string = "Operation requires a public key")]
    PublicKeyRequired,
    /// Error that occurs when a key has no public counterpart to extract.
    #[strum(to_string = "Key has no public counterpart")]
    NoPublicCounterpart,
    /// Error that occurs when the key material cannot be converted for the
    /// cryptographic backend.
    #[strum(to_string = "Invalid key material")]
    InvalidKeyMaterial,
    /// Error that occurs when a derived shared secret fails its length
    /// check.
    #[strum(to_string = "Shared secret must be {0} bytes, got {1}")]
    InvalidSharedSecretLength(usize, usize),
    /// Error that occurs when key generation failed.
    #[strum(to_string = "Key generation failed")]
    KeyGenerationFailed,
    /// Error that occurs when the cryptographic backend unexpectedly failed.
    #[strum(to_string = "Crypto backend failed")]
    CryptoBackend,
}

impl bherror::BhError for CryptoError {}
