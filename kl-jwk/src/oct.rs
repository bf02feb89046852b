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

use bherror::{
    traits::{ErrorContext as _, ForeignError as _, PropagateError as _},
    Error, Result,
};
use zeroize::Zeroize as _;

use crate::{
    error::{CryptoError, KeyDataError},
    json_object,
    key::{Jwk, KeyType, FIELD_K},
    utils::base64_url_encode,
};

/// A symmetric key: a [`Jwk`] of type `oct` holding a raw octet sequence.
///
/// A symmetric key is always private; it has no public counterpart.
#[derive(Debug, Clone)]
pub struct OctKey {
    jwk: Jwk,
}

impl TryFrom<Jwk> for OctKey {
    type Error = Error<KeyDataError>;

    fn try_from(jwk: Jwk) -> Result<Self, KeyDataError> {
        if jwk.kty() != KeyType::Oct {
            return Err(Error::root(KeyDataError::UnexpectedKeyType(
                KeyType::Oct.to_string(),
                jwk.kty().to_string(),
            )));
        }
        Ok(Self { jwk })
    }
}

impl TryFrom<&Jwk> for OctKey {
    type Error = Error<KeyDataError>;

    fn try_from(jwk: &Jwk) -> Result<Self, KeyDataError> {
        Self::try_from(jwk.clone())
    }
}

impl OctKey {
    /// Generate a fresh symmetric key with the given entropy via the
    /// cryptographic backend's secure random generator.
    ///
    /// The bit count must be a positive multiple of 8.
    pub fn generate(bits: usize) -> Result<Self, CryptoError> {
        if bits == 0 || bits % 8 != 0 {
            return Err(Error::root(CryptoError::KeyGenerationFailed))
                .ctx(|| format!("{bits} is not a positive multiple of 8"));
        }

        let mut secret = vec![0u8; bits / 8];
        openssl::rand::rand_bytes(&mut secret)
            .foreign_err(|| CryptoError::KeyGenerationFailed)?;

        let fields = json_object!({
            "kty": "oct",
            "k": base64_url_encode(&secret),
        });
        secret.zeroize();

        let jwk = Jwk::from_fields(fields).with_err(|| CryptoError::KeyGenerationFailed)?;
        Ok(Self { jwk })
    }

    /// Returns the underlying [`Jwk`].
    pub fn jwk(&self) -> &Jwk {
        &self.jwk
    }

    /// Consumes the view, returning the underlying [`Jwk`].
    pub fn into_jwk(self) -> Jwk {
        self.jwk
    }

    /// Returns the decoded secret octet sequence.
    pub fn secret_bytes(&self) -> Result<Vec<u8>, KeyDataError> {
        let secret = self.jwk.decoded_field(FIELD_K)?;
        if secret.is_empty() {
            return Err(Error::root(KeyDataError::EmptyMaterial(FIELD_K.to_string())));
        }
        Ok(secret)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use bherror::traits::ErrorContext as _;

    use super::*;

    /// Symmetric key example taken from [Appendix A.3. of RFC 7517][1].
    ///
    /// [1]: <https://datatracker.ietf.org/doc/html/rfc7517#appendix-A.3>
    pub(crate) fn rfc7517_hmac_key() -> OctKey {
        OctKey::try_from(
            Jwk::from_fields(json_object!({
                "kty": "oct",
                "k": "AyM1SysPpbyDfgZld3umj1qzKObwVMkoqQ-EstJQLr_T-1qS0gZH75aKtMN3Yj0iPS4hcgUuTwjAzZr1Z9CAow"
            }))
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn generate_produces_the_requested_entropy() {
        let key = OctKey::generate(256).unwrap();
        assert_eq!(key.jwk().size_bits().unwrap(), 256);
        assert_eq!(key.secret_bytes().unwrap().len(), 32);
        assert!(!key.jwk().is_public());
    }

    #[test]
    fn generate_rejects_partial_octets() {
        for bits in [0, 7, 100] {
            let error = OctKey::generate(bits).unwrap_err();
            assert_eq!(error.error, CryptoError::KeyGenerationFailed);
        }
    }

    #[test]
    fn secret_bytes_round_trip() {
        let key = rfc7517_hmac_key();
        assert_eq!(key.secret_bytes().unwrap().len(), 64);
        assert_eq!(key.jwk().size_bits().unwrap(), 512);
    }

    #[test]
    fn empty_secret_is_rejected() {
        let key = OctKey::try_from(
            Jwk::from_fields(json_object!({ "kty": "oct", "k": "" })).unwrap(),
        )
        .unwrap();

        let error = key
            .secret_bytes()
            .ctx(|| "reading empty key")
            .unwrap_err();
        assert_eq!(error.error, KeyDataError::EmptyMaterial("k".to_string()));
    }
}
