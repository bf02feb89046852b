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
    traits::{ForeignError as _, PropagateError as _},
    Error, Result,
};
use kl_jwk::{sha256, EcKey, Jwk, KeyDataError};
use openssl::{bn::BigNum, ecdsa::EcdsaSig};

use crate::{
    error::SignatureError,
    traits::{Algorithm, AlgorithmId, SignatureAlgorithm},
};

/// `ES256`: ECDSA over the P-256 curve with SHA-256.
pub static ES256: Es256 = Es256;

/// Byte length of an `ES256` JWS signature: two 32-byte padded halves.
const ES256_SIGNATURE_LEN: usize = 64;

/// [`SignatureAlgorithm`] implementation supporting the `ES256` algorithm
/// (ECDSA using the P-256 curve and the SHA-256 hash function), as
/// specified in [RFC7518].
///
/// The signature is the JWS `r ‖ s` layout, not DER.
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.4
#[derive(Debug, Default)]
pub struct Es256;

impl Es256 {
    /// Checks the variant and curve, returning the typed EC view.
    fn signing_key(key: &Jwk) -> Result<EcKey, SignatureError> {
        EcKey::try_from(key).match_err(|source| match source {
            KeyDataError::UnsupportedCurve(curve) => SignatureError::WrongCurve(curve.clone()),
            _ => SignatureError::WrongKeyType(key.kty().to_string()),
        })
    }
}

impl Algorithm for Es256 {
    fn alg_id(&self) -> AlgorithmId {
        AlgorithmId::Es256
    }
}

impl SignatureAlgorithm for Es256 {
    fn sign(&self, key: &Jwk, data: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let ec = Self::signing_key(key)?;
        if key.is_public() {
            return Err(Error::root(SignatureError::PrivateKeyRequired));
        }
        let private = ec
            .to_private_ec()
            .with_err(|| SignatureError::InvalidKey("unusable P-256 private key".to_string()))?;

        let digest = sha256(data);
        let signature = EcdsaSig::sign(&digest, private.as_ref())
            .foreign_err(|| SignatureError::CryptoBackend)?;

        // The unwraps are safe, as we've requested vectors of the exact
        // same size as the arrays.
        let r: Box<[u8; 32]> = signature
            .r()
            .to_vec_padded(32)
            .foreign_err(|| SignatureError::CryptoBackend)?
            .try_into()
            .unwrap();
        let s: Box<[u8; 32]> = signature
            .s()
            .to_vec_padded(32)
            .foreign_err(|| SignatureError::CryptoBackend)?
            .try_into()
            .unwrap();

        let mut jws = (r as Box<[_]>).into_vec();
        jws.extend_from_slice(&*s);
        Ok(jws)
    }

    fn verify(&self, key: &Jwk, data: &[u8], tag: &[u8]) -> Result<bool, SignatureError> {
        let ec = Self::signing_key(key)?;
        if tag.len() != ES256_SIGNATURE_LEN {
            return Err(Error::root(SignatureError::MalformedSignature(format!(
                "expected {ES256_SIGNATURE_LEN} bytes, got {}",
                tag.len()
            ))));
        }

        let (r, s) = tag.split_at(32);
        let r = BigNum::from_slice(r).foreign_err(|| SignatureError::CryptoBackend)?;
        let s = BigNum::from_slice(s).foreign_err(|| SignatureError::CryptoBackend)?;
        let ecdsa_sig = EcdsaSig::from_private_components(r, s)
            .foreign_err(|| SignatureError::CryptoBackend)?;

        let public = ec
            .to_public_ec()
            .with_err(|| SignatureError::InvalidKey("unusable P-256 public key".to_string()))?;

        let digest = sha256(data);
        ecdsa_sig
            .verify(&digest, public.as_ref())
            .foreign_err(|| SignatureError::CryptoBackend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_setup() -> (Jwk, Jwk, Vec<u8>) {
        let private = kl_jwk::EcKey::generate().unwrap().into_jwk();
        let public = private.public_key().unwrap();
        let tag = ES256.sign(&private, b"Test message to be signed").unwrap();
        (private, public, tag)
    }

    #[test]
    fn sign_verify_round_trip() {
        let (_, public, tag) = signed_setup();
        assert_eq!(tag.len(), ES256_SIGNATURE_LEN);
        assert!(ES256
            .verify(&public, b"Test message to be signed", &tag)
            .unwrap());
    }

    #[test]
    fn tampered_tags_verify_false() {
        let (_, public, mut tag) = signed_setup();
        tag[40] ^= 0x01;
        assert!(!ES256
            .verify(&public, b"Test message to be signed", &tag)
            .unwrap());
    }

    #[test]
    fn mis_sized_tags_are_malformed_not_false() {
        let (_, public, tag) = signed_setup();
        let error = ES256
            .verify(&public, b"Test message to be signed", &tag[..40])
            .unwrap_err();
        assert!(matches!(error.error, SignatureError::MalformedSignature(_)));
    }

    #[test]
    fn signing_requires_a_private_key() {
        let (_, public, _) = signed_setup();
        let error = ES256.sign(&public, b"payload").unwrap_err();
        assert_eq!(error.error, SignatureError::PrivateKeyRequired);
    }

    #[test]
    fn wrong_variants_and_curves_are_rejected() {
        let okp = kl_jwk::OkpKey::generate(kl_jwk::OkpCurve::Ed25519)
            .unwrap()
            .into_jwk();
        let error = ES256.sign(&okp, b"payload").unwrap_err();
        assert_eq!(error.error, SignatureError::WrongKeyType("OKP".to_string()));

        let p384 = Jwk::from_fields(kl_jwk::json_object!({
            "kty": "EC",
            "crv": "P-384",
            "x": "MKBCTNIcKUSDii11ySs3526iDZ8AiTo7Tu6KPAqv7D4",
            "y": "4Etl6SRW2YiLUrN5vfvVHuhp7x8PxltmWWlbbM4IFyM"
        }))
        .unwrap();
        let error = ES256.sign(&p384, b"payload").unwrap_err();
        assert_eq!(error.error, SignatureError::WrongCurve("P-384".to_string()));
    }
}
