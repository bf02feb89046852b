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

use bherror::{Error, Result};
use kl_jwk::{CryptoError, Jwk};
use serde::{Deserialize, Serialize};

use crate::error::{AlgorithmError, SignatureError};

/// JWS `"alg"` header parameter value for **HMAC using SHA-256**, as
/// specified in [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.2
pub const ALG_HS256: &str = "HS256";
/// JWS `"alg"` header parameter value for **HMAC using SHA-384**, as
/// specified in [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.2
pub const ALG_HS384: &str = "HS384";
/// JWS `"alg"` header parameter value for **HMAC using SHA-512**, as
/// specified in [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.2
pub const ALG_HS512: &str = "HS512";
/// JWS `"alg"` header parameter value for **EdDSA over Ed25519**, as
/// specified in [RFC8037].
///
/// [RFC8037]: https://datatracker.ietf.org/doc/html/rfc8037#section-3.1
pub const ALG_EDDSA: &str = "EdDSA";
/// JWS `"alg"` header parameter value for **ECDSA using P-256 and
/// SHA-256**, as specified in [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.1
pub const ALG_ES256: &str = "ES256";
/// JWE `"alg"` header parameter value for **ECDH-ES key agreement**, as
/// specified in [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-4.6
pub const ALG_ECDH_ES: &str = "ECDH-ES";

/// The closed set of algorithm identifiers this crate implements.
///
/// An identifier uniquely determines both the capability family of the
/// algorithm and its parameters; no two instances may claim the same token
/// with different behavior. Use [`signature_algorithm`] or
/// [`key_agreement`] to obtain the implementation behind a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgorithmId {
    /// HMAC with SHA-256.
    #[serde(rename = "HS256")]
    Hs256,
    /// HMAC with SHA-384.
    #[serde(rename = "HS384")]
    Hs384,
    /// HMAC with SHA-512.
    #[serde(rename = "HS512")]
    Hs512,
    /// EdDSA over the Ed25519 curve.
    #[serde(rename = "EdDSA")]
    EdDsa,
    /// ECDSA over P-256 with SHA-256.
    #[serde(rename = "ES256")]
    Es256,
    /// Elliptic Curve Diffie-Hellman Ephemeral-Static over X25519.
    #[serde(rename = "ECDH-ES")]
    EcdhEs,
}

impl AlgorithmId {
    /// Returns the standard `alg` token of the identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hs256 => ALG_HS256,
            Self::Hs384 => ALG_HS384,
            Self::Hs512 => ALG_HS512,
            Self::EdDsa => ALG_EDDSA,
            Self::Es256 => ALG_ES256,
            Self::EcdhEs => ALG_ECDH_ES,
        }
    }
}

impl FromStr for AlgorithmId {
    type Err = Error<AlgorithmError>;

    fn from_str(value: &str) -> Result<Self, AlgorithmError> {
        match value {
            ALG_HS256 => Ok(AlgorithmId::Hs256),
            ALG_HS384 => Ok(AlgorithmId::Hs384),
            ALG_HS512 => Ok(AlgorithmId::Hs512),
            ALG_EDDSA => Ok(AlgorithmId::EdDsa),
            ALG_ES256 => Ok(AlgorithmId::Es256),
            ALG_ECDH_ES => Ok(AlgorithmId::EcdhEs),
            _ => Err(Error::root(AlgorithmError::UnknownAlgorithm(
                value.to_string(),
            ))),
        }
    }
}

impl std::fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An algorithm bound to exactly one [`AlgorithmId`].
///
/// The binding is set at construction and immutable thereafter; dispatch
/// logic (token header inspection, allow-list enforcement) must use this
/// accessor rather than re-deriving the identifier.
pub trait Algorithm {
    /// The identifier this algorithm instance is bound to. Must be a
    /// constant function.
    fn alg_id(&self) -> AlgorithmId;
}

/// The capability of producing and verifying a short authentication tag
/// over arbitrary data.
///
/// The digest and any other parameters are fixed by the algorithm's own
/// identifier, never supplied by the caller; this forecloses algorithm
/// confusion and downgrade.
pub trait SignatureAlgorithm: Algorithm + Sync {
    /// Produce the authentication tag over exactly the given `data`.
    ///
    /// The byte sequence to sign (e.g. a JWS signing input) is constructed
    /// by the caller; this core never frames it.
    fn sign(&self, key: &Jwk, data: &[u8]) -> Result<Vec<u8>, SignatureError>;

    /// Verify the authentication tag over the given `data`.
    ///
    /// # Return
    ///
    /// `Ok(true)` if the tag is valid for the data, `Ok(false)` if it is
    /// not, and `Err(_)` when the algorithm itself is misused (wrong key
    /// type, curve or role) or the backend fails. Tag comparison is
    /// constant-time wherever the tag is deterministic.
    fn verify(&self, key: &Jwk, data: &[u8], tag: &[u8]) -> Result<bool, SignatureError>;
}

/// The capability of deriving a shared secret between two compatible keys.
pub trait KeyAgreement: Algorithm + Sync {
    /// Generate a fresh ephemeral key pair compatible with this algorithm.
    fn create_ephemeral_key(&self) -> Result<Jwk, CryptoError>;

    /// Derive the shared secret between `own` (private) and `peer`
    /// (public).
    ///
    /// Upstream encryption logic turns the secret into a content-encryption
    /// key; this core only derives it.
    fn derive_shared_secret(&self, own: &Jwk, peer: &Jwk) -> Result<Vec<u8>, CryptoError>;
}

/// Returns the [`SignatureAlgorithm`] implementation behind the given
/// identifier, if the identifier names one.
pub fn signature_algorithm(alg: AlgorithmId) -> Option<&'static dyn SignatureAlgorithm> {
    match alg {
        AlgorithmId::Hs256 => Some(&crate::hmac_sha::HS256),
        AlgorithmId::Hs384 => Some(&crate::hmac_sha::HS384),
        AlgorithmId::Hs512 => Some(&crate::hmac_sha::HS512),
        AlgorithmId::EdDsa => Some(&crate::eddsa::ED_DSA),
        AlgorithmId::Es256 => Some(&crate::ecdsa::ES256),
        AlgorithmId::EcdhEs => None,
    }
}

/// Returns the [`KeyAgreement`] implementation behind the given identifier,
/// if the identifier names one.
pub fn key_agreement(alg: AlgorithmId) -> Option<&'static dyn KeyAgreement> {
    match alg {
        AlgorithmId::EcdhEs => Some(&crate::ecdh_es::ECDH_ES),
        AlgorithmId::Hs256
        | AlgorithmId::Hs384
        | AlgorithmId::Hs512
        | AlgorithmId::EdDsa
        | AlgorithmId::Es256 => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[test]
    fn algorithm_tokens_round_trip() {
        let test_cases: &[(AlgorithmId, &str)] = &[
            (AlgorithmId::Hs256, ALG_HS256),
            (AlgorithmId::Hs384, ALG_HS384),
            (AlgorithmId::Hs512, ALG_HS512),
            (AlgorithmId::EdDsa, ALG_EDDSA),
            (AlgorithmId::Es256, ALG_ES256),
            (AlgorithmId::EcdhEs, ALG_ECDH_ES),
        ];

        for (alg, token) in test_cases {
            assert_eq!(alg.to_string(), *token);
            assert_eq!(token.parse::<AlgorithmId>().unwrap(), *alg);

            let serialized = serde_json::to_string(alg).unwrap();
            assert_eq!(serialized, format!("\"{token}\""));
            let deserialized: AlgorithmId = serde_json::from_str(&serialized).unwrap();
            assert_eq!(deserialized, *alg);
        }
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        let error = "none".parse::<AlgorithmId>().unwrap_err();
        assert_eq!(
            error.error,
            AlgorithmError::UnknownAlgorithm("none".to_string())
        );
    }

    #[test]
    fn capability_matrix_is_disjoint() {
        for alg in [
            AlgorithmId::Hs256,
            AlgorithmId::Hs384,
            AlgorithmId::Hs512,
            AlgorithmId::EdDsa,
            AlgorithmId::Es256,
        ] {
            let implementation = signature_algorithm(alg).unwrap();
            assert_eq!(implementation.alg_id(), alg);
            assert!(key_agreement(alg).is_none());
        }

        let agreement = key_agreement(AlgorithmId::EcdhEs).unwrap();
        assert_eq!(agreement.alg_id(), AlgorithmId::EcdhEs);
        assert!(signature_algorithm(AlgorithmId::EcdhEs).is_none());
    }
}
