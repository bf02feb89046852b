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
use kl_jwk::{Jwk, OkpCurve, OkpKey};
use openssl::sign::{Signer, Verifier};

use crate::{
    error::SignatureError,
    traits::{Algorithm, AlgorithmId, SignatureAlgorithm},
};

/// `EdDSA`: the Edwards-curve digital signature algorithm over Ed25519.
pub static ED_DSA: EdDsa = EdDsa;

/// Byte length of an Ed25519 signature.
const ED25519_SIGNATURE_LEN: usize = 64;

/// [`SignatureAlgorithm`] implementation supporting the `EdDSA` algorithm
/// over the Ed25519 curve, as specified in [RFC8037].
///
/// [RFC8037]: https://datatracker.ietf.org/doc/html/rfc8037#section-3.1
#[derive(Debug, Default)]
pub struct EdDsa;

impl EdDsa {
    /// Checks the variant and curve, returning the typed OKP view.
    fn signing_key(key: &Jwk) -> Result<OkpKey, SignatureError> {
        let okp = OkpKey::try_from(key)
            .with_err(|| SignatureError::WrongKeyType(key.kty().to_string()))?;
        match okp.curve() {
            Ok(OkpCurve::Ed25519) => Ok(okp),
            _ => Err(Error::root(SignatureError::WrongCurve(
                okp.curve_name().to_string(),
            ))),
        }
    }
}

impl Algorithm for EdDsa {
    fn alg_id(&self) -> AlgorithmId {
        AlgorithmId::EdDsa
    }
}

impl SignatureAlgorithm for EdDsa {
    fn sign(&self, key: &Jwk, data: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let okp = Self::signing_key(key)?;
        if key.is_public() {
            return Err(Error::root(SignatureError::PrivateKeyRequired));
        }

        let pkey = okp
            .to_private_pkey()
            .with_err(|| SignatureError::InvalidKey("unusable Ed25519 private key".to_string()))?;

        // Ed25519 is a one-shot algorithm without a separate digest step.
        let mut signer =
            Signer::new_without_digest(&pkey).foreign_err(|| SignatureError::CryptoBackend)?;
        signer
            .sign_oneshot_to_vec(data)
            .foreign_err(|| SignatureError::CryptoBackend)
    }

    fn verify(&self, key: &Jwk, data: &[u8], tag: &[u8]) -> Result<bool, SignatureError> {
        let okp = Self::signing_key(key)?;
        if tag.len() != ED25519_SIGNATURE_LEN {
            return Err(Error::root(SignatureError::MalformedSignature(format!(
                "expected {ED25519_SIGNATURE_LEN} bytes, got {}",
                tag.len()
            ))));
        }

        let pkey = okp
            .to_public_pkey()
            .with_err(|| SignatureError::InvalidKey("unusable Ed25519 public key".to_string()))?;

        let mut verifier =
            Verifier::new_without_digest(&pkey).foreign_err(|| SignatureError::CryptoBackend)?;
        verifier
            .verify_oneshot(tag, data)
            .foreign_err(|| SignatureError::CryptoBackend)
    }
}
