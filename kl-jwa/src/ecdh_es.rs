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

use bherror::{traits::PropagateError as _, Result};
use kl_jwk::{CryptoError, Jwk, OkpCurve, OkpKey};

use crate::traits::{Algorithm, AlgorithmId, KeyAgreement};

/// `ECDH-ES`: Ephemeral-Static Diffie-Hellman key agreement over X25519.
pub static ECDH_ES: EcdhEs = EcdhEs;

/// [`KeyAgreement`] implementation supporting the `ECDH-ES` algorithm over
/// the X25519 curve, as specified in [RFC8037].
///
/// The derived secret is the raw Diffie-Hellman output; turning it into a
/// content-encryption key (e.g. via Concat KDF) is the caller's concern.
///
/// [RFC8037]: https://datatracker.ietf.org/doc/html/rfc8037#section-3.2
#[derive(Debug, Default)]
pub struct EcdhEs;

impl Algorithm for EcdhEs {
    fn alg_id(&self) -> AlgorithmId {
        AlgorithmId::EcdhEs
    }
}

impl KeyAgreement for EcdhEs {
    fn create_ephemeral_key(&self) -> Result<Jwk, CryptoError> {
        Ok(OkpKey::generate(OkpCurve::X25519)?.into_jwk())
    }

    fn derive_shared_secret(&self, own: &Jwk, peer: &Jwk) -> Result<Vec<u8>, CryptoError> {
        let own = OkpKey::try_from(own).with_err(|| CryptoError::InvalidKeyMaterial)?;
        let peer = OkpKey::try_from(peer).with_err(|| CryptoError::InvalidKeyMaterial)?;
        own.derive_shared_secret(&peer)
    }
}
