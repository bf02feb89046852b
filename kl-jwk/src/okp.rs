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
    traits::{ForeignError as _, PropagateError as _},
    Error, Result,
};
use openssl::{
    derive::Deriver,
    pkey::{Id, PKey, Private, Public},
};
use zeroize::Zeroize as _;

use crate::{
    error::{CryptoError, KeyDataError},
    json_object,
    key::{Jwk, KeyType, FIELD_CRV, FIELD_D, FIELD_X},
    utils::{base64_url_encode, constant_time_eq},
};

/// JWK `"crv"` parameter value for the **Ed25519** signing curve, as
/// specified in [RFC8037].
///
/// [RFC8037]: https://datatracker.ietf.org/doc/html/rfc8037#section-3.1
pub const OKP_CURVE_ED25519: &str = "Ed25519";
/// JWK `"crv"` parameter value for the **X25519** key-agreement curve, as
/// specified in [RFC8037].
///
/// [RFC8037]: https://datatracker.ietf.org/doc/html/rfc8037#section-3.2
pub const OKP_CURVE_X25519: &str = "X25519";

/// The curve designated for key agreement. A future agreement curve must
/// not be accepted without an explicit compatibility decision here; see
/// [`OkpKey::is_on_same_curve`].
const AGREEMENT_CURVE: &str = OKP_CURVE_X25519;

/// Byte length of a single coordinate or scalar on either supported curve.
pub const OKP_MATERIAL_LEN: usize = 32;

/// The fixed byte length of an X25519 shared secret.
pub const SHARED_SECRET_LEN: usize = 32;

/// A curve supported by the octet-key-pair variant.
///
/// The curve determines which capability the key supports: [`Ed25519`]
/// keys sign, [`X25519`] keys perform key agreement. There is no overlap.
///
/// [`Ed25519`]: OkpCurve::Ed25519
/// [`X25519`]: OkpCurve::X25519
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OkpCurve {
    /// The Edwards signing curve.
    Ed25519,
    /// The Montgomery key-agreement curve.
    X25519,
}

impl OkpCurve {
    /// Returns the JWK `"crv"` value of the curve.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519 => OKP_CURVE_ED25519,
            Self::X25519 => OKP_CURVE_X25519,
        }
    }

    fn pkey_id(&self) -> Id {
        match self {
            Self::Ed25519 => Id::ED25519,
            Self::X25519 => Id::X25519,
        }
    }
}

impl FromStr for OkpCurve {
    type Err = Error<KeyDataError>;

    fn from_str(value: &str) -> Result<Self, KeyDataError> {
        match value {
            OKP_CURVE_ED25519 => Ok(OkpCurve::Ed25519),
            OKP_CURVE_X25519 => Ok(OkpCurve::X25519),
            _ => Err(Error::root(KeyDataError::UnsupportedCurve(
                value.to_string(),
            ))),
        }
    }
}

impl std::fmt::Display for OkpCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An octet key pair: a [`Jwk`] of type `OKP` holding raw Edwards or
/// Montgomery curve coordinates.
///
/// This typed view scopes the curve capability methods to the variant;
/// obtain one with `TryFrom` over a [`Jwk`].
#[derive(Debug, Clone)]
pub struct OkpKey {
    jwk: Jwk,
}

impl TryFrom<Jwk> for OkpKey {
    type Error = Error<KeyDataError>;

    fn try_from(jwk: Jwk) -> Result<Self, KeyDataError> {
        if jwk.kty() != KeyType::Okp {
            return Err(Error::root(KeyDataError::UnexpectedKeyType(
                KeyType::Okp.to_string(),
                jwk.kty().to_string(),
            )));
        }
        Ok(Self { jwk })
    }
}

impl TryFrom<&Jwk> for OkpKey {
    type Error = Error<KeyDataError>;

    fn try_from(jwk: &Jwk) -> Result<Self, KeyDataError> {
        Self::try_from(jwk.clone())
    }
}

impl OkpKey {
    /// Generate a fresh key pair on the given curve via the cryptographic
    /// backend's secure key-generation routine.
    pub fn generate(curve: OkpCurve) -> Result<Self, CryptoError> {
        let pkey = match curve {
            OkpCurve::Ed25519 => PKey::generate_ed25519(),
            OkpCurve::X25519 => PKey::generate_x25519(),
        }
        .foreign_err(|| CryptoError::KeyGenerationFailed)?;

        let x = pkey
            .raw_public_key()
            .foreign_err(|| CryptoError::CryptoBackend)?;
        let mut d = pkey
            .raw_private_key()
            .foreign_err(|| CryptoError::CryptoBackend)?;

        let fields = json_object!({
            "kty": "OKP",
            "crv": curve.as_str(),
            "x": base64_url_encode(&x),
            "d": base64_url_encode(&d),
        });
        d.zeroize();

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

    /// Returns the raw `crv` field of the key.
    pub fn curve_name(&self) -> &str {
        // The unwrap is safe because `crv` is a required OKP field, checked
        // at construction.
        self.jwk.field_str(FIELD_CRV).unwrap()
    }

    /// Returns the parsed curve of the key.
    pub fn curve(&self) -> Result<OkpCurve, KeyDataError> {
        self.curve_name().parse()
    }

    /// Returns `true` iff `other` is also an octet key pair, declares the
    /// same curve as this key, and that curve is the designated agreement
    /// curve.
    ///
    /// Curve names are compared exactly, in constant time; a differing
    /// variant or curve is "not the same curve family", never an error.
    /// Both comparisons are kept separate on purpose: two keys sharing some
    /// future curve name must not pass until that curve is explicitly
    /// designated for agreement.
    pub fn is_on_same_curve(&self, other: &Jwk) -> bool {
        if other.kty() != KeyType::Okp {
            return false;
        }
        let Some(other_curve) = other.field_str(FIELD_CRV) else {
            return false;
        };
        let own_curve = self.curve_name();

        // Evaluate both comparisons unconditionally to keep the timing
        // profile independent of where a mismatch occurs.
        let same_curve = constant_time_eq(own_curve.as_bytes(), other_curve.as_bytes());
        let agreement_curve = constant_time_eq(own_curve.as_bytes(), AGREEMENT_CURVE.as_bytes());
        same_curve & agreement_curve
    }

    /// Converts the key into the exact byte layout expected by the
    /// cryptographic backend for its curve.
    ///
    /// For a private Ed25519 key this is the dense `secret ‖ public`
    /// packing (never the secret alone); for a private X25519 key it is the
    /// 32-byte secret scalar. A public key yields its public coordinate.
    /// Either component being empty or mis-sized is a data error.
    pub fn to_raw_key_material(&self) -> Result<Vec<u8>, KeyDataError> {
        let curve: OkpCurve = self.curve_name().parse()?;

        if self.jwk.is_public() {
            return self.decoded_material(FIELD_X);
        }

        let x = self.decoded_material(FIELD_X)?;
        let mut packed = self.decoded_material(FIELD_D)?;
        match curve {
            OkpCurve::Ed25519 => packed.extend_from_slice(&x),
            OkpCurve::X25519 => (),
        }
        Ok(packed)
    }

    /// Create a fresh ephemeral key pair on this key's curve.
    ///
    /// Valid only on the agreement curve; a signing-curve key fails with
    /// [`CryptoError::UnsupportedCurve`].
    pub fn create_ephemeral_key(&self) -> Result<Self, CryptoError> {
        match self.curve() {
            Ok(OkpCurve::X25519) => Self::generate(OkpCurve::X25519),
            _ => Err(Error::root(CryptoError::UnsupportedCurve(
                self.curve_name().to_string(),
            ))),
        }
    }

    /// Derive the Diffie-Hellman shared secret between this private key and
    /// the peer's public key.
    ///
    /// The receiver must be private and the peer public; both must be on
    /// the designated agreement curve. The derived secret must have the
    /// fixed [`SHARED_SECRET_LEN`]; a short result indicates a degenerate
    /// point or backend failure and is rejected.
    pub fn derive_shared_secret(&self, peer: &OkpKey) -> Result<Vec<u8>, CryptoError> {
        if self.jwk.is_public() {
            return Err(Error::root(CryptoError::PrivateKeyRequired));
        }
        if !peer.jwk.is_public() {
            return Err(Error::root(CryptoError::PublicKeyRequired));
        }
        if !constant_time_eq(self.curve_name().as_bytes(), AGREEMENT_CURVE.as_bytes()) {
            return Err(Error::root(CryptoError::UnsupportedCurve(
                self.curve_name().to_string(),
            )));
        }
        if !self.is_on_same_curve(&peer.jwk) {
            return Err(Error::root(CryptoError::UnsupportedCurve(
                peer.curve_name().to_string(),
            )));
        }

        let own = self.to_private_pkey()?;
        let peer = peer.to_public_pkey()?;

        let mut deriver = Deriver::new(&own).foreign_err(|| CryptoError::CryptoBackend)?;
        deriver
            .set_peer(&peer)
            .foreign_err(|| CryptoError::CryptoBackend)?;
        let secret = deriver
            .derive_to_vec()
            .foreign_err(|| CryptoError::CryptoBackend)?;

        if secret.len() != SHARED_SECRET_LEN {
            return Err(Error::root(CryptoError::InvalidSharedSecretLength(
                SHARED_SECRET_LEN,
                secret.len(),
            )));
        }
        Ok(secret)
    }

    /// Converts the private key into a backend key object.
    pub fn to_private_pkey(&self) -> Result<PKey<Private>, CryptoError> {
        if self.jwk.is_public() {
            return Err(Error::root(CryptoError::PrivateKeyRequired));
        }
        let curve: OkpCurve = self
            .curve_name()
            .parse()
            .with_err(|| CryptoError::UnsupportedCurve(self.curve_name().to_string()))?;

        let mut raw = self
            .to_raw_key_material()
            .with_err(|| CryptoError::InvalidKeyMaterial)?;
        // Both layouts lead with the 32-byte secret scalar/seed.
        let pkey = PKey::private_key_from_raw_bytes(&raw[..OKP_MATERIAL_LEN], curve.pkey_id())
            .foreign_err(|| CryptoError::CryptoBackend)?;
        raw.zeroize();
        Ok(pkey)
    }

    /// Converts the public coordinate into a backend key object.
    pub fn to_public_pkey(&self) -> Result<PKey<Public>, CryptoError> {
        let curve: OkpCurve = self
            .curve_name()
            .parse()
            .with_err(|| CryptoError::UnsupportedCurve(self.curve_name().to_string()))?;
        let x = self
            .decoded_material(FIELD_X)
            .with_err(|| CryptoError::InvalidKeyMaterial)?;

        PKey::public_key_from_raw_bytes(&x, curve.pkey_id())
            .foreign_err(|| CryptoError::CryptoBackend)
    }

    /// Fetches a coordinate/scalar field, enforcing the fixed material
    /// length.
    fn decoded_material(&self, field: &str) -> Result<Vec<u8>, KeyDataError> {
        let material = self.jwk.decoded_field(field)?;
        if material.is_empty() {
            return Err(Error::root(KeyDataError::EmptyMaterial(field.to_string())));
        }
        if material.len() != OKP_MATERIAL_LEN {
            return Err(Error::root(KeyDataError::InvalidMaterialLength(
                field.to_string(),
                OKP_MATERIAL_LEN,
                material.len(),
            )));
        }
        Ok(material)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use assert_matches::assert_matches;

    use super::*;

    pub(crate) fn generated_pair(curve: OkpCurve) -> (OkpKey, OkpKey) {
        let private = OkpKey::generate(curve).unwrap();
        let public = OkpKey::try_from(private.jwk().public_key().unwrap()).unwrap();
        (private, public)
    }

    fn okp_from_raw(curve: &str, x: &[u8], d: Option<&[u8]>) -> OkpKey {
        let mut fields = json_object!({
            "kty": "OKP",
            "crv": curve,
            "x": base64_url_encode(x),
        });
        if let Some(d) = d {
            fields.insert(
                "d".to_string(),
                serde_json::Value::String(base64_url_encode(d)),
            );
        }
        OkpKey::try_from(Jwk::from_fields(fields).unwrap()).unwrap()
    }

    #[test]
    fn generate_produces_a_full_private_key() {
        let key = OkpKey::generate(OkpCurve::X25519).unwrap();
        assert!(!key.jwk().is_public());
        assert_eq!(key.curve().unwrap(), OkpCurve::X25519);
        assert_eq!(key.jwk().size_bits().unwrap(), 256);
    }

    #[test]
    fn shared_secret_is_symmetric() {
        let (alice_private, alice_public) = generated_pair(OkpCurve::X25519);
        let (bob_private, bob_public) = generated_pair(OkpCurve::X25519);

        let s1 = alice_private.derive_shared_secret(&bob_public).unwrap();
        let s2 = bob_private.derive_shared_secret(&alice_public).unwrap();

        assert_eq!(s1, s2);
        assert_eq!(s1.len(), SHARED_SECRET_LEN);
    }

    /// Test vector from [Section 6.1. of RFC 7748][1].
    ///
    /// [1]: <https://datatracker.ietf.org/doc/html/rfc7748#section-6.1>
    #[test]
    fn rfc7748_shared_secret_vector() {
        let alice_d =
            hex::decode("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a")
                .unwrap();
        let alice_x =
            hex::decode("8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a")
                .unwrap();
        let bob_x =
            hex::decode("de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f")
                .unwrap();

        let alice = okp_from_raw("X25519", &alice_x, Some(&alice_d));
        let bob_public = okp_from_raw("X25519", &bob_x, None);

        let secret = alice.derive_shared_secret(&bob_public).unwrap();
        assert_eq!(
            hex::encode(secret),
            "4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742"
        );
    }

    #[test]
    fn is_on_same_curve_matrix() {
        let (x1, _) = generated_pair(OkpCurve::X25519);
        let (x2, _) = generated_pair(OkpCurve::X25519);
        let (ed1, _) = generated_pair(OkpCurve::Ed25519);
        let (ed2, _) = generated_pair(OkpCurve::Ed25519);

        // Reflexive and symmetric on the agreement curve.
        assert!(x1.is_on_same_curve(x1.jwk()));
        assert!(x1.is_on_same_curve(x2.jwk()));
        assert!(x2.is_on_same_curve(x1.jwk()));

        // The signing curve is shared, but it is not the agreement curve.
        assert!(!ed1.is_on_same_curve(ed2.jwk()));
        assert!(!ed1.is_on_same_curve(ed1.jwk()));

        // Cross-curve and cross-variant mismatches.
        assert!(!x1.is_on_same_curve(ed1.jwk()));
        assert!(!ed1.is_on_same_curve(x1.jwk()));
        let ec = Jwk::from_fields(json_object!({
            "kty": "EC",
            "crv": "P-256",
            "x": "MKBCTNIcKUSDii11ySs3526iDZ8AiTo7Tu6KPAqv7D4",
            "y": "4Etl6SRW2YiLUrN5vfvVHuhp7x8PxltmWWlbbM4IFyM"
        }))
        .unwrap();
        assert!(!x1.is_on_same_curve(&ec));
    }

    #[test]
    fn curve_names_differing_by_case_or_whitespace_do_not_match() {
        let (x1, _) = generated_pair(OkpCurve::X25519);
        for crv in ["x25519", "X25519 ", " X25519", "X2551"] {
            let other = okp_from_raw(crv, &[0x42; 32], None);
            assert!(!x1.is_on_same_curve(other.jwk()), "{crv:?}");
        }
    }

    #[test]
    fn raw_material_packs_secret_then_public_for_ed25519() {
        let d = [0x11u8; 32];
        let x = [0x22u8; 32];
        let key = okp_from_raw("Ed25519", &x, Some(&d));

        let raw = key.to_raw_key_material().unwrap();
        assert_eq!(raw.len(), 64);
        assert_eq!(&raw[..32], &d);
        assert_eq!(&raw[32..], &x);
    }

    #[test]
    fn raw_material_is_the_scalar_for_x25519() {
        let (private, public) = generated_pair(OkpCurve::X25519);

        let raw = private.to_raw_key_material().unwrap();
        assert_eq!(raw.len(), OKP_MATERIAL_LEN);

        let raw_public = public.to_raw_key_material().unwrap();
        assert_eq!(raw_public.len(), OKP_MATERIAL_LEN);
        assert_eq!(raw_public, private.jwk().decoded_field("x").unwrap());
    }

    #[test]
    fn raw_material_round_trips_to_the_same_public_coordinate() {
        let (private, _) = generated_pair(OkpCurve::Ed25519);

        let raw = private.to_raw_key_material().unwrap();
        let rebuilt = PKey::private_key_from_raw_bytes(&raw[..32], Id::ED25519).unwrap();

        let public_coordinate = private.jwk().public_key().unwrap();
        assert_eq!(
            rebuilt.raw_public_key().unwrap(),
            public_coordinate.decoded_field("x").unwrap()
        );
    }

    #[test]
    fn empty_secret_material_is_rejected() {
        let mut fields = json_object!({
            "kty": "OKP",
            "crv": "Ed25519",
            "x": base64_url_encode([0x22u8; 32]),
        });
        fields.insert("d".to_string(), serde_json::Value::String(String::new()));
        let key = OkpKey::try_from(Jwk::from_fields(fields).unwrap()).unwrap();

        let error = key.to_raw_key_material().unwrap_err();
        assert_eq!(error.error, KeyDataError::EmptyMaterial("d".to_string()));
    }

    #[test]
    fn mis_sized_material_is_rejected() {
        let key = okp_from_raw("X25519", &[0x22; 32], Some(&[0x11; 31]));

        let error = key.to_raw_key_material().unwrap_err();
        assert_eq!(
            error.error,
            KeyDataError::InvalidMaterialLength("d".to_string(), 32, 31)
        );
    }

    #[test]
    fn unsupported_curve_is_a_data_error() {
        let key = okp_from_raw("Ed448", &[0x22; 32], Some(&[0x11; 32]));

        let error = key.to_raw_key_material().unwrap_err();
        assert_eq!(
            error.error,
            KeyDataError::UnsupportedCurve("Ed448".to_string())
        );
    }

    #[test]
    fn ephemeral_keys_require_the_agreement_curve() {
        let (signing, _) = generated_pair(OkpCurve::Ed25519);
        let error = signing.create_ephemeral_key().unwrap_err();
        assert_eq!(
            error.error,
            CryptoError::UnsupportedCurve("Ed25519".to_string())
        );

        let (agreement, _) = generated_pair(OkpCurve::X25519);
        let ephemeral = agreement.create_ephemeral_key().unwrap();
        assert!(!ephemeral.jwk().is_public());
        assert!(!ephemeral.jwk().same_key(agreement.jwk()).unwrap());
    }

    #[test]
    fn derive_enforces_key_roles() {
        let (private, public) = generated_pair(OkpCurve::X25519);
        let (peer_private, peer_public) = generated_pair(OkpCurve::X25519);

        let error = public.derive_shared_secret(&peer_public).unwrap_err();
        assert_eq!(error.error, CryptoError::PrivateKeyRequired);

        let error = private.derive_shared_secret(&peer_private).unwrap_err();
        assert_eq!(error.error, CryptoError::PublicKeyRequired);
    }

    #[test]
    fn derive_rejects_the_signing_curve() {
        let (ed_private, ed_public) = generated_pair(OkpCurve::Ed25519);
        let error = ed_private.derive_shared_secret(&ed_public).unwrap_err();
        assert_matches!(error.error, CryptoError::UnsupportedCurve(_));
    }

    #[test]
    fn okp_view_rejects_other_variants() {
        let ec = Jwk::from_fields(json_object!({
            "kty": "EC",
            "crv": "P-256",
            "x": "MKBCTNIcKUSDii11ySs3526iDZ8AiTo7Tu6KPAqv7D4",
            "y": "4Etl6SRW2YiLUrN5vfvVHuhp7x8PxltmWWlbbM4IFyM"
        }))
        .unwrap();

        let error = OkpKey::try_from(ec).unwrap_err();
        assert_eq!(
            error.error,
            KeyDataError::UnexpectedKeyType("OKP".to_string(), "EC".to_string())
        );
    }
}
