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
use openssl::{
    bn::{BigNum, BigNumContext},
    ec::{EcGroup, EcGroupRef, EcKey as SslEcKey, EcPointRef},
    nid::Nid,
    pkey::{Private, Public},
};
use zeroize::Zeroize as _;

use crate::{
    error::{CryptoError, KeyDataError},
    json_object,
    key::{Jwk, KeyType, FIELD_CRV, FIELD_D, FIELD_X, FIELD_Y},
    utils::base64_url_encode,
};

type EcPrivate = SslEcKey<Private>;
type EcPublic = SslEcKey<Public>;

/// JWK `"crv"` parameter value for the **P-256** curve, as specified in
/// [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-6.2.1.1
pub const EC_CURVE_P256: &str = "P-256";

/// A 32-byte affine coordinate on the P-256 curve.
pub type Coordinate = [u8; 32];

// X9_62_PRIME256V1 is basically an alias for secp256r1, which NIST names
// P-256; see https://tools.ietf.org/search/rfc4492#appendix-A
pub(crate) const ELLIPTIC_CURVE_NID: Nid = Nid::X9_62_PRIME256V1;

/// An elliptic curve key: a [`Jwk`] of type `EC` on the P-256 curve.
///
/// This typed view scopes the affine-coordinate conversions to the variant;
/// obtain one with `TryFrom` over a [`Jwk`]. Only P-256 is currently
/// supported.
#[derive(Debug, Clone)]
pub struct EcKey {
    jwk: Jwk,
}

impl TryFrom<Jwk> for EcKey {
    type Error = Error<KeyDataError>;

    fn try_from(jwk: Jwk) -> Result<Self, KeyDataError> {
        if jwk.kty() != KeyType::Ec {
            return Err(Error::root(KeyDataError::UnexpectedKeyType(
                KeyType::Ec.to_string(),
                jwk.kty().to_string(),
            )));
        }
        // The unwrap is safe because `crv` is a required EC field, checked
        // at construction.
        let curve = jwk.field_str(FIELD_CRV).unwrap();
        if curve != EC_CURVE_P256 {
            return Err(Error::root(KeyDataError::UnsupportedCurve(
                curve.to_string(),
            )));
        }
        Ok(Self { jwk })
    }
}

impl TryFrom<&Jwk> for EcKey {
    type Error = Error<KeyDataError>;

    fn try_from(jwk: &Jwk) -> Result<Self, KeyDataError> {
        Self::try_from(jwk.clone())
    }
}

/// Returns the affine coordinates of the given public key point, padded to
/// the fixed coordinate width.
pub(crate) fn to_affine_coords(
    point: &EcPointRef,
    group: &EcGroupRef,
) -> Result<(Box<Coordinate>, Box<Coordinate>), CryptoError> {
    let mut x = BigNum::new().foreign_err(|| CryptoError::CryptoBackend)?;
    let mut y = BigNum::new().foreign_err(|| CryptoError::CryptoBackend)?;
    let mut ctx = BigNumContext::new().foreign_err(|| CryptoError::CryptoBackend)?;
    point
        .affine_coordinates(group, &mut x, &mut y, &mut ctx)
        .foreign_err(|| CryptoError::CryptoBackend)?;

    // The unwraps are safe, as we choose the length correctly.
    let x = x
        .to_vec_padded(32)
        .foreign_err(|| CryptoError::CryptoBackend)?
        .try_into()
        .unwrap();
    let y = y
        .to_vec_padded(32)
        .foreign_err(|| CryptoError::CryptoBackend)?
        .try_into()
        .unwrap();
    Ok((x, y))
}

impl EcKey {
    /// Generate a fresh P-256 key pair via the cryptographic backend's
    /// secure key-generation routine.
    pub fn generate() -> Result<Self, CryptoError> {
        let group = EcGroup::from_curve_name(ELLIPTIC_CURVE_NID)
            .foreign_err(|| CryptoError::CryptoBackend)?;
        let key = SslEcKey::<Private>::generate(group.as_ref())
            .foreign_err(|| CryptoError::KeyGenerationFailed)?;

        let (x, y) = to_affine_coords(key.public_key(), key.group())?;
        let mut d = key
            .private_key()
            .to_vec_padded(32)
            .foreign_err(|| CryptoError::CryptoBackend)?;

        let fields = json_object!({
            "kty": "EC",
            "crv": EC_CURVE_P256,
            "x": base64_url_encode(&*x),
            "y": base64_url_encode(&*y),
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
        // The unwrap is safe because `crv` is a required EC field, checked
        // at construction.
        self.jwk.field_str(FIELD_CRV).unwrap()
    }

    /// Converts the public coordinates into a backend key object.
    pub fn to_public_ec(&self) -> Result<EcPublic, KeyDataError> {
        let x = self.decoded_coordinate(FIELD_X)?;
        let x = BigNum::from_slice(&x)
            .foreign_err(|| KeyDataError::MalformedField(FIELD_X.to_string()))?;
        let y = self.decoded_coordinate(FIELD_Y)?;
        let y = BigNum::from_slice(&y)
            .foreign_err(|| KeyDataError::MalformedField(FIELD_Y.to_string()))?;

        // The unwrap is safe because we always use the same curve.
        let group = EcGroup::from_curve_name(ELLIPTIC_CURVE_NID).unwrap();
        EcPublic::from_public_key_affine_coordinates(group.as_ref(), x.as_ref(), y.as_ref())
            .foreign_err(|| KeyDataError::MalformedField("public coordinates".to_string()))
    }

    /// Converts the private key into a backend key object.
    pub fn to_private_ec(&self) -> Result<EcPrivate, CryptoError> {
        if self.jwk.is_public() {
            return Err(Error::root(CryptoError::PrivateKeyRequired));
        }

        let mut d_bytes = self
            .decoded_coordinate(FIELD_D)
            .with_err(|| CryptoError::InvalidKeyMaterial)?;
        let d = BigNum::from_slice(&d_bytes).foreign_err(|| CryptoError::CryptoBackend)?;
        d_bytes.zeroize();

        let public = self
            .to_public_ec()
            .with_err(|| CryptoError::InvalidKeyMaterial)?;
        let group = EcGroup::from_curve_name(ELLIPTIC_CURVE_NID)
            .foreign_err(|| CryptoError::CryptoBackend)?;

        SslEcKey::from_private_components(group.as_ref(), d.as_ref(), public.public_key())
            .foreign_err(|| CryptoError::CryptoBackend)
    }

    /// Fetches a coordinate/scalar field, enforcing the fixed coordinate
    /// width.
    fn decoded_coordinate(&self, field: &str) -> Result<Vec<u8>, KeyDataError> {
        let material = self.jwk.decoded_field(field)?;
        if material.is_empty() {
            return Err(Error::root(KeyDataError::EmptyMaterial(field.to_string())));
        }
        if material.len() != 32 {
            return Err(Error::root(KeyDataError::InvalidMaterialLength(
                field.to_string(),
                32,
                material.len(),
            )));
        }
        Ok(material)
    }
}
