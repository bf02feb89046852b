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

use bherror::{Error, Result};

use crate::{
    error::KeyDataError,
    key::{Jwk, KeyType, FIELD_E, FIELD_N},
};

/// An RSA key: a [`Jwk`] of type `RSA`.
///
/// The variant is representation-level: it carries the modulus and exponent
/// fields through the common key contracts (sizing, public derivation,
/// thumbprints) without shipping an RSA algorithm family of its own.
#[derive(Debug, Clone)]
pub struct RsaKey {
    jwk: Jwk,
}

impl TryFrom<Jwk> for RsaKey {
    type Error = Error<KeyDataError>;

    fn try_from(jwk: Jwk) -> Result<Self, KeyDataError> {
        if jwk.kty() != KeyType::Rsa {
            return Err(Error::root(KeyDataError::UnexpectedKeyType(
                KeyType::Rsa.to_string(),
                jwk.kty().to_string(),
            )));
        }
        Ok(Self { jwk })
    }
}

impl TryFrom<&Jwk> for RsaKey {
    type Error = Error<KeyDataError>;

    fn try_from(jwk: &Jwk) -> Result<Self, KeyDataError> {
        Self::try_from(jwk.clone())
    }
}

impl RsaKey {
    /// Returns the underlying [`Jwk`].
    pub fn jwk(&self) -> &Jwk {
        &self.jwk
    }

    /// Consumes the view, returning the underlying [`Jwk`].
    pub fn into_jwk(self) -> Jwk {
        self.jwk
    }

    /// Returns the decoded modulus `n`.
    pub fn modulus(&self) -> Result<Vec<u8>, KeyDataError> {
        let n = self.jwk.decoded_field(FIELD_N)?;
        if n.is_empty() {
            return Err(Error::root(KeyDataError::EmptyMaterial(FIELD_N.to_string())));
        }
        Ok(n)
    }

    /// Returns the decoded public exponent `e`.
    pub fn public_exponent(&self) -> Result<Vec<u8>, KeyDataError> {
        let e = self.jwk.decoded_field(FIELD_E)?;
        if e.is_empty() {
            return Err(Error::root(KeyDataError::EmptyMaterial(FIELD_E.to_string())));
        }
        Ok(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_object;

    fn rfc7638_key() -> Jwk {
        Jwk::from_fields(json_object!({
            "kty": "RSA",
            "n": "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zw\
                  u1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY\
                  4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAta\
                  Sqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTW\
                  hAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-k\
                  EgU8awapJzKnqDKgw",
            "e": "AQAB"
        }))
        .unwrap()
    }

    #[test]
    fn modulus_drives_the_key_size() {
        let key = RsaKey::try_from(rfc7638_key()).unwrap();
        assert_eq!(key.jwk().size_bits().unwrap(), 2048);
        assert_eq!(key.modulus().unwrap().len(), 256);
        assert_eq!(key.public_exponent().unwrap(), vec![0x01, 0x00, 0x01]);
    }

    #[test]
    fn public_derivation_strips_the_private_exponent() {
        let mut fields = rfc7638_key().fields().clone();
        fields.insert(
            "d".to_string(),
            serde_json::Value::String("dGVzdC1wcml2YXRlLWV4cG9uZW50".to_string()),
        );
        let private = Jwk::from_fields(fields).unwrap();
        assert!(!private.is_public());

        let public = private.public_key().unwrap();
        assert!(public.is_public());
        assert!(public.field("d").is_none());
        assert!(public.same_key(&private).unwrap());
    }

    #[test]
    fn missing_exponent_is_rejected() {
        let error = Jwk::from_fields(json_object!({
            "kty": "RSA",
            "n": "0vx7agoebGcQ"
        }))
        .unwrap_err();
        assert_eq!(error.error, KeyDataError::MissingField("e".to_string()));
    }

    #[test]
    fn thumbprint_members_are_the_rfc7638_set() {
        let key = rfc7638_key();
        assert_eq!(key.thumbprint_members(), &["e", "kty", "n"]);
    }
}
