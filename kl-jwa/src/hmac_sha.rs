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
use kl_jwk::{base64_url_encode, constant_time_eq, sha256, sha384, sha512, Jwk, OctKey};
use openssl::{hash::MessageDigest, pkey::PKey, sign::Signer};
use zeroize::Zeroize as _;

use crate::{
    error::SignatureError,
    traits::{Algorithm, AlgorithmId, SignatureAlgorithm},
};

/// `HS256`: HMAC with SHA-256.
pub static HS256: HmacSha = HmacSha::hs256();
/// `HS384`: HMAC with SHA-384.
pub static HS384: HmacSha = HmacSha::hs384();
/// `HS512`: HMAC with SHA-512.
pub static HS512: HmacSha = HmacSha::hs512();

/// The digest widths defined for the HMAC-SHA family by [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestBits {
    /// A 256-bit digest.
    Bits256,
    /// A 384-bit digest.
    Bits384,
    /// A 512-bit digest.
    Bits512,
}

impl DigestBits {
    /// Returns the digest width in bits.
    pub const fn bits(&self) -> usize {
        match self {
            Self::Bits256 => 256,
            Self::Bits384 => 384,
            Self::Bits512 => 512,
        }
    }

    fn message_digest(&self) -> MessageDigest {
        match self {
            Self::Bits256 => MessageDigest::sha256(),
            Self::Bits384 => MessageDigest::sha384(),
            Self::Bits512 => MessageDigest::sha512(),
        }
    }
}

/// The digest-based signature family: HMAC over SHA-2, parameterized by the
/// digest width.
///
/// Besides signing, the family provides [`HmacSha::short_hash`], the
/// truncated-digest fingerprint whose width is a fixed function of the
/// digest size.
#[derive(Debug, Clone, Copy)]
pub struct HmacSha {
    bits: DigestBits,
}

impl HmacSha {
    /// The `HS256` member of the family.
    pub const fn hs256() -> Self {
        Self {
            bits: DigestBits::Bits256,
        }
    }

    /// The `HS384` member of the family.
    pub const fn hs384() -> Self {
        Self {
            bits: DigestBits::Bits384,
        }
    }

    /// The `HS512` member of the family.
    pub const fn hs512() -> Self {
        Self {
            bits: DigestBits::Bits512,
        }
    }

    /// Returns the digest width of this family member in bits.
    pub const fn digest_bits(&self) -> usize {
        self.bits.bits()
    }

    /// Computes the full digest of `data` with the configured width.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self.bits {
            DigestBits::Bits256 => sha256(data).to_vec(),
            DigestBits::Bits384 => sha384(data).to_vec(),
            DigestBits::Bits512 => sha512(data).to_vec(),
        }
    }

    /// Computes the short hash of `data`: the full digest truncated to
    /// `digest_bits / 16` bytes and `base64url`-encoded.
    ///
    /// The truncation width is mandated by the digest size, not
    /// configurable; the result is deterministic and reused as a compact
    /// fingerprint (e.g. abbreviated key and certificate identifiers).
    pub fn short_hash(&self, data: &[u8]) -> String {
        let digest = self.digest(data);
        base64_url_encode(&digest[..self.bits.bits() / 16])
    }

    /// Extracts and checks the HMAC secret from an `oct` key.
    ///
    /// [RFC7518] requires a key of at least the digest width.
    ///
    /// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.2
    fn secret_from(&self, key: &Jwk) -> Result<Vec<u8>, SignatureError> {
        let oct = OctKey::try_from(key)
            .with_err(|| SignatureError::WrongKeyType(key.kty().to_string()))?;
        let secret = oct
            .secret_bytes()
            .with_err(|| SignatureError::InvalidKey("unreadable oct key material".to_string()))?;

        if secret.len() * 8 < self.bits.bits() {
            return Err(Error::root(SignatureError::WeakKey(format!(
                "{} bits, need at least {}",
                secret.len() * 8,
                self.bits.bits()
            ))));
        }
        Ok(secret)
    }
}

impl Algorithm for HmacSha {
    fn alg_id(&self) -> AlgorithmId {
        match self.bits {
            DigestBits::Bits256 => AlgorithmId::Hs256,
            DigestBits::Bits384 => AlgorithmId::Hs384,
            DigestBits::Bits512 => AlgorithmId::Hs512,
        }
    }
}

impl SignatureAlgorithm for HmacSha {
    fn sign(&self, key: &Jwk, data: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let mut secret = self.secret_from(key)?;
        let pkey = PKey::hmac(&secret).foreign_err(|| SignatureError::CryptoBackend)?;
        secret.zeroize();

        let mut signer = Signer::new(self.bits.message_digest(), &pkey)
            .foreign_err(|| SignatureError::CryptoBackend)?;
        signer
            .update(data)
            .foreign_err(|| SignatureError::CryptoBackend)?;
        signer
            .sign_to_vec()
            .foreign_err(|| SignatureError::CryptoBackend)
    }

    fn verify(&self, key: &Jwk, data: &[u8], tag: &[u8]) -> Result<bool, SignatureError> {
        // HMAC tags are deterministic, so verification is recomputation
        // plus a constant-time comparison.
        let expected = self.sign(key, data)?;
        Ok(constant_time_eq(&expected, tag))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use kl_jwk::json_object;

    use super::*;

    /// Symmetric key example taken from [Appendix A.3. of RFC 7517][1],
    /// which is also the `HS256` signing key of [Appendix A.1. of RFC
    /// 7515][2].
    ///
    /// [1]: <https://datatracker.ietf.org/doc/html/rfc7517#appendix-A.3>
    /// [2]: <https://datatracker.ietf.org/doc/html/rfc7515#appendix-A.1>
    pub(crate) fn rfc7515_hmac_key() -> Jwk {
        Jwk::from_fields(json_object!({
            "kty": "oct",
            "k": "AyM1SysPpbyDfgZld3umj1qzKObwVMkoqQ-EstJQLr_T-1qS0gZH75aKtMN3Yj0iPS4hcgUuTwjAzZr1Z9CAow"
        }))
        .unwrap()
    }

    /// The `HS256` signing input and signature of [Appendix A.1. of RFC
    /// 7515][1].
    ///
    /// [1]: <https://datatracker.ietf.org/doc/html/rfc7515#appendix-A.1>
    #[test]
    fn rfc7515_hs256_signature_vector() {
        let signing_input = "eyJ0eXAiOiJKV1QiLA0KICJhbGciOiJIUzI1NiJ9.\
             eyJpc3MiOiJqb2UiLA0KICJleHAiOjEzMDA4MTkzODAsDQogImh0dHA6Ly9leGFt\
             cGxlLmNvbS9pc19yb290Ijp0cnVlfQ";
        let expected_tag =
            kl_jwk::base64_url_decode("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk").unwrap();

        let key = rfc7515_hmac_key();
        let tag = HS256.sign(&key, signing_input.as_bytes()).unwrap();
        assert_eq!(tag, expected_tag);
        assert!(HS256
            .verify(&key, signing_input.as_bytes(), &tag)
            .unwrap());
    }

    #[test]
    fn tampered_tags_verify_false() {
        let key = rfc7515_hmac_key();
        let mut tag = HS512.sign(&key, b"payload").unwrap();
        assert!(HS512.verify(&key, b"payload", &tag).unwrap());

        tag[0] ^= 0x01;
        assert!(!HS512.verify(&key, b"payload", &tag).unwrap());
        // A truncated tag is a mismatch, not an error.
        assert!(!HS512.verify(&key, b"payload", &tag[..31]).unwrap());
    }

    #[test]
    fn short_hash_widths_follow_the_digest_size() {
        for (family, len) in [(&HS256, 16), (&HS384, 24), (&HS512, 32)] {
            let encoded = family.short_hash(b"fingerprint me");
            let decoded = kl_jwk::base64_url_decode(&encoded).unwrap();
            assert_eq!(decoded.len(), len);
            // Deterministic: same input, same output.
            assert_eq!(family.short_hash(b"fingerprint me"), encoded);
        }
    }

    #[test]
    fn short_hash_is_the_truncated_digest() {
        // SHA-256 of the empty string, truncated to 16 bytes.
        assert_eq!(HS256.short_hash(b""), "47DEQpj8HBSa-_TImW-5JA");
    }

    #[test]
    fn non_oct_keys_are_rejected() {
        let key = kl_jwk::OkpKey::generate(kl_jwk::OkpCurve::Ed25519)
            .unwrap()
            .into_jwk();

        let error = HS256.sign(&key, b"payload").unwrap_err();
        assert_eq!(error.error, SignatureError::WrongKeyType("OKP".to_string()));
    }

    #[test]
    fn undersized_keys_are_rejected() {
        // 128-bit key, below the 256-bit digest width.
        let key = Jwk::from_fields(json_object!({
            "kty": "oct",
            "k": "GawgguFyGrWKav7AX4VKUg"
        }))
        .unwrap();

        let error = HS256.sign(&key, b"payload").unwrap_err();
        assert!(matches!(error.error, SignatureError::WeakKey(_)));
    }

    #[test]
    fn unreadable_key_material_is_an_invalid_key() {
        let key = Jwk::from_fields(json_object!({
            "kty": "oct",
            "k": "%%% not base64url %%%"
        }))
        .unwrap();

        let error = HS256.sign(&key, b"payload").unwrap_err();
        assert!(matches!(error.error, SignatureError::InvalidKey(_)));
    }
}
