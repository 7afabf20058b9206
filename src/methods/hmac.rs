//! The HMAC-SHA2 family of signing methods: HS256, HS384 and HS512.

use std::sync::Arc;

use ring::constant_time::verify_slices_are_equal as ConstantTimeEquals;
use ring::hmac::{sign, Algorithm, Key as MacKey, Tag, HMAC_SHA256, HMAC_SHA384, HMAC_SHA512};

use crate::encoding::{decode_segment, encode_segment};
use crate::errors::Error;
use crate::methods::{Key, SigningMethod};

/// An HMAC signing method: an algorithm identifier bound to a SHA-2
/// digest. Expects [`Key::Secret`] raw bytes for both signing and
/// verification.
///
/// The method is symmetric, so verification reproduces the signature from
/// the signing string and compares; both directions share one MAC
/// computation. ring links its digests statically, so the hash behind each
/// instance is always available.
pub struct SigningMethodHmac {
  name: &'static str,
  algorithm: Algorithm,
}

impl SigningMethodHmac {
  /// HMAC using SHA-256.
  pub fn hs256() -> Arc<SigningMethodHmac> {
    Arc::new(SigningMethodHmac {
      name: "HS256",
      algorithm: HMAC_SHA256,
    })
  }

  /// HMAC using SHA-384.
  pub fn hs384() -> Arc<SigningMethodHmac> {
    Arc::new(SigningMethodHmac {
      name: "HS384",
      algorithm: HMAC_SHA384,
    })
  }

  /// HMAC using SHA-512.
  pub fn hs512() -> Arc<SigningMethodHmac> {
    Arc::new(SigningMethodHmac {
      name: "HS512",
      algorithm: HMAC_SHA512,
    })
  }

  fn compute(&self, signing_input: &str, secret: &[u8]) -> Tag {
    let mac_key = MacKey::new(self.algorithm, secret);
    sign(&mac_key, signing_input.as_bytes())
  }
}

impl SigningMethod for SigningMethodHmac {
  fn alg(&self) -> &str {
    self.name
  }

  fn sign(&self, signing_input: &str, key: &Key) -> Result<String, Error> {
    let secret = match key {
      Key::Secret(bytes) => bytes,
      _ => return Err(Error::InvalidKeyType),
    };

    Ok(encode_segment(self.compute(signing_input, secret).as_ref()))
  }

  fn verify(&self, signing_input: &str, signature: &str, key: &Key) -> Result<(), Error> {
    let sig = decode_segment(signature)?;

    let secret = match key {
      Key::Secret(bytes) => bytes,
      _ => return Err(Error::InvalidKeyType),
    };

    let expected = self.compute(signing_input, secret);
    ConstantTimeEquals(expected.as_ref(), &sig).map_err(|_| Error::SignatureInvalid)
  }
}
