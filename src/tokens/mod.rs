//! The token model: a header and a claim set bound to the method that
//! signs them.

use std::fmt;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::claims::MapClaims;
use crate::encoding::encode_segment;
use crate::errors::Error;
use crate::methods::{Key, SharedSigningMethod};

pub mod builder;
pub use self::builder::TokenBuilder;

/// A token, either freshly built for issuing or decoded by the parser.
///
/// `valid` only means something after a full parse and verify pass; a
/// token built for issuing stays `false` until the receiving side has
/// checked it.
pub struct Token<C = MapClaims> {
  /// The raw compact text. Populated when the token came from the parser.
  pub raw: Option<String>,
  /// The method used, or to be used, for the signature.
  pub method: SharedSigningMethod,
  /// The first segment of the token.
  pub header: Map<String, Value>,
  /// The second segment of the token.
  pub claims: C,
  /// The third segment of the token. Populated by the parser.
  pub signature: Option<String>,
  /// Whether the signature and the claims both checked out.
  pub valid: bool,
}

impl Token<MapClaims> {
  /// A token with an empty claim map, signed by `method`.
  pub fn new(method: SharedSigningMethod) -> Token<MapClaims> {
    Token::with_claims(method, MapClaims::new())
  }
}

impl<C> Token<C> {
  /// A token carrying `claims`, with the fixed `typ` and the method's
  /// identifier in the header.
  pub fn with_claims(method: SharedSigningMethod, claims: C) -> Token<C> {
    let mut header = Map::new();
    header.insert(String::from("typ"), json!("JWT"));
    header.insert(String::from("alg"), json!(method.alg()));

    Token {
      raw: None,
      method,
      header,
      claims,
      signature: None,
      valid: false,
    }
  }
}

impl<C: Serialize> Token<C> {
  /// Derives the text that gets signed: the encoded header and the encoded
  /// claims joined by a dot. Both sides of a token exchange re-derive this
  /// from the same logical content, so the JSON layer only has to be
  /// deterministic, not canonical across implementations.
  pub fn signing_string(&self) -> Result<String, Error> {
    let header = serde_json::to_vec(&self.header)?;
    let claims = serde_json::to_vec(&self.claims)?;

    Ok(format!(
      "{}.{}",
      encode_segment(&header),
      encode_segment(&claims)
    ))
  }

  /// The complete signed token for `key`: the signing string and the
  /// signature segment joined by a dot.
  pub fn signed_string(&self, key: &Key) -> Result<String, Error> {
    let signing_input = self.signing_string()?;
    let signature = self.method.sign(&signing_input, key)?;

    Ok(format!("{}.{}", signing_input, signature))
  }
}

impl<C: fmt::Debug> fmt::Debug for Token<C> {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Token")
      .field("raw", &self.raw)
      .field("alg", &self.method.alg())
      .field("header", &self.header)
      .field("claims", &self.claims)
      .field("signature", &self.signature)
      .field("valid", &self.valid)
      .finish()
  }
}

#[cfg(test)]
mod unit_tests {
  use super::*;
  use crate::claims::RegisteredClaims;
  use crate::encoding::decode_segment;
  use crate::methods::SigningMethodHmac;

  #[test]
  fn new_tokens_carry_the_fixed_header() {
    let token = Token::new(SigningMethodHmac::hs256());

    assert_eq!(token.header.get("typ"), Some(&json!("JWT")));
    assert_eq!(token.header.get("alg"), Some(&json!("HS256")));
    assert!(token.raw.is_none());
    assert!(token.signature.is_none());
    assert!(!token.valid);
  }

  #[test]
  fn header_tracks_the_chosen_method() {
    let token = Token::new(SigningMethodHmac::hs512());
    assert_eq!(token.header.get("alg"), Some(&json!("HS512")));
  }

  #[test]
  fn signing_string_has_two_decodable_segments() {
    let claims = RegisteredClaims {
      issuer: String::from("svc-a"),
      expires_at: 1516239022,
      ..RegisteredClaims::default()
    };
    let token = Token::with_claims(SigningMethodHmac::hs256(), claims);

    let signing_input = token.signing_string().unwrap();
    let segments: Vec<&str> = signing_input.split('.').collect();
    assert_eq!(segments.len(), 2);

    let header = decode_segment(segments[0]).unwrap();
    assert_eq!(header, b"{\"alg\":\"HS256\",\"typ\":\"JWT\"}");

    let claims = decode_segment(segments[1]).unwrap();
    assert_eq!(claims, b"{\"exp\":1516239022,\"iss\":\"svc-a\"}");
  }

  #[test]
  fn signing_string_is_stable_across_calls() {
    let token = Token::with_claims(
      SigningMethodHmac::hs256(),
      RegisteredClaims {
        subject: String::from("someone"),
        ..RegisteredClaims::default()
      },
    );

    assert_eq!(token.signing_string().unwrap(), token.signing_string().unwrap());
  }

  #[test]
  fn signed_string_appends_a_verifiable_signature() {
    let key = Key::secret(b"s3cr3t");
    let token = Token::new(SigningMethodHmac::hs256());

    let signed = token.signed_string(&key).unwrap();
    let segments: Vec<&str> = signed.split('.').collect();
    assert_eq!(segments.len(), 3);

    let signing_input = format!("{}.{}", segments[0], segments[1]);
    token
      .method
      .verify(&signing_input, segments[2], &key)
      .expect("self signed token must verify");
  }

  #[test]
  fn signing_with_wrong_key_material_propagates_the_error() {
    let token = Token::new(SigningMethodHmac::hs256());
    let err = token.signed_string(&Key::Der(vec![0x30])).unwrap_err();

    assert!(matches!(err, Error::InvalidKeyType));
  }
}
