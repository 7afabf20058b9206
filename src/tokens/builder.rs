use chrono::prelude::*;
use serde_json::{json, Value};

use crate::claims::MapClaims;
use crate::errors::Error;
use crate::methods::{Key, SharedSigningMethod, SigningMethodHmac};
use crate::tokens::Token;

/// A token builder.
pub struct TokenBuilder {
  /// The method that will sign the built token.
  method: SharedSigningMethod,
  /// The key handed to the method. Building without one fails.
  key: Option<Key>,
  /// The claims stored in the token body.
  claims: MapClaims,
}

impl TokenBuilder {
  /// Creates a new token builder, signing with HS256 until told otherwise.
  pub fn new() -> TokenBuilder {
    TokenBuilder {
      method: SigningMethodHmac::hs256(),
      key: None,
      claims: MapClaims::new(),
    }
  }

  /// Sets the method used to sign the token.
  pub fn set_signing_method(mut self, method: SharedSigningMethod) -> Self {
    self.method = method;
    self
  }

  /// Sets the key the token will be signed with.
  pub fn set_key(mut self, key: Key) -> Self {
    self.key = Some(key);
    self
  }

  /// Sets an arbitrary claim (a key inside the json body).
  pub fn set_claim(mut self, name: &str, value: Value) -> Self {
    self.claims.insert(name, value);
    self
  }

  /// Sets the audience for this token.
  pub fn set_audience(self, audience: &str) -> Self {
    self.set_claim("aud", json!(audience))
  }

  /// Sets the expiration date for this token, stored as epoch seconds.
  pub fn set_expiration(self, expiration: &DateTime<Utc>) -> Self {
    self.set_claim("exp", json!(expiration.timestamp()))
  }

  /// Sets the time this token was issued at.
  ///
  /// issued_at defaults to: Utc::now();
  pub fn set_issued_at(self, issued_at: Option<DateTime<Utc>>) -> Self {
    self.set_claim("iat", json!(issued_at.unwrap_or_else(Utc::now).timestamp()))
  }

  /// Sets the issuer for this token.
  pub fn set_issuer(self, issuer: &str) -> Self {
    self.set_claim("iss", json!(issuer))
  }

  /// Sets the JTI ID for this token.
  pub fn set_jti(self, id: &str) -> Self {
    self.set_claim("jti", json!(id))
  }

  /// Sets the not before time.
  pub fn set_not_before(self, not_before: &DateTime<Utc>) -> Self {
    self.set_claim("nbf", json!(not_before.timestamp()))
  }

  /// Sets the subject for this token.
  pub fn set_subject(self, subject: &str) -> Self {
    self.set_claim("sub", json!(subject))
  }

  /// Builds a signed token.
  pub fn build(self) -> Result<String, Error> {
    let key = match self.key {
      Some(key) => key,
      None => return Err(Error::InvalidKey),
    };

    Token::with_claims(self.method, self.claims).signed_string(&key)
  }
}

impl Default for TokenBuilder {
  fn default() -> TokenBuilder {
    TokenBuilder::new()
  }
}

#[cfg(test)]
mod unit_tests {
  use super::*;
  use crate::claims::Claims;
  use crate::clock::Clock;
  use crate::methods::SigningMethodRegistry;
  use crate::parser::Parser;

  #[test]
  fn built_tokens_parse_and_verify() {
    let now = Utc::now();
    let expiration = now + chrono::Duration::hours(1);

    let token = TokenBuilder::new()
      .set_key(Key::secret(b"YELLOW SUBMARINE, BLACK WIZARDRY"))
      .set_issued_at(Some(now))
      .set_expiration(&expiration)
      .set_issuer("issuer")
      .set_audience("audience")
      .set_jti("jti")
      .set_not_before(&now)
      .set_subject("test")
      .set_claim("claim", json!("data"))
      .build()
      .expect("failed to build a signed token");

    let registry = SigningMethodRegistry::new();
    let parsed = Parser::new(&registry)
      .parse(&token, |_| Ok(Key::secret(b"YELLOW SUBMARINE, BLACK WIZARDRY")))
      .expect("built token must verify");

    assert!(parsed.valid);
    assert_eq!(parsed.claims.get("iss"), Some(&json!("issuer")));
    assert_eq!(parsed.claims.get("aud"), Some(&json!("audience")));
    assert_eq!(parsed.claims.get("jti"), Some(&json!("jti")));
    assert_eq!(parsed.claims.get("sub"), Some(&json!("test")));
    assert_eq!(parsed.claims.get("claim"), Some(&json!("data")));
    assert_eq!(parsed.claims.get("exp"), Some(&json!(expiration.timestamp())));
  }

  #[test]
  fn builder_uses_the_chosen_method() {
    let token = TokenBuilder::new()
      .set_signing_method(SigningMethodHmac::hs384())
      .set_key(Key::secret(b"s3cr3t"))
      .set_subject("test")
      .build()
      .unwrap();

    let registry = SigningMethodRegistry::new();
    let parsed = Parser::new(&registry)
      .parse(&token, |_| Ok(Key::secret(b"s3cr3t")))
      .unwrap();

    assert_eq!(parsed.header.get("alg"), Some(&json!("HS384")));
  }

  #[test]
  fn expired_claims_come_out_expired() {
    let past = Utc::now() - chrono::Duration::hours(2);

    let token = TokenBuilder::new()
      .set_key(Key::secret(b"s3cr3t"))
      .set_expiration(&past)
      .build()
      .unwrap();

    let registry = SigningMethodRegistry::new();
    let err = Parser::with_clock(&registry, Clock::System)
      .parse(&token, |_| Ok(Key::secret(b"s3cr3t")))
      .unwrap_err();

    assert!(err.error.contains(crate::errors::ValidationError::EXPIRED));
    // The decoded claims still validate on their own terms.
    let token = err.token.unwrap();
    assert!(token.claims.validate(past.timestamp()).is_ok());
  }

  #[test]
  fn building_without_a_key_fails() {
    let err = TokenBuilder::new().set_subject("test").build().unwrap_err();
    assert!(matches!(err, Error::InvalidKey));
  }
}
