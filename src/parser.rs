//! Parses and verifies compact serialized tokens.
//!
//! A parse is a fixed pipeline: split the text into its three segments,
//! decode the header and claims, resolve the signing method from the
//! header, resolve the key through the caller's callback, verify the
//! signature, then validate the claims. Structural failures and a missing
//! method or key stop the pipeline, since nothing downstream could produce
//! meaningful output. A failed signature does not: claims are still
//! checked, so the caller sees every failure of a bad token at once.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::claims::{Claims, MapClaims};
use crate::clock::Clock;
use crate::encoding::decode_segment;
use crate::errors::{Error, ValidationError};
use crate::methods::{Key, SigningMethodRegistry};
use crate::tokens::Token;

/// A failed parse.
///
/// The token rides along from the first stage at which it could be
/// assembled, so callers can still read the decoded header and claims of a
/// token that did not verify, to tell a forged token from a merely expired
/// one in logs.
#[derive(Debug)]
pub struct ParseError<C> {
  /// The decoded token, when parsing got far enough to build one.
  pub token: Option<Token<C>>,
  /// The aggregate validation failure.
  pub error: ValidationError,
}

impl<C> ParseError<C> {
  fn bare(error: ValidationError) -> ParseError<C> {
    ParseError { token: None, error }
  }
}

impl<C> fmt::Display for ParseError<C> {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.error)
  }
}

impl<C: fmt::Debug> std::error::Error for ParseError<C> {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    Some(&self.error)
  }
}

/// Splits, decodes, verifies and validates tokens against an injected
/// registry of signing methods.
pub struct Parser<'r> {
  registry: &'r SigningMethodRegistry,
  clock: Clock,
}

impl<'r> Parser<'r> {
  /// A parser resolving methods from `registry`, validating claims against
  /// the system clock.
  pub fn new(registry: &SigningMethodRegistry) -> Parser<'_> {
    Parser::with_clock(registry, Clock::System)
  }

  /// A parser with an explicit time source.
  pub fn with_clock(registry: &SigningMethodRegistry, clock: Clock) -> Parser<'_> {
    Parser { registry, clock }
  }

  /// Parses and verifies a token with an open claim map body.
  ///
  /// `key_fn` receives the decoded but not yet verified token, so it can
  /// pick a key based on the header or claims.
  pub fn parse<F>(&self, raw: &str, key_fn: F) -> Result<Token<MapClaims>, ParseError<MapClaims>>
  where
    F: FnOnce(&Token<MapClaims>) -> Result<Key, Error>,
  {
    self.parse_with_claims(raw, key_fn)
  }

  /// Parses and verifies a token, decoding the claims segment into `C`.
  pub fn parse_with_claims<C, F>(&self, raw: &str, key_fn: F) -> Result<Token<C>, ParseError<C>>
  where
    C: Claims + DeserializeOwned,
    F: FnOnce(&Token<C>) -> Result<Key, Error>,
  {
    let parts: Vec<&str> = raw.split('.').collect();
    if parts.len() != 3 {
      return Err(ParseError::bare(ValidationError::new(
        "token contains an invalid number of segments",
        ValidationError::MALFORMED,
      )));
    }

    // Structural decode of the first two segments. Failing here is
    // unrecoverable: there is nothing left to verify or report on.
    let header: Map<String, Value> = decode_json(parts[0]).map_err(ParseError::bare)?;
    let claims: C = decode_json(parts[1]).map_err(ParseError::bare)?;

    // Only a method registered up front is ever trusted; an unknown or
    // "none" algorithm stops the parse before any verification.
    let method = header
      .get("alg")
      .and_then(Value::as_str)
      .and_then(|alg| self.registry.resolve(alg));
    let method = match method {
      Some(method) => method,
      None => {
        return Err(ParseError::bare(ValidationError::new(
          "signing method (alg) is unavailable",
          ValidationError::UNVERIFIABLE,
        )))
      }
    };

    let mut token = Token {
      raw: Some(raw.to_owned()),
      method,
      header,
      claims,
      signature: None,
      valid: false,
    };

    let key = match key_fn(&token) {
      Ok(key) => key,
      Err(cause) => {
        let mut error = ValidationError::default();
        error.set_cause(ValidationError::UNVERIFIABLE, cause);
        return Err(ParseError {
          token: Some(token),
          error,
        });
      }
    };

    let mut error = ValidationError::default();

    let signing_input = &raw[..parts[0].len() + 1 + parts[1].len()];
    if let Err(cause) = token.method.verify(signing_input, parts[2], &key) {
      error.set_cause(ValidationError::SIGNATURE_INVALID, cause);
    }
    token.signature = Some(parts[2].to_owned());

    if let Err(claims_error) = token.claims.validate(self.clock.now()) {
      error.merge(claims_error);
    }

    if error.is_empty() {
      token.valid = true;
      Ok(token)
    } else {
      Err(ParseError {
        token: Some(token),
        error,
      })
    }
  }
}

fn decode_json<T: DeserializeOwned>(seg: &str) -> Result<T, ValidationError> {
  let bytes = decode_segment(seg).map_err(|err| malformed(Error::from(err)))?;
  serde_json::from_slice(&bytes).map_err(|err| malformed(Error::from(err)))
}

fn malformed(cause: Error) -> ValidationError {
  let mut error = ValidationError::default();
  error.set_cause(ValidationError::MALFORMED, cause);
  error
}
