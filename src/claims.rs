//! Claim sets and their semantic validation rules.
//!
//! Anything that can produce a validity verdict for a given instant can be
//! a claim set: the registered claims of RFC 7519 section 4.1, an open map,
//! or a caller defined struct implementing [`Claims`].

use ring::constant_time::verify_slices_are_equal as ConstantTimeEquals;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ValidationError;

/// The capability every claim set shares: check itself against an instant,
/// in seconds since the unix epoch.
pub trait Claims {
  /// Returns the accumulated failures if any semantic check did not hold.
  /// The returned error carries one bit per failed check.
  fn validate(&self, now: i64) -> Result<(), ValidationError>;
}

/// The registered claim set from RFC 7519 section 4.1.
///
/// All claims are optional. A zero timestamp or an empty string means the
/// claim is unset, and an unset claim passes any check that does not
/// require it. Unset claims are omitted from the serialized form entirely,
/// never emitted as null.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisteredClaims {
  #[serde(rename = "aud", default, skip_serializing_if = "String::is_empty")]
  pub audience: String,
  #[serde(rename = "exp", default, skip_serializing_if = "is_unset")]
  pub expires_at: i64,
  #[serde(rename = "jti", default, skip_serializing_if = "String::is_empty")]
  pub id: String,
  #[serde(rename = "iat", default, skip_serializing_if = "is_unset")]
  pub issued_at: i64,
  #[serde(rename = "iss", default, skip_serializing_if = "String::is_empty")]
  pub issuer: String,
  #[serde(rename = "nbf", default, skip_serializing_if = "is_unset")]
  pub not_before: i64,
  #[serde(rename = "sub", default, skip_serializing_if = "String::is_empty")]
  pub subject: String,
}

fn is_unset(stamp: &i64) -> bool {
  *stamp == 0
}

impl RegisteredClaims {
  /// Compares the `aud` claim against `cmp`. An unset audience passes
  /// unless `required`.
  pub fn verify_audience(&self, cmp: &str, required: bool) -> bool {
    verify_string_claim(&self.audience, cmp, required)
  }

  /// Checks the `exp` claim against `now`. An unset expiration passes
  /// unless `required`.
  pub fn verify_expires_at(&self, now: i64, required: bool) -> bool {
    verify_exp(self.expires_at, now, required)
  }

  /// Checks the `iat` claim against `now`. An unset issue time passes
  /// unless `required`.
  pub fn verify_issued_at(&self, now: i64, required: bool) -> bool {
    verify_iat(self.issued_at, now, required)
  }

  /// Compares the `iss` claim against `cmp`. An unset issuer passes unless
  /// `required`.
  pub fn verify_issuer(&self, cmp: &str, required: bool) -> bool {
    verify_string_claim(&self.issuer, cmp, required)
  }

  /// Checks the `nbf` claim against `now`. An unset not-before passes
  /// unless `required`.
  pub fn verify_not_before(&self, now: i64, required: bool) -> bool {
    verify_nbf(self.not_before, now, required)
  }
}

impl Claims for RegisteredClaims {
  /// Validates the time based claims, with no allowance for clock skew.
  /// All three are optional here; callers wanting a claim to be mandatory
  /// check it through the `verify_*` methods with `required` set.
  fn validate(&self, now: i64) -> Result<(), ValidationError> {
    let mut err = ValidationError::default();

    if !self.verify_expires_at(now, false) {
      err.set(ValidationError::EXPIRED, "token is expired");
    }
    if !self.verify_issued_at(now, false) {
      err.set(ValidationError::ISSUED_AT, "token used before issued");
    }
    if !self.verify_not_before(now, false) {
      err.set(ValidationError::NOT_VALID_YET, "token is not valid yet");
    }

    if err.is_empty() {
      Ok(())
    } else {
      Err(err)
    }
  }
}

/// An open claim mapping, for tokens whose body has no fixed shape.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapClaims(pub Map<String, Value>);

impl MapClaims {
  /// An empty claim map.
  pub fn new() -> MapClaims {
    MapClaims(Map::new())
  }

  /// Stores a claim under `name`.
  pub fn insert(&mut self, name: &str, value: Value) {
    self.0.insert(name.to_owned(), value);
  }

  /// The claim stored under `name`, if any.
  pub fn get(&self, name: &str) -> Option<&Value> {
    self.0.get(name)
  }

  /// Checks the `exp` claim against `now`. A missing or zero claim passes
  /// unless `required`; a present claim that is not an integer fails.
  pub fn verify_expires_at(&self, now: i64, required: bool) -> bool {
    match self.0.get("exp") {
      None => !required,
      Some(value) => value
        .as_i64()
        .map_or(false, |exp| verify_exp(exp, now, required)),
    }
  }

  /// Checks the `iat` claim against `now`, with the same conventions as
  /// `verify_expires_at`.
  pub fn verify_issued_at(&self, now: i64, required: bool) -> bool {
    match self.0.get("iat") {
      None => !required,
      Some(value) => value
        .as_i64()
        .map_or(false, |iat| verify_iat(iat, now, required)),
    }
  }

  /// Checks the `nbf` claim against `now`, with the same conventions as
  /// `verify_expires_at`.
  pub fn verify_not_before(&self, now: i64, required: bool) -> bool {
    match self.0.get("nbf") {
      None => !required,
      Some(value) => value
        .as_i64()
        .map_or(false, |nbf| verify_nbf(nbf, now, required)),
    }
  }

  /// Compares the `aud` claim against `cmp`.
  pub fn verify_audience(&self, cmp: &str, required: bool) -> bool {
    self.verify_string_entry("aud", cmp, required)
  }

  /// Compares the `iss` claim against `cmp`.
  pub fn verify_issuer(&self, cmp: &str, required: bool) -> bool {
    self.verify_string_entry("iss", cmp, required)
  }

  fn verify_string_entry(&self, name: &str, cmp: &str, required: bool) -> bool {
    match self.0.get(name).and_then(Value::as_str) {
      None => !required,
      Some(claim) => verify_string_claim(claim, cmp, required),
    }
  }
}

impl Claims for MapClaims {
  fn validate(&self, now: i64) -> Result<(), ValidationError> {
    let mut err = ValidationError::default();

    if !self.verify_expires_at(now, false) {
      err.set(ValidationError::EXPIRED, "token is expired");
    }
    if !self.verify_issued_at(now, false) {
      err.set(ValidationError::ISSUED_AT, "token used before issued");
    }
    if !self.verify_not_before(now, false) {
      err.set(ValidationError::NOT_VALID_YET, "token is not valid yet");
    }

    if err.is_empty() {
      Ok(())
    } else {
      Err(err)
    }
  }
}

// ----- shared claim checks

fn verify_string_claim(claim: &str, cmp: &str, required: bool) -> bool {
  if claim.is_empty() {
    return !required;
  }

  // Identity claims are compared in constant time so a probing caller
  // learns nothing from how quickly a mismatch is reported.
  ConstantTimeEquals(claim.as_bytes(), cmp.as_bytes()).is_ok()
}

fn verify_exp(exp: i64, now: i64, required: bool) -> bool {
  if exp == 0 {
    return !required;
  }
  now <= exp
}

fn verify_iat(iat: i64, now: i64, required: bool) -> bool {
  if iat == 0 {
    return !required;
  }
  now >= iat
}

fn verify_nbf(nbf: i64, now: i64, required: bool) -> bool {
  if nbf == 0 {
    return !required;
  }
  now >= nbf
}
