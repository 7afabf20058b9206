use std::fmt;

use thiserror::Error;

/// Errors from signing, segment decoding, or key handling. These surface
/// directly from [`sign`](crate::methods::SigningMethod::sign) and friends;
/// during a parse they end up as the cause inside a [`ValidationError`].
#[derive(Error, Debug)]
pub enum Error {
  #[error("key is invalid")]
  InvalidKey,
  #[error("key is of invalid type")]
  InvalidKeyType,
  #[error("the requested hash function is unavailable")]
  HashUnavailable,
  #[error("signature is invalid")]
  SignatureInvalid,
  #[error("Base64 decoding failed: {0}")]
  Base64DecodeError(#[from] base64::DecodeError),
  #[error("JSON serialization error: {0}")]
  JsonSerializationError(#[from] serde_json::error::Error),
  #[error("key resolution failed: {0}")]
  KeyResolution(String),
}

/// The aggregate error from parsing and validating a token.
///
/// Every failed check sets one bit in `flags`, so simultaneous failures are
/// all visible to callers branching on the bit set. Only the most recently
/// recorded cause or message survives as the human readable detail; the bit
/// set, not the message, is the authoritative record.
#[derive(Debug, Default)]
pub struct ValidationError {
  /// Bitfield of the flag constants below. Zero means valid.
  pub flags: u32,
  /// The error returned by a lower layer or an external dependency,
  /// i.e. the key resolution callback.
  pub cause: Option<Error>,
  text: Option<String>,
}

impl ValidationError {
  /// The token text is structurally broken.
  pub const MALFORMED: u32 = 1 << 0;
  /// No usable signing method or key, so trust could not be evaluated.
  pub const UNVERIFIABLE: u32 = 1 << 1;
  /// The signature did not match the signing string.
  pub const SIGNATURE_INVALID: u32 = 1 << 2;
  /// The `aud` claim did not hold.
  pub const AUDIENCE: u32 = 1 << 3;
  /// The `exp` claim did not hold.
  pub const EXPIRED: u32 = 1 << 4;
  /// The `iat` claim did not hold.
  pub const ISSUED_AT: u32 = 1 << 5;
  /// The `iss` claim did not hold.
  pub const ISSUER: u32 = 1 << 6;
  /// The `nbf` claim did not hold.
  pub const NOT_VALID_YET: u32 = 1 << 7;
  /// The `jti` claim did not hold.
  pub const ID: u32 = 1 << 8;
  /// A custom claim type reported a failure outside the named categories.
  pub const CLAIMS_INVALID: u32 = 1 << 9;

  /// Creates a validation error from a message and a set of flags.
  pub fn new(text: &str, flags: u32) -> ValidationError {
    ValidationError {
      flags,
      cause: None,
      text: Some(text.to_owned()),
    }
  }

  /// Records a failed check, replacing any earlier message.
  pub fn set(&mut self, flags: u32, text: &str) {
    self.flags |= flags;
    self.cause = None;
    self.text = Some(text.to_owned());
  }

  /// Records a failed check whose detail is a lower level error.
  pub fn set_cause(&mut self, flags: u32, cause: Error) {
    self.flags |= flags;
    self.cause = Some(cause);
    self.text = None;
  }

  /// Folds another validation error into this one. The bit sets are
  /// combined; the newer error's detail wins when it has one.
  pub fn merge(&mut self, other: ValidationError) {
    self.flags |= other.flags;
    if other.cause.is_some() || other.text.is_some() {
      self.cause = other.cause;
      self.text = other.text;
    }
  }

  /// True when every given flag bit is set.
  pub fn contains(&self, flags: u32) -> bool {
    self.flags & flags == flags
  }

  /// True when no check has failed.
  pub fn is_empty(&self) -> bool {
    self.flags == 0
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    if let Some(cause) = &self.cause {
      write!(f, "{}", cause)
    } else if let Some(text) = &self.text {
      f.write_str(text)
    } else {
      f.write_str("token is invalid")
    }
  }
}

impl std::error::Error for ValidationError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    self.cause.as_ref().map(|cause| cause as &(dyn std::error::Error + 'static))
  }
}

#[cfg(test)]
mod unit_tests {
  use super::*;

  #[test]
  fn empty_error_is_valid() {
    let err = ValidationError::default();
    assert!(err.is_empty());
    assert_eq!(err.flags, 0);
    assert_eq!(err.to_string(), "token is invalid");
  }

  #[test]
  fn flags_accumulate_message_is_lossy() {
    let mut err = ValidationError::default();
    err.set(ValidationError::EXPIRED, "token is expired");
    err.set(ValidationError::NOT_VALID_YET, "token is not valid yet");

    assert!(err.contains(ValidationError::EXPIRED));
    assert!(err.contains(ValidationError::NOT_VALID_YET));
    assert!(!err.contains(ValidationError::SIGNATURE_INVALID));
    // Only the newest message survives.
    assert_eq!(err.to_string(), "token is not valid yet");
  }

  #[test]
  fn merge_combines_bits_and_keeps_newest_detail() {
    let mut err = ValidationError::default();
    err.set_cause(ValidationError::SIGNATURE_INVALID, Error::SignatureInvalid);

    err.merge(ValidationError::new("token is expired", ValidationError::EXPIRED));

    assert!(err.contains(ValidationError::SIGNATURE_INVALID | ValidationError::EXPIRED));
    assert_eq!(err.to_string(), "token is expired");
  }

  #[test]
  fn merge_without_detail_keeps_existing_message() {
    let mut err = ValidationError::new("token is expired", ValidationError::EXPIRED);

    let mut other = ValidationError::default();
    other.flags = ValidationError::ISSUED_AT;
    err.merge(other);

    assert!(err.contains(ValidationError::EXPIRED | ValidationError::ISSUED_AT));
    assert_eq!(err.to_string(), "token is expired");
  }

  #[test]
  fn cause_is_exposed_as_source() {
    let mut err = ValidationError::default();
    err.set_cause(ValidationError::UNVERIFIABLE, Error::InvalidKeyType);

    assert_eq!(err.to_string(), "key is of invalid type");
    assert!(std::error::Error::source(&err).is_some());
  }
}
