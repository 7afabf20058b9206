//! The base64url codec used for every token segment.
//!
//! Segments use the URL safe alphabet with the trailing `=` padding
//! stripped, since the wire format forbids padding characters inside a
//! segment. Decoding restores the padding before handing the text to the
//! base64 decoder, so the two directions are deliberately asymmetric.

use base64::{decode_config, encode_config, URL_SAFE, URL_SAFE_NO_PAD};

/// Encodes a token segment, emitting no padding.
pub fn encode_segment(data: &[u8]) -> String {
  encode_config(data, URL_SAFE_NO_PAD)
}

/// Decodes a token segment, restoring the stripped padding first.
///
/// Fails on characters outside the URL safe alphabet and on lengths no
/// amount of re-padding can make decodable.
pub fn decode_segment(seg: &str) -> Result<Vec<u8>, base64::DecodeError> {
  let mut padded = seg.to_owned();
  while padded.len() % 4 != 0 {
    padded.push('=');
  }

  decode_config(&padded, URL_SAFE)
}
