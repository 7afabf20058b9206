//! The pluggable signing method abstraction and its registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::Error;

pub mod hmac;
pub use self::hmac::SigningMethodHmac;

/// Wraps the key material handed to a signing method, so each method can
/// reject material of the wrong kind instead of misusing it.
#[derive(Clone)]
pub enum Key {
  /// Raw shared secret bytes, used by the HMAC family.
  Secret(Vec<u8>),
  /// DER encoded key material, for asymmetric signing methods.
  Der(Vec<u8>),
}

impl Key {
  /// Wraps a raw shared secret.
  pub fn secret(bytes: &[u8]) -> Key {
    Key::Secret(bytes.to_vec())
  }
}

/// An algorithm able to produce and verify signatures over a signing
/// string.
pub trait SigningMethod {
  /// The identifier carried in the token header's `alg` field.
  fn alg(&self) -> &str;

  /// Signs `signing_input` with `key`, returning the encoded signature
  /// segment.
  fn sign(&self, signing_input: &str, key: &Key) -> Result<String, Error>;

  /// Checks `signature` against `signing_input` and `key`. `Ok(())` means
  /// the signature is genuine.
  fn verify(&self, signing_input: &str, signature: &str, key: &Key) -> Result<(), Error>;
}

/// A signing method instance shareable across tokens and threads.
pub type SharedSigningMethod = Arc<dyn SigningMethod + Send + Sync>;

/// Lookup from algorithm identifier to signing method.
///
/// Intended lifecycle: register everything at startup, then share a plain
/// reference; `resolve` is safe from any number of threads once no more
/// registrations happen. Registering an identifier twice silently replaces
/// the earlier method.
pub struct SigningMethodRegistry {
  methods: HashMap<String, SharedSigningMethod>,
}

impl SigningMethodRegistry {
  /// A registry with nothing registered.
  pub fn empty() -> SigningMethodRegistry {
    SigningMethodRegistry {
      methods: HashMap::new(),
    }
  }

  /// A registry preloaded with the HMAC family: HS256, HS384 and HS512.
  pub fn new() -> SigningMethodRegistry {
    let mut registry = SigningMethodRegistry::empty();
    registry.register(SigningMethodHmac::hs256());
    registry.register(SigningMethodHmac::hs384());
    registry.register(SigningMethodHmac::hs512());
    registry
  }

  /// Stores `method` under its identifier, replacing any earlier entry.
  pub fn register(&mut self, method: SharedSigningMethod) {
    self.methods.insert(method.alg().to_owned(), method);
  }

  /// Looks up the method registered for `alg`. Absence is not an error at
  /// this layer; the parser turns it into an unverifiable token.
  pub fn resolve(&self, alg: &str) -> Option<SharedSigningMethod> {
    self.methods.get(alg).cloned()
  }
}

impl Default for SigningMethodRegistry {
  fn default() -> SigningMethodRegistry {
    SigningMethodRegistry::new()
  }
}
