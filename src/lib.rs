//! Creation, signing and verification of JSON Web Tokens in their compact
//! serialization: a header, a claim set and a signature, base64url encoded
//! and joined by dots.
//!
//! Issue with [`Token::signed_string`] or [`TokenBuilder`]; verify with
//! [`Parser::parse`], which resolves the signing method from an injected
//! [`SigningMethodRegistry`] and the key from a caller supplied callback.

pub mod claims;
pub mod clock;
pub mod encoding;
pub mod errors;
pub mod methods;
pub mod parser;
pub mod tokens;

pub use self::claims::{Claims, MapClaims, RegisteredClaims};
pub use self::clock::Clock;
pub use self::errors::{Error, ValidationError};
pub use self::methods::{
  Key, SharedSigningMethod, SigningMethod, SigningMethodHmac, SigningMethodRegistry,
};
pub use self::parser::{ParseError, Parser};
pub use self::tokens::{Token, TokenBuilder};
