//! Credential handling: password hashes and signed bearer tokens.
//!
//! # Module Structure
//!
//! - `password`: Argon2id hashing and verification of raw passwords
//! - `token`: The token authority issuing and checking HS256 bearer tokens

pub mod password;
pub mod token;

pub use token::{bearer_token, Claims, TokenAuthority, TokenKind, TokenPair};
