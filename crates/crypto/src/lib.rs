//! flurfunk-crypto – Hash-Konstruktionen und symmetrische Verschluesselung
//!
//! Dieses Crate buendelt die kryptografischen Bausteine von Flurfunk:
//! - iterierter SHA-224 und die speichergebundene Hash-Konstruktion
//!   fuer Kanal-Kennungen
//! - PBKDF2-Schluessel-Ableitung aus Kanalname oder Passwort
//! - AES-256-CBC Verschluesselung der Chat-Nachrichten
//! - FNV-1a Streuwerte (Salz und Pointer-Chasing)

pub mod cipher;
pub mod error;
pub mod fnv;
pub mod hash;
pub mod kdf;
pub mod types;

pub use cipher::{decrypt, encrypt, IV_LAENGE};
pub use error::{CryptoError, CryptoResult};
pub use hash::{hash, iterated_hash, memory_bound_hash, DIGEST_LAENGE};
pub use kdf::{derive_key, SCHLUESSEL_LAENGE};
pub use types::{Ciphertext, SecretBytes};
