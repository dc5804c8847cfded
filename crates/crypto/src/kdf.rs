//! Passwort-basierte Schluessel-Ableitung
//!
//! PBKDF2-HMAC-SHA256 mit 65536 Iterationen und 256-Bit-Ausgabe. Das Salz
//! ist der FNV-1a-64-Hash des Passworts selbst: deterministisch und nicht
//! geheim, dafuer leitet dasselbe Name/Passwort-Paar auf jedem Rechner
//! denselben Schluessel ab, ohne dass ein Salz gespeichert oder verteilt
//! werden muesste.

use hmac::Hmac;
use sha2::Sha256;

use crate::error::{CryptoError, CryptoResult};
use crate::fnv::fnv1a_64_bytes;
use crate::types::SecretBytes;

/// PBKDF2-Iterationen
pub const KDF_ITERATIONEN: u32 = 65536;

/// Laenge des abgeleiteten Schluessels in Bytes (AES-256)
pub const SCHLUESSEL_LAENGE: usize = 32;

/// Leitet einen symmetrischen Schluessel aus einem Passwort ab
pub fn derive_key(passwort: &str) -> CryptoResult<SecretBytes> {
    if passwort.is_empty() {
        return Err(CryptoError::UngueltigeDaten("leeres Passwort".into()));
    }

    let salz = fnv1a_64_bytes(passwort.as_bytes());
    let mut schluessel = vec![0u8; SCHLUESSEL_LAENGE];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(
        passwort.as_bytes(),
        &salz,
        KDF_ITERATIONEN,
        &mut schluessel,
    )
    .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    Ok(SecretBytes::new(schluessel))
}
