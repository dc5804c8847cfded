//! Gemeinsame Typen fuer das Kryptografie-Subsystem

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// Sicherer Schluessel-Container (wird beim Drop genullt)
#[derive(Clone)]
pub struct SecretBytes(Vec<u8>);

impl Drop for SecretBytes {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretBytes([REDACTED] {} bytes)", self.0.len())
    }
}

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Ciphertext
// ---------------------------------------------------------------------------

/// Container fuer verschluesselte Daten
///
/// Haelt die verschluesselten Bytes, den Initialisierungsvektor und die
/// Kennung des verwendeten Verfahrens zusammen.
#[derive(Debug, Clone)]
pub struct Ciphertext {
    /// Verschluesselte Daten (duerfen leer sein)
    daten: Vec<u8>,
    /// Initialisierungsvektor (16 Bytes bei AES-CBC)
    iv: Vec<u8>,
    /// Kennung des Cipher-Verfahrens
    verfahren: &'static str,
}

impl Ciphertext {
    /// Erstellt einen Ciphertext mit dem Standard-Verfahren
    pub fn neu(daten: Vec<u8>, iv: Vec<u8>) -> Self {
        Self {
            daten,
            iv,
            verfahren: crate::cipher::CIPHER_VERFAHREN,
        }
    }

    pub fn daten(&self) -> &[u8] {
        &self.daten
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn verfahren(&self) -> &'static str {
        self.verfahren
    }

    /// Prueft ob der Ciphertext vollstaendig ist
    ///
    /// Die Daten duerfen leer sein, der IV nicht.
    pub fn ist_gueltig(&self) -> bool {
        !self.iv.is_empty()
    }
}

impl std::fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ verfahren = {}; iv = {}; daten = {} }}",
            self.verfahren,
            als_hex(&self.iv),
            BASE64.encode(&self.daten)
        )
    }
}

/// Rendert Bytes als Hex-String (nur fuer Anzeige und Logs)
pub fn als_hex(daten: &[u8]) -> String {
    daten.iter().map(|b| format!("{b:02x}")).collect()
}
