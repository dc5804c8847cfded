//! Fehlertypen fuer Flurfunk
//!
//! Zentraler Fehler-Enum der alle moeglichen Fehlerzustaende abdeckt.
//! Untermodule koennen eigene Fehler definieren und via `#[from]` konvertieren.

use thiserror::Error;

/// Globaler Result-Alias fuer Flurfunk
pub type Result<T> = std::result::Result<T, FlurfunkError>;

/// Alle moeglichen Fehler im Flurfunk-System
#[derive(Debug, Error)]
pub enum FlurfunkError {
    // --- Netzwerk ---
    #[error("Netzwerkfehler: {0}")]
    Netzwerk(String),

    #[error("Zeitlimit ueberschritten: {0}")]
    Zeitlimit(String),

    // --- Protokoll ---
    #[error("Ungueltiges Paket: {0}")]
    UngueltigesPaket(String),

    #[error("Kodierungsfehler: {0}")]
    Kodierung(String),

    // --- Kryptografie ---
    #[error("Kryptografiefehler: {0}")]
    Krypto(String),

    // --- Kanaele ---
    #[error("Kanal nicht gefunden: {0}")]
    KanalNichtGefunden(String),

    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl FlurfunkError {
    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Gibt true zurueck wenn der Fehler wiederholbar sein koennte
    pub fn ist_wiederholbar(&self) -> bool {
        matches!(self, Self::Zeitlimit(_) | Self::Netzwerk(_))
    }
}
