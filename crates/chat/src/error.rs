//! Fehlertypen fuer das Chat-Crate

use thiserror::Error;

/// Chat-Fehlertypen
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Kanal nicht gefunden: {0}")]
    KanalNichtGefunden(String),

    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    #[error("Sitzung nicht konfiguriert: {0}")]
    NichtKonfiguriert(String),

    #[error("Kryptografie-Fehler: {0}")]
    Krypto(#[from] flurfunk_crypto::CryptoError),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unerwarteter Fehler: {0}")]
    Anyhow(#[from] anyhow::Error),
}

pub type ChatResult<T> = Result<T, ChatError>;
