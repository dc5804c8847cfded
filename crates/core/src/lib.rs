//! flurfunk-core – Gemeinsame Typen, Konfiguration und Fehlertypen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Flurfunk-Crates gemeinsam genutzt werden.

pub mod error;
pub mod logging;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{FlurfunkError, Result};
pub use types::{ChannelHash, CommunicationType, Configuration};
