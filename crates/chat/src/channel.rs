//! Kanaele und das Kanal-Register
//!
//! Ein Kanal wird allein durch seinen Namen (und optional ein geteiltes
//! Passwort) bestimmt: der 28-Byte-Hash entsteht aus dem Namen ueber die
//! speichergebundene Hash-Konstruktion, der symmetrische Schluessel per
//! PBKDF2 aus dem Passwort (Standard: der Name selbst). Das Register
//! indiziert Kanaele nach ihrem Hash; der Hash-Treffer beim Empfang ist
//! zugleich die implizite Pruefung "wir besitzen den Schluessel".
//!
//! Kanaele werden nie aus dem Register entfernt. Bei einer (praktisch
//! ausgeschlossenen) Hash-Kollision gewinnt der zuletzt angelegte Kanal.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use flurfunk_core::ChannelHash;
use flurfunk_crypto::{derive_key, memory_bound_hash, SecretBytes};

use crate::error::ChatResult;

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// Ein Chat-Kanal mit abgeleitetem Hash und Schluessel
///
/// Nach der Konstruktion unveraenderlich; das Register haelt den Kanal
/// fuer die Lebensdauer des Prozesses.
pub struct Channel {
    /// Klartext-Name (verlaesst den Prozess nie)
    name: String,
    /// Oeffentliche Kanal-Kennung auf dem Draht
    hash: ChannelHash,
    /// Symmetrischer AES-256-Schluessel
    schluessel: SecretBytes,
}

impl Channel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hash(&self) -> &ChannelHash {
        &self.hash
    }

    pub fn schluessel(&self) -> &SecretBytes {
        &self.schluessel
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Schluessel bleibt aussen vor
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("hash", &self.hash)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ChannelRegistry
// ---------------------------------------------------------------------------

/// Register aller bekannten Kanaele, indiziert nach Kanal-Hash
///
/// Wird als Wert vom Sitzungs-Kontext gehalten und per Referenz an den
/// Paket-Codec gereicht (kein globaler Zustand). Geschrieben wird nur
/// beim Anlegen eines Kanals, gelesen bei jedem eingehenden Datagramm;
/// ein einzelnes RwLock um die Map genuegt dafuer.
#[derive(Default)]
pub struct ChannelRegistry {
    kanaele: RwLock<HashMap<ChannelHash, Arc<Channel>>>,
}

impl ChannelRegistry {
    /// Erstellt ein leeres Register
    pub fn neu() -> Self {
        Self::default()
    }

    /// Legt einen Kanal an, dessen Schluessel aus dem Namen selbst
    /// abgeleitet wird, und registriert ihn
    ///
    /// Ein leerer Name steht fuer "kein Kanal": Ergebnis `None`, nichts
    /// wird registriert.
    pub fn kanal_aus_name(&self, name: &str) -> ChatResult<Option<Arc<Channel>>> {
        // Der Name des Kanals ist zugleich das Kanal-Passwort
        self.kanal_aus_geschuetztem_namen(name, name)
    }

    /// Legt einen Kanal mit explizitem geteiltem Passwort an
    ///
    /// Der Hash entsteht weiterhin aus dem Namen (Demultiplexing), nur
    /// der Schluessel aus dem Passwort. So koennen Teilnehmer einem
    /// oeffentlich benannten Kanal beitreten, ohne mitlesen zu koennen,
    /// solange ihnen das Passwort fehlt.
    pub fn kanal_aus_geschuetztem_namen(
        &self,
        name: &str,
        passwort: &str,
    ) -> ChatResult<Option<Arc<Channel>>> {
        if name.is_empty() {
            return Ok(None);
        }

        let hash = ChannelHash::from(memory_bound_hash(name.as_bytes())?);
        let schluessel = derive_key(passwort)?;
        let kanal = Arc::new(Channel {
            name: name.to_string(),
            hash,
            schluessel,
        });

        tracing::debug!(kanal = name, hash = %hash, "Kanal registriert");
        self.kanaele.write().insert(hash, Arc::clone(&kanal));
        Ok(Some(kanal))
    }

    /// Sucht einen Kanal anhand seines 28-Byte-Hashes
    pub fn finden(&self, hash: &ChannelHash) -> Option<Arc<Channel>> {
        self.kanaele.read().get(hash).cloned()
    }

    /// Liefert eine Momentaufnahme aller registrierten Kanaele
    pub fn alle(&self) -> Vec<Arc<Channel>> {
        self.kanaele.read().values().cloned().collect()
    }

    /// Anzahl der registrierten Kanaele
    pub fn anzahl(&self) -> usize {
        self.kanaele.read().len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
