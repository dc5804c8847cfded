//! Chat-Nachricht und ihr Draht-Format
//!
//! Eine Nachricht besteht aus Absendername und Text plus drei reservierten
//! Ganzzahl-Feldern fuer eine kuenftige Fragmentierung langer Nachrichten
//! ueber mehrere Pakete.
//!
//! ## Feld-Reihenfolge (Klartext, vor der Verschluesselung)
//!
//! ```text
//! [Absendername]     Varint-Laenge + UTF-8
//! [Text]             Varint-Laenge + UTF-8
//! [Nachrichten-ID]   Varint (reserviert)
//! [Fragment-Anzahl]  Varint (reserviert)
//! [Fragment-Index]   Varint (reserviert)
//! ```
//!
//! Ein Dekoder muss fehlende nachlaufende Felder tolerieren (fehlend = 0
//! bzw. leer); ein Enkoder schreibt immer alle fuenf Felder.

use std::io;

use crate::serial::SerialBuffer;

/// Eine einzelne Chat-Nachricht
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatMessage {
    /// Anzeigename des Absenders
    pub absender: String,
    /// Nachrichtentext
    pub text: String,
    /// Reservierte Nachrichten-ID (derzeit immer 0)
    pub id: u32,
    /// Reservierte Fragment-Anzahl (derzeit immer 0)
    pub fragment_anzahl: u32,
    /// Reservierter Fragment-Index (derzeit immer 0)
    pub fragment_index: u32,
}

impl ChatMessage {
    /// Erstellt eine neue Nachricht mit Absender und Text
    pub fn neu(absender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            absender: absender.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Serialisiert die Nachricht in ihr Draht-Format
    pub fn serialisieren(&self) -> io::Result<Vec<u8>> {
        let mut puffer = SerialBuffer::neu();
        puffer.text_schreiben(&self.absender)?;
        puffer.text_schreiben(&self.text)?;
        puffer.varint_schreiben(self.id)?;
        puffer.varint_schreiben(self.fragment_anzahl)?;
        puffer.varint_schreiben(self.fragment_index)?;
        Ok(puffer.als_bytes())
    }

    /// Deserialisiert eine Nachricht aus ihrem Draht-Format
    ///
    /// Fehlende nachlaufende Felder werden als leer bzw. 0 gelesen;
    /// fehlerhafte Varints oder abgeschnittene Strings sind ein Fehler.
    pub fn deserialisieren(daten: &[u8]) -> io::Result<Self> {
        let mut puffer = SerialBuffer::aus_bytes(daten);
        let absender = puffer.text_lesen()?.unwrap_or_default();
        let text = puffer.text_lesen()?.unwrap_or_default();
        let id = puffer.varint_lesen()?.unwrap_or(0);
        let fragment_anzahl = puffer.varint_lesen()?.unwrap_or(0);
        let fragment_index = puffer.varint_lesen()?.unwrap_or(0);
        Ok(Self {
            absender,
            text,
            id,
            fragment_anzahl,
            fragment_index,
        })
    }
}

impl std::fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let absender = if self.absender.is_empty() {
            "[]"
        } else {
            &self.absender
        };
        write!(f, "<{}> {}", absender, self.text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
