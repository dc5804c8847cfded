//! Paket-Codec: ChatEntry auf das Draht-Format und zurueck
//!
//! ## Paketaufbau (UDP-Nutzlast, feste Offsets, keine Laengen-Praefixe)
//!
//! ```text
//! Offset  Len  Beschreibung
//! ------  ---  -----------
//!  0      28   Kanal-Hash
//! 28      16   Initialisierungsvektor
//! 44+      N   AES-CBC-Ciphertext der serialisierten ChatMessage
//! ```
//!
//! Gesamtlaenge zwischen 49 und 512 Bytes. Beides sind Protokoll-
//! Konstanten: das Minimum deckt den kleinsten plausiblen Ciphertext ab,
//! das Maximum begrenzt den Speicheraufwand fuer feindliche Eingaben.
//!
//! Beim Dekodieren gibt es keine Fehler nach aussen: jedes Paket, das
//! nicht zu einem registrierten Kanal passt oder sich nicht sauber
//! entschluesseln laesst, wird stillschweigend zu `None`. Die
//! Empfangs-Schleife pollt dann einfach weiter.

use std::sync::Arc;

use flurfunk_core::ChannelHash;
use flurfunk_crypto::{decrypt, encrypt, Ciphertext, IV_LAENGE};
use flurfunk_protocol::{ByteStream, ChatMessage};

use crate::channel::{Channel, ChannelRegistry};
use crate::error::ChatResult;

/// Minimale Paketlaenge: Hash (28) + IV (16) + kleinster Ciphertext (5)
pub const MIN_PAKET_GROESSE: usize = 49;

/// Maximale Paketlaenge
pub const MAX_PAKET_GROESSE: usize = 512;

// ---------------------------------------------------------------------------
// ChatEntry
// ---------------------------------------------------------------------------

/// Eine dekodierte Chat-Nachricht samt zugehoerigem Kanal
///
/// Die Einheit, die zwischen Empfangs-Schleife und Anwendungsschicht
/// ausgetauscht wird.
#[derive(Debug, Clone)]
pub struct ChatEntry {
    kanal: Arc<Channel>,
    nachricht: ChatMessage,
}

impl ChatEntry {
    /// Erstellt einen Eintrag aus Kanal und Nachricht
    pub fn neu(kanal: Arc<Channel>, nachricht: ChatMessage) -> Self {
        Self { kanal, nachricht }
    }

    pub fn kanal(&self) -> &Arc<Channel> {
        &self.kanal
    }

    pub fn nachricht(&self) -> &ChatMessage {
        &self.nachricht
    }

    /// Packt den Eintrag in das Draht-Format
    ///
    /// Serialisiert die Nachricht, verschluesselt sie mit dem
    /// Kanal-Schluessel und haengt Hash, IV und Ciphertext aneinander.
    pub fn verschluesseln(&self) -> ChatResult<Vec<u8>> {
        let nachricht_bytes = self.nachricht.serialisieren()?;
        let ciphertext = encrypt(&nachricht_bytes, self.kanal.schluessel().as_bytes())?;

        let mut strom = ByteStream::neu();
        strom.schreiben(self.kanal.hash().as_bytes())?;
        strom.schreiben(ciphertext.iv())?;
        strom.schreiben(ciphertext.daten())?;
        Ok(strom.als_bytes())
    }

    /// Entpackt ein eingehendes Datagramm
    ///
    /// `None` wenn das Paket ausserhalb der Groessengrenzen liegt, der
    /// Kanal-Hash nicht im Register steht (Paket fuer einen fremden Kanal
    /// oder schlicht Rauschen), die Entschluesselung fehlschlaegt oder
    /// der Klartext keine gueltige Nachricht ist.
    pub fn entschluesseln(register: &ChannelRegistry, paket: &[u8]) -> Option<ChatEntry> {
        if paket.len() < MIN_PAKET_GROESSE || paket.len() > MAX_PAKET_GROESSE {
            return None;
        }

        let mut strom = ByteStream::aus_bytes(paket);
        let hash_bytes = strom.lesen(ChannelHash::LAENGE);
        let hash = ChannelHash::aus_bytes(&hash_bytes)?;
        let kanal = register.finden(&hash)?;

        let iv = strom.lesen(IV_LAENGE);
        let daten = strom.rest_lesen();
        let ciphertext = Ciphertext::neu(daten, iv);

        let klartext = decrypt(&ciphertext, kanal.schluessel().as_bytes()).ok()?;
        let nachricht = ChatMessage::deserialisieren(&klartext).ok()?;

        Some(ChatEntry::neu(kanal, nachricht))
    }
}

impl std::fmt::Display for ChatEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {}", self.kanal, self.nachricht)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_eintrag(register: &ChannelRegistry, kanal_name: &str) -> ChatEntry {
        let kanal = register.kanal_aus_name(kanal_name).unwrap().unwrap();
        ChatEntry::neu(kanal, ChatMessage::neu("alice", "hello"))
    }

    #[test]
    fn round_trip_ueber_den_eigenen_kanal() {
        let register = ChannelRegistry::neu();
        let eintrag = test_eintrag(&register, "general");

        let paket = eintrag.verschluesseln().unwrap();
        assert!(paket.len() >= MIN_PAKET_GROESSE);
        assert!(paket.len() <= MAX_PAKET_GROESSE);

        let dekodiert = ChatEntry::entschluesseln(&register, &paket).unwrap();
        assert_eq!(dekodiert.nachricht().absender, "alice");
        assert_eq!(dekodiert.nachricht().text, "hello");
        assert_eq!(dekodiert.kanal().hash(), eintrag.kanal().hash());
    }

    #[test]
    fn fremder_kanal_wird_verworfen() {
        let sender_register = ChannelRegistry::neu();
        let eintrag = test_eintrag(&sender_register, "general");
        let paket = eintrag.verschluesseln().unwrap();

        // Der Empfaenger kennt nur einen anderen Kanal
        let empfaenger_register = ChannelRegistry::neu();
        empfaenger_register.kanal_aus_name("other-channel").unwrap();

        assert!(ChatEntry::entschluesseln(&empfaenger_register, &paket).is_none());
    }

    #[test]
    fn zu_kurze_pakete_werden_verworfen() {
        let register = ChannelRegistry::neu();
        register.kanal_aus_name("general").unwrap();

        // 48 Bytes beliebigen Inhalts: unter dem Minimum, immer verworfen
        assert!(ChatEntry::entschluesseln(&register, &[0xABu8; 48]).is_none());
        assert!(ChatEntry::entschluesseln(&register, &[]).is_none());
    }

    #[test]
    fn zu_lange_pakete_werden_verworfen() {
        let register = ChannelRegistry::neu();
        let eintrag = test_eintrag(&register, "general");

        // Gueltiges Paket ueber das Maximum hinaus auffuellen
        let mut paket = eintrag.verschluesseln().unwrap();
        paket.resize(MAX_PAKET_GROESSE + 1, 0);
        assert!(ChatEntry::entschluesseln(&register, &paket).is_none());
    }

    #[test]
    fn manipulierter_ciphertext_wird_verworfen() {
        let register = ChannelRegistry::neu();
        let eintrag = test_eintrag(&register, "general");
        let mut paket = eintrag.verschluesseln().unwrap();

        // Letztes Ciphertext-Byte kippen: Padding-Pruefung schlaegt fehl
        // (oder der Klartext zerfaellt zu einer anderen Nachricht)
        let letzte = paket.len() - 1;
        paket[letzte] ^= 0xff;
        if let Some(dekodiert) = ChatEntry::entschluesseln(&register, &paket) {
            assert_ne!(dekodiert.nachricht().text, "hello");
        }
    }

    #[test]
    fn paket_beginnt_mit_dem_kanal_hash() {
        let register = ChannelRegistry::neu();
        let eintrag = test_eintrag(&register, "general");
        let paket = eintrag.verschluesseln().unwrap();
        assert_eq!(&paket[..28], eintrag.kanal().hash().as_bytes());
    }

    #[test]
    fn anzeige_format() {
        let register = ChannelRegistry::neu();
        let eintrag = test_eintrag(&register, "general");
        assert_eq!(eintrag.to_string(), "#general <alice> hello");
    }
}
