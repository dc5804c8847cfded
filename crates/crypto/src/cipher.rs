//! Symmetrische Verschluesselung: AES-256-CBC mit PKCS#7-Padding
//!
//! Pro Verschluesselung wird ein frischer 16-Byte-IV aus dem OS-Zufall
//! gezogen. Eine fehlgeschlagene Padding-Pruefung beim Entschluesseln
//! (typisch: falscher Schluessel) ist ein sauberer Fehler, kein Panic.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CryptoError, CryptoResult};
use crate::types::Ciphertext;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Kennung des verwendeten Cipher-Verfahrens
pub const CIPHER_VERFAHREN: &str = "AES-256-CBC/PKCS7";

/// Laenge des Initialisierungsvektors in Bytes
pub const IV_LAENGE: usize = 16;

/// Erwartete Schluessel-Laenge in Bytes
pub const CIPHER_SCHLUESSEL_LAENGE: usize = 32;

/// Verschluesselt Klartext mit einem frisch generierten Zufalls-IV
pub fn encrypt(klartext: &[u8], schluessel: &[u8]) -> CryptoResult<Ciphertext> {
    if schluessel.len() != CIPHER_SCHLUESSEL_LAENGE {
        return Err(CryptoError::UngueltigeSchluesselLaenge {
            erwartet: CIPHER_SCHLUESSEL_LAENGE,
            erhalten: schluessel.len(),
        });
    }
    if klartext.is_empty() {
        return Err(CryptoError::UngueltigeDaten("leerer Klartext".into()));
    }

    let mut iv = [0u8; IV_LAENGE];
    OsRng.fill_bytes(&mut iv);

    let cipher = Aes256CbcEnc::new_from_slices(schluessel, &iv)
        .map_err(|e| CryptoError::Verschluesselung(e.to_string()))?;
    let daten = cipher.encrypt_padded_vec_mut::<Pkcs7>(klartext);

    Ok(Ciphertext::neu(daten, iv.to_vec()))
}

/// Entschluesselt einen Ciphertext
///
/// Schlaegt fehl bei unvollstaendigem Ciphertext (fehlender IV), falscher
/// Schluessel-Laenge oder fehlgeschlagener Padding-Pruefung.
pub fn decrypt(ciphertext: &Ciphertext, schluessel: &[u8]) -> CryptoResult<Vec<u8>> {
    if !ciphertext.ist_gueltig() {
        return Err(CryptoError::UngueltigeDaten(
            "unvollstaendiger Ciphertext".into(),
        ));
    }
    if schluessel.len() != CIPHER_SCHLUESSEL_LAENGE {
        return Err(CryptoError::UngueltigeSchluesselLaenge {
            erwartet: CIPHER_SCHLUESSEL_LAENGE,
            erhalten: schluessel.len(),
        });
    }

    let cipher = Aes256CbcDec::new_from_slices(schluessel, ciphertext.iv())
        .map_err(|e| CryptoError::Entschluesselung(e.to_string()))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext.daten())
        .map_err(|e| CryptoError::Entschluesselung(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::derive_key;

    #[test]
    fn encrypt_decrypt_round_trip() {
        let schluessel = derive_key("test-kanal").unwrap();
        let klartext = b"hallo flurfunk";

        let ciphertext = encrypt(klartext, schluessel.as_bytes()).unwrap();
        assert_eq!(ciphertext.iv().len(), IV_LAENGE);
        // CBC-Ausgabe ist auf Blockgrenzen gepolstert
        assert!(ciphertext.daten().len() >= klartext.len());
        assert_eq!(ciphertext.daten().len() % 16, 0);

        let entschluesselt = decrypt(&ciphertext, schluessel.as_bytes()).unwrap();
        assert_eq!(entschluesselt, klartext);
    }

    #[test]
    fn jeder_aufruf_zieht_frischen_iv() {
        let schluessel = derive_key("test-kanal").unwrap();
        let a = encrypt(b"gleicher text", schluessel.as_bytes()).unwrap();
        let b = encrypt(b"gleicher text", schluessel.as_bytes()).unwrap();
        assert_ne!(a.iv(), b.iv());
        assert_ne!(a.daten(), b.daten());
    }

    #[test]
    fn falscher_schluessel_schlaegt_fehl() {
        let richtig = derive_key("kanal-a").unwrap();
        let falsch = derive_key("kanal-b").unwrap();
        let ciphertext = encrypt(b"geheime nachricht!", richtig.as_bytes()).unwrap();

        match decrypt(&ciphertext, falsch.as_bytes()) {
            // Erwarteter Fall: Padding-Pruefung schlaegt fehl
            Err(_) => {}
            // CBC ohne Authentifizierung: mit ~1/256 Wahrscheinlichkeit
            // passt das Padding zufaellig, dann ist der Klartext Muell
            Ok(klartext) => assert_ne!(klartext, b"geheime nachricht!"),
        }
    }

    #[test]
    fn ungueltige_schluessel_laenge_wird_abgelehnt() {
        let ergebnis = encrypt(b"daten", &[0u8; 16]);
        assert!(matches!(
            ergebnis,
            Err(CryptoError::UngueltigeSchluesselLaenge { .. })
        ));
    }

    #[test]
    fn leerer_klartext_wird_abgelehnt() {
        let schluessel = derive_key("kanal").unwrap();
        assert!(encrypt(&[], schluessel.as_bytes()).is_err());
    }

    #[test]
    fn ciphertext_ohne_iv_wird_abgelehnt() {
        let schluessel = derive_key("kanal").unwrap();
        let kaputt = Ciphertext::neu(vec![0u8; 16], vec![]);
        assert!(decrypt(&kaputt, schluessel.as_bytes()).is_err());
    }
}
