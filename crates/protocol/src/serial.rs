//! Laengen-praefigierte Binaer-Kodierung auf LEB128-Basis
//!
//! Ganzzahlen werden als LEB128-Varints kodiert: 7 Nutzbits pro Byte, das
//! hoechste Bit zeigt an ob ein weiteres Byte folgt. Byte-Strings werden
//! als `[Varint-Laenge][Rohbytes]` geschrieben, Texte als ihre UTF-8-Form.
//!
//! ## Varint-Beispiel
//!
//! ```text
//! 5432 = 0x1538
//!
//! Byte 1: (5432 & 0x7f) | 0x80 = 0xb8   (Fortsetzungsbit gesetzt)
//! 5432 >> 7 = 42
//! Byte 2: 42 = 0x2a                     (< 128, letztes Byte)
//!
//! Kodierung: b8 2a
//! ```
//!
//! Werte muessen in 32 Bit passen: spaetestens das fuenfte Byte muss das
//! letzte sein, sonst gilt die Kodierung als fehlerhaft.

use std::io;

use crate::bytestream::ByteStream;

// ---------------------------------------------------------------------------
// SerialBuffer
// ---------------------------------------------------------------------------

/// Schreib-/Lese-Puffer fuer Varint-kodierte Felder
///
/// Ein duenner Aufsatz auf [`ByteStream`]: derselbe Puffer wird erst
/// beschrieben und danach (nach einem Seek an den Anfang) wieder gelesen.
///
/// Lese-Methoden unterscheiden zwei Faelle: ein sauberes Stream-Ende vor
/// dem ersten Byte eines Feldes liefert `Ok(None)` (Feld fehlt), eine
/// fehlerhafte Kodierung liefert `Err`.
#[derive(Debug, Default)]
pub struct SerialBuffer {
    strom: ByteStream,
}

impl SerialBuffer {
    /// Erstellt einen leeren Puffer zum Schreiben
    pub fn neu() -> Self {
        Self::default()
    }

    /// Erstellt einen Lese-Puffer ueber einer Kopie der Bytes
    pub fn aus_bytes(daten: &[u8]) -> Self {
        Self {
            strom: ByteStream::aus_bytes(daten),
        }
    }

    /// Schreibt eine Ganzzahl als LEB128-Varint
    pub fn varint_schreiben(&mut self, wert: u32) -> io::Result<()> {
        let mut wert = wert;
        while wert >= 0x80 {
            self.strom.byte_schreiben((wert as u8 & 0x7f) | 0x80)?;
            wert >>= 7;
        }
        self.strom.byte_schreiben(wert as u8)
    }

    /// Schreibt einen Byte-String als `[Varint-Laenge][Rohbytes]`
    ///
    /// Ein leerer String wird als alleinstehendes Laengen-Praefix 0
    /// kodiert.
    pub fn bytes_schreiben(&mut self, daten: &[u8]) -> io::Result<()> {
        self.varint_schreiben(daten.len() as u32)?;
        self.strom.schreiben(daten)
    }

    /// Schreibt einen Text als UTF-8-Byte-String
    pub fn text_schreiben(&mut self, text: &str) -> io::Result<()> {
        self.bytes_schreiben(text.as_bytes())
    }

    /// Liest eine LEB128-Varint-Ganzzahl
    ///
    /// `Ok(None)` wenn der Strom vor dem ersten Byte endet. Fehler wenn
    /// die Kodierung ein sechstes Byte braeuchte (Wert passt nicht in
    /// 32 Bit) oder der Strom mitten im Varint abbricht.
    pub fn varint_lesen(&mut self) -> io::Result<Option<u32>> {
        let mut shift = 0u32;
        let mut ergebnis = 0u32;
        loop {
            if shift == 35 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "Varint ueberschreitet 32 Bit",
                ));
            }

            let byte = match self.strom.byte_lesen() {
                Some(b) => b,
                None if shift == 0 => return Ok(None),
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "Strom endet mitten im Varint",
                    ))
                }
            };

            ergebnis |= ((byte & 0x7f) as u32) << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                return Ok(Some(ergebnis));
            }
        }
    }

    /// Liest einen laengen-praefigierten Byte-String
    ///
    /// `Ok(None)` wenn das Feld fehlt (Stream-Ende vor dem Praefix).
    /// Fehler wenn weniger Bytes vorhanden sind als das Praefix verspricht.
    pub fn bytes_lesen(&mut self) -> io::Result<Option<Vec<u8>>> {
        let laenge = match self.varint_lesen()? {
            Some(l) => l as usize,
            None => return Ok(None),
        };

        let daten = self.strom.lesen(laenge);
        if daten.len() < laenge {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Byte-String kuerzer als sein Laengen-Praefix",
            ));
        }

        Ok(Some(daten))
    }

    /// Liest einen UTF-8-Text; fehlende Felder werden zu `None`
    pub fn text_lesen(&mut self) -> io::Result<Option<String>> {
        match self.bytes_lesen()? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            None => Ok(None),
        }
    }

    /// Setzt den Cursor an den Anfang (Wechsel von Schreiben zu Lesen)
    pub fn zum_lesen(&mut self) {
        self.strom.seek_anfang();
    }

    /// Liefert den kodierten Inhalt als Byte-Vektor
    pub fn als_bytes(&self) -> Vec<u8> {
        self.strom.als_bytes()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
