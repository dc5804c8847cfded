//! Byte-Strom mit einem gemeinsamen Cursor fuer Lesen und Schreiben
//!
//! Ein wachsender Puffer, auf dem Lese- und Schreibzugriffe ueber dieselbe
//! Position laufen. Der Paket-Codec baut damit ein Paket auf und liest es
//! unmittelbar danach wieder aus, ohne zwischen getrennten Reader-/
//! Writer-Objekten umkopieren zu muessen.
//!
//! ## Cursor-Regeln
//!
//! - `write` haengt an der Cursor-Position an und vergroessert den Puffer
//!   bei Bedarf; liegt der Cursor durch einen vorherigen Seek hinter dem
//!   Stream-Ende, wird die Luecke mit Nullbytes gefuellt.
//! - `read` liefert hoechstens die angeforderte Anzahl Bytes und am
//!   Stream-Ende entsprechend weniger (oder gar keine).
//! - Negative Seek-Positionen zaehlen vom Stream-Ende (`laenge + position`).

use std::io;

/// Maximale Puffer-Kapazitaet (56 Bytes unterhalb des Vec-Maximums,
/// damit Laengenrechnungen nahe der Grenze nicht ueberlaufen)
pub const MAX_PUFFER_KAPAZITAET: usize = (isize::MAX as usize) - 56;

/// Minimale Kapazitaet beim ersten Wachstum
const MIN_KAPAZITAET: usize = 256;

// ---------------------------------------------------------------------------
// ByteStream
// ---------------------------------------------------------------------------

/// Wachsender Byte-Puffer mit einem Lese-/Schreib-Cursor
///
/// Die logische Laenge des Stroms ist von der Kapazitaet des Puffers
/// entkoppelt; `als_bytes` liefert immer exakt den Bereich `[0, laenge)`.
#[derive(Debug, Clone, Default)]
pub struct ByteStream {
    /// Hinterlegter Speicher; `puffer.len()` ist die Kapazitaet
    puffer: Vec<u8>,
    /// Lese-/Schreib-Position
    position: usize,
    /// Logische Laenge des Stroms
    laenge: usize,
}

impl ByteStream {
    /// Erstellt einen leeren Strom
    pub fn neu() -> Self {
        Self::default()
    }

    /// Erstellt einen Strom aus einer Kopie der uebergebenen Bytes
    ///
    /// Der Cursor steht am Anfang, die Laenge entspricht dem Slice.
    pub fn aus_bytes(daten: &[u8]) -> Self {
        Self {
            puffer: daten.to_vec(),
            position: 0,
            laenge: daten.len(),
        }
    }

    /// Logische Laenge des Stroms in Bytes
    pub fn laenge(&self) -> usize {
        self.laenge
    }

    /// Aktuelle Cursor-Position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Setzt die Cursor-Position
    ///
    /// Negative Werte zaehlen vom Stream-Ende (`laenge + position`); ein
    /// Ergebnis vor dem Stream-Anfang wird auf 0 geklemmt. Positionen
    /// hinter dem Ende sind erlaubt, die Luecke fuellt der naechste
    /// Schreibzugriff mit Nullbytes.
    pub fn position_setzen(&mut self, position: i64) {
        if position < 0 {
            self.position = (self.laenge as i64 + position).max(0) as usize;
        } else {
            self.position = position as usize;
        }
    }

    /// Setzt den Cursor an den Stream-Anfang
    pub fn seek_anfang(&mut self) {
        self.position = 0;
    }

    /// Setzt den Cursor an das Stream-Ende
    pub fn seek_ende(&mut self) {
        self.position = self.laenge;
    }

    /// Liest bis zu `anzahl` Bytes ab dem Cursor
    ///
    /// Am Stream-Ende werden weniger Bytes geliefert, gegebenenfalls ein
    /// leerer Vektor. Der Puffer waechst durch Lesen nie.
    pub fn lesen(&mut self, anzahl: usize) -> Vec<u8> {
        let verfuegbar = self.laenge.saturating_sub(self.position);
        let n = anzahl.min(verfuegbar);
        if n == 0 {
            // Cursor kann hinter dem Ende stehen, dann gibt es nichts
            return Vec::new();
        }
        let ergebnis = self.puffer[self.position..self.position + n].to_vec();
        self.position += n;
        ergebnis
    }

    /// Liest ein einzelnes Byte, `None` am Stream-Ende
    pub fn byte_lesen(&mut self) -> Option<u8> {
        if self.position >= self.laenge {
            return None;
        }
        let b = self.puffer[self.position];
        self.position += 1;
        Some(b)
    }

    /// Liest alle Bytes vom Cursor bis zum Stream-Ende
    pub fn rest_lesen(&mut self) -> Vec<u8> {
        self.lesen(self.laenge.saturating_sub(self.position))
    }

    /// Schreibt Bytes an der Cursor-Position
    ///
    /// Liegt der Cursor hinter dem Stream-Ende, wird die Luecke mit
    /// Nullbytes gefuellt. Wuerde die resultierende Laenge die maximale
    /// Stream-Groesse ueberschreiten, schlaegt der gesamte Schreibzugriff
    /// fehl und der Strom bleibt unveraendert.
    pub fn schreiben(&mut self, daten: &[u8]) -> io::Result<()> {
        let neue_laenge = self
            .position
            .checked_add(daten.len())
            .filter(|&l| l <= MAX_PUFFER_KAPAZITAET)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Stream zu lang"))?;

        if neue_laenge > self.laenge {
            if neue_laenge > self.puffer.len() {
                self.kapazitaet_sichern(neue_laenge);
            } else if self.position > self.laenge {
                // Luecke zwischen altem Ende und Cursor nullen
                self.puffer[self.laenge..self.position].fill(0);
            }
            self.laenge = neue_laenge;
        }

        self.puffer[self.position..self.position + daten.len()].copy_from_slice(daten);
        self.position += daten.len();
        Ok(())
    }

    /// Schreibt ein einzelnes Byte an der Cursor-Position
    pub fn byte_schreiben(&mut self, byte: u8) -> io::Result<()> {
        self.schreiben(&[byte])
    }

    /// Liefert eine Kopie des logischen Stream-Inhalts `[0, laenge)`
    ///
    /// Ueberallokierte Kapazitaet ist im Ergebnis nie enthalten.
    pub fn als_bytes(&self) -> Vec<u8> {
        self.puffer[..self.laenge].to_vec()
    }

    /// Vergroessert den Puffer auf mindestens `kapazitaet` Bytes
    ///
    /// Wachstum: mindestens `MIN_KAPAZITAET`, sonst Verdoppelung; oberhalb
    /// der Maximal-Kapazitaet wird exakt auf die angeforderte Groesse
    /// gewachsen. Neuer Speicher ist genullt.
    fn kapazitaet_sichern(&mut self, kapazitaet: usize) {
        if kapazitaet <= self.puffer.len() {
            return;
        }

        let mut neue_kapazitaet = kapazitaet
            .max(MIN_KAPAZITAET)
            .max(self.puffer.len().saturating_mul(2));
        if neue_kapazitaet > MAX_PUFFER_KAPAZITAET {
            // Verdoppelung wuerde das Maximum reissen: exakt wachsen
            neue_kapazitaet = kapazitaet;
        }

        self.puffer.resize(neue_kapazitaet, 0);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
