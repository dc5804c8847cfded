//! Iterierter SHA-224 und die speichergebundene Hash-Konstruktion
//!
//! Der Kanal-Hash soll teuer zu erraten sein: wer Kanalnamen per
//! Woerterbuch durchprobieren will, muss fuer jeden Kandidaten einen
//! grossen Puffer aufbauen und zufaellig darin herumspringen. Ein
//! legitimer Teilnehmer zahlt denselben, aber fixen Preis genau einmal
//! pro Kanal.
//!
//! ## Konstruktion
//!
//! ```text
//! 1. Fuellen:   h = SHA224(daten); fuell_runden mal: anhaengen, h = SHA224(h)
//! 2. Springen:  Cursor startet 4 Bytes vor dem Puffer-Ende.
//!               Pro Runde: 4 Bytes big-endian lesen -> mod Laenge,
//!               auf 8 Bytes abrunden -> 8-Byte-Fenster lesen ->
//!               FNV-1a 64 -> erste 4 Bytes mod Laenge, auf 4 Bytes
//!               abrunden -> neuer Cursor.
//! 3. Ergebnis:  SHA224 des letzten FNV-Werts (28 Bytes).
//! ```

use sha2::{Digest, Sha224};

use flurfunk_protocol::ByteStream;

use crate::error::CryptoResult;
use crate::fnv::fnv1a_64_bytes;

/// Laenge eines SHA-224-Digests in Bytes
pub const DIGEST_LAENGE: usize = 28;

/// Standard-Rundenzahl fuer Fuellen und Springen
pub const STANDARD_RUNDEN: u32 = 32767;

/// Breite des Lese-Fensters beim Pointer-Chasing
const FENSTER_LAENGE: usize = 8;

/// Wendet SHA-224 `runden` mal hintereinander an
///
/// Jede Runde hasht den Digest der vorherigen; `runden = 1` ist der
/// einfache Digest. Rundenzahlen unter 1 werden als 1 behandelt.
pub fn iterated_hash(daten: &[u8], runden: u32) -> [u8; DIGEST_LAENGE] {
    let mut hashwert: [u8; DIGEST_LAENGE] = Sha224::digest(daten).into();
    for _ in 1..runden.max(1) {
        hashwert = Sha224::digest(hashwert).into();
    }
    hashwert
}

/// Einfacher SHA-224-Digest
pub fn hash(daten: &[u8]) -> [u8; DIGEST_LAENGE] {
    iterated_hash(daten, 1)
}

/// Speichergebundener Hash mit Standard-Rundenzahlen
pub fn memory_bound_hash(daten: &[u8]) -> CryptoResult<[u8; DIGEST_LAENGE]> {
    memory_bound_hash_mit_runden(daten, STANDARD_RUNDEN, STANDARD_RUNDEN)
}

/// Speichergebundener Hash mit expliziten Rundenzahlen
///
/// `fuell_runden` bestimmt die Puffer-Groesse (`fuell_runden * 28` Bytes),
/// `sprung_runden` die Anzahl der Pointer-Chasing-Schritte. Rundenzahlen
/// unter 1 werden als 1 behandelt. Ist der Puffer nicht groesser als ein
/// Fenster, wird er direkt gehasht.
pub fn memory_bound_hash_mit_runden(
    daten: &[u8],
    fuell_runden: u32,
    sprung_runden: u32,
) -> CryptoResult<[u8; DIGEST_LAENGE]> {
    let fuell_runden = fuell_runden.max(1);
    let sprung_runden = sprung_runden.max(1);

    let mut puffer = ByteStream::neu();
    let mut hashwert = hash(daten);
    for _ in 0..fuell_runden {
        puffer.schreiben(&hashwert)?;
        hashwert = hash(&hashwert);
    }

    let puffer_laenge = puffer.laenge();
    if puffer_laenge <= FENSTER_LAENGE {
        return Ok(hash(&puffer.als_bytes()));
    }

    puffer.position_setzen(-4);
    let mut offset_hash = [0u8; 8];
    for _ in 0..sprung_runden {
        let zeiger = puffer.lesen(4);
        let mut offset = u32_aus_bytes(&zeiger) as usize % puffer_laenge;
        offset -= offset % FENSTER_LAENGE;
        puffer.position_setzen(offset as i64);

        // Am Puffer-Ende kann das Fenster kuerzer als 8 Bytes sein;
        // gehasht wird genau das Gelesene
        let fenster = puffer.lesen(FENSTER_LAENGE);
        offset_hash = fnv1a_64_bytes(&fenster);

        let mut offset = u32_aus_bytes(&offset_hash) as usize % puffer_laenge;
        offset -= offset % 4;
        puffer.position_setzen(offset as i64);
    }

    Ok(hash(&offset_hash))
}

/// Interpretiert bis zu 4 Bytes als big-endian u32, kuerzere Eingaben
/// werden mit Nullbytes aufgefuellt
fn u32_aus_bytes(bytes: &[u8]) -> u32 {
    let mut arr = [0u8; 4];
    let n = bytes.len().min(4);
    arr[..n].copy_from_slice(&bytes[..n]);
    u32::from_be_bytes(arr)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
