//! FNV-1a Streuwerte (nicht kryptografisch)
//!
//! Schnelle Hashes fuer das Pointer-Chasing der speichergebundenen
//! Hash-Konstruktion und als deterministisches Salz der
//! Schluessel-Ableitung. Beide Ausgaben sind big-endian serialisiert.

use std::hash::Hasher;

use fnv::FnvHasher;

/// FNV-1a 32-Bit Offset-Basis
const FNV_OFFSET_BASIS_32: u32 = 0x811c9dc5;
/// FNV-1a 32-Bit Primzahl (2^24 + 2^8 + 0x93)
const FNV_PRIME_32: u32 = 0x0100_0193;

/// Berechnet den 64-Bit FNV-1a Hash der Daten
pub fn fnv1a_64(daten: &[u8]) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(daten);
    hasher.finish()
}

/// Berechnet den 64-Bit FNV-1a Hash als 8 big-endian Bytes
pub fn fnv1a_64_bytes(daten: &[u8]) -> [u8; 8] {
    fnv1a_64(daten).to_be_bytes()
}

/// Berechnet den 32-Bit FNV-1a Hash der Daten
pub fn fnv1a_32(daten: &[u8]) -> u32 {
    let mut hashwert = FNV_OFFSET_BASIS_32;
    for &b in daten {
        hashwert ^= b as u32;
        hashwert = hashwert.wrapping_mul(FNV_PRIME_32);
    }
    hashwert
}

/// Berechnet den 32-Bit FNV-1a Hash als 4 big-endian Bytes
pub fn fnv1a_32_bytes(daten: &[u8]) -> [u8; 4] {
    fnv1a_32(daten).to_be_bytes()
}
