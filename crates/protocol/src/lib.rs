//! flurfunk-protocol – Binaer-Formate fuer Flurfunk
//!
//! Dieses Crate definiert die unteren Schichten des Draht-Formats:
//! der Byte-Strom mit gemeinsamem Lese-/Schreib-Cursor, die
//! Varint-Kodierung und das Klartext-Format der Chat-Nachricht.
//! Die aeussere Paket-Rahmung (Kanal-Hash + IV + Ciphertext) lebt im
//! Chat-Crate, weil sie die Kryptografie braucht.

pub mod bytestream;
pub mod message;
pub mod serial;

pub use bytestream::ByteStream;
pub use message::ChatMessage;
pub use serial::SerialBuffer;
