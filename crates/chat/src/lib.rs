//! flurfunk-chat – Kanaele, Paket-Codec und UDP-Sitzung
//!
//! Dieses Crate implementiert die obere Haelfte des Flurfunk-Kerns:
//! - Channel/ChannelRegistry: Kanal-Hash und Schluessel aus dem Namen
//!   ableiten, Kanaele fuer das Demultiplexing indizieren
//! - ChatEntry: das Draht-Format (Hash + IV + Ciphertext) packen und
//!   eingehende Datagramme stillschweigend filternd entpacken
//! - ChatReceiver: die abbrechbare Empfangs-Schleife
//! - ChatClient: die Sitzung mit Sende-/Empfangs-Socket und Lebenszyklus
//!
//! # Beispiel
//!
//! ```no_run
//! use std::sync::Arc;
//! use flurfunk_chat::{ChatClient, EntryCallback};
//! use flurfunk_core::Configuration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut client = ChatClient::neu();
//!
//!     let callback: EntryCallback = Arc::new(|eintrag| {
//!         println!("{eintrag}");
//!     });
//!     client.callback_setzen(callback);
//!     client.konfigurieren(Configuration::default()).await?;
//!
//!     let kanal = client
//!         .register()
//!         .kanal_aus_name("general")?
//!         .expect("Name ist nicht leer");
//!     client.text_senden(&kanal, "hallo flur").await?;
//!
//!     client.beenden().await;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod client;
pub mod entry;
pub mod error;
pub mod receiver;

// Bequeme Re-Exporte
pub use channel::{Channel, ChannelRegistry};
pub use client::ChatClient;
pub use entry::{ChatEntry, MAX_PAKET_GROESSE, MIN_PAKET_GROESSE};
pub use error::{ChatError, ChatResult};
pub use receiver::{ChatReceiver, EntryCallback};
