//! Empfangs-Schleife: rohe Datagramme zu dekodierten Chat-Eintraegen
//!
//! Ein eigener tokio-Task zieht Datagramme vom Socket, dekodiert sie
//! ueber den Paket-Codec und reicht Treffer an den registrierten
//! Callback weiter. Nicht dekodierbare Pakete werden verworfen, die
//! Schleife laeuft weiter.
//!
//! ## Lebenszyklus
//!
//! ```text
//! Idle --starten()--> Running --stop_anfordern() + warten()--> Idle
//! ```
//!
//! Abbruch ist kooperativ: jeder Empfangs-Aufruf ist durch ein Timeout
//! (Standard 1 Sekunde) begrenzt, zusaetzlich lauscht die Schleife auf
//! ein Stop-Signal. Die Abschalt-Latenz ist damit im schlimmsten Fall
//! ein Timeout-Intervall. Ein harter IO-Fehler beendet genau diese
//! Schleifen-Instanz; bis zur naechsten Konfiguration gibt es dann
//! keinen aktiven Empfaenger.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

use crate::channel::ChannelRegistry;
use crate::entry::ChatEntry;

/// Standard-Groesse des Empfangspuffers: eine Speicherseite
pub const DEFAULT_PUFFER_GROESSE: usize = 4096;

/// Kleinste akzeptierte Puffer-Groesse; darunter gilt der Standard
pub const MIN_PUFFER_GROESSE: usize = 16;

/// Standard-Empfangs-Timeout (bestimmt die maximale Abschalt-Latenz)
pub const DEFAULT_EMPFANGS_TIMEOUT: Duration = Duration::from_secs(1);

/// Callback fuer dekodierte Chat-Eintraege
///
/// Wird aus dem Empfangs-Task heraus aufgerufen; die Anwendungsschicht
/// ist selbst dafuer zustaendig, auf ihren eigenen Event-Thread
/// umzusteigen falls noetig.
pub type EntryCallback = Arc<dyn Fn(ChatEntry) + Send + Sync>;

// ---------------------------------------------------------------------------
// ChatReceiver
// ---------------------------------------------------------------------------

/// Die abbrechbare Empfangs-Schleife einer Chat-Sitzung
pub struct ChatReceiver {
    register: Arc<ChannelRegistry>,
    socket: Arc<UdpSocket>,
    puffer_groesse: usize,
    empfangs_timeout: Duration,
    callback: Arc<RwLock<EntryCallback>>,
    laeuft: Arc<AtomicBool>,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ChatReceiver {
    /// Erstellt eine Empfangs-Schleife mit Standard-Puffer und -Timeout
    pub fn neu(
        register: Arc<ChannelRegistry>,
        socket: Arc<UdpSocket>,
        callback: EntryCallback,
    ) -> Self {
        Self::mit_puffer_groesse(register, socket, callback, DEFAULT_PUFFER_GROESSE)
    }

    /// Erstellt eine Empfangs-Schleife mit expliziter Puffer-Groesse
    ///
    /// Groessen unter `MIN_PUFFER_GROESSE` fallen auf den Standard
    /// zurueck.
    pub fn mit_puffer_groesse(
        register: Arc<ChannelRegistry>,
        socket: Arc<UdpSocket>,
        callback: EntryCallback,
        puffer_groesse: usize,
    ) -> Self {
        let puffer_groesse = if puffer_groesse < MIN_PUFFER_GROESSE {
            DEFAULT_PUFFER_GROESSE
        } else {
            puffer_groesse
        };

        Self {
            register,
            socket,
            puffer_groesse,
            empfangs_timeout: DEFAULT_EMPFANGS_TIMEOUT,
            callback: Arc::new(RwLock::new(callback)),
            laeuft: Arc::new(AtomicBool::new(false)),
            stop_tx: None,
            task: None,
        }
    }

    /// Setzt das Empfangs-Timeout (wirksam ab dem naechsten `starten`)
    pub fn empfangs_timeout_setzen(&mut self, timeout: Duration) {
        self.empfangs_timeout = timeout;
    }

    /// Meldet ob die Schleife tatsaechlich laeuft
    ///
    /// Spiegelt den Task-Zustand wider, nicht bloss "Stop angefordert".
    pub fn ist_aktiv(&self) -> bool {
        self.laeuft.load(Ordering::SeqCst)
    }

    /// Ersetzt den Callback; wirksam ab dem naechsten Datagramm
    pub fn callback_setzen(&self, callback: EntryCallback) {
        *self.callback.write() = callback;
    }

    /// Startet den Empfangs-Task
    ///
    /// Ein bereits laufender Empfaenger wird nicht erneut gestartet.
    pub fn starten(&mut self) {
        if self.task.is_some() {
            return;
        }

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        self.stop_tx = Some(stop_tx);

        let register = Arc::clone(&self.register);
        let socket = Arc::clone(&self.socket);
        let callback = Arc::clone(&self.callback);
        let laeuft = Arc::clone(&self.laeuft);
        let empfangs_timeout = self.empfangs_timeout;
        let puffer_groesse = self.puffer_groesse;

        let task = tokio::spawn(async move {
            // Wiederverwendeter Empfangspuffer, keine Allokation pro Paket
            let mut puffer = vec![0u8; puffer_groesse];
            laeuft.store(true, Ordering::SeqCst);
            tracing::info!(puffer = puffer_groesse, "Empfangs-Schleife gestartet");

            loop {
                tokio::select! {
                    // Stop-Signal (auch: Sender wurde gedroppt)
                    _ = &mut stop_rx => {
                        tracing::debug!("Stop-Signal empfangen");
                        break;
                    }

                    ergebnis = timeout(empfangs_timeout, socket.recv_from(&mut puffer)) => {
                        match ergebnis {
                            Ok(Ok((laenge, absender))) => {
                                match ChatEntry::entschluesseln(&register, &puffer[..laenge]) {
                                    Some(eintrag) => {
                                        tracing::trace!(
                                            absender = %absender,
                                            kanal = %eintrag.kanal(),
                                            bytes = laenge,
                                            "Chat-Eintrag dekodiert"
                                        );
                                        let cb = Arc::clone(&*callback.read());
                                        cb(eintrag);
                                    }
                                    None => {
                                        tracing::debug!(
                                            absender = %absender,
                                            bytes = laenge,
                                            "Datagramm verworfen"
                                        );
                                    }
                                }
                            }
                            Ok(Err(e)) => {
                                // Harter IO-Fehler: fatal fuer diese Instanz
                                tracing::error!(fehler = %e, "Empfangsfehler, Schleife endet");
                                break;
                            }
                            Err(_) => {
                                // Timeout: naechster Durchlauf, Stop-Signal
                                // wird im select-Zweig beobachtet
                            }
                        }
                    }
                }
            }

            laeuft.store(false, Ordering::SeqCst);
            tracing::info!("Empfangs-Schleife beendet");
        });

        self.task = Some(task);
    }

    /// Fordert das Ende der Schleife an (kooperativ, nicht blockierend)
    pub fn stop_anfordern(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }

    /// Fordert das Ende an und wartet auf den Task
    ///
    /// Kehrt spaetestens ein Timeout-Intervall nach der naechsten
    /// Poll-Grenze zurueck.
    pub async fn stoppen(&mut self) {
        self.stop_anfordern();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(fehler = %e, "Empfangs-Task endete unsauber");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use flurfunk_protocol::ChatMessage;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::mpsc;

    fn localhost(port: u16) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    async fn empfaenger_mit_kanal(
        kanal_name: &str,
    ) -> (ChatReceiver, Arc<ChannelRegistry>, SocketAddr, mpsc::UnboundedReceiver<ChatEntry>) {
        let register = Arc::new(ChannelRegistry::neu());
        register.kanal_aus_name(kanal_name).unwrap();

        let socket = UdpSocket::bind(localhost(0)).await.unwrap();
        let addr = socket.local_addr().unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        let callback: EntryCallback = Arc::new(move |eintrag| {
            let _ = tx.send(eintrag);
        });

        let empfaenger = ChatReceiver::neu(Arc::clone(&register), Arc::new(socket), callback);
        (empfaenger, register, addr, rx)
    }

    #[tokio::test]
    async fn eintrag_wird_empfangen_und_dekodiert() {
        let (mut empfaenger, register, addr, mut rx) = empfaenger_mit_kanal("general").await;
        empfaenger.starten();

        let kanal = register.finden(register.alle()[0].hash()).unwrap();
        let eintrag = ChatEntry::neu(kanal, ChatMessage::neu("alice", "hello"));
        let paket = eintrag.verschluesseln().unwrap();

        let sender = UdpSocket::bind(localhost(0)).await.unwrap();
        sender.send_to(&paket, addr).await.unwrap();

        let empfangen = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("Eintrag muss rechtzeitig ankommen")
            .unwrap();
        assert_eq!(empfangen.nachricht().absender, "alice");
        assert_eq!(empfangen.nachricht().text, "hello");

        empfaenger.stoppen().await;
        assert!(!empfaenger.ist_aktiv());
    }

    #[tokio::test]
    async fn fremde_datagramme_werden_verworfen() {
        let (mut empfaenger, _register, addr, mut rx) = empfaenger_mit_kanal("general").await;
        empfaenger.starten();

        let sender = UdpSocket::bind(localhost(0)).await.unwrap();
        // Rauschen in gueltiger Groesse und ein zu kurzes Paket
        sender.send_to(&[0xEE; 64], addr).await.unwrap();
        sender.send_to(&[0xEE; 8], addr).await.unwrap();

        let ergebnis = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(ergebnis.is_err(), "kein Eintrag darf dekodiert werden");

        empfaenger.stoppen().await;
    }

    #[tokio::test]
    async fn stoppen_kehrt_innerhalb_des_timeouts_zurueck() {
        let (mut empfaenger, _register, _addr, _rx) = empfaenger_mit_kanal("general").await;
        empfaenger.empfangs_timeout_setzen(Duration::from_secs(1));
        empfaenger.starten();

        // Kurz warten bis der Task laeuft
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(empfaenger.ist_aktiv());

        let start = std::time::Instant::now();
        empfaenger.stoppen().await;
        assert!(
            start.elapsed() <= Duration::from_secs(1),
            "Abschalten muss innerhalb eines Timeout-Intervalls liegen"
        );
        assert!(!empfaenger.ist_aktiv());
    }

    #[tokio::test]
    async fn callback_ersetzen_wirkt_ab_naechstem_datagramm() {
        let register = Arc::new(ChannelRegistry::neu());
        let kanal = register.kanal_aus_name("general").unwrap().unwrap();

        let socket = UdpSocket::bind(localhost(0)).await.unwrap();
        let addr = socket.local_addr().unwrap();

        let erster_zaehler = Arc::new(AtomicUsize::new(0));
        let zaehler = Arc::clone(&erster_zaehler);
        let erster: EntryCallback = Arc::new(move |_| {
            zaehler.fetch_add(1, Ordering::SeqCst);
        });

        let mut empfaenger =
            ChatReceiver::neu(Arc::clone(&register), Arc::new(socket), erster);
        empfaenger.starten();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let zweiter: EntryCallback = Arc::new(move |eintrag| {
            let _ = tx.send(eintrag);
        });
        empfaenger.callback_setzen(zweiter);

        let eintrag = ChatEntry::neu(kanal, ChatMessage::neu("bob", "nach dem wechsel"));
        let sender = UdpSocket::bind(localhost(0)).await.unwrap();
        sender
            .send_to(&eintrag.verschluesseln().unwrap(), addr)
            .await
            .unwrap();

        let empfangen = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("neuer Callback muss den Eintrag bekommen")
            .unwrap();
        assert_eq!(empfangen.nachricht().text, "nach dem wechsel");
        assert_eq!(erster_zaehler.load(Ordering::SeqCst), 0);

        empfaenger.stoppen().await;
    }

    #[tokio::test]
    async fn zu_kleine_puffer_groesse_faellt_auf_standard() {
        let register = Arc::new(ChannelRegistry::neu());
        let socket = UdpSocket::bind(localhost(0)).await.unwrap();
        let callback: EntryCallback = Arc::new(|_| {});

        let empfaenger = ChatReceiver::mit_puffer_groesse(
            register,
            Arc::new(socket),
            callback,
            8, // unter MIN_PUFFER_GROESSE
        );
        assert_eq!(empfaenger.puffer_groesse, DEFAULT_PUFFER_GROESSE);
    }

    #[tokio::test]
    async fn doppeltes_starten_ist_harmlos() {
        let (mut empfaenger, _register, _addr, _rx) = empfaenger_mit_kanal("general").await;
        empfaenger.starten();
        empfaenger.starten();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(empfaenger.ist_aktiv());
        empfaenger.stoppen().await;
    }
}
