//! Runs an echo server and a handful of clients in one thread, all driven by one poller.
//!
//! Set `RUST_LOG=localpoll=debug` to see what the sockets are up to.

use localpoll::{Acceptor, Connector, Interest, Poller};
use std::{error::Error, io};
use tracing_subscriber::EnvFilter;

const PATH: &str = "/tmp/localpoll-echo.sock";
const CLIENTS: usize = 3;

struct Peer {
    conn: Connector,
    outgoing: Option<Vec<u8>>,
    is_client: bool,
    alive: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let mut acceptor = Acceptor::bind(PATH, 16)?;
    let mut peers = (0..CLIENTS)
        .map(|i| -> io::Result<Peer> {
            Ok(Peer {
                conn: Connector::connect(PATH)?,
                outgoing: Some(format!("Hello from client {i}!").into_bytes()),
                is_client: true,
                alive: true,
            })
        })
        .collect::<io::Result<Vec<_>>>()?;

    let mut poller = Poller::new();
    let mut buf = [0; 256];
    let mut answered = 0;
    while answered < CLIENTS {
        poller.clear();
        poller.add_acceptor(&acceptor);
        for peer in &peers {
            let mut interest = Interest::READABLE;
            if peer.outgoing.is_some() {
                interest |= Interest::WRITABLE;
            }
            poller.add(&peer.conn, interest);
        }
        if poller.poll(1000)? == 0 {
            continue;
        }
        let events = poller.iter().map(|(_, ev)| ev).collect::<Vec<_>>();
        let (acceptor_events, peer_events) = events.split_first().ok_or("poller lost its entries")?;

        for (peer, events) in peers.iter_mut().zip(peer_events) {
            if !peer.conn.update(*events)? {
                peer.alive = false;
                continue;
            }
            if let Some(packet) = &peer.outgoing {
                if peer.conn.try_send(packet)?.is_some() {
                    peer.outgoing = None;
                }
            }
            match peer.conn.try_recv(&mut buf)? {
                Some(0) => peer.alive = false,
                Some(n) => {
                    let packet = buf.get(..n).unwrap_or_default();
                    if peer.is_client {
                        println!("Server answered: {}", String::from_utf8_lossy(packet));
                        answered += 1;
                        peer.alive = false;
                    } else {
                        peer.outgoing = Some(packet.to_vec());
                    }
                }
                None => {}
            }
        }
        peers.retain(|peer| peer.alive);

        acceptor.update(*acceptor_events)?;
        if let Some(conn) = acceptor.accept()? {
            println!("Incoming connection!");
            peers.push(Peer { conn, outgoing: None, is_client: false, alive: true });
        }
    }
    acceptor.unlink();
    Ok(())
}
