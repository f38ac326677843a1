//! PING/PONG echo server
//!
//! The peer that pooled connections talk to. Every 4-byte message a client
//! sends is answered with `PONG`; a client that disconnects just ends its
//! connection thread.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;

use log::{debug, info, warn};

/// Request every exchange starts with
pub const PING: &[u8; 4] = b"PING";

/// Reply to every 4-byte request
pub const PONG: &[u8; 4] = b"PONG";

/// Bind the echo server and serve it on a background thread.
///
/// Returns the bound address, which differs from the requested one when
/// binding to port 0.
pub fn spawn(addr: impl ToSocketAddrs) -> io::Result<SocketAddr> {
    let listener = TcpListener::bind(addr)?;
    let local = listener.local_addr()?;
    thread::Builder::new()
        .name("echo-server".to_string())
        .spawn(move || serve(listener))?;
    Ok(local)
}

/// Bind the echo server and serve it on the current thread
pub fn run(addr: impl ToSocketAddrs) -> io::Result<()> {
    let listener = TcpListener::bind(addr)?;
    serve(listener);
    Ok(())
}

/// Accept connections forever, one thread per client
pub fn serve(listener: TcpListener) {
    if let Ok(addr) = listener.local_addr() {
        info!("Echo server listening on {}", addr);
    }

    let mut accepted = 0usize;
    for conn in listener.incoming() {
        match conn {
            Ok(conn) => {
                accepted += 1;
                debug!(
                    "Accepted connection {:?}, {} so far",
                    conn.peer_addr().ok(),
                    accepted
                );
                thread::spawn(move || handle(conn));
            }
            Err(e) => warn!("Echo server accept error: {}", e),
        }
    }
}

fn handle(mut conn: TcpStream) {
    let mut request = [0u8; 4];
    loop {
        if conn.read_exact(&mut request).is_err() {
            break;
        }
        if let Err(e) = conn.write_all(PONG) {
            debug!("Echo client went away: {}", e);
            break;
        }
    }
}

/// Send one `PING` and check the `PONG` reply
pub fn exchange(conn: &mut TcpStream) -> io::Result<()> {
    conn.write_all(PING)?;
    let mut reply = [0u8; 4];
    conn.read_exact(&mut reply)?;
    if &reply != PONG {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unexpected reply {:?}", String::from_utf8_lossy(&reply)),
        ));
    }
    Ok(())
}
