//! PING/PONG echo server used to exercise pools of real TCP connections.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;

/// Start an echo server on an ephemeral local port.
///
/// Every 4-byte message is answered with `PONG`. The server runs until the
/// test process exits.
pub fn spawn_echo_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind echo server");
    let addr = listener.local_addr().expect("Echo server has no local address");

    thread::spawn(move || {
        for conn in listener.incoming() {
            let Ok(conn) = conn else { continue };
            thread::spawn(move || serve(conn));
        }
    });

    addr
}

fn serve(mut conn: TcpStream) {
    let mut buf = [0u8; 4];
    while conn.read_exact(&mut buf).is_ok() {
        if conn.write_all(b"PONG").is_err() {
            break;
        }
    }
}

/// Send `PING` and check the reply
pub fn ping(conn: &mut TcpStream) {
    conn.write_all(b"PING").expect("Failed to write PING");
    let mut reply = [0u8; 4];
    conn.read_exact(&mut reply).expect("Failed to read reply");
    assert_eq!(&reply, b"PONG");
}
