//! Integration tests for pooling real TCP connections.
//!
//! A local echo server answers every `PING` with `PONG`; the pool manages
//! client connections to it through the full borrow, return and destroy
//! lifecycle.

mod common;

use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use berth_pool::{Pool, PoolConfig, PoolError};

fn connection_pool(
    addr: SocketAddr,
    initial_size: usize,
    capacity: usize,
) -> (Pool<TcpStream>, Arc<AtomicUsize>) {
    let disposed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&disposed);

    let pool = Pool::builder(PoolConfig::new(initial_size, capacity))
        .creator(move || TcpStream::connect(addr))
        .validator(|conn: &TcpStream| conn.peer_addr().is_ok())
        .disposer(move |conn: TcpStream| {
            let _ = conn.shutdown(Shutdown::Both);
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .expect("Failed to create connection pool");

    (pool, disposed)
}

#[test]
fn test_connection_pool_lifecycle() {
    let addr = common::spawn_echo_server();
    let (pool, disposed) = connection_pool(addr, 2, 10);
    assert_eq!(pool.len(), 2);

    // Borrow, use, return.
    let mut conn = pool.get().unwrap();
    common::ping(&mut conn);
    assert_eq!(pool.len(), 1);
    pool.put(conn);
    assert_eq!(pool.len(), 2);

    // A reused connection keeps working.
    let mut conn = pool.get().unwrap();
    for _ in 0..10 {
        common::ping(&mut conn);
    }
    assert_eq!(pool.len(), 1);
    pool.put(conn);
    assert_eq!(pool.len(), 2);

    // Sequential borrows never grow the pool.
    for _ in 0..10 {
        let mut conn = pool.get().unwrap();
        common::ping(&mut conn);
        pool.put(conn);
    }
    assert_eq!(pool.len(), 2);

    // Borrow past the idle count, then return more than capacity.
    let mut conns = Vec::new();
    for _ in 0..20 {
        let mut conn = pool.get().unwrap();
        common::ping(&mut conn);
        conns.push(conn);
    }
    for conn in conns {
        pool.put(conn);
    }
    assert_eq!(pool.len(), 10);
    assert_eq!(disposed.load(Ordering::SeqCst), 10);

    // A connection that is never returned just leaves the pool.
    let mut kept = pool.get().unwrap();
    common::ping(&mut kept);
    assert_eq!(pool.len(), 9);

    pool.destroy();
    assert_eq!(pool.len(), 0);
    assert_eq!(disposed.load(Ordering::SeqCst), 19);

    // After destroy connections are still dialed, just not pooled.
    let mut fresh = pool.get().unwrap();
    common::ping(&mut fresh);
    assert_eq!(pool.len(), 0);
    pool.put(fresh);
    assert_eq!(pool.len(), 0);
    assert_eq!(disposed.load(Ordering::SeqCst), 20);

    common::ping(&mut kept);
}

#[test]
fn test_concurrent_connections() {
    let addr = common::spawn_echo_server();
    let (pool, disposed) = connection_pool(addr, 2, 4);
    let pool = Arc::new(pool);

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for _ in 0..25 {
                    let mut conn = pool.checkout().unwrap();
                    common::ping(&mut conn);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert!(pool.len() <= 4);
    let idle = pool.len();
    pool.destroy();
    assert!(disposed.load(Ordering::SeqCst) >= idle);
}

#[test]
fn test_unreachable_server() {
    // Bind and immediately drop a listener so the port refuses connections.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let err = Pool::new(1, 2, move || TcpStream::connect(addr)).unwrap_err();
    assert!(matches!(err.error(), PoolError::CreationFailed(_)));

    let pool = err.into_pool().unwrap();
    assert_eq!(pool.len(), 0);
    assert!(pool.get().unwrap_err().is_creation_error());
}
