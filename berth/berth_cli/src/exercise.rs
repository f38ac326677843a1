//! Exercise a connection pool against an echo server
//!
//! Worker threads borrow connections from a shared `Pool<TcpStream>`, make
//! one PING/PONG exchange per round and hand the connection back. Broken
//! connections are detached and dropped instead of being returned.

use std::fmt;
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use berth_pool::{Pool, PoolConfig};
use log::{debug, info, warn};

use crate::config::ExerciseConfig;
use crate::echo;

/// Outcome of an exercise run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseReport {
    /// Worker threads used
    pub workers: usize,

    /// Successful PING/PONG exchanges
    pub exchanges: usize,

    /// Exchanges that failed and dropped their connection
    pub failures: usize,

    /// Connections dialed, including the initial fill
    pub dialed: usize,

    /// Connections passed to the disposer
    pub disposed: usize,

    /// Idle connections right before the pool was destroyed
    pub idle_before_destroy: usize,

    /// Wall-clock duration of the worker phase
    pub elapsed: Duration,
}

impl fmt::Display for ExerciseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "workers: {}", self.workers)?;
        writeln!(f, "exchanges: {}", self.exchanges)?;
        writeln!(f, "failures: {}", self.failures)?;
        writeln!(f, "dialed: {}", self.dialed)?;
        writeln!(f, "disposed: {}", self.disposed)?;
        writeln!(f, "idle before destroy: {}", self.idle_before_destroy)?;
        write!(f, "elapsed: {:?}", self.elapsed)
    }
}

#[derive(Default)]
struct Tally {
    dialed: AtomicUsize,
    disposed: AtomicUsize,
}

fn connection_pool(
    addr: SocketAddr,
    pool_config: PoolConfig,
    read_timeout: Duration,
    tally: &Arc<Tally>,
) -> Result<Pool<TcpStream>> {
    let dialed = Arc::clone(tally);
    let disposed = Arc::clone(tally);

    let built = Pool::builder(pool_config)
        .creator(move || {
            let conn = TcpStream::connect(addr)?;
            conn.set_read_timeout(Some(read_timeout))?;
            dialed.dialed.fetch_add(1, Ordering::Relaxed);
            Ok::<_, std::io::Error>(conn)
        })
        .validator(|conn: &TcpStream| matches!(conn.take_error(), Ok(None)))
        .disposer(move |conn: TcpStream| {
            if let Err(e) = conn.shutdown(Shutdown::Both) {
                debug!("Failed to shut down pooled connection: {}", e);
            }
            disposed.disposed.fetch_add(1, Ordering::Relaxed);
        })
        .build();

    match built {
        Ok(pool) => Ok(pool),
        Err(err) => match err.into_parts() {
            (error, Some(pool)) => {
                warn!(
                    "Continuing with {} pre-created connections: {}",
                    pool.len(),
                    error
                );
                Ok(pool)
            }
            (error, None) => Err(error).context("Invalid pool configuration"),
        },
    }
}

/// Run the exercise against the echo server at `addr`
pub fn run(
    addr: SocketAddr,
    pool_config: PoolConfig,
    exercise: &ExerciseConfig,
) -> Result<ExerciseReport> {
    let tally = Arc::new(Tally::default());
    let read_timeout = Duration::from_millis(exercise.read_timeout_ms.max(1));
    let pool = Arc::new(connection_pool(addr, pool_config, read_timeout, &tally)?);

    info!(
        "Exercising pool (capacity {}) against {} with {} workers x {} rounds",
        pool.capacity(),
        addr,
        exercise.workers,
        exercise.rounds
    );

    let started = Instant::now();
    let mut handles = Vec::with_capacity(exercise.workers);
    for worker in 0..exercise.workers {
        let pool = Arc::clone(&pool);
        let rounds = exercise.rounds;
        let handle = thread::Builder::new()
            .name(format!("exercise-{}", worker))
            .spawn(move || run_worker(&pool, rounds))
            .context("Failed to spawn worker thread")?;
        handles.push(handle);
    }

    let mut exchanges = 0;
    let mut failures = 0;
    for handle in handles {
        let (ok, failed) = handle
            .join()
            .map_err(|_| anyhow!("exercise worker panicked"))??;
        exchanges += ok;
        failures += failed;
    }
    let elapsed = started.elapsed();

    let idle_before_destroy = pool.len();
    pool.destroy();

    Ok(ExerciseReport {
        workers: exercise.workers,
        exchanges,
        failures,
        dialed: tally.dialed.load(Ordering::Relaxed),
        disposed: tally.disposed.load(Ordering::Relaxed),
        idle_before_destroy,
        elapsed,
    })
}

fn run_worker(pool: &Arc<Pool<TcpStream>>, rounds: usize) -> Result<(usize, usize)> {
    let mut exchanges = 0;
    let mut failures = 0;

    for _ in 0..rounds {
        let mut conn = pool.checkout().context("Failed to borrow connection")?;
        match echo::exchange(&mut conn) {
            Ok(()) => exchanges += 1,
            Err(e) => {
                warn!("Exchange failed, dropping connection: {}", e);
                drop(conn.detach());
                failures += 1;
            }
        }
    }

    Ok((exchanges, failures))
}
