//! Redis health checks: a PING connection probe and a SET/GET/DEL
//! round-trip probe.

use crate::check::Check;
use crate::status::Status;
use anyhow::Context;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::{Duration, Instant};
use tracing::warn;

const SCRATCH_TTL_SECS: usize = 60;

/// Verifies the connection to Redis by pinging it.
///
/// A successful PING means the connection is open and the server responds;
/// it does not guarantee the client can perform operations. With a latency
/// SLA configured, a PONG that arrives late degrades the status instead of
/// passing.
pub struct Ping {
    conn: ConnectionManager,
    sla: Option<Duration>,
}

impl Ping {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn, sla: None }
    }

    /// Degrade (rather than pass) when the PING round-trip exceeds `sla`.
    pub fn with_sla(conn: ConnectionManager, sla: Duration) -> Self {
        Self {
            conn,
            sla: Some(sla),
        }
    }
}

#[async_trait]
impl Check for Ping {
    async fn status(&self) -> Status {
        let mut conn = self.conn.clone();
        let started = Instant::now();
        let reply: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        ping_status(reply, started.elapsed(), self.sla)
    }
}

fn ping_status(
    reply: redis::RedisResult<String>,
    elapsed: Duration,
    sla: Option<Duration>,
) -> Status {
    match reply {
        Ok(reply) if reply == "PONG" => match sla {
            Some(sla) if elapsed > sla => {
                warn!("Redis PING took {:?}, above the {:?} SLA", elapsed, sla);
                Status::Degraded
            }
            _ => Status::Up,
        },
        Ok(reply) => {
            warn!("Unexpected reply to redis PING: {}", reply);
            Status::Down
        }
        Err(e) => {
            warn!("Redis PING failed: {}", e);
            Status::Down
        }
    }
}

/// Verifies the ability to perform SET, GET, and DEL operations on Redis.
///
/// More thorough than [`Ping`]: use it when connectivity alone is not
/// enough and reads and writes must be proven to work. The scratch key is
/// written with a short TTL so an interrupted check cannot leak it forever.
pub struct ReadWrite {
    conn: ConnectionManager,
    key: String,
}

impl ReadWrite {
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            key: format!("vitals:{}:healthcheck", std::process::id()),
        }
    }

    /// Override the scratch key used for the round-trip.
    pub fn with_key(conn: ConnectionManager, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }

    async fn probe(&self) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();

        conn.set_ex::<_, _, ()>(&self.key, "hello", SCRATCH_TTL_SECS)
            .await
            .context("redis SET")?;
        let value: String = conn.get(&self.key).await.context("redis GET")?;
        if value != "hello" {
            anyhow::bail!("unexpected value for key {}: {}", self.key, value);
        }
        conn.del::<_, ()>(&self.key).await.context("redis DEL")?;
        Ok(())
    }
}

#[async_trait]
impl Check for ReadWrite {
    async fn status(&self) -> Status {
        match self.probe().await {
            Ok(()) => Status::Up,
            Err(e) => {
                warn!("Redis read/write check failed: {:#}", e);
                Status::Down
            }
        }
    }
}
