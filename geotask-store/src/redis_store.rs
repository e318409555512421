//! Redis store implementation (feature `redis`).
//!
//! Every command checks a connection out of a `deadpool-redis` pool and runs
//! under `command_timeout`, so a hung server never blocks a caller forever.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config as RedisConfig, Connection, Pool, Runtime};
use geotask_domain::Point;
use redis::geo::RadiusSearchResult;
use redis::{Cmd, FromRedisValue};
use tracing::debug;

use crate::error::StoreError;
use crate::geo::{DistanceUnit, GeoHit, GeoStore};

/// Production store backed by Redis.
pub struct RedisStore {
    pool: Pool,
    command_timeout: Duration,
}

impl RedisStore {
    /// Build a pool for `redis://host:port/db`. No connection is opened
    /// until the first command; call [`GeoStore::ping`] to verify.
    pub fn new(url: &str, command_timeout: Duration) -> Result<Self, StoreError> {
        let pool = RedisConfig::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self { pool, command_timeout })
    }

    /// URL for a host/port pair on database 0.
    pub fn url(host: &str, port: u16) -> String {
        format!("redis://{}:{}/0", host, port)
    }

    async fn connection(&self) -> Result<Connection, StoreError> {
        tokio::time::timeout(self.command_timeout, self.pool.get())
            .await
            .map_err(|_| StoreError::Timeout(self.command_timeout))?
            .map_err(StoreError::from)
    }

    async fn query<T: FromRedisValue>(&self, cmd: Cmd) -> Result<T, StoreError> {
        let mut conn = self.connection().await?;
        tokio::time::timeout(self.command_timeout, cmd.query_async::<_, T>(&mut conn))
            .await
            .map_err(|_| StoreError::Timeout(self.command_timeout))?
            .map_err(|e| StoreError::from_redis(e, self.command_timeout))
    }
}

/// Score bound in the form Redis expects (`-inf`, `+inf` or a number).
fn score_arg(score: f64) -> String {
    if score == f64::NEG_INFINITY {
        "-inf".to_string()
    } else if score == f64::INFINITY {
        "+inf".to_string()
    } else {
        score.to_string()
    }
}

#[async_trait]
impl GeoStore for RedisStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let pong: String = self.query(redis::cmd("PING")).await?;
        debug!(%pong, "Redis ping");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.query(cmd).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            cmd.arg("PX").arg(ttl.as_millis() as u64);
        }
        self.query(cmd).await
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut cmd = redis::cmd("INCR");
        cmd.arg(key);
        self.query(cmd).await
    }

    async fn geo_add(&self, index: &str, member: &str, point: Point) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("GEOADD");
        cmd.arg(index).arg(point.lng).arg(point.lat).arg(member);
        self.query(cmd).await
    }

    async fn geo_radius(
        &self,
        index: &str,
        center: Point,
        radius: f64,
        unit: DistanceUnit,
    ) -> Result<Vec<GeoHit>, StoreError> {
        let mut cmd = redis::cmd("GEORADIUS");
        cmd.arg(index)
            .arg(center.lng)
            .arg(center.lat)
            .arg(radius)
            .arg(unit.as_str())
            .arg("WITHCOORD")
            .arg("WITHDIST")
            .arg("ASC");

        let results: Vec<RadiusSearchResult> = self.query(cmd).await?;

        results
            .into_iter()
            .map(|r| match (r.coord, r.dist) {
                (Some(coord), Some(distance)) => Ok(GeoHit {
                    member: r.name,
                    point: Point::new(coord.latitude, coord.longitude),
                    distance,
                }),
                _ => Err(StoreError::Database(format!(
                    "GEORADIUS reply for {} lacks coordinates or distance",
                    r.name
                ))),
            })
            .collect()
    }

    async fn zadd(&self, set: &str, member: &str, score: f64) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("ZADD");
        cmd.arg(set).arg(score).arg(member);
        self.query(cmd).await
    }

    async fn zrange_by_score(&self, set: &str, min: f64, max: f64) -> Result<Vec<String>, StoreError> {
        let mut cmd = redis::cmd("ZRANGEBYSCORE");
        cmd.arg(set).arg(score_arg(min)).arg(score_arg(max));
        self.query(cmd).await
    }

    async fn zrem(&self, set: &str, members: &[String]) -> Result<(), StoreError> {
        if members.is_empty() {
            return Ok(());
        }
        let mut cmd = redis::cmd("ZREM");
        cmd.arg(set).arg(members);
        self.query(cmd).await
    }

    async fn zrem_range_by_score(&self, set: &str, min: f64, max: f64) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("ZREMRANGEBYSCORE");
        cmd.arg(set).arg(score_arg(min)).arg(score_arg(max));
        self.query(cmd).await
    }

    async fn zcard(&self, set: &str) -> Result<i64, StoreError> {
        let mut cmd = redis::cmd("ZCARD");
        cmd.arg(set);
        self.query(cmd).await
    }
}
