//! Redis-backed delayed job queue
//!
//! Layout under a namespace (default `chat:jobs`):
//!
//! - `<ns>:record:<key>`: JSON [`QueuedJob`]
//! - `<ns>:scheduled`: sorted set of job keys scored by due time (ms)
//! - `<ns>:dead`: set of dead-lettered job keys
//!
//! A job key is unique while its record exists. Enqueueing an existing key is
//! a no-op, so a job is pending at most once and a dead-lettered job is not
//! silently revived. Claiming pushes the due time forward by a lease; a worker
//! that dies mid-job leaves the job to be claimed again once the lease ends.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::Script;
use serde::{Deserialize, Serialize};

use booking_chat_core::traits::{RepoResult, TaskQueue};
use booking_chat_core::DomainError;

use crate::pool::{RedisPool, RedisResult};

pub const DEFAULT_NAMESPACE: &str = "chat:jobs";

// KEYS: record, scheduled. ARGV: record json, due ms, job key
const ENQUEUE_SCRIPT: &str = r"
if redis.call('SET', KEYS[1], ARGV[1], 'NX') then
    redis.call('ZADD', KEYS[2], ARGV[2], ARGV[3])
    return 1
end
return 0
";

// KEYS: scheduled. ARGV: now ms, limit, lease-until ms, record key prefix
const CLAIM_SCRIPT: &str = r"
local due = redis.call('ZRANGEBYSCORE', KEYS[1], '-inf', ARGV[1], 'LIMIT', 0, ARGV[2])
local claimed = {}
for _, key in ipairs(due) do
    local record = redis.call('GET', ARGV[4] .. key)
    if record then
        redis.call('ZADD', KEYS[1], ARGV[3], key)
        table.insert(claimed, record)
    else
        redis.call('ZREM', KEYS[1], key)
    end
end
return claimed
";

/// A job as stored in Redis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedJob {
    /// Deduplication key
    pub key: String,
    /// Handler name
    pub name: String,
    pub payload: serde_json::Value,
    /// Attempts that have already failed
    pub attempts: u32,
    pub enqueued_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl QueuedJob {
    pub fn new(name: &str, key: &str, payload: serde_json::Value) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            payload,
            attempts: 0,
            enqueued_at: Utc::now(),
            last_error: None,
        }
    }

    /// Number of the attempt about to run, starting at 1
    #[inline]
    pub fn current_attempt(&self) -> u32 {
        self.attempts + 1
    }
}

/// Redis implementation of [`TaskQueue`] plus the worker-side operations
#[derive(Clone)]
pub struct RedisTaskQueue {
    pool: RedisPool,
    namespace: String,
}

impl RedisTaskQueue {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self::with_namespace(pool, DEFAULT_NAMESPACE)
    }

    #[must_use]
    pub fn with_namespace(pool: RedisPool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }

    fn record_prefix(&self) -> String {
        format!("{}:record:", self.namespace)
    }

    fn record_key(&self, key: &str) -> String {
        format!("{}{key}", self.record_prefix())
    }

    fn scheduled_key(&self) -> String {
        format!("{}:scheduled", self.namespace)
    }

    fn dead_key(&self) -> String {
        format!("{}:dead", self.namespace)
    }

    /// Schedule a job unless one with the same key exists
    pub async fn push(&self, job: &QueuedJob, delay: Duration) -> RedisResult<bool> {
        let mut conn = self.pool.get().await?;
        let due = due_at_ms(Utc::now(), delay);
        let added: i32 = Script::new(ENQUEUE_SCRIPT)
            .key(self.record_key(&job.key))
            .key(self.scheduled_key())
            .arg(serde_json::to_string(job)?)
            .arg(due)
            .arg(&job.key)
            .invoke_async(&mut conn)
            .await?;
        Ok(added == 1)
    }

    /// Claim up to `limit` due jobs, leasing each for `lease`
    pub async fn claim_due(&self, limit: usize, lease: Duration) -> RedisResult<Vec<QueuedJob>> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now();
        let records: Vec<String> = Script::new(CLAIM_SCRIPT)
            .key(self.scheduled_key())
            .arg(now.timestamp_millis())
            .arg(limit.max(1))
            .arg(due_at_ms(now, lease))
            .arg(self.record_prefix())
            .invoke_async(&mut conn)
            .await?;

        let mut jobs = Vec::with_capacity(records.len());
        for record in records {
            match serde_json::from_str::<QueuedJob>(&record) {
                Ok(job) => jobs.push(job),
                Err(e) => tracing::error!(error = %e, "Skipping unreadable job record"),
            }
        }
        Ok(jobs)
    }

    /// Remove a finished job
    pub async fn complete(&self, job: &QueuedJob) -> RedisResult<()> {
        let mut conn = self.pool.get().await?;
        redis::pipe()
            .atomic()
            .del(self.record_key(&job.key))
            .ignore()
            .zrem(self.scheduled_key(), &job.key)
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    /// Record a failed attempt and schedule the next one after `delay`
    pub async fn retry(&self, job: &QueuedJob, delay: Duration, error: &str) -> RedisResult<()> {
        let mut updated = job.clone();
        updated.attempts += 1;
        updated.last_error = Some(error.to_string());

        let mut conn = self.pool.get().await?;
        redis::pipe()
            .atomic()
            .set(self.record_key(&job.key), serde_json::to_string(&updated)?)
            .ignore()
            .zadd(self.scheduled_key(), &job.key, due_at_ms(Utc::now(), delay))
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    /// Move a job to the dead-letter set; it will not run again
    pub async fn bury(&self, job: &QueuedJob, error: &str) -> RedisResult<()> {
        let mut updated = job.clone();
        updated.attempts += 1;
        updated.last_error = Some(error.to_string());

        let mut conn = self.pool.get().await?;
        redis::pipe()
            .atomic()
            .set(self.record_key(&job.key), serde_json::to_string(&updated)?)
            .ignore()
            .zrem(self.scheduled_key(), &job.key)
            .ignore()
            .sadd(self.dead_key(), &job.key)
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    /// Keys of dead-lettered jobs
    pub async fn dead_letters(&self) -> RedisResult<Vec<String>> {
        let mut conn = self.pool.get().await?;
        let keys: Vec<String> = redis::cmd("SMEMBERS")
            .arg(self.dead_key())
            .query_async(&mut conn)
            .await?;
        Ok(keys)
    }

    /// Stored record for `key`, if any
    pub async fn find(&self, key: &str) -> RedisResult<Option<QueuedJob>> {
        let mut conn = self.pool.get().await?;
        let record: Option<String> = redis::cmd("GET")
            .arg(self.record_key(key))
            .query_async(&mut conn)
            .await?;
        Ok(record.map(|r| serde_json::from_str(&r)).transpose()?)
    }
}

fn due_at_ms(now: DateTime<Utc>, delay: Duration) -> i64 {
    now.timestamp_millis() + i64::try_from(delay.as_millis()).unwrap_or(i64::MAX / 2)
}

#[async_trait]
impl TaskQueue for RedisTaskQueue {
    async fn enqueue(
        &self,
        job: &str,
        key: &str,
        payload: serde_json::Value,
        delay: Duration,
    ) -> RepoResult<bool> {
        let queued = QueuedJob::new(job, key, payload);
        let added = self
            .push(&queued, delay)
            .await
            .map_err(|e| DomainError::QueueError(e.to_string()))?;

        if added {
            tracing::info!(job = %job, key = %key, delay_secs = delay.as_secs(), "Job enqueued");
        } else {
            tracing::debug!(job = %job, key = %key, "Job already queued, skipping");
        }
        Ok(added)
    }
}
