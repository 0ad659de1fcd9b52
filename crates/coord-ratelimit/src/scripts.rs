//! Lua scripts implementing the three-axis atomic acquire and its
//! supporting metrics read.
//!
//! `KEYS` are always `{active, tps, tpm}` in that order. A limit of `0`
//! disables both the check and the state update for that axis. Stale
//! sorted-set entries are trimmed before counting so the sliding window is
//! exact regardless of observer skew.

pub(crate) const ACQUIRE: &str = r#"
local active_key = KEYS[1]
local tps_key = KEYS[2]
local tpm_key = KEYS[3]

local max_active = tonumber(ARGV[1])
local max_tps = tonumber(ARGV[2])
local max_tpm = tonumber(ARGV[3])
local transaction_id = ARGV[4]
local now_ns = tonumber(ARGV[5])
local ttl_seconds = tonumber(ARGV[6])

local tps_window_ns = 1000000000
local tpm_window_ns = 60000000000

if max_tps > 0 then
    redis.call("ZREMRANGEBYSCORE", tps_key, "-inf", now_ns - tps_window_ns)
end
if max_tpm > 0 then
    redis.call("ZREMRANGEBYSCORE", tpm_key, "-inf", now_ns - tpm_window_ns)
end

if max_active > 0 then
    local active = tonumber(redis.call("GET", active_key) or "0")
    if active >= max_active then
        return 0
    end
end

if max_tps > 0 then
    local tps_count = redis.call("ZCARD", tps_key)
    if tps_count >= max_tps then
        return -1
    end
end

if max_tpm > 0 then
    local tpm_count = redis.call("ZCARD", tpm_key)
    if tpm_count >= max_tpm then
        return -2
    end
end

if max_active > 0 then
    redis.call("INCR", active_key)
    redis.call("EXPIRE", active_key, ttl_seconds * 2)
end
if max_tps > 0 then
    redis.call("ZADD", tps_key, now_ns, transaction_id)
    redis.call("EXPIRE", tps_key, 2)
end
if max_tpm > 0 then
    redis.call("ZADD", tpm_key, now_ns, transaction_id)
    redis.call("EXPIRE", tpm_key, 60)
end

return 1
"#;

/// `KEYS[1]` is the active-counter key. Decrements and clamps at zero;
/// returns the resulting value.
pub(crate) const RELEASE: &str = r#"
local current = redis.call("DECR", KEYS[1])
if tonumber(current) < 0 then
    redis.call("SET", KEYS[1], 0)
    return 0
end
return current
"#;

/// Deletes all three derived keys for one partition.
pub(crate) const CLEANUP: &str = r#"
return redis.call("DEL", KEYS[1], KEYS[2], KEYS[3])
"#;

/// Returns `{active, tps_count, tpm_count}`.
pub(crate) const METRICS: &str = r#"
local active_key = KEYS[1]
local tps_key = KEYS[2]
local tpm_key = KEYS[3]
local now_ns = tonumber(ARGV[1])

local tps_window_ns = 1000000000
local tpm_window_ns = 60000000000

local active = tonumber(redis.call("GET", active_key) or "0")
local tps_count = redis.call("ZCOUNT", tps_key, now_ns - tps_window_ns, now_ns)
local tpm_count = redis.call("ZCOUNT", tpm_key, now_ns - tpm_window_ns, now_ns)

return {active, tps_count, tpm_count}
"#;
