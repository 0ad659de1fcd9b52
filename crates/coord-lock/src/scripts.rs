//! Lua scripts enforcing the lock's compare-and-X invariants atomically.
//!
//! `KEYS[1]` is always the full lock key; `ARGV[1]` is always the fencing
//! value. Acquire additionally takes the TTL in milliseconds as `ARGV[2]`;
//! refresh takes the same.

pub(crate) const ACQUIRE: &str = r#"
if redis.call("SET", KEYS[1], ARGV[1], "NX", "PX", ARGV[2]) then
    return 1
else
    return 0
end
"#;

pub(crate) const RELEASE: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

pub(crate) const REFRESH: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("PEXPIRE", KEYS[1], ARGV[2])
else
    return 0
end
"#;
