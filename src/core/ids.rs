//! Identifier generation.
//!
//! Session, message, study and devotional ids are millisecond timestamps.
//! Two ids minted in the same millisecond would collide, so the generator
//! never hands out a value lower than or equal to the previous one.

use chrono::Utc;

#[derive(Debug, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next millisecond-based value, strictly greater than any earlier one.
    pub fn next_millis(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        self.last = now.max(self.last + 1);
        self.last
    }

    pub fn next_id(&mut self) -> String {
        self.next_millis().to_string()
    }

    pub fn next_prefixed(&mut self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_millis())
    }
}

/// Random UUID-formatted identifier (version 4 layout).
pub fn random_user_id() -> Result<String, getrandom::Error> {
    let mut bytes = [0u8; 16];
    getrandom::fill(&mut bytes)?;
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    Ok(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}
