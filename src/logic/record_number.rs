use chrono::{DateTime, Utc};

pub const DEFAULT_PREFIX: &str = "MR";

/// Width of the `record_no` column.
pub const MAX_RECORD_NO_LEN: usize = 32;

/// Leaves room for an 11-digit timestamp, the dash and the suffix.
pub const MAX_PREFIX_LEN: usize = 16;

/// Human-facing chart labels: `<prefix><unix-seconds>-<4 hex>`.
///
/// The random suffix keeps two charts created within the same second from
/// sharing a label; the unique index in storage is the final guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordNumberGenerator {
    prefix: String,
}

impl Default for RecordNumberGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl RecordNumberGenerator {
    pub fn new(prefix: &str) -> Self {
        let prefix: String = prefix.chars().filter(|c| !c.is_whitespace()).collect();
        Self { prefix }
    }

    /// Like [`RecordNumberGenerator::new`], rejecting prefixes too long for storage.
    pub fn try_new(prefix: &str) -> anyhow::Result<Self> {
        let generator = Self::new(prefix);
        let len = generator.prefix.chars().count();
        if len > MAX_PREFIX_LEN {
            anyhow::bail!(
                "record number prefix {:?} is {} characters; at most {} are allowed",
                generator.prefix,
                len,
                MAX_PREFIX_LEN
            );
        }
        Ok(generator)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn generate(&self) -> String {
        self.generate_at(Utc::now())
    }

    pub fn generate_at(&self, at: DateTime<Utc>) -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("{}{}-{}", self.prefix, at.timestamp(), &suffix[..4])
    }
}
