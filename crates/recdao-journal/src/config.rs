//! Journal configuration.

/// How a [`JournalStore`](crate::JournalStore) writes its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppendMode {
    /// Queue entries to a background task; callers never wait for the write.
    #[default]
    Background,
    /// Write each entry before the operation returns. Failures are still
    /// logged and swallowed.
    Inline,
}

/// Configuration for a journal decorator.
#[derive(Debug, Clone)]
pub struct JournalConfig {
    /// Capacity of the queue feeding the background writer.
    pub channel_capacity: usize,
    /// Write strategy.
    pub append_mode: AppendMode,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
            append_mode: AppendMode::Background,
        }
    }
}

impl JournalConfig {
    /// Inline writes, mostly useful in tests.
    pub fn inline() -> Self {
        Self {
            append_mode: AppendMode::Inline,
            ..Self::default()
        }
    }
}
