//! Configuration for the memory pipeline core.
//!
//! Mirrors the rest of this codebase's configuration style: a `defaults`
//! submodule of named architectural constants, a hierarchical `#[derive(Deserialize)]`
//! struct tree, and per-field `#[serde(default = "...")]` helpers so a caller can
//! override only the fields it cares about from JSON.

use serde::Deserialize;

/// Default configuration constants for the Mbox.
///
/// These are the 21264 HRM's architectural defaults, used whenever a field is
/// not explicitly present in the supplied configuration.
mod defaults {
    /// Number of Load Queue / Store Queue slots.
    pub const QUEUE_LEN: usize = 32;

    /// Number of DTB entries.
    pub const TB_LEN: usize = 32;

    /// Dcache size in bytes (2-way, 512 sets, 64-byte lines = 64 KiB).
    pub const DCACHE_SIZE: usize = 64 * 1024;

    /// Dcache line size in bytes.
    pub const DCACHE_LINE: usize = 64;

    /// Dcache associativity.
    pub const DCACHE_WAYS: usize = 2;

    /// Bcache size in bytes (1 MiB default backing cache).
    pub const BCACHE_SIZE: usize = 1024 * 1024;

    /// Bcache line size in bytes.
    pub const BCACHE_LINE: usize = 64;

    /// Bcache associativity.
    pub const BCACHE_WAYS: usize = 1;

    /// Number of Miss Address File entries.
    pub const MAF_LEN: usize = 8;

    /// Number of I/O Write Buffer entries.
    pub const IOWB_LEN: usize = 4;

    /// Base physical address of the MMIO aperture.
    pub const MMIO_BASE: u64 = 0x8_0000_0000;
}

/// Cache replacement policy selection, shared by the Dcache and Bcache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// Least Recently Used (the architectural default, approximating the
    /// 21264's two-way pseudo-LRU `set_0_1` bit).
    #[default]
    #[serde(alias = "Lru")]
    Lru,
    /// Pseudo-LRU (tree-based).
    #[serde(alias = "Plru")]
    Plru,
    /// First In, First Out.
    #[serde(alias = "Fifo")]
    Fifo,
    /// Random victim selection.
    #[serde(alias = "Random")]
    Random,
    /// Most Recently Used.
    #[serde(alias = "Mru")]
    Mru,
}

/// Geometry of a single cache (used for both Dcache and Bcache).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Total cache size in bytes.
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,
    /// Line size in bytes.
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,
    /// Associativity (ways per set).
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,
    /// Victim-selection policy.
    #[serde(default)]
    pub policy: ReplacementPolicy,
}

impl CacheConfig {
    fn default_size() -> usize {
        defaults::DCACHE_SIZE
    }
    fn default_line() -> usize {
        defaults::DCACHE_LINE
    }
    fn default_ways() -> usize {
        defaults::DCACHE_WAYS
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            size_bytes: Self::default_size(),
            line_bytes: Self::default_line(),
            ways: Self::default_ways(),
            policy: ReplacementPolicy::default(),
        }
    }
}

/// Queue depths for the Load Queue, Store Queue, and miss-tracking structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct QueueConfig {
    /// Number of LQ/SQ slots.
    #[serde(default = "QueueConfig::default_queue_len")]
    pub queue_len: usize,
    /// Number of DTB entries.
    #[serde(default = "QueueConfig::default_tb_len")]
    pub tb_len: usize,
    /// Number of MAF entries.
    #[serde(default = "QueueConfig::default_maf_len")]
    pub maf_len: usize,
    /// Number of IOWB entries.
    #[serde(default = "QueueConfig::default_iowb_len")]
    pub iowb_len: usize,
}

impl QueueConfig {
    fn default_queue_len() -> usize {
        defaults::QUEUE_LEN
    }
    fn default_tb_len() -> usize {
        defaults::TB_LEN
    }
    fn default_maf_len() -> usize {
        defaults::MAF_LEN
    }
    fn default_iowb_len() -> usize {
        defaults::IOWB_LEN
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue_len: Self::default_queue_len(),
            tb_len: Self::default_tb_len(),
            maf_len: Self::default_maf_len(),
            iowb_len: Self::default_iowb_len(),
        }
    }
}

/// Root Mbox configuration.
///
/// # Examples
///
/// ```
/// use mbox_core::config::MboxConfig;
///
/// let config = MboxConfig::default();
/// assert_eq!(config.queues.queue_len, 32);
/// assert_eq!(config.dcache.ways, 2);
/// ```
///
/// Overriding only the Dcache geometry from JSON:
///
/// ```
/// use mbox_core::config::MboxConfig;
///
/// let json = r#"{
///     "dcache": { "size_bytes": 32768, "ways": 4 }
/// }"#;
/// let config: MboxConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.dcache.ways, 4);
/// assert_eq!(config.bcache.ways, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MboxConfig {
    /// LQ/SQ/MAF/IOWB depths.
    #[serde(default)]
    pub queues: QueueConfig,
    /// Dcache geometry.
    #[serde(default = "MboxConfig::default_dcache")]
    pub dcache: CacheConfig,
    /// Bcache geometry.
    #[serde(default = "MboxConfig::default_bcache")]
    pub bcache: CacheConfig,
    /// Base physical address of the MMIO aperture.
    #[serde(default = "MboxConfig::default_mmio_base")]
    pub mmio_base: u64,
}

impl MboxConfig {
    fn default_dcache() -> CacheConfig {
        CacheConfig::default()
    }

    fn default_bcache() -> CacheConfig {
        CacheConfig {
            size_bytes: defaults::BCACHE_SIZE,
            line_bytes: defaults::BCACHE_LINE,
            ways: defaults::BCACHE_WAYS,
            policy: ReplacementPolicy::default(),
        }
    }

    fn default_mmio_base() -> u64 {
        defaults::MMIO_BASE
    }
}

impl Default for MboxConfig {
    /// Not derived: a derived `Default` would call `CacheConfig::default()`
    /// for both `dcache` and `bcache`, giving the Bcache Dcache-shaped
    /// geometry. The `#[serde(default = "...")]` functions above are the
    /// single source of truth for both deserialization and this impl.
    fn default() -> Self {
        Self {
            queues: QueueConfig::default(),
            dcache: Self::default_dcache(),
            bcache: Self::default_bcache(),
            mmio_base: Self::default_mmio_base(),
        }
    }
}
