//! Dcache and Bcache simulation.
//!
//! Both caches share this same set-associative line store; they differ only
//! in geometry (the Dcache is small and 2-way, the Bcache is the larger,
//! direct-mapped-by-default backing cache) and in who probes them. The Mbox's
//! `TryCaches` protocol probes the Dcache first and falls through to the
//! Bcache on a miss, so a single implementation parameterized by
//! [`crate::config::CacheConfig`] serves both.

use crate::common::constants::AXP_CACHE_LINE_BYTES;
use crate::config::{CacheConfig, ReplacementPolicy as PolicyKind};

use policies::{FifoPolicy, LruPolicy, MruPolicy, PlruPolicy, RandomPolicy, ReplacementPolicy};

/// Pluggable cache victim-selection policies.
pub mod policies;

/// Per-line status bits.
///
/// These mirror the 21264 Dcache's status encoding rather than a textbook
/// MOESI state enum: the hardware keeps independent bits, and a few
/// combinations (e.g. `modified && shared`) are architecturally meaningless
/// but not worth forbidding at the type level here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct LineStatus {
    /// Line holds a valid translation of `tag`.
    pub valid: bool,
    /// Line has been written since it was filled (owns the data).
    pub dirty: bool,
    /// Line may also be cached by another Mbox (Bcache-only in a single-CPU
    /// simulation, kept for protocol fidelity).
    pub shared: bool,
    /// Line holds the sole up-to-date copy.
    pub modified: bool,
    /// Raw `set_0_1` pseudo-LRU hint bit, as exposed by `dcStat` on real
    /// hardware. Not used by the policy abstraction below, but readable for
    /// parity with the architectural status register.
    pub set_0_1: bool,
    /// Line is locked against eviction (e.g. backing a pending load-lock).
    pub locked: bool,
}

/// A single cache line.
#[derive(Clone, Copy, Debug)]
struct Line {
    tag: u64,
    status: LineStatus,
}

impl Default for Line {
    fn default() -> Self {
        Self {
            tag: 0,
            status: LineStatus::default(),
        }
    }
}

/// Outcome of a cache probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeResult {
    /// The line is resident; `way` identifies which way hit.
    Hit { way: usize },
    /// The line is not resident.
    Miss,
}

fn make_policy(kind: PolicyKind, sets: usize, ways: usize) -> Box<dyn ReplacementPolicy> {
    match kind {
        PolicyKind::Lru => Box::new(LruPolicy::new(sets, ways)),
        PolicyKind::Plru => Box::new(PlruPolicy::new(sets, ways)),
        PolicyKind::Fifo => Box::new(FifoPolicy::new(sets, ways)),
        PolicyKind::Random => Box::new(RandomPolicy::new(sets, ways)),
        PolicyKind::Mru => Box::new(MruPolicy::new(sets, ways)),
    }
}

/// A set-associative cache line store shared by the Dcache and the Bcache.
pub struct CacheSim {
    line_bytes: usize,
    sets: usize,
    ways: usize,
    lines: Vec<Line>,
    policy: Box<dyn ReplacementPolicy>,
}

impl CacheSim {
    /// Builds a cache from a geometry configuration.
    ///
    /// Panics if `config.size_bytes` is not evenly divisible by
    /// `line_bytes * ways`; this is a configuration error the caller should
    /// have validated before reaching here.
    pub fn new(config: CacheConfig) -> Self {
        let line_bytes = config.line_bytes.max(1);
        let ways = config.ways.max(1);
        let set_bytes = line_bytes * ways;
        assert!(
            config.size_bytes % set_bytes == 0,
            "cache size {} is not a multiple of {} (line_bytes * ways)",
            config.size_bytes,
            set_bytes
        );
        let sets = config.size_bytes / set_bytes;
        Self {
            line_bytes,
            sets,
            ways,
            lines: vec![Line::default(); sets * ways],
            policy: make_policy(config.policy, sets, ways),
        }
    }

    /// Line size in bytes.
    pub fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Decomposes an address into `(set, tag)`.
    fn set_and_tag(&self, addr: u64) -> (usize, u64) {
        let line_index = addr / self.line_bytes as u64;
        let set = (line_index as usize) % self.sets;
        let tag = line_index / self.sets as u64;
        (set, tag)
    }

    fn index(&self, set: usize, way: usize) -> usize {
        set * self.ways + way
    }

    /// Probes for `addr` without affecting replacement state.
    pub fn probe(&self, addr: u64) -> ProbeResult {
        let (set, tag) = self.set_and_tag(addr);
        for way in 0..self.ways {
            let line = &self.lines[self.index(set, way)];
            if line.status.valid && line.tag == tag {
                return ProbeResult::Hit { way };
            }
        }
        ProbeResult::Miss
    }

    /// Probes for `addr`, updating replacement state on a hit as if it had
    /// just been accessed.
    pub fn access(&mut self, addr: u64) -> ProbeResult {
        let result = self.probe(addr);
        if let ProbeResult::Hit { way } = result {
            let (set, _) = self.set_and_tag(addr);
            self.policy.update(set, way);
        }
        result
    }

    /// Returns the status bits for a resident line, if any.
    pub fn status(&self, addr: u64) -> Option<LineStatus> {
        match self.probe(addr) {
            ProbeResult::Hit { way } => {
                let (set, _) = self.set_and_tag(addr);
                Some(self.lines[self.index(set, way)].status)
            }
            ProbeResult::Miss => None,
        }
    }

    /// Marks a resident line dirty (a store has retired into it).
    ///
    /// Returns `false` if the line is not resident.
    pub fn mark_dirty(&mut self, addr: u64) -> bool {
        match self.probe(addr) {
            ProbeResult::Hit { way } => {
                let (set, _) = self.set_and_tag(addr);
                let idx = self.index(set, way);
                self.lines[idx].status.dirty = true;
                self.lines[idx].status.modified = true;
                true
            }
            ProbeResult::Miss => false,
        }
    }

    /// Installs a freshly filled line at `addr`, evicting a victim per the
    /// configured replacement policy if the set is full of valid lines.
    ///
    /// Returns the evicted line's `(tag, status)` if eviction wrote back a
    /// dirty line, so the caller can push it to the next cache level.
    pub fn install_line(&mut self, addr: u64, initial: LineStatus) -> Option<(u64, LineStatus)> {
        let (set, tag) = self.set_and_tag(addr);

        for way in 0..self.ways {
            let idx = self.index(set, way);
            if !self.lines[idx].status.valid {
                self.lines[idx] = Line { tag, status: initial };
                self.policy.update(set, way);
                return None;
            }
        }

        let victim_way = self.policy.get_victim(set);
        let idx = self.index(set, victim_way);
        let evicted = self.lines[idx];
        self.lines[idx] = Line { tag, status: initial };
        self.policy.update(set, victim_way);

        if evicted.status.valid && evicted.status.dirty {
            let evicted_line_index = evicted.tag * self.sets as u64 + set as u64;
            let evicted_addr = evicted_line_index * self.line_bytes as u64;
            Some((evicted_addr, evicted.status))
        } else {
            None
        }
    }

    /// Invalidates the line holding `addr`, if resident. Used for cache-flush
    /// IPRs and for Cbox-directed invalidation on an external probe hit.
    pub fn invalidate(&mut self, addr: u64) -> bool {
        match self.probe(addr) {
            ProbeResult::Hit { way } => {
                let (set, _) = self.set_and_tag(addr);
                self.lines[self.index(set, way)].status = LineStatus::default();
                true
            }
            ProbeResult::Miss => false,
        }
    }

    /// Invalidates every line. Used by `dcCtl`/full-cache-flush IPR writes.
    pub fn flush(&mut self) {
        for line in &mut self.lines {
            line.status = LineStatus::default();
        }
    }
}

impl Default for CacheSim {
    /// Builds a Dcache-shaped cache at the architectural default geometry.
    fn default() -> Self {
        Self::new(CacheConfig {
            size_bytes: AXP_CACHE_LINE_BYTES * 512 * 2,
            line_bytes: AXP_CACHE_LINE_BYTES,
            ways: 2,
            policy: PolicyKind::Lru,
        })
    }
}
