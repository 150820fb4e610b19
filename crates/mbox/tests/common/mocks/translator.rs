//! Fake `Translator`: an identity VA→PA map with one-shot fault injection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use mbox_core::common::access::AccessType;
use mbox_core::common::addr::{PhysAddr, VirtAddr};
use mbox_core::common::fault::{Trap, TranslationResult};
use mbox_core::core::access_mode::AccessMode;
use mbox_core::core::collaborators::Translator;

/// Identity-mapped translator (`pa.val() == va.val()`), with faults armed
/// per-address and consumed on the translation that observes them.
#[derive(Clone, Default)]
pub struct FakeTranslator {
    faults: Arc<Mutex<HashMap<u64, Trap>>>,
}

impl FakeTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a one-shot fault: the next translation of `virt_addr` returns
    /// `trap` instead of succeeding.
    pub fn inject_fault(&self, virt_addr: VirtAddr, trap: Trap) {
        self.faults.lock().unwrap().insert(virt_addr.val(), trap);
    }
}

impl Translator for FakeTranslator {
    fn translate(&self, va: VirtAddr, _access: AccessType, _mode: AccessMode) -> TranslationResult {
        if let Some(trap) = self.faults.lock().unwrap().remove(&va.val()) {
            return TranslationResult::fault(trap);
        }
        TranslationResult::success(PhysAddr::new(va.val()))
    }
}
