use std::sync::atomic::{AtomicBool, Ordering};

/// Crawl-mode flags shared between a crawler's passes.
///
/// `syncing` is held for the duration of a first- or back-sync pass and
/// decides whether a later tick may resume an unfinished sync; `top_syncing`
/// marks that a tip crawl has owned the sync record at least once;  `reorg`
/// asks the supply crawler's dispatch loop to wind down after the current
/// batch.
#[derive(Debug, Default)]
pub struct CrawlState {
    syncing: AtomicBool,
    top_syncing: AtomicBool,
    reorg: AtomicBool,
    busy: AtomicBool,
}

impl CrawlState {
    /// Whether a first- or back-sync pass currently owns the sync record.
    pub fn syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    /// Marks or clears first-/back-sync ownership.
    pub fn set_syncing(&self, value: bool) {
        self.syncing.store(value, Ordering::Release);
    }

    /// Whether a tip crawl has run in this process.
    pub fn top_syncing(&self) -> bool {
        self.top_syncing.load(Ordering::Acquire)
    }

    /// Marks that a tip crawl has run.
    pub fn set_top_syncing(&self, value: bool) {
        self.top_syncing.store(value, Ordering::Release);
    }

    /// Whether a reorg was detected during the current pass.
    pub fn reorg(&self) -> bool {
        self.reorg.load(Ordering::Acquire)
    }

    /// Raises or clears the reorg flag.
    pub fn set_reorg(&self, value: bool) {
        self.reorg.store(value, Ordering::Release);
    }

    /// Tries to claim the single-pass slot; `true` when the caller may run a
    /// pass, which it must release with [`CrawlState::finish_pass`].
    pub fn begin_pass(&self) -> bool {
        self.busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok()
    }

    /// Releases the single-pass slot.
    pub fn finish_pass(&self) {
        self.busy.store(false, Ordering::Release);
    }
}
