use std::fmt;

/// Discriminator for [`crate::Store::update_store`], matching the crawl mode
/// that produced the committing block.
///
/// The variants are mutually exclusive per tick. `None` is the mode of a
/// top-sync tick that runs while a back-sync still owns the sync record; its
/// commits park the record at the fresh sentinel instead of clobbering the
/// back-sync's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncType {
    /// Initial crawl of an empty store.
    First,
    /// Maintenance crawl near the chain tip.
    Top,
    /// Descending crawl resuming an unfinished sync.
    Back,
    /// Tip crawl concurrent with an active back-sync.
    None,
}

impl SyncType {
    /// Whether commits in this mode may advance the sync head.
    pub const fn owns_sync_head(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether this mode holds the `syncing` state flag for the duration of
    /// a pass.
    pub const fn is_exclusive(&self) -> bool {
        matches!(self, Self::First | Self::Back)
    }
}

impl fmt::Display for SyncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::First => "first",
            Self::Top => "top",
            Self::Back => "back",
            Self::None => "",
        };
        f.write_str(s)
    }
}
