//! CPU access (privilege) mode.

/// Alpha's four access modes, ordered from most to least privileged.
///
/// The DTB's per-PTE enable bits (`kre`/`ere`/`sre`/`ure`, `kwe`/`ewe`/`swe`/`uwe`)
/// are indexed by this mode; a page readable in `Kernel` need not be readable
/// in `User`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum AccessMode {
    /// Most privileged.
    #[default]
    Kernel = 0,
    Executive = 1,
    Supervisor = 2,
    /// Least privileged.
    User = 3,
}

impl AccessMode {
    /// Index into a per-mode enable-bit array (`[kernel, exec, super, user]`).
    pub fn index(self) -> usize {
        self as usize
    }
}
