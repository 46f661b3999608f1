//! Re-entrancy guards.
//!
//! A suggestion control reacts to its own writes: updating the displayed text
//! raises a text-changed notification, committing a selection moves keyboard
//! focus, and so on. A [`SyncGuard`] marks a region during which such echoes
//! must be ignored.
//!
//! Guards nest. Each [`SyncGuard::acquire`] returns a [`GuardToken`], and the
//! guard stays held until every token has been dropped. Because release
//! happens in `Drop`, a guard is released even when the guarded code returns
//! early through `?`.
//!
//! # Example
//!
//! ```
//! use horizon_suggest_core::SyncGuard;
//!
//! let skip_text_update = SyncGuard::new("skip_text_update");
//!
//! {
//!     let _token = skip_text_update.acquire();
//!     assert!(skip_text_update.is_held());
//! }
//!
//! assert!(!skip_text_update.is_held());
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::logging::targets;

/// A named, nestable flag that is held while any of its tokens are alive.
///
/// Guards are single-threaded: the state machine they protect runs on one
/// thread, and tokens must be dropped on the thread that created them.
#[derive(Clone)]
pub struct SyncGuard {
    name: &'static str,
    depth: Rc<Cell<usize>>,
}

impl SyncGuard {
    /// Create a released guard with a diagnostic name.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            depth: Rc::new(Cell::new(0)),
        }
    }

    /// The guard's diagnostic name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Hold the guard until the returned token is dropped.
    pub fn acquire(&self) -> GuardToken {
        let depth = self.depth.get() + 1;
        self.depth.set(depth);
        tracing::trace!(target: targets::GUARD, guard = self.name, depth, "guard acquired");
        GuardToken {
            name: self.name,
            depth: Rc::clone(&self.depth),
        }
    }

    /// Whether any token for this guard is alive.
    pub fn is_held(&self) -> bool {
        self.depth.get() > 0
    }

    /// The number of live tokens.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }
}

impl fmt::Debug for SyncGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncGuard")
            .field("name", &self.name)
            .field("depth", &self.depth.get())
            .finish()
    }
}

/// Proof that a [`SyncGuard`] is held. Releases one level on drop.
#[must_use = "the guard is released as soon as the token is dropped"]
pub struct GuardToken {
    name: &'static str,
    depth: Rc<Cell<usize>>,
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        let depth = self.depth.get().saturating_sub(1);
        self.depth.set(depth);
        tracing::trace!(target: targets::GUARD, guard = self.name, depth, "guard released");
    }
}

impl fmt::Debug for GuardToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardToken").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_released_on_drop() {
        let guard = SyncGuard::new("test");
        assert!(!guard.is_held());

        let token = guard.acquire();
        assert!(guard.is_held());

        drop(token);
        assert!(!guard.is_held());
    }

    #[test]
    fn test_guard_nests() {
        let guard = SyncGuard::new("test");
        let outer = guard.acquire();
        let inner = guard.acquire();
        assert_eq!(guard.depth(), 2);

        drop(inner);
        assert!(guard.is_held());
        drop(outer);
        assert!(!guard.is_held());
    }

    #[test]
    fn test_guard_released_on_early_return() {
        fn guarded(guard: &SyncGuard, fail: bool) -> Result<(), &'static str> {
            let _token = guard.acquire();
            if fail {
                return Err("failed");
            }
            Ok(())
        }

        let guard = SyncGuard::new("test");
        assert!(guarded(&guard, true).is_err());
        assert!(!guard.is_held());
    }

    #[test]
    fn test_clones_share_state() {
        let guard = SyncGuard::new("shared");
        let observer = guard.clone();
        let _token = guard.acquire();
        assert!(observer.is_held());
        assert_eq!(observer.name(), "shared");
    }
}
