//! Property system for Horizon Suggest.
//!
//! Properties are the data backbone of a suggestion control. When a property
//! changes, its owner emits a signal to notify interested parties. Setting a
//! property to the value it already holds is not a change.
//!
//! # Property Types
//!
//! - **Property<T>**: A reactive property with change detection
//! - **ReadOnlyProperty<T>**: A property that rejects writes from outside its owner
//!
//! # Example
//!
//! ```
//! use horizon_suggest_core::{Property, Signal};
//!
//! struct Query {
//!     text: Property<String>,
//!     text_changed: Signal<String>,
//! }
//!
//! impl Query {
//!     fn set_text(&self, text: &str) {
//!         if self.text.set(text.to_string()) {
//!             self.text_changed.emit(text.to_string());
//!         }
//!     }
//! }
//!
//! let query = Query { text: Property::default(), text_changed: Signal::new() };
//! query.set_text("tex");
//! assert_eq!(query.text.get(), "tex");
//! ```

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::logging::targets;

/// A reactive property that tracks changes.
///
/// `Property<T>` wraps a value and provides change detection. When `set()` is
/// called, it compares the new value with the current one and returns whether
/// the value actually changed. This enables efficient change notification.
///
/// # Thread Safety
///
/// `Property<T>` uses interior mutability with `RwLock` and is `Send + Sync`
/// whenever `T` is.
///
/// # Example
///
/// ```
/// use horizon_suggest_core::Property;
///
/// let prop = Property::new(42);
/// assert_eq!(prop.get(), 42);
///
/// // Setting same value returns false (no change)
/// assert!(!prop.set(42));
///
/// // Setting different value returns true (changed)
/// assert!(prop.set(100));
/// assert_eq!(prop.get(), 100);
/// ```
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    ///
    /// This clones the value. For large types, consider using `with()` instead.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if the value changed.
    ///
    /// The caller should emit the associated notification signal when this
    /// returns `true`.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }

    /// Set the value, returning the old value if it changed.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.write();
        if *current != value {
            Some(std::mem::replace(&mut *current, value))
        } else {
            None
        }
    }
}

impl<T: Clone> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}

/// A property that can only be written through an explicit write grant.
///
/// Writes made through [`try_set`](Self::try_set) are rejected with
/// [`PropertyError::ReadOnly`] and leave the value untouched, unless the
/// owner currently holds a [`WriteAccess`] obtained from
/// [`unlock`](Self::unlock).
///
/// # Example
///
/// ```
/// use horizon_suggest_core::{PropertyError, ReadOnlyProperty};
///
/// let search_text = ReadOnlyProperty::new("search_text", String::new());
///
/// assert!(matches!(
///     search_text.try_set("outside".into()),
///     Err(PropertyError::ReadOnly { .. })
/// ));
/// assert_eq!(search_text.get(), "");
///
/// let access = search_text.unlock();
/// assert!(access.set("inside".into()));
/// drop(access);
/// assert_eq!(search_text.get(), "inside");
/// ```
pub struct ReadOnlyProperty<T> {
    name: &'static str,
    inner: Property<T>,
    grants: AtomicUsize,
}

impl<T: Clone> ReadOnlyProperty<T> {
    /// Create a read-only property with a diagnostic name.
    pub fn new(name: &'static str, value: T) -> Self {
        Self {
            name,
            inner: Property::new(value),
            grants: AtomicUsize::new(0),
        }
    }

    /// The name reported in [`PropertyError::ReadOnly`].
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.inner.get()
    }

    /// Access the value through a closure.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.inner.with(f)
    }

    /// Whether a write grant is currently outstanding.
    pub fn is_writable(&self) -> bool {
        self.grants.load(Ordering::SeqCst) > 0
    }

    /// Grant write access until the returned token is dropped.
    pub fn unlock(&self) -> WriteAccess<'_, T> {
        self.grants.fetch_add(1, Ordering::SeqCst);
        WriteAccess { property: self }
    }
}

impl<T: Clone + PartialEq> ReadOnlyProperty<T> {
    /// Attempt a write from outside the owner.
    ///
    /// Succeeds only while a [`WriteAccess`] is held. Returns whether the
    /// value changed.
    pub fn try_set(&self, value: T) -> Result<bool, PropertyError> {
        if !self.is_writable() {
            tracing::debug!(
                target: targets::PROPERTY,
                property = self.name,
                "rejected write to read-only property"
            );
            return Err(PropertyError::ReadOnly {
                name: self.name.to_string(),
            });
        }
        Ok(self.inner.set(value))
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for ReadOnlyProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyProperty")
            .field("name", &self.name)
            .field("value", &self.get())
            .finish()
    }
}

/// Scoped write permission for a [`ReadOnlyProperty`].
pub struct WriteAccess<'a, T> {
    property: &'a ReadOnlyProperty<T>,
}

impl<T: Clone + PartialEq> WriteAccess<'_, T> {
    /// Write the value, returning `true` if it changed.
    pub fn set(&self, value: T) -> bool {
        self.property.inner.set(value)
    }

    /// Write the value, returning the old value if it changed.
    pub fn replace(&self, value: T) -> Option<T> {
        self.property.inner.replace(value)
    }
}

impl<T> Drop for WriteAccess<'_, T> {
    fn drop(&mut self) {
        self.property.grants.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Error types for property operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// The property is read-only and cannot be modified.
    ReadOnly {
        /// The name of the read-only property.
        name: String,
    },
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly { name } => write!(f, "Property '{}' is read-only", name),
        }
    }
}

impl std::error::Error for PropertyError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_property_basic() {
        let prop = Property::new(42);
        assert_eq!(prop.get(), 42);
    }

    #[test]
    fn test_property_set_detects_change() {
        let prop = Property::new(10);

        // Same value - no change
        assert!(!prop.set(10));
        assert_eq!(prop.get(), 10);

        // Different value - changed
        assert!(prop.set(20));
        assert_eq!(prop.get(), 20);
    }

    #[test]
    fn test_property_replace() {
        let prop = Property::new("hello".to_string());

        assert!(prop.replace("hello".to_string()).is_none());

        let old = prop.replace("world".to_string());
        assert_eq!(old, Some("hello".to_string()));
        assert_eq!(prop.get(), "world");
    }

    #[test]
    fn test_property_with_closure() {
        let prop = Property::new(vec!["Alabama", "Alaska"]);
        let count = prop.with(|v| v.len());
        assert_eq!(count, 2);
    }

    #[test]
    fn test_property_thread_safe() {
        let prop = Arc::new(Property::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let prop = prop.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        prop.set(i);
                        let _ = prop.get();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
    }

    #[test]
    fn test_read_only_rejects_outside_writes() {
        let prop = ReadOnlyProperty::new("search_text", "tex".to_string());

        let err = prop.try_set("other".into()).unwrap_err();
        assert_eq!(
            err,
            PropertyError::ReadOnly {
                name: "search_text".into()
            }
        );
        assert_eq!(prop.get(), "tex");
    }

    #[test]
    fn test_read_only_accepts_writes_under_grant() {
        let prop = ReadOnlyProperty::new("search_text", String::new());

        {
            let access = prop.unlock();
            assert!(prop.is_writable());
            assert!(access.set("ala".into()));
            assert_eq!(prop.try_set("alab".into()), Ok(true));
        }

        assert!(!prop.is_writable());
        assert_eq!(prop.get(), "alab");
    }

    #[test]
    fn test_nested_grants() {
        let prop = ReadOnlyProperty::new("search_text", 0);
        let outer = prop.unlock();
        {
            let _inner = prop.unlock();
        }
        // The outer grant is still alive
        assert!(prop.is_writable());
        drop(outer);
        assert!(!prop.is_writable());
    }

    #[test]
    fn test_property_error_display() {
        let err = PropertyError::ReadOnly {
            name: "search_text".into(),
        };
        assert_eq!(err.to_string(), "Property 'search_text' is read-only");
    }
}
