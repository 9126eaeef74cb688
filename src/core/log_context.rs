//! Scoped log context
//!
//! This module provides:
//! - `LogContext`: a thread-local stack of properties attached to every event
//!   raised on the thread while they are pushed
//! - `ContextGuard`: RAII guard that pops what it pushed

use super::property_value::{Properties, PropertyValue};
use std::cell::RefCell;
use std::marker::PhantomData;

thread_local! {
    static SCOPED_PROPERTIES: RefCell<Vec<(String, PropertyValue)>> = const { RefCell::new(Vec::new()) };
}

/// Thread-local property stack.
///
/// # Example
///
/// ```
/// use compact_logger::core::LogContext;
///
/// {
///     let _guard = LogContext::push_property("RequestId", "abc-123");
///     assert_eq!(LogContext::depth(), 1);
/// }
/// assert_eq!(LogContext::depth(), 0);
/// ```
pub struct LogContext;

impl LogContext {
    /// Push a property for the lifetime of the returned guard
    #[must_use = "the property is popped as soon as the guard is dropped"]
    pub fn push_property(name: impl Into<String>, value: impl Into<PropertyValue>) -> ContextGuard {
        Self::push_properties([(name.into(), value.into())])
    }

    /// Push several properties under a single guard
    #[must_use = "the properties are popped as soon as the guard is dropped"]
    pub fn push_properties<I>(properties: I) -> ContextGuard
    where
        I: IntoIterator<Item = (String, PropertyValue)>,
    {
        // Collected first: the iterator may read the context itself
        let properties: Vec<(String, PropertyValue)> = properties.into_iter().collect();
        SCOPED_PROPERTIES.with(|stack| {
            let mut stack = stack.borrow_mut();
            let depth = stack.len();
            stack.extend(properties);
            ContextGuard {
                depth,
                _not_send: PhantomData,
            }
        })
    }

    /// Number of properties currently pushed on this thread
    pub fn depth() -> usize {
        SCOPED_PROPERTIES.with(|stack| stack.borrow().len())
    }

    /// Current properties, oldest first; a later push of the same name
    /// replaces the earlier value in place
    pub fn snapshot() -> Properties {
        SCOPED_PROPERTIES.with(|stack| {
            let mut merged = Properties::new();
            for (name, value) in stack.borrow().iter() {
                merged.insert(name.clone(), value.clone());
            }
            merged
        })
    }

    /// Add the scoped properties to `properties` where absent
    pub fn enrich(properties: &mut Properties) {
        for (name, value) in Self::snapshot() {
            properties.entry(name).or_insert(value);
        }
    }
}

/// Pops the properties pushed with it when dropped.
///
/// Guards must be dropped in reverse push order; dropping an outer guard also
/// discards anything pushed after it.
pub struct ContextGuard {
    depth: usize,
    // The stack is thread-local, so the guard must stay on its thread
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        SCOPED_PROPERTIES.with(|stack| stack.borrow_mut().truncate(self.depth));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_pop() {
        assert_eq!(LogContext::depth(), 0);
        {
            let _outer = LogContext::push_property("A", 1);
            {
                let _inner = LogContext::push_property("B", 2);
                assert_eq!(LogContext::depth(), 2);
            }
            assert_eq!(LogContext::depth(), 1);
        }
        assert_eq!(LogContext::depth(), 0);
    }

    #[test]
    fn test_push_properties_single_guard() {
        let guard = LogContext::push_properties(vec![
            ("Caller".to_string(), PropertyValue::from("a.b()")),
            ("LineNumber".to_string(), PropertyValue::from("3")),
        ]);
        assert_eq!(LogContext::depth(), 2);
        drop(guard);
        assert_eq!(LogContext::depth(), 0);
    }

    #[test]
    fn test_push_properties_iterator_may_read_context() {
        let _outer = LogContext::push_property("Tenant", "one");
        let nested = LogContext::push_properties(["First", "Second"].into_iter().map(|name| {
            let depth = LogContext::depth();
            (name.to_string(), PropertyValue::from(depth))
        }));

        assert_eq!(LogContext::depth(), 3);
        assert_eq!(LogContext::snapshot().get("Second"), Some(&PropertyValue::from(1usize)));
        drop(nested);
        assert_eq!(LogContext::depth(), 1);
    }

    #[test]
    fn test_later_push_overrides_in_place() {
        let _a = LogContext::push_property("Tenant", "one");
        let _b = LogContext::push_property("User", "ana");
        let _c = LogContext::push_property("Tenant", "two");

        let snapshot = LogContext::snapshot();
        let names: Vec<&str> = snapshot.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Tenant", "User"]);
        assert_eq!(snapshot.get("Tenant"), Some(&PropertyValue::from("two")));
    }

    #[test]
    fn test_enrich_does_not_override_existing() {
        let _guard = LogContext::push_property("OrderId", 1);
        let mut properties = Properties::new();
        properties.insert("OrderId".to_string(), PropertyValue::from(99));

        LogContext::enrich(&mut properties);
        assert_eq!(properties.get("OrderId"), Some(&PropertyValue::from(99)));
    }

    #[test]
    fn test_context_is_thread_local() {
        let _guard = LogContext::push_property("Here", true);
        let other = std::thread::spawn(LogContext::depth).join().unwrap();
        assert_eq!(other, 0);
    }
}
