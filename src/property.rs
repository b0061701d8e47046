use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use anyhow::{bail, Result};

/// A value container that notifies subscribers when its value changes.
///
/// Implementations deliver change notifications synchronously from `set`, and
/// only when the stored value actually changed.
pub trait ObservableProperty<T> {
    fn name(&self) -> &str;
    fn get(&self) -> T;
    fn set(&self, value: T);
    fn subscribe(&self, on_change: Box<dyn Fn()>) -> Subscription;
}

/// An observable property restricted to an ordered set of values.
pub trait ChoiceProperty<T>: ObservableProperty<T> {
    fn values(&self) -> Vec<T>;
}

/// Keeps a change listener registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to cancel.
    pub fn empty() -> Self {
        Self { cancel: None }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

type Listener = Rc<dyn Fn()>;

struct Inner<T> {
    name: String,
    value: RefCell<T>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_id: Cell<u64>,
}

/// Named observable value. Clones share the value and its listeners.
pub struct Property<T> {
    inner: Rc<Inner<T>>,
}

pub type BooleanProperty = Property<bool>;

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Property<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                name: name.into(),
                value: RefCell::new(value),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

impl<T: Clone + PartialEq + 'static> ObservableProperty<T> for Property<T> {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    fn set(&self, value: T) {
        {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return;
            }
            *current = value;
        }

        // Snapshot so listeners may subscribe or unsubscribe while being notified.
        let listeners = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect::<Vec<_>>();
        for listener in listeners {
            listener();
        }
    }

    fn subscribe(&self, on_change: Box<dyn Fn()>) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::from(on_change)));

        let inner: Weak<Inner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.listeners.borrow_mut().retain(|(other, _)| *other != id);
            }
        })
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.inner.name)
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

/// A property whose value is always one of a fixed, ordered list.
pub struct EnumProperty<T> {
    property: Property<T>,
    values: Rc<[T]>,
}

impl<T> Clone for EnumProperty<T> {
    fn clone(&self) -> Self {
        Self {
            property: self.property.clone(),
            values: self.values.clone(),
        }
    }
}

impl<T: Clone + PartialEq + fmt::Display + 'static> EnumProperty<T> {
    pub fn new(name: impl Into<String>, values: Vec<T>, value: T) -> Result<Self> {
        let name = name.into();
        if !values.contains(&value) {
            bail!("'{value}' is not one of the allowed values for '{name}'");
        }
        Ok(Self {
            property: Property::new(name, value),
            values: values.into(),
        })
    }

    pub fn listener_count(&self) -> usize {
        self.property.listener_count()
    }
}

impl<T: Clone + PartialEq + 'static> ObservableProperty<T> for EnumProperty<T> {
    fn name(&self) -> &str {
        self.property.name()
    }

    fn get(&self) -> T {
        self.property.get()
    }

    fn set(&self, value: T) {
        if !self.values.contains(&value) {
            log::warn!("ignoring out-of-range value for '{}'", self.name());
            return;
        }
        self.property.set(value);
    }

    fn subscribe(&self, on_change: Box<dyn Fn()>) -> Subscription {
        self.property.subscribe(on_change)
    }
}

impl<T: Clone + PartialEq + 'static> ChoiceProperty<T> for EnumProperty<T> {
    fn values(&self) -> Vec<T> {
        self.values.to_vec()
    }
}

impl<T: fmt::Debug> fmt::Debug for EnumProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumProperty")
            .field("property", &self.property)
            .field("values", &self.values)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(property: &dyn ObservableProperty<bool>) -> (Rc<Cell<usize>>, Subscription) {
        let hits = Rc::new(Cell::new(0));
        let seen = hits.clone();
        let sub = property.subscribe(Box::new(move || seen.set(seen.get() + 1)));
        (hits, sub)
    }

    #[test]
    fn notifies_only_on_actual_change() {
        let flag = BooleanProperty::new("Show legend", false);
        let (hits, _sub) = counter(&flag);

        flag.set(false);
        assert_eq!(hits.get(), 0);
        flag.set(true);
        assert_eq!(hits.get(), 1);
        assert!(flag.get());
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let flag = BooleanProperty::new("Show legend", false);
        let (hits, sub) = counter(&flag);
        assert_eq!(flag.listener_count(), 1);

        drop(sub);
        assert_eq!(flag.listener_count(), 0);
        flag.set(true);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn clones_share_value_and_listeners() {
        let flag = BooleanProperty::new("Grid", true);
        let other = flag.clone();
        let (hits, _sub) = counter(&flag);

        other.set(false);
        assert!(!flag.get());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn listener_may_unsubscribe_during_notification() {
        let flag = BooleanProperty::new("Grid", true);
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let inner_slot = slot.clone();
        let sub = flag.subscribe(Box::new(move || {
            inner_slot.borrow_mut().take();
        }));
        *slot.borrow_mut() = Some(sub);

        flag.set(false);
        assert_eq!(flag.listener_count(), 0);
    }

    #[test]
    fn enum_property_rejects_unknown_initial_value() {
        let err = EnumProperty::new("Scheme", vec!["a", "b"], "c").unwrap_err();
        assert!(err.to_string().contains("'c'"));
    }

    #[test]
    fn enum_property_ignores_values_outside_its_list() {
        let scheme = EnumProperty::new("Scheme", vec!["a", "b"], "a").unwrap();
        scheme.set("z");
        assert_eq!(scheme.get(), "a");
        scheme.set("b");
        assert_eq!(scheme.get(), "b");
        assert_eq!(scheme.values(), vec!["a", "b"]);
    }
}
