use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use anyhow::{anyhow, bail, Context, Result};

use crate::property::{ChoiceProperty, ObservableProperty, Subscription};
use crate::queue::Scheduler;

pub type Callback = Rc<dyn Fn()>;

/// Snapshot of a popup menu as the toolkit should display it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSpec {
    pub items: Vec<MenuItem>,
}

impl MenuSpec {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Action { title: String },
    Check { title: String, checked: bool },
    Radio { title: String, selected: bool },
    Submenu { title: String, items: Vec<MenuItem> },
}

/// Addresses a selectable item: a top-level entry, or one choice inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPath {
    pub entry: usize,
    pub choice: Option<usize>,
}

impl ItemPath {
    pub fn entry(entry: usize) -> Self {
        Self { entry, choice: None }
    }

    pub fn choice(entry: usize, choice: usize) -> Self {
        Self {
            entry,
            choice: Some(choice),
        }
    }
}

pub enum MenuEntry {
    Action(ActionEntry),
    Toggle(ToggleEntry),
    ChoiceGroup(ChoiceGroupEntry),
}

pub struct ActionEntry {
    label: String,
    callback: Callback,
}

pub struct ToggleEntry {
    label: String,
    property: Rc<dyn ObservableProperty<bool>>,
    checked: Cell<bool>,
    // Set while this entry writes its own property, so the change is not
    // reported back as an external one.
    selecting: Cell<bool>,
    callback: Callback,
    _subscription: Subscription,
}

pub struct ChoiceGroupEntry {
    label: String,
    binding: Box<dyn ChoiceBinding>,
    items: Vec<ChoiceItem>,
    selecting: Cell<bool>,
    callback: Callback,
    _subscription: Subscription,
}

struct ChoiceItem {
    label: String,
    selected: Cell<bool>,
}

/// Type-erased link between a choice group and its enumerated property.
trait ChoiceBinding {
    /// One flag per value: whether it equals the property's current value.
    fn selection(&self) -> Vec<bool>;
    fn choose(&self, index: usize);
}

struct BoundChoice<T> {
    property: Rc<dyn ChoiceProperty<T>>,
    values: Vec<T>,
}

impl<T: Clone + PartialEq> ChoiceBinding for BoundChoice<T> {
    fn selection(&self) -> Vec<bool> {
        let current = self.property.get();
        self.values.iter().map(|v| *v == current).collect()
    }

    fn choose(&self, index: usize) {
        if let Some(value) = self.values.get(index) {
            self.property.set(value.clone());
        }
    }
}

impl ChoiceGroupEntry {
    fn apply_selection(&self) {
        for (item, selected) in self.items.iter().zip(self.binding.selection()) {
            item.selected.set(selected);
        }
    }
}

impl MenuEntry {
    pub fn action(label: impl Into<String>, callback: Callback) -> Rc<Self> {
        Rc::new(MenuEntry::Action(ActionEntry {
            label: label.into(),
            callback,
        }))
    }

    pub fn toggle(
        property: Rc<dyn ObservableProperty<bool>>,
        callback: Callback,
        scheduler: &Rc<dyn Scheduler>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|me| {
            let subscription =
                property.subscribe(on_property_change(me.clone(), scheduler.clone()));
            MenuEntry::Toggle(ToggleEntry {
                label: property.name().to_string(),
                checked: Cell::new(property.get()),
                selecting: Cell::new(false),
                property,
                callback,
                _subscription: subscription,
            })
        })
    }

    pub fn choice_group<T>(
        label: impl Into<String>,
        property: Rc<dyn ChoiceProperty<T>>,
        callback: Callback,
        scheduler: &Rc<dyn Scheduler>,
    ) -> Rc<Self>
    where
        T: Clone + PartialEq + fmt::Display + 'static,
    {
        let values = property.values();
        let labels = values.iter().map(ToString::to_string).collect::<Vec<_>>();
        let binding = BoundChoice {
            property: property.clone(),
            values,
        };
        let items = labels
            .into_iter()
            .zip(binding.selection())
            .map(|(label, selected)| ChoiceItem {
                label,
                selected: Cell::new(selected),
            })
            .collect();

        Rc::new_cyclic(|me| {
            let subscription =
                property.subscribe(on_property_change(me.clone(), scheduler.clone()));
            MenuEntry::ChoiceGroup(ChoiceGroupEntry {
                label: label.into(),
                binding: Box::new(binding),
                items,
                selecting: Cell::new(false),
                callback,
                _subscription: subscription,
            })
        })
    }

    pub fn label(&self) -> &str {
        match self {
            MenuEntry::Action(a) => &a.label,
            MenuEntry::Toggle(t) => &t.label,
            MenuEntry::ChoiceGroup(g) => &g.label,
        }
    }

    fn callback(&self) -> &Callback {
        match self {
            MenuEntry::Action(a) => &a.callback,
            MenuEntry::Toggle(t) => &t.callback,
            MenuEntry::ChoiceGroup(g) => &g.callback,
        }
    }

    fn is_selecting(&self) -> bool {
        match self {
            MenuEntry::Action(_) => false,
            MenuEntry::Toggle(t) => t.selecting.get(),
            MenuEntry::ChoiceGroup(g) => g.selecting.get(),
        }
    }

    /// Brings the visual selection state back in line with the bound property.
    pub fn refresh(&self) {
        match self {
            MenuEntry::Action(_) => {}
            MenuEntry::Toggle(t) => t.checked.set(t.property.get()),
            MenuEntry::ChoiceGroup(g) => g.apply_selection(),
        }
    }

    pub fn render(&self) -> MenuItem {
        match self {
            MenuEntry::Action(a) => MenuItem::Action {
                title: a.label.clone(),
            },
            MenuEntry::Toggle(t) => MenuItem::Check {
                title: t.label.clone(),
                checked: t.checked.get(),
            },
            MenuEntry::ChoiceGroup(g) => MenuItem::Submenu {
                title: g.label.clone(),
                items: g
                    .items
                    .iter()
                    .map(|item| MenuItem::Radio {
                        title: item.label.clone(),
                        selected: item.selected.get(),
                    })
                    .collect(),
            },
        }
    }

    fn choice_index(&self, label: &str) -> Option<usize> {
        match self {
            MenuEntry::ChoiceGroup(g) => g.items.iter().position(|item| item.label == label),
            _ => None,
        }
    }

    /// Handles the user picking this entry (or one of its choices).
    fn select(self: &Rc<Self>, choice: Option<usize>, scheduler: &dyn Scheduler) -> Result<()> {
        match &**self {
            MenuEntry::Action(a) => {
                if choice.is_some() {
                    bail!("'{}' has no choices", a.label);
                }
            }
            MenuEntry::Toggle(t) => {
                if choice.is_some() {
                    bail!("'{}' has no choices", t.label);
                }
                let next = !t.checked.get();
                t.checked.set(next);
                t.selecting.set(true);
                t.property.set(next);
                t.selecting.set(false);
                schedule_refresh(Rc::downgrade(self), scheduler);
            }
            MenuEntry::ChoiceGroup(g) => {
                let index =
                    choice.with_context(|| format!("'{}' needs a choice to select", g.label))?;
                if index >= g.items.len() {
                    bail!(
                        "'{}' has {} choice(s), no choice #{index}",
                        g.label,
                        g.items.len()
                    );
                }
                g.selecting.set(true);
                g.binding.choose(index);
                g.selecting.set(false);
                g.apply_selection();
                schedule_refresh(Rc::downgrade(self), scheduler);
            }
        }

        log::debug!("selected '{}'", self.label());
        schedule_callback(self.callback().clone(), scheduler);
        Ok(())
    }
}

fn schedule_callback(callback: Callback, scheduler: &dyn Scheduler) {
    scheduler.schedule_later(Box::new(move || callback()));
}

fn schedule_refresh(entry: Weak<MenuEntry>, scheduler: &dyn Scheduler) {
    scheduler.schedule_later(Box::new(move || {
        // Entries removed by `clear` before the task runs are simply gone.
        if let Some(entry) = entry.upgrade() {
            entry.refresh();
        }
    }));
}

fn on_property_change(entry: Weak<MenuEntry>, scheduler: Rc<dyn Scheduler>) -> Box<dyn Fn()> {
    Box::new(move || {
        let Some(current) = entry.upgrade() else {
            return;
        };
        schedule_refresh(entry.clone(), &*scheduler);
        if current.is_selecting() {
            return;
        }
        schedule_callback(current.callback().clone(), &*scheduler);
    })
}

impl fmt::Debug for MenuEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MenuEntry").field(&self.render()).finish()
    }
}

/// Ordered entries of one popup menu.
#[derive(Debug, Default)]
pub struct PopupMenuState {
    entries: Vec<Rc<MenuEntry>>,
}

impl PopupMenuState {
    pub fn push(&mut self, entry: Rc<MenuEntry>) {
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<Rc<MenuEntry>> {
        self.entries.get(index).cloned()
    }

    pub fn render(&self) -> MenuSpec {
        MenuSpec::new(self.entries.iter().map(|e| e.render()).collect())
    }

    /// Resolves `"Label"` or `"Group/Choice"` to an item path.
    pub fn find(&self, path: &str) -> Option<ItemPath> {
        if let Some(entry) = self.entries.iter().position(|e| e.label() == path) {
            return Some(ItemPath::entry(entry));
        }

        let (group, choice) = path.split_once('/')?;
        self.entries.iter().enumerate().find_map(|(i, e)| {
            if e.label() != group {
                return None;
            }
            e.choice_index(choice).map(|c| ItemPath::choice(i, c))
        })
    }
}

/// A popup menu and the queue its deferred work goes to.
///
/// Clones are handles to the same menu.
#[derive(Clone)]
pub struct ContextMenu {
    state: Rc<RefCell<PopupMenuState>>,
    scheduler: Rc<dyn Scheduler>,
}

impl ContextMenu {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            state: Rc::new(RefCell::new(PopupMenuState::default())),
            scheduler,
        }
    }

    /// Appends an item that schedules `callback` when selected.
    pub fn add_action(&self, label: impl Into<String>, callback: impl Fn() + 'static) {
        let entry = MenuEntry::action(label, Rc::new(callback));
        self.state.borrow_mut().push(entry);
    }

    /// Appends a checkable item mirroring `property`, labelled with its name.
    pub fn add_toggle<P>(&self, property: P, callback: impl Fn() + 'static)
    where
        P: ObservableProperty<bool> + 'static,
    {
        let entry = MenuEntry::toggle(Rc::new(property), Rc::new(callback), &self.scheduler);
        self.state.borrow_mut().push(entry);
    }

    /// Appends a submenu with one exclusive choice per value of `property`.
    pub fn add_choice_group<T, P>(
        &self,
        label: impl Into<String>,
        property: P,
        callback: impl Fn() + 'static,
    ) where
        T: Clone + PartialEq + fmt::Display + 'static,
        P: ChoiceProperty<T> + 'static,
    {
        let entry = MenuEntry::choice_group(
            label,
            Rc::new(property),
            Rc::new(callback),
            &self.scheduler,
        );
        self.state.borrow_mut().push(entry);
    }

    pub fn clear(&self) {
        // Dropped outside the borrow: entry drops unsubscribe from properties.
        let removed = std::mem::take(&mut *self.state.borrow_mut());
        drop(removed);
    }

    pub fn len(&self) -> usize {
        self.state.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }

    pub fn render(&self) -> MenuSpec {
        self.state.borrow().render()
    }

    pub fn find(&self, path: &str) -> Option<ItemPath> {
        self.state.borrow().find(path)
    }

    pub fn select(&self, path: ItemPath) -> Result<()> {
        let entry = self
            .state
            .borrow()
            .entry(path.entry)
            .ok_or_else(|| anyhow!("no menu entry #{}", path.entry))?;
        entry.select(path.choice, &*self.scheduler)
    }

    pub fn select_label(&self, path: &str) -> Result<()> {
        let item = self
            .find(path)
            .ok_or_else(|| anyhow!("no menu item named '{path}'"))?;
        self.select(item)
            .with_context(|| format!("select '{path}'"))
    }

    pub fn shares_state_with(&self, other: &ContextMenu) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for ContextMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextMenu")
            .field("state", &*self.state.borrow())
            .finish()
    }
}
