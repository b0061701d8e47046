use std::{collections::HashMap, fmt, rc::Rc};

use anyhow::{Context, Result};

use crate::gesture::{PointerEvent, TriggerClassifier};
use crate::menu::ContextMenu;
use crate::present::Presenter;
use crate::property::{ChoiceProperty, ObservableProperty};
use crate::queue::Scheduler;

/// Identity of a UI component that can own a context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(pub u64);

/// Associates at most one popup menu with each owner and opens it on trigger
/// gestures.
pub struct ContextMenus {
    scheduler: Rc<dyn Scheduler>,
    presenter: Rc<dyn Presenter>,
    classifier: Rc<dyn TriggerClassifier>,
    owners: HashMap<OwnerId, ContextMenu>,
}

impl ContextMenus {
    pub fn new(
        scheduler: Rc<dyn Scheduler>,
        presenter: Rc<dyn Presenter>,
        classifier: Rc<dyn TriggerClassifier>,
    ) -> Self {
        Self {
            scheduler,
            presenter,
            classifier,
            owners: HashMap::new(),
        }
    }

    pub fn scheduler(&self) -> &Rc<dyn Scheduler> {
        &self.scheduler
    }

    /// Returns the owner's menu, creating it on first use.
    pub fn attach(&mut self, owner: OwnerId) -> ContextMenu {
        let scheduler = &self.scheduler;
        self.owners
            .entry(owner)
            .or_insert_with(|| {
                log::debug!("attached context menu to owner {}", owner.0);
                ContextMenu::new(scheduler.clone())
            })
            .clone()
    }

    /// Makes `menu` the owner's context menu. Several owners may share one menu.
    pub fn attach_menu(&mut self, owner: OwnerId, menu: &ContextMenu) {
        if self.owners.insert(owner, menu.clone()).is_some() {
            log::debug!("replaced context menu of owner {}", owner.0);
        }
    }

    /// Forgets the owner entirely; its trigger gestures are ignored afterwards.
    pub fn detach(&mut self, owner: OwnerId) -> Option<ContextMenu> {
        self.owners.remove(&owner)
    }

    pub fn menu(&self, owner: OwnerId) -> Option<&ContextMenu> {
        self.owners.get(&owner)
    }

    pub fn is_attached(&self, owner: OwnerId) -> bool {
        self.owners.contains_key(&owner)
    }

    pub fn add_action(
        &mut self,
        owner: OwnerId,
        label: impl Into<String>,
        callback: impl Fn() + 'static,
    ) {
        self.attach(owner).add_action(label, callback);
    }

    pub fn add_toggle<P>(&mut self, owner: OwnerId, property: P, callback: impl Fn() + 'static)
    where
        P: ObservableProperty<bool> + 'static,
    {
        self.attach(owner).add_toggle(property, callback);
    }

    pub fn add_choice_group<T, P>(
        &mut self,
        owner: OwnerId,
        label: impl Into<String>,
        property: P,
        callback: impl Fn() + 'static,
    ) where
        T: Clone + PartialEq + fmt::Display + 'static,
        P: ChoiceProperty<T> + 'static,
    {
        self.attach(owner).add_choice_group(label, property, callback);
    }

    /// Removes every entry from the owner's menu. The association stays.
    pub fn clear(&self, owner: OwnerId) {
        if let Some(menu) = self.owners.get(&owner) {
            menu.clear();
        }
    }

    /// Feeds a pointer event for `owner`. On a trigger gesture the event is
    /// consumed and the popup is scheduled at the event position.
    ///
    /// Returns whether a popup was scheduled.
    pub fn handle_pointer(&self, owner: OwnerId, event: &mut PointerEvent) -> bool {
        let Some(menu) = self.owners.get(&owner) else {
            return false;
        };
        if !self.classifier.is_popup_trigger(event) {
            return false;
        }

        event.consume();
        let (x, y) = (event.x, event.y);
        let menu = menu.clone();
        let presenter = self.presenter.clone();
        log::debug!("popup trigger on owner {} at ({x}, {y})", owner.0);
        self.scheduler.schedule_later(Box::new(move || {
            if let Err(err) = present(&*presenter, owner, &menu, x, y) {
                log::error!("{err:#}");
            }
        }));
        true
    }

    /// Displays the owner's menu right away. Owners without a menu are ignored.
    pub fn show_popup(&self, owner: OwnerId, x: i32, y: i32) -> Result<()> {
        match self.owners.get(&owner) {
            Some(menu) => present(&*self.presenter, owner, menu, x, y),
            None => Ok(()),
        }
    }
}

fn present(
    presenter: &dyn Presenter,
    owner: OwnerId,
    menu: &ContextMenu,
    x: i32,
    y: i32,
) -> Result<()> {
    let spec = menu.render();
    presenter
        .show(owner, x, y, &spec)
        .with_context(|| format!("show popup for owner {} at ({x}, {y})", owner.0))
}

impl fmt::Debug for ContextMenus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextMenus")
            .field("owners", &self.owners)
            .finish()
    }
}
