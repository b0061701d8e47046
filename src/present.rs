use std::fmt;

use anyhow::Result;

use crate::attach::OwnerId;
use crate::menu::{MenuItem, MenuSpec};

/// The toolkit side of `show_popup`: displays a transient menu overlay.
pub trait Presenter {
    fn show(&self, owner: OwnerId, x: i32, y: i32, menu: &MenuSpec) -> Result<()>;
}

/// Prints popups to stdout as an indented outline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextPresenter;

impl Presenter for TextPresenter {
    fn show(&self, owner: OwnerId, x: i32, y: i32, menu: &MenuSpec) -> Result<()> {
        println!("popup for owner {} at ({x}, {y})", owner.0);
        print!("{}", format_menu(menu));
        Ok(())
    }
}

pub fn format_menu(menu: &MenuSpec) -> String {
    let mut out = String::new();
    // A String sink never reports an error.
    let _ = write_menu(&mut out, menu);
    out
}

/// Writes `menu` as an indented outline, one item per line.
pub fn write_menu(out: &mut impl fmt::Write, menu: &MenuSpec) -> fmt::Result {
    if menu.is_empty() {
        return out.write_str("  (empty)\n");
    }
    write_items(out, &menu.items, 1)
}

fn write_items(out: &mut impl fmt::Write, items: &[MenuItem], depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    for item in items {
        match item {
            MenuItem::Action { title } => writeln!(out, "{indent}    {title}")?,
            MenuItem::Check { title, checked } => {
                let mark = if *checked { "[x]" } else { "[ ]" };
                writeln!(out, "{indent}{mark} {title}")?;
            }
            MenuItem::Radio { title, selected } => {
                let mark = if *selected { "(*)" } else { "( )" };
                writeln!(out, "{indent}{mark} {title}")?;
            }
            MenuItem::Submenu { title, items } => {
                writeln!(out, "{indent}    {title} >")?;
                write_items(out, items, depth + 2)?;
            }
        }
    }
    Ok(())
}
