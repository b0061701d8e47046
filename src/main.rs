use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use ctxmenu::{
    config,
    gesture::{PointerButton, PointerEvent, PointerEventKind},
    present::TextPresenter,
    ContextMenus, OwnerId, UiQueue,
};

const OWNER: OwnerId = OwnerId(1);

#[derive(Parser, Debug)]
#[command(name = "ctxmenu", version, about = "Contextual popup menu playground")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Builds the configured menu, replays selections, then opens the popup.
    Show {
        /// Pointer x position, relative to the owner.
        #[arg(long, default_value_t = 0)]
        x: i32,
        /// Pointer y position, relative to the owner.
        #[arg(long, default_value_t = 0)]
        y: i32,
        /// Button used for the click that should open the menu.
        #[arg(long, value_enum, default_value_t = Button::Secondary)]
        button: Button,
        /// Hold ctrl during the click.
        #[arg(long)]
        ctrl: bool,
        /// Item to select before opening, e.g. "Refresh" or "Color scheme/Diverging".
        /// May be repeated; selections apply in order.
        #[arg(long = "select", value_name = "PATH")]
        selections: Vec<String>,
        /// Print property values after everything ran.
        #[arg(long)]
        state: bool,
    },
    /// Writes a sample config if none exists and prints its path.
    InitConfig,
    /// Prints the config path that would be used (if any).
    ConfigPath,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Button {
    Primary,
    Secondary,
    Middle,
}

impl From<Button> for PointerButton {
    fn from(button: Button) -> Self {
        match button {
            Button::Primary => PointerButton::Primary,
            Button::Secondary => PointerButton::Secondary,
            Button::Middle => PointerButton::Middle,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Show {
            x,
            y,
            button,
            ctrl,
            selections,
            state,
        } => {
            let cfg = config::load_optional()?.unwrap_or_else(config::Config::sample);
            let queue = UiQueue::new();
            let mut menus = ContextMenus::new(
                Rc::new(queue.clone()),
                Rc::new(TextPresenter),
                Rc::new(cfg.classifier()),
            );
            let bound = config::install_entries(&mut menus, OWNER, &cfg.entries, |msg| {
                println!("ran: {msg}")
            })?;

            let menu = menus.attach(OWNER);
            for path in &selections {
                menu.select_label(path)?;
                queue.drain();
            }

            let mut opened = false;
            for kind in [
                PointerEventKind::Pressed,
                PointerEventKind::Released,
                PointerEventKind::Clicked,
            ] {
                let mut event = PointerEvent::new(kind, button.into(), x, y).with_ctrl(ctrl);
                opened |= menus.handle_pointer(OWNER, &mut event);
            }
            queue.drain();
            if !opened {
                println!("no popup: click was not a context-menu trigger");
            }

            if state {
                for property in &bound {
                    println!("{property}");
                }
            }
        }
        Command::InitConfig => {
            let path = config::ensure_config_file_exists().context("create config")?;
            println!("{}", path.display());
        }
        Command::ConfigPath => {
            if let Some(path) = config::resolve_config_path() {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}
