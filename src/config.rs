use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::attach::{ContextMenus, OwnerId};
use crate::gesture::{PlatformClassifier, TriggerPhase};
use crate::property::{BooleanProperty, EnumProperty, ObservableProperty};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Overrides whether popups open on button press or release.
    #[serde(default)]
    pub trigger: Option<TriggerPhase>,

    /// Treat ctrl + primary click as a popup trigger.
    #[serde(default)]
    pub ctrl_click: Option<bool>,

    #[serde(default)]
    pub entries: Vec<EntryConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryConfig {
    Action {
        label: String,
    },
    Toggle {
        name: String,
        #[serde(default)]
        value: bool,
    },
    Choice {
        label: String,
        name: String,
        values: Vec<String>,
        /// Defaults to the first value.
        #[serde(default)]
        value: Option<String>,
    },
}

/// Properties created for configured toggles and choice groups.
#[derive(Debug, Clone)]
pub enum BoundProperty {
    Flag(BooleanProperty),
    Choice(EnumProperty<String>),
}

impl fmt::Display for BoundProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundProperty::Flag(p) => write!(f, "{} = {}", p.name(), p.get()),
            BoundProperty::Choice(p) => write!(f, "{} = {}", p.name(), p.get()),
        }
    }
}

pub fn load_optional() -> Result<Option<Config>> {
    let Some(path) = resolve_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }
    load_from(&path).map(Some)
}

pub fn load_from(path: &Path) -> Result<Config> {
    let bytes = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    let cfg: Config =
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}

pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(p) = env::var("CTXMENU_CONFIG") {
        if !p.trim().is_empty() {
            return Some(PathBuf::from(p));
        }
    }

    let local = PathBuf::from("ctxmenu.json");
    if local.exists() {
        return Some(local);
    }

    if let Some(appdata) = env::var_os("APPDATA") {
        return Some(PathBuf::from(appdata).join("ctxmenu").join("config.json"));
    }

    if let Some(home) = env::var_os("HOME") {
        return Some(PathBuf::from(home).join(".config").join("ctxmenu").join("config.json"));
    }

    None
}

pub fn ensure_config_file_exists() -> Result<PathBuf> {
    let Some(path) = resolve_config_path() else {
        return Err(anyhow!(
            "No config path available (set CTXMENU_CONFIG or ensure APPDATA/HOME is present)"
        ));
    };
    write_template_if_missing(&path)?;
    Ok(path)
}

fn write_template_if_missing(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config dir {}", parent.display()))?;
    }

    if !path.exists() {
        let mut s = serde_json::to_string_pretty(&Config::sample())
            .context("serialize config template")?;
        s.push('\n');
        fs::write(path, s.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    }
    Ok(())
}

impl Config {
    /// Menu used when no config file exists.
    pub fn sample() -> Self {
        Self {
            trigger: None,
            ctrl_click: None,
            entries: vec![
                EntryConfig::Action {
                    label: "Refresh".to_string(),
                },
                EntryConfig::Toggle {
                    name: "Show legend".to_string(),
                    value: true,
                },
                EntryConfig::Choice {
                    label: "Color scheme".to_string(),
                    name: "scheme".to_string(),
                    values: vec![
                        "Sequential".to_string(),
                        "Diverging".to_string(),
                        "Qualitative".to_string(),
                    ],
                    value: None,
                },
            ],
        }
    }

    pub fn classifier(&self) -> PlatformClassifier {
        let platform = PlatformClassifier::default();
        PlatformClassifier::new(
            self.trigger.unwrap_or(platform.phase),
            self.ctrl_click.unwrap_or(platform.ctrl_click),
        )
    }
}

/// Adds the configured entries to `owner`'s menu. Each selection or property
/// change reports through `report` once it runs on the UI queue.
pub fn install_entries(
    menus: &mut ContextMenus,
    owner: OwnerId,
    entries: &[EntryConfig],
    report: impl Fn(String) + Clone + 'static,
) -> Result<Vec<BoundProperty>> {
    let mut bound = Vec::new();
    for entry in entries {
        match entry {
            EntryConfig::Action { label } => {
                let report = report.clone();
                let msg = format!("action '{label}'");
                menus.add_action(owner, label.clone(), move || report(msg.clone()));
            }
            EntryConfig::Toggle { name, value } => {
                let property = BooleanProperty::new(name.clone(), *value);
                let report = report.clone();
                let watched = property.clone();
                menus.add_toggle(owner, property.clone(), move || {
                    report(format!("{} = {}", watched.name(), watched.get()))
                });
                bound.push(BoundProperty::Flag(property));
            }
            EntryConfig::Choice {
                label,
                name,
                values,
                value,
            } => {
                let initial = match value {
                    Some(v) => v.clone(),
                    None => values
                        .first()
                        .cloned()
                        .ok_or_else(|| anyhow!("choice '{label}' has no values"))?,
                };
                let property = EnumProperty::new(name.clone(), values.clone(), initial)
                    .with_context(|| format!("choice '{label}'"))?;
                let report = report.clone();
                let watched = property.clone();
                menus.add_choice_group(owner, label.clone(), property.clone(), move || {
                    report(format!("{} = {}", watched.name(), watched.get()))
                });
                bound.push(BoundProperty::Choice(property));
            }
        }
    }
    Ok(bound)
}
