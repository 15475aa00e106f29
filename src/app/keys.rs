//! Key bindings for the demo.
//!
//! Bindings come from the `[keys]` table of the config file, one entry per
//! action, each a comma-separated list such as `"Down, j, Ctrl+n"`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

/// Everything a key can do in the demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
    CycleEasing,
    Quit,
}

impl Action {
    pub const ALL: &[Action] = &[
        Action::ScrollUp,
        Action::ScrollDown,
        Action::PageUp,
        Action::PageDown,
        Action::Top,
        Action::Bottom,
        Action::CycleEasing,
        Action::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::ScrollUp => "Scroll Up",
            Action::ScrollDown => "Scroll Down",
            Action::PageUp => "Page Up",
            Action::PageDown => "Page Down",
            Action::Top => "Top",
            Action::Bottom => "Bottom",
            Action::CycleEasing => "Cycle Easing",
            Action::Quit => "Quit",
        }
    }

    fn config_key(self) -> &'static str {
        match self {
            Action::ScrollUp => "scroll_up",
            Action::ScrollDown => "scroll_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::Top => "top",
            Action::Bottom => "bottom",
            Action::CycleEasing => "cycle_easing",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(key: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == key)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// Named keys accepted in the config file.  The first name for a code is
/// the one shown in the status bar.
const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("↑", KeyCode::Up),
    ("up", KeyCode::Up),
    ("↓", KeyCode::Down),
    ("down", KeyCode::Down),
    ("←", KeyCode::Left),
    ("left", KeyCode::Left),
    ("→", KeyCode::Right),
    ("right", KeyCode::Right),
    ("Home", KeyCode::Home),
    ("End", KeyCode::End),
    ("PgUp", KeyCode::PageUp),
    ("pageup", KeyCode::PageUp),
    ("PgDn", KeyCode::PageDown),
    ("pagedown", KeyCode::PageDown),
    ("Esc", KeyCode::Esc),
    ("escape", KeyCode::Esc),
    ("Enter", KeyCode::Enter),
    ("return", KeyCode::Enter),
    ("Space", KeyCode::Char(' ')),
];

const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT);

/// A key code with the modifiers that must be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    /// Uppercase letters always carry SHIFT, matching what terminals report.
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let mut modifiers = modifiers & MODIFIER_MASK;
        if matches!(code, KeyCode::Char(c) if c.is_uppercase()) {
            modifiers |= KeyModifiers::SHIFT;
        }
        Self { code, modifiers }
    }

    pub fn matches(&self, event: KeyEvent) -> bool {
        *self == KeyBind::new(event.code, event.modifiers)
    }
}

impl fmt::Display for KeyBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shifted_letter = matches!(self.code, KeyCode::Char(c) if c.is_uppercase());
        for (flag, name) in [
            (KeyModifiers::CONTROL, "Ctrl"),
            (KeyModifiers::ALT, "Alt"),
            (KeyModifiers::SHIFT, "Shift"),
        ] {
            if self.modifiers.contains(flag) && !(flag == KeyModifiers::SHIFT && shifted_letter) {
                write!(f, "{name}+")?;
            }
        }
        match (self.code, NAMED_KEYS.iter().find(|(_, code)| *code == self.code)) {
            (_, Some((name, _))) => f.write_str(name),
            (KeyCode::Char(c), None) => write!(f, "{c}"),
            (KeyCode::F(n), None) => write!(f, "F{n}"),
            (other, None) => write!(f, "{other:?}"),
        }
    }
}

impl FromStr for KeyBind {
    type Err = String;

    /// `"Ctrl+c"`, `"Down"`, `"j"`, `"G"`, `"F5"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key = parts.pop().filter(|k| !k.is_empty()).ok_or_else(|| s.to_string())?;

        let mut modifiers = KeyModifiers::NONE;
        for part in parts {
            modifiers |= match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return Err(s.to_string()),
            };
        }

        let single_char = || {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c)),
                _ => None,
            }
        };
        let code = NAMED_KEYS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, code)| *code)
            .or_else(|| {
                let n = key.strip_prefix(['f', 'F'])?;
                n.parse().ok().map(KeyCode::F)
            })
            .or_else(single_char)
            .ok_or_else(|| s.to_string())?;
        Ok(KeyBind::new(code, modifiers))
    }
}

// ───────────────────────────────────────── bindings ──────────

/// Action → keys table used by the input handler.
#[derive(Debug, Clone)]
pub struct Bindings {
    map: HashMap<Action, Vec<KeyBind>>,
}

impl Default for Bindings {
    fn default() -> Self {
        let bind = |code| KeyBind::new(code, KeyModifiers::NONE);
        let map = HashMap::from([
            (Action::ScrollUp, vec![bind(KeyCode::Up), bind(KeyCode::Char('k'))]),
            (Action::ScrollDown, vec![bind(KeyCode::Down), bind(KeyCode::Char('j'))]),
            (Action::PageUp, vec![bind(KeyCode::PageUp), bind(KeyCode::Char('b'))]),
            (Action::PageDown, vec![bind(KeyCode::PageDown), bind(KeyCode::Char(' '))]),
            (Action::Top, vec![bind(KeyCode::Home), bind(KeyCode::Char('g'))]),
            (Action::Bottom, vec![bind(KeyCode::End), bind(KeyCode::Char('G'))]),
            (Action::CycleEasing, vec![bind(KeyCode::Char('e'))]),
            (Action::Quit, vec![bind(KeyCode::Char('q')), bind(KeyCode::Esc)]),
        ]);
        Self { map }
    }
}

impl Bindings {
    /// Defaults overlaid with a `[keys]` table.  Unknown actions and
    /// unparseable keys are skipped with a warning.
    pub fn from_table(table: &HashMap<String, String>) -> Self {
        let mut bindings = Self::default();
        for (key, value) in table {
            let Some(action) = Action::from_config_key(key) else {
                warn!(key = %key, "unknown action in [keys]");
                continue;
            };
            let parsed: Vec<KeyBind> = value
                .split(',')
                .filter_map(|part| match part.parse() {
                    Ok(bind) => Some(bind),
                    Err(bad) => {
                        warn!(key = %key, binding = %bad, "unparseable key binding");
                        None
                    }
                })
                .collect();
            if !parsed.is_empty() {
                bindings.map.insert(action, parsed);
            }
        }
        bindings
    }

    /// The action bound to `event`.  With several matches the binding with
    /// the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.map
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |bind| (action, bind)))
            .filter(|(_, bind)| bind.matches(event))
            .max_by_key(|(_, bind)| bind.modifiers.bits().count_ones())
            .map(|(action, _)| action)
    }

    /// Every key bound to `action`, comma separated.
    pub fn describe(&self, action: Action) -> String {
        self.map
            .get(&action)
            .map(|binds| binds.iter().map(KeyBind::to_string).collect::<Vec<_>>().join(", "))
            .unwrap_or_default()
    }

    pub fn status_bar_hint(&self) -> String {
        let first = |action| {
            self.map
                .get(&action)
                .and_then(|binds| binds.first())
                .map_or_else(|| "?".to_string(), KeyBind::to_string)
        };
        format!(
            "{}/{}: scroll | {}: easing | {}: quit",
            first(Action::ScrollUp),
            first(Action::ScrollDown),
            first(Action::CycleEasing),
            first(Action::Quit),
        )
    }
}
