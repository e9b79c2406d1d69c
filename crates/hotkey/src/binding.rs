//! Key combinations and the bindings attempted at startup

use crate::{Action, HotkeyError, HotkeyResult};
use std::fmt;

pub const MOD_ALT: u32 = 0x0001;
pub const MOD_CONTROL: u32 = 0x0002;
pub const MOD_SHIFT: u32 = 0x0004;
pub const MOD_WIN: u32 = 0x0008;
/// Suppresses auto-repeat while the key is held
pub const MOD_NOREPEAT: u32 = 0x4000;

pub const VK_ESCAPE: u32 = 0x1B;
pub const VK_SPACE: u32 = 0x20;
pub const VK_SNAPSHOT: u32 = 0x2C;
pub const VK_DIVIDE: u32 = 0x6F;
pub const VK_F1: u32 = 0x70;
pub const VK_F7: u32 = 0x76;
pub const VK_F8: u32 = 0x77;
pub const VK_F9: u32 = 0x78;
/// Main keyboard '/?' key on US-style layouts
pub const VK_OEM_2: u32 = 0xBF;

pub const SHOW_ID: i32 = 1002;
pub const HIDE_ID: i32 = 1003;
pub const FIRST_CAPTURE_ID: i32 = 2000;

/// Virtual-key code plus modifier mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub vk: u32,
    pub modifiers: u32,
}

impl KeyCombo {
    pub const fn new(vk: u32, modifiers: u32) -> Self {
        Self { vk, modifiers }
    }

    /// Parse `Ctrl+Shift+F9`, `Shift+/`, `Numpad /` and the like
    pub fn parse(sequence: &str) -> HotkeyResult<Self> {
        let invalid = || HotkeyError::InvalidCombo(sequence.to_string());

        let mut modifiers = 0;
        let mut vk = None;
        for part in sequence.split('+').map(str::trim) {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= MOD_CONTROL,
                "alt" => modifiers |= MOD_ALT,
                "shift" => modifiers |= MOD_SHIFT,
                "win" => modifiers |= MOD_WIN,
                "" => return Err(invalid()),
                key => {
                    if vk.is_some() {
                        return Err(invalid());
                    }
                    vk = Some(virtual_key_from_string(key).ok_or_else(invalid)?);
                }
            }
        }

        vk.map(|vk| Self { vk, modifiers }).ok_or_else(invalid)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (MOD_CONTROL, "Ctrl"),
            (MOD_ALT, "Alt"),
            (MOD_SHIFT, "Shift"),
            (MOD_WIN, "Win"),
        ] {
            if self.modifiers & flag != 0 {
                write!(f, "{}+", name)?;
            }
        }
        match key_name(self.vk) {
            Some(name) => f.write_str(&name),
            None => write!(f, "VK_{:02X}", self.vk),
        }
    }
}

/// Map a lower-case key name to its virtual-key code
pub fn virtual_key_from_string(key: &str) -> Option<u32> {
    let key = key.trim().to_lowercase();
    match key.as_str() {
        "/" | "slash" => Some(VK_OEM_2),
        "numpad /" | "numpad/" | "divide" => Some(VK_DIVIDE),
        "esc" | "escape" => Some(VK_ESCAPE),
        "space" => Some(VK_SPACE),
        "printscreen" | "prtsc" => Some(VK_SNAPSHOT),
        _ => {
            if let Some(n) = key.strip_prefix('f').and_then(|n| n.parse::<u32>().ok()) {
                return (1..=24).contains(&n).then(|| VK_F1 + n - 1);
            }
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() => {
                    Some(c.to_ascii_uppercase() as u32)
                }
                _ => None,
            }
        }
    }
}

fn key_name(vk: u32) -> Option<String> {
    match vk {
        VK_OEM_2 => Some("/".into()),
        VK_DIVIDE => Some("Numpad /".into()),
        VK_ESCAPE => Some("Esc".into()),
        VK_SPACE => Some("Space".into()),
        VK_SNAPSHOT => Some("PrintScreen".into()),
        v if (VK_F1..VK_F1 + 24).contains(&v) => Some(format!("F{}", v - VK_F1 + 1)),
        v if (0x30..=0x39).contains(&v) || (0x41..=0x5A).contains(&v) => {
            char::from_u32(v).map(String::from)
        }
        _ => None,
    }
}

/// A key combination the listener registered, with its OS id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBinding {
    pub combo: KeyCombo,
    pub id: i32,
    pub action: Action,
}

/// Combinations to attempt at startup; capture candidates in priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingPlan {
    pub show: KeyCombo,
    pub hide: KeyCombo,
    pub capture: Vec<KeyCombo>,
}

impl BindingPlan {
    /// Build a plan from key strings
    pub fn parse(show: &str, hide: &str, capture: &[String]) -> HotkeyResult<Self> {
        Ok(Self {
            show: KeyCombo::parse(show)?,
            hide: KeyCombo::parse(hide)?,
            capture: capture
                .iter()
                .map(|s| KeyCombo::parse(s))
                .collect::<HotkeyResult<_>>()?,
        })
    }
}

impl Default for BindingPlan {
    fn default() -> Self {
        Self {
            show: KeyCombo::new(VK_F7, 0),
            hide: KeyCombo::new(VK_F8, 0),
            capture: vec![
                KeyCombo::new(VK_OEM_2, 0),
                KeyCombo::new(VK_OEM_2, MOD_SHIFT),
                KeyCombo::new(VK_DIVIDE, 0),
                KeyCombo::new(VK_F9, 0),
            ],
        }
    }
}
