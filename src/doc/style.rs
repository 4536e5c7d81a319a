//! Styling sugar over the attribute map.
//!
//! Boolean styles are stored as `true`/`false`; color and font hold arbitrary
//! values. Style values are not validated, but writes still go through the
//! entry's attribute checks.

use super::Entry;
use crate::core::{Result, Tree};
use serde_json::Value;

pub const BOLD: &str = "bold";
pub const ITALIC: &str = "italic";
pub const UNDERLINED: &str = "underlined";
pub const COLOR: &str = "color";
pub const FONT: &str = "font";

pub trait Styleable {
    fn style(&self, key: &str) -> Option<&Value>;

    fn set_style(&mut self, key: &str, value: Value) -> Result<()>;

    fn is_bold(&self) -> bool {
        truthy(self.style(BOLD))
    }

    fn set_bold(&mut self, bold: bool) -> Result<()> {
        self.set_style(BOLD, Value::Bool(bold))
    }

    fn is_italic(&self) -> bool {
        truthy(self.style(ITALIC))
    }

    fn set_italic(&mut self, italic: bool) -> Result<()> {
        self.set_style(ITALIC, Value::Bool(italic))
    }

    fn is_underlined(&self) -> bool {
        truthy(self.style(UNDERLINED))
    }

    fn set_underlined(&mut self, underlined: bool) -> Result<()> {
        self.set_style(UNDERLINED, Value::Bool(underlined))
    }

    fn is_underline(&self) -> bool {
        self.is_underlined()
    }

    fn set_underline(&mut self, underline: bool) -> Result<()> {
        self.set_underlined(underline)
    }

    fn color(&self) -> Option<&Value> {
        self.style(COLOR)
    }

    fn set_color(&mut self, color: impl Into<Value>) -> Result<()> {
        self.set_style(COLOR, color.into())
    }

    fn font(&self) -> Option<&Value> {
        self.style(FONT)
    }

    fn set_font(&mut self, font: impl Into<Value>) -> Result<()> {
        self.set_style(FONT, font.into())
    }
}

fn truthy(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null) | Some(Value::Bool(false)))
}

impl Styleable for Entry {
    fn style(&self, key: &str) -> Option<&Value> {
        self.attribute(key)
    }

    fn set_style(&mut self, key: &str, value: Value) -> Result<()> {
        self.set_attribute(key, value)?;
        Ok(())
    }
}
