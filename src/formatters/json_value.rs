//! JSON rendering of structured property values

use crate::core::{PropertyValue, Result, StructureValue};
use std::io::Write;

pub const DEFAULT_TYPE_TAG_NAME: &str = "$type";

/// Writes a [`PropertyValue`] as compact JSON.
///
/// Structures carrying a type tag get it as a trailing member named
/// `type_tag_name`; `None` omits the tag.
#[derive(Debug, Clone)]
pub struct JsonValueFormatter {
    type_tag_name: Option<String>,
}

impl Default for JsonValueFormatter {
    fn default() -> Self {
        Self {
            type_tag_name: Some(DEFAULT_TYPE_TAG_NAME.to_string()),
        }
    }
}

impl JsonValueFormatter {
    pub fn new(type_tag_name: Option<&str>) -> Self {
        Self {
            type_tag_name: type_tag_name.map(str::to_string),
        }
    }

    pub fn format(&self, value: &PropertyValue, output: &mut dyn Write) -> Result<()> {
        match value {
            PropertyValue::Null => output.write_all(b"null")?,
            PropertyValue::Bool(true) => output.write_all(b"true")?,
            PropertyValue::Bool(false) => output.write_all(b"false")?,
            PropertyValue::Int(i) => write!(output, "{}", i)?,
            PropertyValue::UInt(u) => write!(output, "{}", u)?,
            PropertyValue::Float(f) => write_float(*f, output)?,
            PropertyValue::String(s) => write_quoted_json_string(s, output)?,
            PropertyValue::Sequence(items) => {
                output.write_all(b"[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        output.write_all(b",")?;
                    }
                    self.format(item, output)?;
                }
                output.write_all(b"]")?;
            }
            PropertyValue::Dictionary(entries) => {
                output.write_all(b"{")?;
                for (index, (key, item)) in entries.iter().enumerate() {
                    if index > 0 {
                        output.write_all(b",")?;
                    }
                    write_quoted_json_string(key, output)?;
                    output.write_all(b":")?;
                    self.format(item, output)?;
                }
                output.write_all(b"}")?;
            }
            PropertyValue::Structure(structure) => self.format_structure(structure, output)?,
        }
        Ok(())
    }

    fn format_structure(&self, structure: &StructureValue, output: &mut dyn Write) -> Result<()> {
        output.write_all(b"{")?;
        let mut delimit = false;
        for (name, item) in &structure.properties {
            if delimit {
                output.write_all(b",")?;
            }
            delimit = true;
            write_quoted_json_string(name, output)?;
            output.write_all(b":")?;
            self.format(item, output)?;
        }

        if let (Some(tag_name), Some(tag)) = (&self.type_tag_name, &structure.type_tag) {
            if delimit {
                output.write_all(b",")?;
            }
            write_quoted_json_string(tag_name, output)?;
            output.write_all(b":")?;
            write_quoted_json_string(tag, output)?;
        }
        output.write_all(b"}")?;
        Ok(())
    }
}

/// Write `s` as a JSON string literal, quotes included
pub fn write_quoted_json_string(s: &str, output: &mut dyn Write) -> Result<()> {
    serde_json::to_writer(&mut *output, s)?;
    Ok(())
}

fn write_float(value: f64, output: &mut dyn Write) -> Result<()> {
    if value.is_nan() {
        output.write_all(b"\"NaN\"")?;
    } else if value.is_infinite() {
        if value > 0.0 {
            output.write_all(b"\"Infinity\"")?;
        } else {
            output.write_all(b"\"-Infinity\"")?;
        }
    } else {
        serde_json::to_writer(&mut *output, &value)?;
    }
    Ok(())
}
