//! Structured values bound to log event properties

use super::error::Result;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::{self, Write as _};

/// Ordered property map; insertion order is emission order
pub type Properties = IndexMap<String, PropertyValue>;

/// A structured value captured for a log event property
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Sequence(Vec<PropertyValue>),
    Structure(StructureValue),
    Dictionary(Vec<(String, PropertyValue)>),
}

/// A destructured object: named members and an optional type tag
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructureValue {
    pub type_tag: Option<String>,
    pub properties: Vec<(String, PropertyValue)>,
}

impl PropertyValue {
    /// Build a structure value from named members
    pub fn structure<K, V, I>(type_tag: Option<&str>, members: I) -> Self
    where
        K: Into<String>,
        V: Into<PropertyValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        PropertyValue::Structure(StructureValue {
            type_tag: type_tag.map(str::to_string),
            properties: members
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        })
    }

    /// Capture the shape of any serializable value.
    ///
    /// Objects become untagged structures; use [`PropertyValue::destructure_tagged`]
    /// to carry the type name along.
    pub fn destructure<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(serde_json::to_value(value)?.into())
    }

    /// Like [`PropertyValue::destructure`], tagging the top-level structure
    /// with the short type name of `T`.
    pub fn destructure_tagged<T: Serialize>(value: &T) -> Result<Self> {
        let mut captured = Self::destructure(value)?;
        if let PropertyValue::Structure(ref mut structure) = captured {
            structure.type_tag = Some(short_type_name::<T>().to_string());
        }
        Ok(captured)
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            PropertyValue::Sequence(_) | PropertyValue::Structure(_) | PropertyValue::Dictionary(_)
        )
    }

    /// Plain string form: strings unquoted, everything else rendered
    pub fn to_plain_string(&self) -> String {
        match self {
            PropertyValue::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Render for a message, honoring the `l` (literal) format for strings
    pub fn render(&self, output: &mut String, format: Option<&str>) {
        match self {
            PropertyValue::Null => output.push_str("null"),
            PropertyValue::Bool(b) => {
                let _ = write!(output, "{}", b);
            }
            PropertyValue::Int(i) => {
                let _ = write!(output, "{}", i);
            }
            PropertyValue::UInt(u) => {
                let _ = write!(output, "{}", u);
            }
            PropertyValue::Float(f) => {
                let _ = write!(output, "{}", f);
            }
            PropertyValue::String(s) => {
                if format == Some("l") {
                    output.push_str(s);
                } else {
                    output.push('"');
                    output.push_str(&s.replace('"', "\\\""));
                    output.push('"');
                }
            }
            PropertyValue::Sequence(items) => {
                output.push('[');
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        output.push_str(", ");
                    }
                    item.render(output, None);
                }
                output.push(']');
            }
            PropertyValue::Structure(structure) => {
                if let Some(ref tag) = structure.type_tag {
                    output.push_str(tag);
                    output.push(' ');
                }
                output.push_str("{ ");
                for (index, (name, value)) in structure.properties.iter().enumerate() {
                    if index > 0 {
                        output.push_str(", ");
                    }
                    output.push_str(name);
                    output.push_str(": ");
                    value.render(output, None);
                }
                output.push_str(" }");
            }
            PropertyValue::Dictionary(entries) => {
                output.push('[');
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        output.push_str(", ");
                    }
                    output.push_str("(\"");
                    output.push_str(key);
                    output.push_str("\": ");
                    value.render(output, None);
                    output.push(')');
                }
                output.push(']');
            }
        }
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = String::new();
        self.render(&mut rendered, None);
        f.write_str(&rendered)
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => PropertyValue::Null,
            Value::Bool(b) => PropertyValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PropertyValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    PropertyValue::UInt(u)
                } else {
                    PropertyValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => PropertyValue::String(s),
            Value::Array(items) => {
                PropertyValue::Sequence(items.into_iter().map(PropertyValue::from).collect())
            }
            Value::Object(members) => PropertyValue::Structure(StructureValue {
                type_tag: None,
                properties: members
                    .into_iter()
                    .map(|(k, v)| (k, PropertyValue::from(v)))
                    .collect(),
            }),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<&String> for PropertyValue {
    fn from(s: &String) -> Self {
        PropertyValue::String(s.clone())
    }
}

impl From<char> for PropertyValue {
    fn from(c: char) -> Self {
        PropertyValue::String(c.to_string())
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<f32> for PropertyValue {
    fn from(f: f32) -> Self {
        PropertyValue::Float(f64::from(f))
    }
}

macro_rules! signed_conversions {
    ($($ty:ty),*) => {
        $(impl From<$ty> for PropertyValue {
            fn from(i: $ty) -> Self {
                PropertyValue::Int(i as i64)
            }
        })*
    };
}

macro_rules! unsigned_conversions {
    ($($ty:ty),*) => {
        $(impl From<$ty> for PropertyValue {
            fn from(u: $ty) -> Self {
                PropertyValue::UInt(u as u64)
            }
        })*
    };
}

signed_conversions!(i8, i16, i32, i64, isize);
unsigned_conversions!(u8, u16, u32, u64, usize);

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropertyValue::Null, Into::into)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(items: Vec<T>) -> Self {
        PropertyValue::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl From<StructureValue> for PropertyValue {
    fn from(structure: StructureValue) -> Self {
        PropertyValue::Structure(structure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Order {
        id: u32,
        customer: String,
    }

    #[test]
    fn test_conversions() {
        assert_eq!(PropertyValue::from(42), PropertyValue::Int(42));
        assert_eq!(PropertyValue::from(7u8), PropertyValue::UInt(7));
        assert_eq!(PropertyValue::from("a"), PropertyValue::String("a".into()));
        assert_eq!(PropertyValue::from(None::<i32>), PropertyValue::Null);
        assert_eq!(
            PropertyValue::from(vec![1, 2]),
            PropertyValue::Sequence(vec![PropertyValue::Int(1), PropertyValue::Int(2)])
        );
    }

    #[test]
    fn test_render_quotes_strings() {
        assert_eq!(PropertyValue::from("billing").to_string(), "\"billing\"");
        assert_eq!(PropertyValue::from("say \"hi\"").to_string(), "\"say \\\"hi\\\"\"");

        let mut literal = String::new();
        PropertyValue::from("billing").render(&mut literal, Some("l"));
        assert_eq!(literal, "billing");
    }

    #[test]
    fn test_render_composites() {
        let seq = PropertyValue::from(vec![1, 2, 3]);
        assert_eq!(seq.to_string(), "[1, 2, 3]");

        let structure = PropertyValue::structure(Some("Order"), [("Id", 1)]);
        assert_eq!(structure.to_string(), "Order { Id: 1 }");

        let dict = PropertyValue::Dictionary(vec![("a".into(), PropertyValue::Int(1))]);
        assert_eq!(dict.to_string(), "[(\"a\": 1)]");
    }

    #[test]
    fn test_destructure_tagged() {
        let order = Order {
            id: 9,
            customer: "acme".into(),
        };
        let captured = PropertyValue::destructure_tagged(&order).unwrap();
        match captured {
            PropertyValue::Structure(structure) => {
                assert_eq!(structure.type_tag.as_deref(), Some("Order"));
                assert_eq!(structure.properties[0].0, "id");
                assert_eq!(structure.properties[1].1, PropertyValue::String("acme".into()));
            }
            other => panic!("Expected structure, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_string() {
        assert_eq!(PropertyValue::from("x").to_plain_string(), "x");
        assert_eq!(PropertyValue::from(1.5).to_plain_string(), "1.5");
    }
}
