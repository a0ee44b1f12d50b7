//! Constraint descriptors attached to documented parameters.
//!
//! One closed variant per field kind. Everything here is plain data and
//! deserializes from the JSON schema format read by [`crate::schema`].

use std::fmt;
use serde::{Deserialize, Deserializer};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Validation rule for a single field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Check {
    Bool,
    String,
    /// Floating range. Brackets follow the inclusivity flags.
    Number {
        #[serde(default = "neg_inf", deserialize_with = "lower_float_bound")]
        min: f64,
        #[serde(default = "pos_inf", deserialize_with = "upper_float_bound")]
        max: f64,
        #[serde(default = "inclusive")]
        min_inclusive: bool,
        #[serde(default = "inclusive")]
        max_inclusive: bool,
    },
    /// Integer range. `None` is unbounded on that side.
    Integer {
        #[serde(default, deserialize_with = "lower_unbounded")]
        min: Option<i64>,
        #[serde(default, deserialize_with = "upper_unbounded")]
        max: Option<i64>,
    },
    Enum {
        choices: Vec<EnumValue>,
    },
    /// Reference to another documented class.
    Class {
        name: String,
    },
    /// Uniquely-valued key.
    Key {
        #[serde(rename = "type")]
        ty: KeyType,
    },
    Vector(ListCheck),
    Lookup(ListCheck),
    Buffer,
    Slice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Str,
    Int,
}

/// Homogeneous list with optional length bounds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListCheck {
    pub item: ItemType,
    #[serde(default)]
    pub minlen: usize,
    /// `None` is unbounded.
    #[serde(default, deserialize_with = "upper_unbounded")]
    pub maxlen: Option<usize>,
}

/// Element type of a list. Never itself a list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Str,
    Int,
    Float,
    Class(String),
    Choices(Vec<EnumValue>),
}

/// One member of an enumeration, tagged with the enumeration it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct EnumValue {
    pub base: String,
    pub name: String,
}

/// A parameter's default, as written in the generated document.
///
/// `Null` is the semantic "no value" default, distinct from having no default
/// at all (which is `Option::None` on [`crate::schema::Param`]).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    // Before `Enum`: a two-string list would otherwise read as an `EnumValue`.
    List(Vec<DefaultValue>),
    Enum(EnumValue),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Check {
    /// Unbounded, inclusive float range.
    pub fn number() -> Self {
        Check::Number {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            min_inclusive: true,
            max_inclusive: true,
        }
    }
    pub fn integer(min: Option<i64>, max: Option<i64>) -> Self {
        Check::Integer { min, max }
    }
    pub fn enumeration<I, S>(base: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Check::Enum { choices: EnumValue::many(base, names) }
    }
    pub fn class(name: impl Into<String>) -> Self {
        Check::Class { name: name.into() }
    }
    pub fn vector(item: ItemType) -> Self {
        Check::Vector(ListCheck::new(item))
    }

    /// Vector and Lookup document their "no items" default as `[]`.
    pub fn is_list(&self) -> bool {
        matches!(self, Check::Vector(_) | Check::Lookup(_))
    }
}

impl ListCheck {
    pub fn new(item: ItemType) -> Self {
        Self { item, minlen: 0, maxlen: None }
    }
    pub fn with_len(mut self, minlen: usize, maxlen: Option<usize>) -> Self {
        self.minlen = minlen;
        self.maxlen = maxlen;
        self
    }
    pub fn is_unbounded(&self) -> bool {
        self.minlen == 0 && self.maxlen.is_none()
    }
}

impl EnumValue {
    pub fn new(base: impl Into<String>, name: impl Into<String>) -> Self {
        Self { base: base.into(), name: name.into() }
    }
    pub fn many<I, S>(base: &str, names: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(|name| Self::new(base, name)).collect()
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::Str => f.write_str("str"),
            KeyType::Int => f.write_str("int"),
        }
    }
}

/// Literal representation of a default, in the conventions the generated
/// documents have always used (`None`, `True`, `'text'`, `1.0`, ...).
impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Null => f.write_str("None"),
            DefaultValue::Bool(true) => f.write_str("True"),
            DefaultValue::Bool(false) => f.write_str("False"),
            DefaultValue::Int(x) => write!(f, "{x}"),
            DefaultValue::Float(x) => f.write_str(&float_literal(*x)),
            DefaultValue::Str(s) => f.write_str(&quoted(s)),
            DefaultValue::Enum(v) => write!(f, "{}.{}", v.base, v.name),
            DefaultValue::List(xs) => {
                f.write_str("[")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 { f.write_str(", ")?; }
                    write!(f, "{x}")?;
                }
                f.write_str("]")
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Floats always show a fractional part or an exponent: `1.0`, `1e+20`, `1.5e-05`.
fn float_literal(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    if needs_exponent(x) {
        return exponent_literal(x);
    }
    if x.fract() == 0.0 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}

/// Finite, non-zero and outside `[1e-4, 1e16)`.
pub(crate) fn needs_exponent(x: f64) -> bool {
    let magnitude = x.abs();
    x.is_finite() && magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude)
}

/// `1e+20`, `1.5e-05`: signed exponent of at least two digits.
pub(crate) fn exponent_literal(x: f64) -> String {
    // `{:e}` yields `1e20` / `1.5e-5`.
    let sci = format!("{x:e}");
    match sci.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(rest) => ('-', rest),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => sci,
    }
}

/// Single-quoted unless the text holds `'` but no `"`.
fn quoted(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn neg_inf() -> f64 { f64::NEG_INFINITY }
fn pos_inf() -> f64 { f64::INFINITY }
fn inclusive() -> bool { true }

/// JSON has no infinities, so bounds may also be spelled `"inf"` / `"-inf"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBound<T> {
    Value(T),
    Text(String),
}

/// Which end of a range a bound sits on. Each end only admits its own infinity.
#[derive(Clone, Copy)]
enum Side {
    Lower,
    Upper,
}

impl Side {
    fn infinity(self) -> f64 {
        match self {
            Side::Lower => f64::NEG_INFINITY,
            Side::Upper => f64::INFINITY,
        }
    }
    fn spelling(self) -> &'static str {
        match self {
            Side::Lower => "\"-inf\"",
            Side::Upper => "\"inf\"",
        }
    }
}

fn parse_infinity(text: &str) -> Option<f64> {
    match text.trim().to_ascii_lowercase().as_str() {
        "inf" | "+inf" | "infinity" | "+infinity" => Some(f64::INFINITY),
        "-inf" | "-infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

/// `null` and the side's own infinity mean "no bound"; anything else is an error.
fn is_open<E: serde::de::Error>(text: &str, side: Side) -> Result<(), E> {
    match parse_infinity(text) {
        Some(x) if x == side.infinity() => Ok(()),
        _ => Err(E::custom(format!(
            "expected a number, null or {}, got {text:?}",
            side.spelling()
        ))),
    }
}

fn float_bound<'de, D>(de: D, side: Side) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawBound<f64>>::deserialize(de)? {
        None => Ok(side.infinity()),
        Some(RawBound::Value(x)) => Ok(x),
        Some(RawBound::Text(text)) => is_open(&text, side).map(|()| side.infinity()),
    }
}

fn lower_float_bound<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    float_bound(de, Side::Lower)
}

fn upper_float_bound<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    float_bound(de, Side::Upper)
}

fn unbounded<'de, D, T>(de: D, side: Side) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<RawBound<T>>::deserialize(de)? {
        None => Ok(None),
        Some(RawBound::Value(x)) => Ok(Some(x)),
        Some(RawBound::Text(text)) => is_open(&text, side).map(|()| None),
    }
}

fn lower_unbounded<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    unbounded(de, Side::Lower)
}

fn upper_unbounded<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    unbounded(de, Side::Upper)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(value: serde_json::Value) -> Check {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn number_bounds_default_to_unbounded_inclusive() {
        assert_eq!(check(json!({"kind": "number"})), Check::number());
    }

    #[test]
    fn number_bounds_accept_infinity_spellings() {
        let c = check(json!({"kind": "number", "min": "-inf", "max": 1, "max_inclusive": false}));
        assert_eq!(c, Check::Number {
            min: f64::NEG_INFINITY,
            max: 1.0,
            min_inclusive: true,
            max_inclusive: false,
        });
        let bad = serde_json::from_value::<Check>(json!({"kind": "number", "min": "lots"}));
        assert!(bad.is_err());
    }

    #[test]
    fn integer_bounds_absent_null_or_inf_are_unbounded() {
        assert_eq!(check(json!({"kind": "integer"})), Check::integer(None, None));
        assert_eq!(
            check(json!({"kind": "integer", "min": null, "max": "inf"})),
            Check::integer(None, None)
        );
        assert_eq!(
            check(json!({"kind": "integer", "min": 0, "max": 10})),
            Check::integer(Some(0), Some(10))
        );
    }

    #[test]
    fn infinity_must_match_its_side() {
        for bad in [
            json!({"kind": "integer", "min": "inf"}),
            json!({"kind": "integer", "max": "-inf"}),
            json!({"kind": "integer", "min": "inf", "max": "-inf"}),
            json!({"kind": "vector", "item": "str", "maxlen": "-inf"}),
            json!({"kind": "number", "min": "+infinity"}),
            json!({"kind": "number", "max": "-inf"}),
        ] {
            assert!(serde_json::from_value::<Check>(bad.clone()).is_err(), "{bad}");
        }
        assert_eq!(
            check(json!({"kind": "integer", "min": "-Infinity", "max": "+inf"})),
            Check::integer(None, None)
        );
        assert_eq!(
            check(json!({"kind": "vector", "item": "str", "maxlen": "inf"})),
            Check::vector(ItemType::Str)
        );
    }

    #[test]
    fn null_number_bounds_are_unbounded_like_integer_bounds() {
        assert_eq!(check(json!({"kind": "number", "min": null, "max": null})), Check::number());
    }

    #[test]
    fn list_items_cover_every_element_kind() {
        let c = check(json!({"kind": "vector", "item": "str", "minlen": 1}));
        assert_eq!(c, Check::Vector(ListCheck::new(ItemType::Str).with_len(1, None)));

        let c = check(json!({"kind": "lookup", "item": {"class": "Axis"}, "maxlen": 3}));
        assert_eq!(c, Check::Lookup(ListCheck::new(ItemType::Class("Axis".into())).with_len(0, Some(3))));

        let c = check(json!({
            "kind": "vector",
            "item": {"choices": [{"base": "Stat", "name": "mean"}, {"base": "Stat", "name": "stdev"}]}
        }));
        assert_eq!(c, Check::vector(ItemType::Choices(EnumValue::many("Stat", ["mean", "stdev"]))));
        assert!(c.is_list());
    }

    #[test]
    fn key_and_unit_kinds() {
        assert_eq!(check(json!({"kind": "key", "type": "str"})), Check::Key { ty: KeyType::Str });
        assert_eq!(check(json!({"kind": "buffer"})), Check::Buffer);
        assert_eq!(check(json!({"kind": "slice"})), Check::Slice);
        assert!(!Check::Slice.is_list());
    }

    #[test]
    fn defaults_deserialize_by_shape() {
        let d: DefaultValue = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(d, DefaultValue::Null);
        let d: DefaultValue = serde_json::from_value(json!(5)).unwrap();
        assert_eq!(d, DefaultValue::Int(5));
        let d: DefaultValue = serde_json::from_value(json!(5.0)).unwrap();
        assert_eq!(d, DefaultValue::Float(5.0));
        let d: DefaultValue = serde_json::from_value(json!({"base": "Color", "name": "Red"})).unwrap();
        assert_eq!(d, DefaultValue::Enum(EnumValue::new("Color", "Red")));
        let d: DefaultValue = serde_json::from_value(json!([1, "a"])).unwrap();
        assert_eq!(d, DefaultValue::List(vec![DefaultValue::Int(1), DefaultValue::Str("a".into())]));
    }

    #[test]
    fn default_literals() {
        assert_eq!(DefaultValue::Null.to_string(), "None");
        assert_eq!(DefaultValue::Bool(false).to_string(), "False");
        assert_eq!(DefaultValue::Float(1.0).to_string(), "1.0");
        assert_eq!(DefaultValue::Float(0.25).to_string(), "0.25");
        assert_eq!(DefaultValue::Float(-0.0).to_string(), "-0.0");
        assert_eq!(DefaultValue::Float(1e20).to_string(), "1e+20");
        assert_eq!(DefaultValue::Float(1.5e-5).to_string(), "1.5e-05");
        assert_eq!(DefaultValue::Float(f64::NEG_INFINITY).to_string(), "-inf");
        assert_eq!(DefaultValue::Str("abc".into()).to_string(), "'abc'");
        assert_eq!(DefaultValue::Str("it's".into()).to_string(), "\"it's\"");
        assert_eq!(DefaultValue::Str("a\\b\n".into()).to_string(), "'a\\\\b\\n'");
        assert_eq!(
            DefaultValue::List(vec![DefaultValue::Int(1), DefaultValue::Bool(true)]).to_string(),
            "[1, True]"
        );
        assert_eq!(DefaultValue::Enum(EnumValue::new("Color", "Red")).to_string(), "Color.Red");
    }
}
