//! Constraint → text.
//!
//! Every descriptor maps to exactly one type string. A parameter line is
//! `* *name*: <type>` plus a ` _(default: ...)_` suffix when the parameter has
//! a default.

use crate::check::{exponent_literal, needs_exponent, Check, DefaultValue, EnumValue, ItemType, KeyType, ListCheck};
use crate::error::{RenderError, RenderResult};

/// Render one parameter line.
///
/// `default` is `None` when the parameter has no default at all, and
/// `Some(&DefaultValue::Null)` when its default is the null value.
pub fn render_param(name: &str, check: &Check, default: Option<&DefaultValue>) -> RenderResult<String> {
    let ty = type_string(check)?;
    let suffix = default_suffix(check, default);
    Ok(format!("* *{name}*: {ty}{suffix}"))
}

/// The canonical type string for a descriptor.
pub fn type_string(check: &Check) -> RenderResult<String> {
    let out = match check {
        Check::Bool => "bool".to_string(),
        Check::String => "str".to_string(),
        Check::Number { min, max, min_inclusive, max_inclusive } => format!(
            "float in {}{}, {}{}",
            if *min_inclusive { "[" } else { "(" },
            bound_literal(*min),
            bound_literal(*max),
            if *max_inclusive { "]" } else { ")" },
        ),
        // Brackets open on the unbounded side, independent of inclusivity.
        Check::Integer { min, max } => format!(
            "int in {}, {}",
            min.map_or_else(|| "(-inf".to_string(), |m| format!("[{m}")),
            max.map_or_else(|| "inf)".to_string(), |m| format!("{m}]")),
        ),
        Check::Enum { choices } => format!("one of {}", choices_string(choices)?),
        Check::Class { name } => name.clone(),
        Check::Key { ty: KeyType::Str } => "unique str".to_string(),
        Check::Key { ty } => return Err(RenderError::Unsupported(format!("key of type {ty}"))),
        Check::Vector(list) | Check::Lookup(list) => list_string(list)?,
        Check::Buffer => "buffer".to_string(),
        Check::Slice => "slice (start:stop:step)".to_string(),
    };
    Ok(out)
}

/// `0`, `0.5`, `inf` as written; very large or small magnitudes as `1e+20`.
fn bound_literal(x: f64) -> String {
    if needs_exponent(x) { exponent_literal(x) } else { x.to_string() }
}

fn list_string(list: &ListCheck) -> RenderResult<String> {
    let subtype = match &list.item {
        ItemType::Str => "str".to_string(),
        ItemType::Int => "int".to_string(),
        ItemType::Float => "float".to_string(),
        ItemType::Class(name) => name.clone(),
        ItemType::Choices(choices) => choices_string(choices)?,
    };
    Ok(format!("list of {subtype}{}", length_clause(list)))
}

fn length_clause(list: &ListCheck) -> String {
    if list.is_unbounded() {
        return String::new();
    }
    match list.maxlen {
        None => format!(" with length in [{}, inf)", list.minlen),
        Some(maxlen) => format!(" with length in [{}, {maxlen}]", list.minlen),
    }
}

/// `Base.{a, b, c}`; the base comes from the first value.
fn choices_string(choices: &[EnumValue]) -> RenderResult<String> {
    let first = choices.first().ok_or(RenderError::EmptyEnum)?;
    let names = choices.iter().map(ToString::to_string).collect::<Vec<_>>();
    Ok(format!("{}.{{{}}}", first.base, names.join(", ")))
}

fn default_suffix(check: &Check, default: Option<&DefaultValue>) -> String {
    match default {
        None => String::new(),
        Some(DefaultValue::Null) if check.is_list() => " _(default: [])_".to_string(),
        Some(value) => format!(" _(default: {value})_"),
    }
}

// ------------------------------- Tests ------------------------------------ //
