//! Declarative class schemas and the documents built from them.
//!
//! A [`Registry`] is an ordered list of classes. Each [`ClassSchema`] lists
//! its constructor parameters in declaration order and maps every parameter
//! name to the [`Check`] that validates it.
use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Deserializer};

use crate::check::{Check, DefaultValue};
use crate::error::{RenderError, RenderResult, SchemaError, SchemaResult};
use crate::render::render_param;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registry {
    pub classes: Vec<ClassSchema>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassSchema {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub checks: IndexMap<String, Check>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Param {
    pub name: String,
    /// Absent key: no default. `null`: a default of null.
    #[serde(default, deserialize_with = "present")]
    pub default: Option<DefaultValue>,
}

/// Text placed around the class blocks of a document.
#[derive(Debug, Clone)]
pub struct Frame {
    pub prelude: String,
    pub epilogue: String,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), default: None }
    }
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }
}

impl ClassSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), params: Vec::new(), checks: IndexMap::new() }
    }

    /// Declare a parameter together with its constraint.
    pub fn param(mut self, param: Param, check: Check) -> Self {
        self.checks.insert(param.name.clone(), check);
        self.params.push(param);
        self
    }

    pub fn check_for(&self, param: &str) -> RenderResult<&Check> {
        self.checks.get(param).ok_or_else(|| RenderError::MissingConstraint {
            class: self.name.clone(),
            param: param.to_string(),
        })
    }

    /// `=== Name` followed by one line per parameter. Stops at the first
    /// parameter that cannot be rendered.
    pub fn render(&self) -> RenderResult<String> {
        tracing::debug!(class = %self.name, params = self.params.len(), "rendering class");
        let mut out = vec![format!("=== {}", self.name)];
        for param in &self.params {
            let check = self.check_for(&param.name)?;
            out.push(render_param(&param.name, check, param.default.as_ref())?);
        }
        Ok(out.join("\n"))
    }

    fn validate(&self) -> SchemaResult<()> {
        let mut seen = HashSet::new();
        for param in &self.params {
            if !seen.insert(param.name.as_str()) {
                return Err(SchemaError::DuplicateParam {
                    class: self.name.clone(),
                    param: param.name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Registry {
    pub fn from_json(src: &str) -> SchemaResult<Self> {
        let registry: Self = crate::path_de::from_str_with_path(src)?;
        registry.validate()?;
        Ok(registry)
    }

    pub fn load(path: &Path) -> SchemaResult<Self> {
        let bytes = std::fs::read(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry: Self = crate::path_de::from_slice_with_path(&bytes)?;
        registry.validate()?;
        tracing::debug!(path = %path.display(), classes = registry.classes.len(), "loaded schema");
        Ok(registry)
    }

    /// Append another registry's classes after this one's.
    pub fn extend(&mut self, other: Registry) {
        self.classes.extend(other.classes);
    }

    /// Keep only the named classes, in registry order. Returns the names that
    /// matched nothing.
    pub fn retain_named(&mut self, names: &[String]) -> Vec<String> {
        let missing = names
            .iter()
            .filter(|n| !self.classes.iter().any(|c| &c.name == *n))
            .cloned()
            .collect();
        self.classes.retain(|c| names.contains(&c.name));
        missing
    }

    /// Render every class independently, preserving registry order.
    pub fn render_blocks(&self) -> Vec<(&str, RenderResult<String>)> {
        self.classes
            .par_iter()
            .map(|class| (class.name.as_str(), class.render()))
            .collect()
    }

    fn validate(&self) -> SchemaResult<()> {
        self.classes.iter().try_for_each(ClassSchema::validate)
    }
}

impl Frame {
    pub fn new(prelude: impl Into<String>, epilogue: impl Into<String>) -> Self {
        Self { prelude: prelude.into(), epilogue: epilogue.into() }
    }

    /// Prelude, each block followed by a newline, epilogue.
    pub fn wrap<'a, I>(&self, blocks: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = self.prelude.clone();
        for block in blocks {
            out.push_str(block);
            out.push('\n');
        }
        out.push_str(&self.epilogue);
        out
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new("\n", "\n")
    }
}

/// The full document for a registry. Fails on the first class that cannot
/// be rendered; nothing is returned for a partial document.
pub fn render_document(registry: &Registry, frame: &Frame) -> RenderResult<String> {
    let blocks = registry
        .render_blocks()
        .into_iter()
        .map(|(_, block)| block)
        .collect::<RenderResult<Vec<_>>>()?;
    Ok(frame.wrap(blocks.iter().map(String::as_str)))
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn present<'de, D>(de: D) -> Result<Option<DefaultValue>, D::Error>
where
    D: Deserializer<'de>,
{
    DefaultValue::deserialize(de).map(Some)
}

// ------------------------------- Tests ------------------------------------ //
