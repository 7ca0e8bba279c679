//! Stylesheet templating.
//!
//! A stylesheet template is a JSON document rendered with [`tera`], so
//! `{{ name }}` placeholders are filled from caller variables first, then
//! from the templatizer's defaults. The rendered text is parsed as a
//! [`Stylesheet`].

use std::collections::BTreeMap;
use std::error::Error as _;

use renderer::Stylesheet;
use serde_json::{json, Value};
use tera::{Context, Tera};
use thumbnail_common::{ThumbnailError, ThumbnailResult};

/// Template used when the caller supplies none.
pub const DEFAULT_TEMPLATE: &str = r#"{
    "fill": "{{ fill }}",
    "fill-opacity": {{ fill_opacity }},
    "stroke": "{{ stroke }}",
    "stroke-width": {{ stroke_width }},
    "stroke-opacity": {{ stroke_opacity }},
    "point-radius": {{ point_radius }}
}"#;

/// Fills stylesheet templates.
#[derive(Debug, Clone)]
pub struct Templatizer {
    defaults: BTreeMap<String, Value>,
}

impl Default for Templatizer {
    fn default() -> Self {
        let style = Stylesheet::default();
        let defaults = [
            ("fill", json!(style.fill)),
            ("fill_opacity", json!(style.fill_opacity)),
            ("stroke", json!(style.stroke)),
            ("stroke_width", json!(style.stroke_width)),
            ("stroke_opacity", json!(style.stroke_opacity)),
            ("point_radius", json!(style.point_radius)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Self { defaults }
    }
}

impl Templatizer {
    /// Templatizer with no default variables.
    pub fn empty() -> Self {
        Self {
            defaults: BTreeMap::new(),
        }
    }

    /// Add or replace a default variable.
    pub fn with_default(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    /// Defaults overlaid with the caller's variables. Null caller values
    /// leave the default in place.
    fn context(&self, variables: &BTreeMap<String, Value>) -> Context {
        let mut context = Context::new();
        for (name, value) in &self.defaults {
            context.insert(name.as_str(), value);
        }
        for (name, value) in variables {
            if !value.is_null() {
                context.insert(name.as_str(), value);
            }
        }
        context
    }

    /// Substitute every placeholder in `template`.
    pub fn render(
        &self,
        template: &str,
        variables: &BTreeMap<String, Value>,
    ) -> ThumbnailResult<String> {
        Tera::one_off(template, &self.context(variables), false)
            .map_err(|e| ThumbnailError::Stylesheet(describe(&e)))
    }

    /// Render `template` and parse it as a stylesheet.
    pub fn resolve(
        &self,
        template: &str,
        variables: &BTreeMap<String, Value>,
    ) -> ThumbnailResult<Stylesheet> {
        let rendered = self.render(template, variables)?;
        Stylesheet::from_json(&rendered).map_err(|e| ThumbnailError::Stylesheet(e.to_string()))
    }
}

/// Tera keeps the useful part of a failure (the missing variable, the parse
/// position) in the error's source chain.
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
