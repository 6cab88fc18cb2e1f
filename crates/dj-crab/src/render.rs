//! Renderers for [`JobDescriptor`].

use dj_core::errors::DjError;
use dj_core::to_canonical_json_pretty;

use crate::descriptor::{ConfigValue, JobDescriptor};

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            other => quoted.push(other),
        }
    }
    quoted.push('\'');
    quoted
}

/// Python literal for one value.
pub fn python_literal(value: &ConfigValue) -> String {
    match value {
        ConfigValue::Text(text) => quote(text),
        ConfigValue::Int(number) => number.to_string(),
        ConfigValue::Bool(true) => "True".to_string(),
        ConfigValue::Bool(false) => "False".to_string(),
        ConfigValue::List(items) => {
            let items: Vec<String> = items.iter().map(|item| quote(item)).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

/// CRAB configuration file for the descriptor.
pub fn render_python(descriptor: &JobDescriptor) -> String {
    let mut out = String::from("from WMCore.Configuration import Configuration\n");
    out.push_str("config = Configuration()\n");
    for (section, entries) in descriptor.sections() {
        out.push('\n');
        out.push_str(&format!("config.section_(\"{section}\")\n"));
        for (key, value) in entries {
            out.push_str(&format!(
                "config.{section}.{key} = {}\n",
                python_literal(&value)
            ));
        }
    }
    out
}

/// Canonical (key-sorted) pretty JSON for the descriptor.
pub fn render_json(descriptor: &JobDescriptor) -> Result<String, DjError> {
    to_canonical_json_pretty(descriptor)
}
