//! FunkLoad script generation from kept exchanges

mod python;
pub mod template;

use std::fmt::Write;

use crate::message::CapturedRequest;
use crate::params::{Param, ParamValue};

/// Maximum length of an instruction description, marker included
pub const DESCRIPTION_MAX_LEN: usize = 42;

/// Marker appended to truncated descriptions
const TRUNCATION_MARKER: &str = "...";

/// Indentation of instructions inside the generated test method
pub const SCRIPT_INDENT: usize = 8;

/// Where a replayed request is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Relative URL on the session server, re-pointable through configuration
    Session(String),
    /// Absolute URL on a third-party origin
    Absolute(String),
}

/// One generated FunkLoad call reproducing a kept exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayInstruction {
    /// HTTP method
    pub method: String,
    /// Request target
    pub target: Target,
    /// Form parameters, present when the request had a body
    pub params: Option<Vec<Param>>,
    /// Human readable description
    pub description: String,
}

impl ReplayInstruction {
    /// Render the call as Python source
    ///
    /// Continuation lines (param entries and the description argument) are
    /// indented four spaces deeper than `indent`.
    pub fn render(&self, indent: usize) -> String {
        let continuation = " ".repeat(indent + 4);
        let mut code = format!("self.{}(", self.method.to_lowercase());

        match &self.target {
            Target::Session(relative) => {
                let _ = write!(code, "server_url + {}", python::string(relative));
            }
            Target::Absolute(url) => code.push_str(&python::string(url)),
        }

        if let Some(params) = &self.params {
            code.push_str(", params=[");
            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    code.push(',');
                }
                let _ = write!(code, "\n{continuation}{}", render_param(param));
            }
            code.push(']');
        }

        let _ = write!(
            code,
            ",\n{continuation}description={})",
            python::string(&self.description)
        );
        code
    }
}

fn render_param(param: &Param) -> String {
    let value = match &param.value {
        ParamValue::Literal(value) => python::repr(value),
        ParamValue::Upload(filename) => format!("Upload({})", python::string(filename)),
    };
    format!("[{}, {value}]", python::repr(&param.name))
}

/// Builds replay instructions relative to a fixed session origin
#[derive(Debug, Clone)]
pub struct ScriptGenerator {
    server_url: String,
}

impl ScriptGenerator {
    /// Create a generator for a session recorded against `server_url`
    #[must_use]
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
        }
    }

    /// Session origin
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Build the instruction replaying `request`
    pub fn instruction(
        &self,
        request: &CapturedRequest,
        params: Option<Vec<Param>>,
    ) -> ReplayInstruction {
        let target = if request.origin() == self.server_url {
            Target::Session(request.relative_url().to_string())
        } else {
            Target::Absolute(request.url().to_string())
        };

        let path = if request.path().is_empty() {
            "/"
        } else {
            request.path()
        };
        let description = truncate(
            &format!("{} {}", capitalize(request.method()), path),
            DESCRIPTION_MAX_LEN,
        );

        ReplayInstruction {
            method: request.method().to_string(),
            target,
            params,
            description,
        }
    }

    /// Wrap generated instructions into a script
    pub fn finish(self, instructions: Vec<ReplayInstruction>) -> Script {
        Script {
            server_url: self.server_url,
            instructions,
        }
    }
}

/// Ordered replay instructions of one recorded session
#[derive(Debug, Clone)]
pub struct Script {
    server_url: String,
    instructions: Vec<ReplayInstruction>,
}

impl Script {
    /// Origin of the first kept request
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Instructions in replay order
    pub fn instructions(&self) -> &[ReplayInstruction] {
        &self.instructions
    }

    /// Render the test method body, one blank line before each call
    pub fn render(&self) -> String {
        let indent = " ".repeat(SCRIPT_INDENT);
        self.instructions
            .iter()
            .map(|instruction| format!("\n\n{indent}{}", instruction.render(SCRIPT_INDENT)))
            .collect()
    }
}

/// Uppercase the first character, lowercase the rest
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Cut `text` to at most `max` characters, ending with a marker when cut
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(TRUNCATION_MARKER.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}
