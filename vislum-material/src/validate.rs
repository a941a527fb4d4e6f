//! Checks generated shaders before they are handed to a driver.
//!
//! [`ShaderValidator`] is the seam a full shading language front end plugs
//! into. [`CallGraphValidator`] is a lightweight stand-in that only looks at
//! the function structure of the preprocessed text.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::composer::{ComposeError, ShaderComposer};
use crate::enums::{ShaderModel, ShaderType, TargetApi};

/// Entry point the author writes for the fragment stage.
pub const MATERIAL_FUNCTION: &str = "material";

/// Setup function every fragment entry point must end up calling.
pub const PREPARE_MATERIAL_FUNCTION: &str = "prepareMaterial";

/// Entry point the author writes for the vertex stage.
pub const MATERIAL_VERTEX_FUNCTION: &str = "materialVertex";

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Preprocess(#[from] ComposeError),

    #[error("unbalanced {delimiter:?} at line {line}")]
    Unbalanced { delimiter: char, line: usize },

    #[error("{shader_type} shader does not define {function}()")]
    MissingFunction {
        shader_type: ShaderType,
        function: &'static str,
    },

    #[error("{from}() never calls {to}()")]
    Unreachable { from: &'static str, to: &'static str },
}

/// A pass/fail check over one generated stage.
///
/// The error's display text is the diagnostic shown to the author.
pub trait ShaderValidator {
    fn validate_vertex(&self, text: &str, shader_model: ShaderModel, target_api: TargetApi)
    -> Result<(), ValidationError>;

    fn validate_fragment(
        &self,
        text: &str,
        shader_model: ShaderModel,
        target_api: TargetApi,
    ) -> Result<(), ValidationError>;
}

static FUNCTION_HEAD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*\([^()]*\)\s*$").unwrap());

static CALL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap());

const KEYWORDS: &[&str] = &["if", "for", "while", "switch", "return", "layout", "uniform"];

/// Validates the entry point rules by walking the call graph of the shader.
///
/// Overloads are merged, so a call reaches every function sharing the name.
#[derive(Debug, Default, Clone, Copy)]
pub struct CallGraphValidator;

static_assertions::assert_impl_all!(CallGraphValidator: Send, Sync);

impl CallGraphValidator {
    pub fn new() -> Self {
        Self
    }

    /// Preprocesses `text` and builds its call graph.
    fn analyze(&self, path: &str, text: &str) -> Result<CallGraph, ValidationError> {
        let composed = ShaderComposer::default().compose(path, text)?;
        let stripped = strip_comments(&composed);
        check_balance(&stripped)?;
        Ok(CallGraph::parse(&stripped))
    }

    fn report(result: Result<(), ValidationError>) -> Result<(), ValidationError> {
        if let Err(e) = &result {
            log::error!("Shader validation failed: {e}");
        }
        result
    }
}

impl ShaderValidator for CallGraphValidator {
    fn validate_vertex(
        &self,
        text: &str,
        shader_model: ShaderModel,
        target_api: TargetApi,
    ) -> Result<(), ValidationError> {
        log::debug!("Validating vertex shader ({shader_model:?}, {target_api:?})");

        Self::report(self.analyze("vertex", text).and_then(|graph| {
            graph.require(ShaderType::Vertex, MATERIAL_VERTEX_FUNCTION)?;
            Ok(())
        }))
    }

    fn validate_fragment(
        &self,
        text: &str,
        shader_model: ShaderModel,
        target_api: TargetApi,
    ) -> Result<(), ValidationError> {
        log::debug!("Validating fragment shader ({shader_model:?}, {target_api:?})");

        Self::report(self.analyze("fragment", text).and_then(|graph| {
            graph.require(ShaderType::Fragment, MATERIAL_FUNCTION)?;
            graph.require(ShaderType::Fragment, PREPARE_MATERIAL_FUNCTION)?;
            if !graph.reaches(MATERIAL_FUNCTION, PREPARE_MATERIAL_FUNCTION) {
                return Err(ValidationError::Unreachable {
                    from: MATERIAL_FUNCTION,
                    to: PREPARE_MATERIAL_FUNCTION,
                });
            }
            Ok(())
        }))
    }
}

/// Replaces comments with spaces, keeping newlines so line numbers survive.
fn strip_comments(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        output.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for c in chars.by_ref() {
                    if c == '\n' {
                        output.push('\n');
                    }
                    if previous == '*' && c == '/' {
                        break;
                    }
                    previous = c;
                }
                output.push(' ');
            }
            _ => output.push(c),
        }
    }

    output
}

/// Checks that parentheses, brackets and braces nest properly.
fn check_balance(text: &str) -> Result<(), ValidationError> {
    let mut stack = Vec::new();
    let mut line = 1;

    for c in text.chars() {
        match c {
            '\n' => line += 1,
            '(' | '[' | '{' => stack.push((c, line)),
            ')' | ']' | '}' => {
                let open = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match stack.pop() {
                    Some((top, _)) if top == open => {}
                    _ => return Err(ValidationError::Unbalanced { delimiter: c, line }),
                }
            }
            _ => {}
        }
    }

    match stack.pop() {
        Some((delimiter, line)) => Err(ValidationError::Unbalanced { delimiter, line }),
        None => Ok(()),
    }
}

/// Top level functions mapped to the names they call.
#[derive(Debug, Default)]
struct CallGraph {
    calls: HashMap<String, HashSet<String>>,
}

impl CallGraph {
    /// Collects every top level `name(...) { ... }` definition.
    ///
    /// Expects comment free, balanced text.
    fn parse(text: &str) -> Self {
        let mut graph = CallGraph::default();
        let mut depth = 0usize;
        let mut head_start = 0;
        let mut body: Option<(String, usize)> = None;

        for (index, c) in text.char_indices() {
            match c {
                '{' => {
                    if depth == 0 {
                        let head = &text[head_start..index];
                        body = FUNCTION_HEAD_REGEX
                            .captures(head)
                            .and_then(|caps| caps.get(1))
                            .map(|name| name.as_str())
                            .filter(|name| !KEYWORDS.contains(name))
                            .map(|name| (name.to_owned(), index + 1));
                    }
                    depth += 1;
                }
                '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        if let Some((name, start)) = body.take() {
                            graph.add_function(name, &text[start..index]);
                        }
                        head_start = index + 1;
                    }
                }
                ';' if depth == 0 => head_start = index + 1,
                _ => {}
            }
        }

        graph
    }

    fn add_function(&mut self, name: String, body: &str) {
        let callees = self.calls.entry(name).or_default();
        for caps in CALL_REGEX.captures_iter(body) {
            if let Some(callee) = caps.get(1) {
                if !KEYWORDS.contains(&callee.as_str()) {
                    callees.insert(callee.as_str().to_owned());
                }
            }
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.calls.contains_key(name)
    }

    fn require(&self, shader_type: ShaderType, function: &'static str) -> Result<(), ValidationError> {
        if self.contains(function) {
            Ok(())
        } else {
            Err(ValidationError::MissingFunction { shader_type, function })
        }
    }

    /// Whether `to` is transitively called from `from`.
    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([from]);

        while let Some(name) = queue.pop_front() {
            if !visited.insert(name) {
                continue;
            }
            let Some(callees) = self.calls.get(name) else {
                continue;
            };
            if callees.contains(to) {
                return true;
            }
            queue.extend(callees.iter().map(String::as_str));
        }

        false
    }
}
