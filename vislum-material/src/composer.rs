use std::collections::HashMap;

use thiserror::Error;

use crate::directive::{Directive, ExpressionError, evaluate};

#[derive(Debug, Error)]
pub enum ComposeErrorType {
    #[error("{0} without a matching #if")]
    UnmatchedDirective(&'static str),

    #[error("#elif after #else")]
    ElifAfterElse,

    #[error("duplicate #else")]
    DuplicateElse,

    #[error("unterminated conditional block")]
    UnterminatedConditional,

    #[error("malformed {0} directive")]
    MalformedDirective(&'static str),

    #[error("invalid expression: {0}")]
    InvalidExpression(#[from] ExpressionError),
}

#[derive(Debug, Error)]
#[error("compose error at {path}:{line}: {ty}")]
pub struct ComposeError {
    pub ty: ComposeErrorType,
    pub path: String,
    /// One-based line of the offending directive.
    pub line: usize,
}

/// Resolves the conditional directives of a shader.
///
/// Lines removed by the composer, directives included, are replaced by empty
/// lines so that line numbers in the output match the input.
#[derive(Default, Debug, Clone)]
pub struct ShaderComposer {
    defines: HashMap<String, String>,
}

impl ShaderComposer {
    /// Defines `identifier` with an empty value before composition starts.
    pub fn add_define_identifier(&mut self, identifier: impl Into<String>) {
        self.defines.insert(identifier.into(), String::new());
    }

    /// Defines `identifier` as `value` before composition starts.
    pub fn add_define(&mut self, identifier: impl Into<String>, value: impl Into<String>) {
        self.defines.insert(identifier.into(), value.into());
    }

    /// Composes `source`. `path` only names the source in errors.
    pub fn compose(&self, path: &str, source: &str) -> Result<String, ComposeError> {
        let mut output = String::with_capacity(source.len());
        let mut defines = self.defines.clone();
        let mut frames = DirectiveFrameStack::default();

        for (index, line) in source.lines().enumerate() {
            let error = |ty: ComposeErrorType| ComposeError {
                ty,
                path: path.to_owned(),
                line: index + 1,
            };

            let Some(directive) = Directive::parse(line) else {
                if frames.active() {
                    output.push_str(line);
                }
                output.push('\n');
                continue;
            };

            match directive {
                Directive::Ifdef(identifier) => {
                    frames.push(defines.contains_key(identifier));
                }
                Directive::Ifndef(identifier) => {
                    frames.push(!defines.contains_key(identifier));
                }
                Directive::If(expression) => {
                    // Expressions nested in a skipped block are never evaluated.
                    let taken = if frames.active() {
                        evaluate(expression, &defines).map_err(|e| error(e.into()))?
                    } else {
                        false
                    };
                    frames.push(taken);
                }
                Directive::Elif(expression) => {
                    let evaluate_branch = frames.pending().map_err(error)?;
                    let taken = if evaluate_branch {
                        evaluate(expression, &defines).map_err(|e| error(e.into()))?
                    } else {
                        false
                    };
                    frames.elif(taken).map_err(error)?;
                }
                Directive::Else => {
                    frames.branch_else().map_err(error)?;
                }
                Directive::Endif => {
                    frames.pop().map_err(error)?;
                }
                Directive::Define(identifier, value) if frames.active() => {
                    defines.insert(identifier.to_owned(), value.to_owned());
                }
                Directive::Undef(identifier) if frames.active() => {
                    defines.remove(identifier);
                }
                // Skipped groups still nest, whatever their operands.
                Directive::Malformed("#if" | "#ifdef" | "#ifndef") if !frames.active() => {
                    frames.push(false);
                }
                Directive::Malformed("#elif") => {
                    if frames.pending().map_err(error)? {
                        return Err(error(ComposeErrorType::MalformedDirective("#elif")));
                    }
                    frames.elif(false).map_err(error)?;
                }
                Directive::Malformed(name) if frames.active() => {
                    return Err(error(ComposeErrorType::MalformedDirective(name)));
                }
                _ => {}
            }

            output.push('\n');
        }

        if !frames.is_empty() {
            return Err(ComposeError {
                ty: ComposeErrorType::UnterminatedConditional,
                path: path.to_owned(),
                line: source.lines().count(),
            });
        }

        Ok(output)
    }
}

struct DirectiveFrame {
    /// Whether the enclosing block is active.
    parent_active: bool,

    /// Whether any branch of this frame was taken.
    taken_any: bool,

    /// Whether the current branch is active.
    active: bool,

    /// Whether the `#else` branch was reached.
    seen_else: bool,
}

#[derive(Default)]
struct DirectiveFrameStack {
    stack: Vec<DirectiveFrame>,
}

impl DirectiveFrameStack {
    /// Opens a frame whose first branch is `taken`.
    fn push(&mut self, taken: bool) {
        let parent_active = self.active();
        self.stack.push(DirectiveFrame {
            parent_active,
            taken_any: parent_active && taken,
            active: parent_active && taken,
            seen_else: false,
        });
    }

    fn current(&mut self, directive: &'static str) -> Result<&mut DirectiveFrame, ComposeErrorType> {
        self.stack
            .last_mut()
            .ok_or(ComposeErrorType::UnmatchedDirective(directive))
    }

    /// Whether the next `#elif` of the current frame could be taken.
    fn pending(&mut self) -> Result<bool, ComposeErrorType> {
        let frame = self.current("#elif")?;
        Ok(frame.parent_active && !frame.taken_any && !frame.seen_else)
    }

    fn elif(&mut self, taken: bool) -> Result<(), ComposeErrorType> {
        let frame = self.current("#elif")?;
        if frame.seen_else {
            return Err(ComposeErrorType::ElifAfterElse);
        }

        frame.active = frame.parent_active && !frame.taken_any && taken;
        frame.taken_any |= frame.active;
        Ok(())
    }

    fn branch_else(&mut self) -> Result<(), ComposeErrorType> {
        let frame = self.current("#else")?;
        if frame.seen_else {
            return Err(ComposeErrorType::DuplicateElse);
        }

        frame.seen_else = true;
        frame.active = frame.parent_active && !frame.taken_any;
        frame.taken_any = true;
        Ok(())
    }

    fn pop(&mut self) -> Result<(), ComposeErrorType> {
        self.stack
            .pop()
            .map(|_| ())
            .ok_or(ComposeErrorType::UnmatchedDirective("#endif"))
    }

    /// Whether lines at the current position are kept.
    fn active(&self) -> bool {
        self.stack.last().map(|frame| frame.active).unwrap_or(true)
    }

    fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compose(source: &str) -> Result<String, ComposeError> {
        ShaderComposer::default().compose("test.glsl", source)
    }

    fn kept(composed: &str) -> Vec<&str> {
        composed.lines().filter(|line| !line.is_empty()).collect()
    }

    #[test]
    fn test_plain_source_is_kept() {
        let source = "void main() {\n    gl_Position = vec4(0.0);\n}\n";
        assert_eq!(compose(source).unwrap(), source);
    }

    #[test]
    fn test_line_numbers_are_preserved() {
        let source = "#version 300 es\n#define A\n#ifdef A\nfloat a;\n#else\nfloat b;\n#endif\nfloat c;\n";
        let composed = compose(source).unwrap();
        assert_eq!(composed.lines().count(), source.lines().count());
        assert_eq!(composed.lines().nth(3), Some("float a;"));
        assert_eq!(composed.lines().nth(7), Some("float c;"));
    }

    #[test]
    fn test_ifdef_and_ifndef() {
        let mut composer = ShaderComposer::default();
        composer.add_define_identifier("DEBUG");

        let source = "#ifdef DEBUG\nfloat debug;\n#endif\n#ifndef DEBUG\nfloat release;\n#endif\n";
        let composed = composer.compose("test.glsl", source).unwrap();
        assert_eq!(kept(&composed), ["float debug;"]);
    }

    #[test]
    fn test_define_and_undef_in_source() {
        let source = "#define A\n#if defined(A)\nfloat a;\n#endif\n#undef A\n#if defined(A)\nfloat b;\n#endif\n";
        assert_eq!(kept(&compose(source).unwrap()), ["float a;"]);
    }

    #[test]
    fn test_define_in_skipped_block_is_ignored() {
        let source = "#ifdef MISSING\n#define A\n#endif\n#ifdef A\nfloat a;\n#endif\n";
        assert!(kept(&compose(source).unwrap()).is_empty());
    }

    #[test]
    fn test_elif_chain_takes_first_match() {
        let source = "#define B\n#define C\n#if defined(A)\nfloat a;\n#elif defined(B)\nfloat b;\n#elif defined(C)\nfloat c;\n#else\nfloat d;\n#endif\n";
        assert_eq!(kept(&compose(source).unwrap()), ["float b;"]);

        let source = "#if defined(A)\nfloat a;\n#elif defined(B)\nfloat b;\n#else\nfloat d;\n#endif\n";
        assert_eq!(kept(&compose(source).unwrap()), ["float d;"]);
    }

    #[test]
    fn test_nested_blocks() {
        let source = "#define OUTER\n#ifdef OUTER\n    #ifdef INNER\n    float inner;\n    #else\n    float fallback;\n    #endif\nfloat outer;\n#else\n    #ifndef INNER\n    float never;\n    #endif\n#endif\n";
        assert_eq!(kept(&compose(source).unwrap()), ["    float fallback;", "float outer;"]);
    }

    #[test]
    fn test_integer_conditions() {
        let source = "#define SPECULAR_AMBIENT_OCCLUSION 0\n#define MULTI_BOUNCE_AMBIENT_OCCLUSION 1\n#if SPECULAR_AMBIENT_OCCLUSION\nfloat specular;\n#endif\n#if MULTI_BOUNCE_AMBIENT_OCCLUSION\nfloat bounce;\n#endif\n";
        assert_eq!(kept(&compose(source).unwrap()), ["float bounce;"]);
    }

    #[test]
    fn test_skipped_expressions_are_not_evaluated() {
        let source = "#ifdef MISSING\n#if 1 +\n#endif\n#endif\n";
        assert!(compose(source).is_ok());
    }

    #[test]
    fn test_malformed_openers_in_skipped_blocks_still_nest() {
        let source = "#ifdef MISSING\n#if\n#endif\n#endif\nfloat a;\n";
        assert_eq!(kept(&compose(source).unwrap()), ["float a;"]);

        let source = "#if 0\n#ifdef\nfloat a;\n#else\nfloat b;\n#endif\n#ifndef 1x\n#endif\n#else\nfloat c;\n#endif\n";
        assert_eq!(kept(&compose(source).unwrap()), ["float c;"]);
    }

    #[test]
    fn test_malformed_elif() {
        let source = "#if 1\nfloat a;\n#elif\nfloat b;\n#endif\n";
        assert_eq!(kept(&compose(source).unwrap()), ["float a;"]);

        let error = compose("#if 0\n#elif\n#endif\n").unwrap_err();
        assert!(matches!(error.ty, ComposeErrorType::MalformedDirective("#elif")));
        assert_eq!(error.line, 2);

        let error = compose("#if 0\n#else\n#elif\n#endif\n").unwrap_err();
        assert!(matches!(error.ty, ComposeErrorType::ElifAfterElse));
    }

    #[test]
    fn test_unmatched_directives() {
        let error = compose("float a;\n#endif\n").unwrap_err();
        assert!(matches!(error.ty, ComposeErrorType::UnmatchedDirective("#endif")));
        assert_eq!(error.line, 2);

        let error = compose("#else\n").unwrap_err();
        assert!(matches!(error.ty, ComposeErrorType::UnmatchedDirective("#else")));

        let error = compose("#elif 1\n").unwrap_err();
        assert!(matches!(error.ty, ComposeErrorType::UnmatchedDirective("#elif")));
    }

    #[test]
    fn test_unterminated_conditional() {
        let error = compose("#ifdef DEBUG\nfloat debug;\n").unwrap_err();
        assert!(matches!(error.ty, ComposeErrorType::UnterminatedConditional));
        assert!(error.to_string().starts_with("compose error at test.glsl:2"));
    }

    #[test]
    fn test_else_ordering_errors() {
        let error = compose("#if 0\n#else\n#else\n#endif\n").unwrap_err();
        assert!(matches!(error.ty, ComposeErrorType::DuplicateElse));

        let error = compose("#if 0\n#else\n#elif 1\n#endif\n").unwrap_err();
        assert!(matches!(error.ty, ComposeErrorType::ElifAfterElse));
        assert_eq!(error.line, 3);
    }

    #[test]
    fn test_invalid_expression() {
        let error = compose("#if defined(\n#endif\n").unwrap_err();
        assert!(matches!(error.ty, ComposeErrorType::InvalidExpression(_)));

        let error = compose("#define\n").unwrap_err();
        assert!(matches!(error.ty, ComposeErrorType::MalformedDirective("#define")));
    }
}
