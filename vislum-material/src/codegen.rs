use std::fmt;

/// Builds shader text line by line.
///
/// Every appended line is prefixed with the current indent. Another generator
/// can be grafted in with [`CodeGenerator::block`], which re-indents its lines
/// with this generator's indent without touching either indent state.
#[derive(Debug, Default, Clone)]
pub struct CodeGenerator {
    /// Appended entries. An entry may itself span several physical lines.
    lines: Vec<String>,

    /// The prefix applied to every new entry.
    indent: String,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line prefixed by the current indent.
    pub fn line(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        let mut entry = String::with_capacity(self.indent.len() + line.len());
        entry.push_str(&self.indent);
        entry.push_str(line);
        self.lines.push(entry);
    }

    /// Appends an empty line.
    #[inline]
    pub fn blank(&mut self) {
        self.line("");
    }

    /// Appends a formatted line, e.g. `cg.line_fmt(format_args!("#define {name}"))`.
    pub fn line_fmt(&mut self, args: fmt::Arguments<'_>) {
        match args.as_str() {
            Some(line) => self.line(line),
            None => self.line(fmt::format(args)),
        }
    }

    /// Moves the contents of `other` into this generator, re-indented with
    /// this generator's current indent.
    pub fn block(&mut self, other: CodeGenerator) {
        self.lines.reserve(other.lines.len());
        for line in other.lines {
            if self.indent.is_empty() {
                self.lines.push(line);
            } else {
                self.lines.push(format!("{}{}", self.indent, line));
            }
        }
    }

    /// Returns whether an entry equal to `line` was appended anywhere.
    pub fn exists_line(&self, line: &str) -> bool {
        self.lines.iter().any(|entry| entry == line)
    }

    /// Increases the indent by one tab.
    pub fn tab(&mut self) {
        self.indent.push('\t');
    }

    /// Decreases the indent by one tab. Does nothing at the outermost level.
    pub fn detab(&mut self) {
        self.indent.pop();
    }

    /// Number of newline characters the serialized text currently holds.
    pub fn line_count(&self) -> usize {
        self.lines
            .iter()
            .map(|entry| count_lines(entry) + 1)
            .sum()
    }

    /// Serializes the generator. Every entry is terminated by a newline.
    pub fn to_text(&self) -> String {
        let capacity = self.lines.iter().map(|entry| entry.len() + 1).sum();
        let mut text = String::with_capacity(capacity);
        for entry in &self.lines {
            text.push_str(entry);
            text.push('\n');
        }
        text
    }
}

impl fmt::Display for CodeGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.lines {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

/// Counts the newline characters in `text`.
pub(crate) fn count_lines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_newline_terminated() {
        let mut cg = CodeGenerator::new();
        cg.line("#version 300 es");
        cg.blank();
        cg.line_fmt(format_args!("#define {} {}", "LOCATION_UV0", 3));

        assert_eq!(cg.to_text(), "#version 300 es\n\n#define LOCATION_UV0 3\n");
        assert_eq!(cg.line_count(), 3);
    }

    #[test]
    fn test_indent_applies_to_new_lines() {
        let mut cg = CodeGenerator::new();
        cg.line("void main() {");
        cg.tab();
        cg.line("gl_Position = vec4(0.0);");
        cg.detab();
        cg.line("}");

        assert_eq!(cg.to_text(), "void main() {\n\tgl_Position = vec4(0.0);\n}\n");
    }

    #[test]
    fn test_detab_at_outermost_level() {
        let mut cg = CodeGenerator::new();
        cg.detab();
        cg.line("a");
        assert_eq!(cg.to_text(), "a\n");
    }

    #[test]
    fn test_block_reindents_child() {
        let mut child = CodeGenerator::new();
        child.line("x = 1;");
        child.tab();
        child.line("y = 2;");

        let mut parent = CodeGenerator::new();
        parent.line("{");
        parent.tab();
        parent.block(child);
        parent.detab();
        parent.line("}");

        assert_eq!(parent.to_text(), "{\n\tx = 1;\n\t\ty = 2;\n}\n");
    }

    #[test]
    fn test_block_does_not_leak_child_indent() {
        let mut child = CodeGenerator::new();
        child.tab();
        child.tab();
        child.line("inner");

        let mut parent = CodeGenerator::new();
        parent.block(child);
        parent.line("outer");

        assert_eq!(parent.to_text(), "\t\tinner\nouter\n");
    }

    #[test]
    fn test_exists_line() {
        let mut cg = CodeGenerator::new();
        cg.line("#define HAS_SKINNING");
        assert!(cg.exists_line("#define HAS_SKINNING"));
        assert!(!cg.exists_line("#define HAS_SHADOWING"));
    }

    #[test]
    fn test_multiline_entries_are_counted() {
        let mut cg = CodeGenerator::new();
        cg.line("#version 300 es\n");
        cg.line("a\nb\nc");
        assert_eq!(cg.line_count(), count_lines(&cg.to_text()));
        assert_eq!(cg.line_count(), 5);
    }
}
