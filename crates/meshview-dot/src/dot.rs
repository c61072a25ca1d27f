//! DOT format utilities for graph rendering.

use std::fmt::Write;

/// Escape special characters for quoted DOT strings.
pub fn escape_label(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Quote an arbitrary string as a DOT node id.
pub fn quote_id(input: &str) -> String {
    format!("\"{}\"", escape_label(input))
}

/// Write indentation to output.
pub fn write_indent(output: &mut String, level: usize) {
    for _ in 0..level {
        output.push_str("  ");
    }
}

fn write_attrs(output: &mut String, attrs: &[(&str, &str)]) {
    for (i, (key, value)) in attrs.iter().enumerate() {
        if i > 0 {
            output.push_str(", ");
        }
        let _ = write!(output, "{}=\"{}\"", key, escape_label(value));
    }
}

/// A DOT graph builder for constructing valid DOT output.
///
/// Node ids passed to [`DotBuilder::node`] and [`DotBuilder::edge`] are
/// quoted and escaped, so any text may be used as an id.
pub struct DotBuilder {
    output: String,
    indent: usize,
}

impl DotBuilder {
    /// Create a new digraph with the given name.
    pub fn new(name: &str) -> Self {
        let mut output = String::with_capacity(1024);
        let _ = writeln!(output, "digraph {name} {{");
        Self { output, indent: 1 }
    }

    /// Set default attributes for every edge.
    pub fn edge_defaults(&mut self, attrs: &[(&str, &str)]) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        self.output.push_str("edge [");
        write_attrs(&mut self.output, attrs);
        self.output.push_str("];\n");
        self
    }

    /// Add a blank line for readability.
    pub fn blank(&mut self) -> &mut Self {
        self.output.push('\n');
        self
    }

    /// Add a node with attributes.
    pub fn node(&mut self, id: &str, attrs: &[(&str, &str)]) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        self.output.push_str(&quote_id(id));
        self.output.push('[');
        write_attrs(&mut self.output, attrs);
        self.output.push_str("];\n");
        self
    }

    /// Add an edge.
    pub fn edge(&mut self, from: &str, to: &str) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = writeln!(self.output, "{} -> {};", quote_id(from), quote_id(to));
        self
    }

    /// Finish building and return the DOT string.
    pub fn build(mut self) -> String {
        self.output.push_str("}\n");
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_label() {
        assert_eq!(escape_label("a\"b"), "a\\\"b");
        assert_eq!(escape_label("two\nlines"), "two\\nlines");
        assert_eq!(escape_label("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_quote_id() {
        assert_eq!(quote_id("node-1"), "\"node-1\"");
        assert_eq!(quote_id("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_builder_output() {
        let mut dot = DotBuilder::new("g");
        dot.edge_defaults(&[("arrowhead", "none"), ("color", "gray")])
            .blank()
            .node("a", &[("label", "A\nB")])
            .edge("a", "b");

        assert_eq!(
            dot.build(),
            concat!(
                "digraph g {\n",
                "  edge [arrowhead=\"none\", color=\"gray\"];\n",
                "\n",
                "  \"a\"[label=\"A\\nB\"];\n",
                "  \"a\" -> \"b\";\n",
                "}\n",
            )
        );
    }
}
