//! Tree-sitter front door for Java sources.

use tree_sitter::{Parser, Tree};

use crate::errors::ParseError;

/// A parsed file waiting to be lowered.
pub struct ParsedSource {
    pub path: String,
    pub text: String,
    pub tree: Tree,
}

/// Owns a tree-sitter parser configured for the Java grammar.
pub struct JavaParser {
    parser: Parser,
}

impl JavaParser {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_java::LANGUAGE.into())?;
        Ok(Self { parser })
    }

    /// Parses one source text. Syntax errors still produce a tree;
    /// only a wholly absent tree is an error.
    pub fn parse(
        &mut self,
        path: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<ParsedSource, ParseError> {
        let path = path.into();
        let text = text.into();
        let tree = self
            .parser
            .parse(&text, None)
            .ok_or_else(|| ParseError::NoTree { path: path.clone() })?;
        Ok(ParsedSource { path, text, tree })
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new().expect("Failed to create Java parser")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_class() {
        let mut parser = JavaParser::new().expect("parser");
        let parsed = parser
            .parse("A.java", "class A { void f() {} }")
            .expect("tree");
        assert_eq!(parsed.tree.root_node().kind(), "program");
        assert!(!parsed.tree.root_node().has_error());
    }

    #[test]
    fn broken_source_still_yields_a_tree() {
        let mut parser = JavaParser::new().expect("parser");
        let parsed = parser.parse("B.java", "class B { void f( {").expect("tree");
        assert!(parsed.tree.root_node().has_error());
    }
}
