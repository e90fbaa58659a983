use crate::span::Span;
use tree_sitter::Node;

/// Read-only view of a parsed syntax node: byte range plus ordered children.
pub trait SyntaxNode: Clone {
    fn start_byte(&self) -> usize;

    fn end_byte(&self) -> usize;

    /// Direct children in document order
    fn children(&self) -> Vec<Self>;

    fn byte_span(&self) -> Span {
        Span::new(self.start_byte(), self.end_byte())
    }
}

impl SyntaxNode for Node<'_> {
    fn start_byte(&self) -> usize {
        Node::start_byte(self)
    }

    fn end_byte(&self) -> usize {
        Node::end_byte(self)
    }

    fn children(&self) -> Vec<Self> {
        let mut cursor = self.walk();
        Node::children(self, &mut cursor).collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    #[test]
    fn test_tree_sitter_node_children_in_document_order() {
        let code = "fn a() {}\nfn b() {}\n";
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(code, None).unwrap();
        let root = tree.root_node();

        let children = SyntaxNode::children(&root);
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].byte_span(), Span::new(0, 9));
        assert_eq!(children[1].byte_span(), Span::new(10, 19));
        assert!(SyntaxNode::end_byte(&root) >= 19);
    }
}
