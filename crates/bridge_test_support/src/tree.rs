//! Indented text dump of a [`MemorySurface`], one node per line.

use dom::{HostSurface, MemorySurface, NodeKey};

pub fn format_tree(surface: &MemorySurface) -> Vec<String> {
    let mut out = Vec::new();
    for &root in surface.roots() {
        push_node(surface, root, 0, &mut out);
    }
    out
}

fn push_node(surface: &MemorySurface, node: NodeKey, depth: usize, out: &mut Vec<String>) {
    let mut line = "  ".repeat(depth);
    line.push_str(&surface.tag_name(node).unwrap_or_default());
    for (name, value) in surface.attributes(node) {
        line.push_str(&format!(" {name}=\"{}\"", escape_text(&value)));
    }
    if let Some(value) = surface.value(node) {
        line.push_str(&format!(" value=\"{}\"", escape_text(&value)));
    }
    if let Some(size) = surface.size(node) {
        line.push_str(&format!(" size={size}"));
    }
    out.push(line);
    for child in surface.children(node) {
        push_node(surface, child, depth + 1, out);
    }
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_nodes_indent() {
        let mut surface = MemorySurface::new();
        let root = surface.create_element("div");
        let input = surface.create_element("input");
        surface.append_root(root);
        surface.append_child(root, input);
        surface.set_attribute(root, "title", "a \"b\"");
        surface.set_value(input, "hi");
        assert_eq!(
            format_tree(&surface),
            vec![
                "div title=\"a \\\"b\\\"\"".to_string(),
                "  input value=\"hi\" size=20".to_string(),
            ]
        );
    }
}
