//! XML utility functions for navigating and extracting data from DOM trees.

use roxmltree::{Document, Node};

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use simba_collector::xml::get_tag_name;
///
/// let xml = r#"<dwr:SimpleDarwinRecordSet xmlns:dwr="urn:x"><dwc:locality xmlns:dwc="urn:y"/></dwr:SimpleDarwinRecordSet>"#;
/// let doc = Document::parse(xml).unwrap();
/// let child = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(child), "locality");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Get the direct text content of a node, untouched, or an empty string.
pub fn get_raw_text(node: Node<'_, '_>) -> String {
    node.text().map(str::to_string).unwrap_or_default()
}

/// Get all element children of a node, skipping text and comments.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Find all elements with the given namespace and local name, in document order.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use simba_collector::xml::find_namespaced;
///
/// let xml = r#"<root xmlns:a="urn:a"><a:item/><item/><a:item/></root>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(find_namespaced(&doc, "urn:a", "item").count(), 2);
/// ```
pub fn find_namespaced<'a, 'input>(
    doc: &'a Document<'input>,
    namespace: &'a str,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    doc.descendants()
        .filter(move |n| n.is_element() && n.has_tag_name((namespace, name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_tag_name() {
        let xml = r#"<root><child/></root>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_tag_name(doc.root_element()), "root");
    }

    #[test]
    fn test_get_tag_name_with_namespace() {
        let xml = r#"<ns:root xmlns:ns="http://example.com"><ns:child/></ns:root>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_tag_name(doc.root_element()), "root");
    }

    #[test]
    fn test_get_raw_text() {
        let xml = r#"<root><a>  spaced  </a><b/></root>"#;
        let doc = Document::parse(xml).unwrap();
        let mut children = element_children(doc.root_element());

        assert_eq!(get_raw_text(children.next().unwrap()), "  spaced  ");
        assert_eq!(get_raw_text(children.next().unwrap()), "");
    }

    #[test]
    fn test_element_children() {
        let xml = r#"<root>text<child1/><!-- note -->more<child2/></root>"#;
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element();

        let children: Vec<_> = element_children(root).map(get_tag_name).collect();
        assert_eq!(children, vec!["child1", "child2"]);
    }

    #[test]
    fn test_find_namespaced_ignores_other_namespaces() {
        let xml = r#"<root xmlns:a="urn:a" xmlns:b="urn:b">
            <a:rec/><b:rec/><rec/><wrap><a:rec/></wrap>
        </root>"#;
        let doc = Document::parse(xml).unwrap();

        assert_eq!(find_namespaced(&doc, "urn:a", "rec").count(), 2);
        assert_eq!(find_namespaced(&doc, "urn:b", "rec").count(), 1);
        assert_eq!(find_namespaced(&doc, "urn:c", "rec").count(), 0);
    }
}
