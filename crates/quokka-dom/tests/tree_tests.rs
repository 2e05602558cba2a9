//! Tree construction and mutation tests.

use quokka_dom::{ElementData, NodeData, NodeId, NodeKind, Tree};

fn element(tree: &mut Tree, tag: &str) -> NodeId {
    tree.alloc(NodeData::Element(ElementData::new(tag)))
}

fn text(tree: &mut Tree, content: &str) -> NodeId {
    tree.alloc(NodeData::Text {
        content: content.to_string(),
        raw: false,
    })
}

#[test]
fn append_maintains_sibling_links() {
    let mut tree = Tree::new_fragment();
    let a = element(&mut tree, "a");
    let b = element(&mut tree, "b");
    let c = element(&mut tree, "c");
    tree.append_child(tree.root(), a);
    tree.append_child(tree.root(), b);
    tree.append_child(tree.root(), c);

    assert_eq!(tree.children(tree.root()), &[a, b, c]);
    assert_eq!(tree.prev_sibling(a), None);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(b), Some(a));
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.next_sibling(c), None);
    assert_eq!(tree.parent(b), Some(tree.root()));
}

#[test]
fn prepend_becomes_first_child() {
    let mut tree = Tree::new_fragment();
    let a = element(&mut tree, "a");
    let b = element(&mut tree, "b");
    tree.append_child(tree.root(), a);
    tree.prepend_child(tree.root(), b);

    assert_eq!(tree.children(tree.root()), &[b, a]);
    assert_eq!(tree.next_sibling(b), Some(a));
    assert_eq!(tree.prev_sibling(a), Some(b));
}

#[test]
fn insert_before_and_after_reference() {
    let mut tree = Tree::new_fragment();
    let a = element(&mut tree, "a");
    let c = element(&mut tree, "c");
    tree.append_child(tree.root(), a);
    tree.append_child(tree.root(), c);

    let b = element(&mut tree, "b");
    tree.insert_before(tree.root(), b, c);
    assert_eq!(tree.children(tree.root()), &[a, b, c]);

    let d = element(&mut tree, "d");
    tree.insert_after(tree.root(), d, c);
    assert_eq!(tree.children(tree.root()), &[a, b, c, d]);
    assert_eq!(tree.prev_sibling(d), Some(c));
    assert_eq!(tree.next_sibling(c), Some(d));
}

#[test]
fn detach_clears_relationships_but_keeps_children() {
    let mut tree = Tree::new_fragment();
    let div = element(&mut tree, "div");
    let span = element(&mut tree, "span");
    tree.append_child(tree.root(), div);
    tree.append_child(div, span);

    tree.detach(div);
    assert!(tree.children(tree.root()).is_empty());
    assert_eq!(tree.parent(div), None);
    assert_eq!(tree.children(div), &[span]);
    assert_eq!(tree.parent(span), Some(div));
}

#[test]
fn remove_middle_child_relinks_siblings() {
    let mut tree = Tree::new_fragment();
    let a = element(&mut tree, "a");
    let b = element(&mut tree, "b");
    let c = element(&mut tree, "c");
    tree.append_child(tree.root(), a);
    tree.append_child(tree.root(), b);
    tree.append_child(tree.root(), c);

    tree.remove_child(tree.root(), b);
    assert_eq!(tree.children(tree.root()), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
}

#[test]
fn insert_text_coalesces_adjacent_runs() {
    let mut tree = Tree::new_fragment();
    tree.insert_text(tree.root(), "Hello");
    tree.insert_text(tree.root(), " World");

    let children = tree.children(tree.root());
    assert_eq!(children.len(), 1);
    assert_eq!(tree.as_text(children[0]), Some("Hello World"));
}

#[test]
fn insert_text_skips_empty_and_respects_element_boundary() {
    let mut tree = Tree::new_fragment();
    tree.insert_text(tree.root(), "");
    assert!(tree.children(tree.root()).is_empty());

    tree.insert_text(tree.root(), "a");
    let br = element(&mut tree, "br");
    tree.append_child(tree.root(), br);
    tree.insert_text(tree.root(), "b");
    assert_eq!(tree.children(tree.root()).len(), 3);
}

#[test]
fn move_children_preserves_order_and_links() {
    let mut tree = Tree::new_fragment();
    let from = element(&mut tree, "ul");
    let to = element(&mut tree, "ol");
    let li1 = element(&mut tree, "li");
    let li2 = element(&mut tree, "li");
    let existing = element(&mut tree, "li");
    tree.append_child(from, li1);
    tree.append_child(from, li2);
    tree.append_child(to, existing);

    tree.move_children(from, to);
    assert!(tree.children(from).is_empty());
    assert_eq!(tree.children(to), &[existing, li1, li2]);
    assert_eq!(tree.next_sibling(existing), Some(li1));
    assert_eq!(tree.prev_sibling(li1), Some(existing));
    assert_eq!(tree.parent(li2), Some(to));
}

#[test]
fn clone_subtree_is_deep_and_detached() {
    let mut tree = Tree::new_fragment();
    let div = element(&mut tree, "div");
    let p = element(&mut tree, "p");
    tree.append_child(tree.root(), div);
    tree.append_child(div, p);
    tree.insert_text(p, "copy me");

    let copy = tree.clone_subtree(div);
    assert_ne!(copy, div);
    assert_eq!(tree.parent(copy), None);
    let copied_p = tree.children(copy)[0];
    assert_eq!(tree.as_element(copied_p).map(|e| e.tag_name.as_str()), Some("p"));
    assert_eq!(tree.as_text(tree.children(copied_p)[0]), Some("copy me"));

    // Mutating the copy leaves the original alone.
    tree.detach(copied_p);
    assert_eq!(tree.children(div), &[p]);
}

#[test]
fn import_subtree_copies_across_arenas() {
    let mut src = Tree::new_fragment();
    let b = element(&mut src, "b");
    src.append_child(src.root(), b);
    src.insert_text(b, "bold");

    let mut dst = Tree::new_document();
    let copy = dst.import_subtree(&src, b);
    dst.append_child(dst.root(), copy);

    assert_eq!(dst.as_element(copy).map(|e| e.tag_name.as_str()), Some("b"));
    assert_eq!(dst.as_text(dst.children(copy)[0]), Some("bold"));
}

#[test]
fn ancestors_walk_to_root() {
    let mut tree = Tree::new_document();
    let html = element(&mut tree, "html");
    let body = element(&mut tree, "body");
    let p = element(&mut tree, "p");
    tree.append_child(tree.root(), html);
    tree.append_child(html, body);
    tree.append_child(body, p);

    let chain: Vec<NodeId> = tree.ancestors(p).collect();
    assert_eq!(chain, vec![body, html, tree.root()]);
}

#[test]
fn descendants_are_pre_order() {
    let mut tree = Tree::new_fragment();
    let div = element(&mut tree, "div");
    let p = element(&mut tree, "p");
    let t = text(&mut tree, "x");
    let span = element(&mut tree, "span");
    tree.append_child(tree.root(), div);
    tree.append_child(div, p);
    tree.append_child(p, t);
    tree.append_child(div, span);

    let order: Vec<NodeId> = tree.descendants(tree.root()).collect();
    assert_eq!(order, vec![div, p, t, span]);
}

#[test]
fn node_kind_display_strings() {
    assert_eq!(NodeKind::Document.to_string(), "#document");
    assert_eq!(NodeKind::Element.to_string(), "#element");
    assert_eq!(NodeKind::Text.to_string(), "#text");
    assert_eq!(NodeKind::ProcessingInstruction.to_string(), "#pi");
}

#[test]
fn attributes_keep_insertion_order_on_replace() {
    let mut tree = Tree::new_fragment();
    let input = element(&mut tree, "input");
    let el = tree.as_element_mut(input).unwrap();
    assert_eq!(el.attrs.set("type", "text"), None);
    assert_eq!(el.attrs.set("name", "user"), None);
    assert_eq!(el.attrs.set("type", "email"), Some("text".to_string()));

    let keys: Vec<&str> = el.attrs.keys().collect();
    assert_eq!(keys, vec!["type", "name"]);
    assert_eq!(el.attrs.get("type"), Some("email"));
    assert_eq!(el.attrs.remove("name"), Some("user".to_string()));
    assert!(!el.attrs.contains("name"));
}
