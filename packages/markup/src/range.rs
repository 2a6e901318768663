//! # Range Operations
//!
//! Character-offset editing primitives over fragment trees.
//!
//! Offsets count Unicode scalar values of text content and ignore markup.
//! Elements without text (line breaks, images, rules) sit at a zero-width
//! position between two characters.
//!
//! ## Boundaries
//!
//! A range `start..end` is first pinned to the tree by splitting text nodes
//! at both offsets, then expressed as two [`Boundary`] points (a parent path
//! plus a child index). Boundaries are lifted out of elements they sit at the
//! very edge of, so that selecting all of `<b>cd</b>` yields boundaries
//! around the `<b>` rather than inside it.
//!
//! When both boundaries share a parent the range can be wrapped in place.
//! Otherwise the range overlaps element edges and must be extracted
//! (cloning the partially covered ancestors) before it can be wrapped.

use crate::ast::{Element, Node};
use crate::error::{MarkupError, MarkupResult};
use std::ops::Range;

/// Child indices from the fragment root down to a node
pub type NodePath = Vec<usize>;

/// A point between two children of the node at `parent`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    pub parent: NodePath,
    pub index: usize,
}

impl Boundary {
    fn before(path: &[usize]) -> Self {
        let (parent, index) = split_path(path);
        Self {
            parent: parent.to_vec(),
            index,
        }
    }

    fn after(path: &[usize]) -> Self {
        let (parent, index) = split_path(path);
        Self {
            parent: parent.to_vec(),
            index: index + 1,
        }
    }
}

#[derive(Debug, Clone)]
struct Leaf {
    path: NodePath,
    start: usize,
    len: usize,
    is_text: bool,
}

impl Leaf {
    fn end(&self) -> usize {
        self.start + self.len
    }

    fn is_nonempty_text(&self) -> bool {
        self.is_text && self.len > 0
    }
}

pub fn text_len(nodes: &[Node]) -> usize {
    nodes.iter().map(Node::text_len).sum()
}

/// Text content between two offsets
pub fn text_slice(nodes: &[Node], start: usize, end: usize) -> String {
    let text: String = nodes.iter().map(Node::text_content).collect();
    text.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}

pub fn node_at<'a>(nodes: &'a [Node], path: &[usize]) -> Option<&'a Node> {
    let (first, rest) = path.split_first()?;
    let mut current = nodes.get(*first)?;
    for &i in rest {
        current = current.children()?.get(i)?;
    }
    Some(current)
}

pub fn node_at_mut<'a>(nodes: &'a mut [Node], path: &[usize]) -> Option<&'a mut Node> {
    let (first, rest) = path.split_first()?;
    let mut current = nodes.get_mut(*first)?;
    for &i in rest {
        current = current.children_mut()?.get_mut(i)?;
    }
    Some(current)
}

/// Children of the node at `parent` (the root list for an empty path)
pub fn children_at_mut<'a>(nodes: &'a mut Vec<Node>, parent: &[usize]) -> Option<&'a mut Vec<Node>> {
    let mut current = nodes;
    for &i in parent {
        current = current.get_mut(i)?.children_mut()?;
    }
    Some(current)
}

fn children_len(nodes: &[Node], parent: &[usize]) -> usize {
    if parent.is_empty() {
        return nodes.len();
    }
    node_at(nodes, parent)
        .and_then(Node::children)
        .map(Vec::len)
        .unwrap_or(0)
}

fn split_path(path: &[usize]) -> (&[usize], usize) {
    match path.split_last() {
        Some((last, parent)) => (parent, *last),
        None => (&[], 0),
    }
}

fn leaves(nodes: &[Node]) -> Vec<Leaf> {
    let mut out = Vec::new();
    let mut offset = 0;
    collect_leaves(nodes, &mut Vec::new(), &mut offset, &mut out);
    out
}

fn collect_leaves(nodes: &[Node], path: &mut NodePath, offset: &mut usize, out: &mut Vec<Leaf>) {
    for (i, node) in nodes.iter().enumerate() {
        path.push(i);
        match node {
            Node::Text { content } => {
                let len = content.chars().count();
                out.push(Leaf {
                    path: path.clone(),
                    start: *offset,
                    len,
                    is_text: true,
                });
                *offset += len;
            }
            Node::Element(el) => {
                if node.text_len() == 0 {
                    out.push(Leaf {
                        path: path.clone(),
                        start: *offset,
                        len: 0,
                        is_text: false,
                    });
                } else {
                    collect_leaves(&el.children, path, offset, out);
                }
            }
        }
        path.pop();
    }
}

/// Text leaf holding `offset`, preferring the end of the earlier leaf
fn caret_leaf(nodes: &[Node], offset: usize) -> Option<Leaf> {
    leaves(nodes)
        .into_iter()
        .find(|l| l.is_text && l.start <= offset && offset <= l.end())
}

fn split_chars(text: &str, at: usize) -> (String, String) {
    let byte = text
        .char_indices()
        .nth(at)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    (text[..byte].to_string(), text[byte..].to_string())
}

fn check_range(nodes: &[Node], start: usize, end: usize) -> MarkupResult<()> {
    let len = text_len(nodes);
    if end > len {
        return Err(MarkupError::out_of_bounds(end, len));
    }
    if start >= end {
        return Err(MarkupError::EmptyRange { start, end });
    }
    Ok(())
}

/// Ensure a text-node boundary exists at `offset`
pub fn split_at(nodes: &mut Vec<Node>, offset: usize) -> MarkupResult<()> {
    let len = text_len(nodes);
    if offset > len {
        return Err(MarkupError::out_of_bounds(offset, len));
    }

    let Some(leaf) = leaves(nodes)
        .into_iter()
        .find(|l| l.is_text && l.start < offset && offset < l.end())
    else {
        return Ok(());
    };

    let (parent, index) = split_path(&leaf.path);
    let siblings =
        children_at_mut(nodes, parent).ok_or_else(|| MarkupError::InvalidPath(leaf.path.clone()))?;
    if let Some(Node::Text { content }) = siblings.get_mut(index) {
        let (head, tail) = split_chars(content, offset - leaf.start);
        *content = head;
        siblings.insert(index + 1, Node::text(tail));
    }
    Ok(())
}

fn start_boundary(nodes: &[Node], offset: usize) -> Boundary {
    let leaves = leaves(nodes);
    if let Some(leaf) = leaves
        .iter()
        .find(|l| l.is_nonempty_text() && l.start == offset)
    {
        return Boundary::before(&leaf.path);
    }
    if let Some(leaf) = leaves
        .iter()
        .rev()
        .find(|l| l.is_nonempty_text() && l.end() == offset)
    {
        return Boundary::after(&leaf.path);
    }
    Boundary {
        parent: Vec::new(),
        index: if offset == 0 { 0 } else { nodes.len() },
    }
}

fn end_boundary(nodes: &[Node], offset: usize) -> Boundary {
    let leaves = leaves(nodes);
    if let Some(leaf) = leaves
        .iter()
        .rev()
        .find(|l| l.is_nonempty_text() && l.end() == offset)
    {
        return Boundary::after(&leaf.path);
    }
    if let Some(leaf) = leaves
        .iter()
        .find(|l| l.is_nonempty_text() && l.start == offset)
    {
        return Boundary::before(&leaf.path);
    }
    Boundary {
        parent: Vec::new(),
        index: if offset == 0 { 0 } else { nodes.len() },
    }
}

fn common_prefix_len(a: &[usize], b: &[usize]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Lift boundaries sitting at the edge of their parent until they share one
fn lift(nodes: &[Node], mut start: Boundary, mut end: Boundary) -> (Boundary, Boundary) {
    while start.parent != end.parent {
        let common = common_prefix_len(&start.parent, &end.parent);
        if start.parent.len() > common && start.index == 0 {
            if let Some(index) = start.parent.pop() {
                start.index = index;
            }
            continue;
        }
        if end.parent.len() > common && end.index == children_len(nodes, &end.parent) {
            if let Some(index) = end.parent.pop() {
                end.index = index + 1;
            }
            continue;
        }
        break;
    }
    (start, end)
}

/// Split text at both ends of the range and return its lifted boundaries
pub fn range_boundaries(
    nodes: &mut Vec<Node>,
    start: usize,
    end: usize,
) -> MarkupResult<(Boundary, Boundary)> {
    check_range(nodes, start, end)?;
    split_at(nodes, end)?;
    split_at(nodes, start)?;
    let sb = start_boundary(nodes, start);
    let eb = end_boundary(nodes, end);
    Ok(lift(nodes, sb, eb))
}

/// Wrap the range in `wrapper` without restructuring.
///
/// Fails with [`MarkupError::Unwrappable`] when the range overlaps element
/// edges. Text nodes may already be split when that happens, which leaves
/// the serialized markup unchanged.
pub fn wrap_range(
    nodes: &mut Vec<Node>,
    start: usize,
    end: usize,
    mut wrapper: Element,
) -> MarkupResult<()> {
    let (sb, eb) = range_boundaries(nodes, start, end)?;
    if sb.parent != eb.parent || sb.index > eb.index {
        return Err(MarkupError::Unwrappable { start, end });
    }

    let siblings =
        children_at_mut(nodes, &sb.parent).ok_or_else(|| MarkupError::InvalidPath(sb.parent.clone()))?;
    wrapper.children = siblings.drain(sb.index..eb.index).collect();
    siblings.insert(sb.index, Node::Element(wrapper));
    Ok(())
}

/// Extract the range (cloning partially covered ancestors), wrap it and
/// reinsert it where the range began.
pub fn extract_and_wrap(
    nodes: &mut Vec<Node>,
    start: usize,
    end: usize,
    mut wrapper: Element,
) -> MarkupResult<()> {
    let (sb, eb) = range_boundaries(nodes, start, end)?;
    let (common, insert_at, extracted) = extract(nodes, &sb, &eb)?;
    wrapper.children = extracted;

    let siblings =
        children_at_mut(nodes, &common).ok_or_else(|| MarkupError::InvalidPath(common.clone()))?;
    let insert_at = insert_at.min(siblings.len());
    siblings.insert(insert_at, Node::Element(wrapper));
    Ok(())
}

/// Remove the range, returning the removed text
pub fn delete_range(nodes: &mut Vec<Node>, start: usize, end: usize) -> MarkupResult<String> {
    let removed = text_slice(nodes, start, end);
    let (sb, eb) = range_boundaries(nodes, start, end)?;
    extract(nodes, &sb, &eb)?;
    Ok(removed)
}

/// Detach everything between two boundaries.
///
/// Returns the common ancestor path, the index in it where the range began
/// after extraction, and the extracted nodes.
fn extract(
    nodes: &mut Vec<Node>,
    sb: &Boundary,
    eb: &Boundary,
) -> MarkupResult<(NodePath, usize, Vec<Node>)> {
    let c = common_prefix_len(&sb.parent, &eb.parent);
    let common: NodePath = sb.parent[..c].to_vec();
    let children =
        children_at_mut(nodes, &common).ok_or_else(|| MarkupError::InvalidPath(common.clone()))?;

    // End side first so start-side indices stay valid
    let mut tail = Vec::new();
    let middle_end = if eb.parent.len() == c {
        eb.index
    } else {
        let b = eb.parent[c];
        if let Some(Node::Element(el)) = children.get_mut(b) {
            let inner = take_left(&mut el.children, &eb.parent[c + 1..], eb.index);
            if !inner.is_empty() {
                tail.push(Node::Element(el.shell().with_children(inner)));
            }
        }
        b
    };

    let mut head = Vec::new();
    let (middle_start, insert_at) = if sb.parent.len() == c {
        (sb.index, sb.index)
    } else {
        let a = sb.parent[c];
        if let Some(Node::Element(el)) = children.get_mut(a) {
            let inner = take_right(&mut el.children, &sb.parent[c + 1..], sb.index);
            if !inner.is_empty() {
                head.push(Node::Element(el.shell().with_children(inner)));
            }
        }
        (a + 1, a + 1)
    };

    let middle_end = middle_end.min(children.len()).max(middle_start.min(children.len()));
    let middle_start = middle_start.min(middle_end);
    let middle: Vec<Node> = children.drain(middle_start..middle_end).collect();

    let mut extracted = head;
    extracted.extend(middle);
    extracted.extend(tail);
    Ok((common, insert_at, extracted))
}

/// Remove and return everything right of a boundary below `children`
fn take_right(children: &mut Vec<Node>, rel: &[usize], index: usize) -> Vec<Node> {
    match rel.split_first() {
        None => children.split_off(index.min(children.len())),
        Some((&first, rest)) => {
            let mut out = Vec::new();
            if let Some(Node::Element(el)) = children.get_mut(first) {
                let inner = take_right(&mut el.children, rest, index);
                if !inner.is_empty() {
                    out.push(Node::Element(el.shell().with_children(inner)));
                }
            }
            if first + 1 <= children.len() {
                out.extend(children.split_off(first + 1));
            }
            out
        }
    }
}

/// Remove and return everything left of a boundary below `children`
fn take_left(children: &mut Vec<Node>, rel: &[usize], index: usize) -> Vec<Node> {
    match rel.split_first() {
        None => children.drain(..index.min(children.len())).collect(),
        Some((&first, rest)) => {
            let first = first.min(children.len());
            let mut out: Vec<Node> = children.drain(..first).collect();
            if let Some(Node::Element(el)) = children.get_mut(0) {
                let inner = take_left(&mut el.children, rest, index);
                if !inner.is_empty() {
                    out.push(Node::Element(el.shell().with_children(inner)));
                }
            }
            out
        }
    }
}

/// Wrap each text node inside the range individually.
///
/// Offsets are clamped to the content; a collapsed range wraps the text
/// node at the caret. Returns the number of text nodes wrapped.
pub fn wrap_text_leaves(nodes: &mut Vec<Node>, start: usize, end: usize, wrapper: &Element) -> usize {
    let len = text_len(nodes);
    let start = start.min(len);
    let end = end.min(len);

    let targets: Vec<NodePath> = if start < end {
        if split_at(nodes, end).is_err() || split_at(nodes, start).is_err() {
            return 0;
        }
        leaves(nodes)
            .into_iter()
            .filter(|l| l.is_nonempty_text() && l.start >= start && l.end() <= end)
            .map(|l| l.path)
            .collect()
    } else {
        caret_leaf(nodes, start).map(|l| l.path).into_iter().collect()
    };

    let mut wrapped = 0;
    for path in &targets {
        if let Some(node) = node_at_mut(nodes, path) {
            let inner = std::mem::replace(node, Node::text(""));
            *node = Node::Element(wrapper.clone().with_children(vec![inner]));
            wrapped += 1;
        }
    }
    wrapped
}

/// Nearest block element strictly above the node at `path`
fn block_ancestor(nodes: &[Node], path: &[usize]) -> Option<NodePath> {
    (1..path.len())
        .rev()
        .map(|len| &path[..len])
        .find(|prefix| matches!(node_at(nodes, prefix), Some(Node::Element(el)) if el.is_block()))
        .map(<[usize]>::to_vec)
}

/// Split a range into one sub-range per block it touches.
///
/// Consecutive text under the same nearest block ancestor (or under none)
/// forms one run. Offsets are clamped to the text the range covers.
pub fn block_ranges(nodes: &[Node], start: usize, end: usize) -> Vec<Range<usize>> {
    let mut runs: Vec<(Option<NodePath>, Range<usize>)> = Vec::new();
    for leaf in leaves(nodes)
        .into_iter()
        .filter(|l| l.is_nonempty_text() && l.start < end && l.end() > start)
    {
        let block = block_ancestor(nodes, &leaf.path);
        let covered = leaf.start.max(start)..leaf.end().min(end);
        match runs.last_mut() {
            Some((last, run)) if *last == block => run.end = covered.end,
            _ => runs.push((block, covered)),
        }
    }
    runs.into_iter().map(|(_, run)| run).collect()
}

/// Paths of elements whose content is exactly the range, innermost first
pub fn covering_elements(nodes: &mut Vec<Node>, start: usize, end: usize) -> MarkupResult<Vec<NodePath>> {
    let (mut sb, mut eb) = range_boundaries(nodes, start, end)?;
    let mut covering = Vec::new();

    loop {
        if sb.parent != eb.parent {
            break;
        }
        if eb.index == sb.index + 1 {
            let mut path = sb.parent.clone();
            path.push(sb.index);
            if matches!(node_at(nodes, &path), Some(Node::Element(_))) {
                covering.push(path);
            }
        }
        let parent_len = children_len(nodes, &sb.parent);
        if sb.parent.is_empty() || sb.index != 0 || eb.index != parent_len {
            break;
        }
        if let (Some(i), Some(_)) = (sb.parent.pop(), eb.parent.pop()) {
            sb.index = i;
            eb.index = i + 1;
        }
    }

    Ok(covering)
}

/// Replace the element at `path` with its children
pub fn unwrap_element(nodes: &mut Vec<Node>, path: &[usize]) -> MarkupResult<()> {
    let (parent, index) = split_path(path);
    let siblings =
        children_at_mut(nodes, parent).ok_or_else(|| MarkupError::InvalidPath(path.to_vec()))?;
    match siblings.get(index) {
        Some(Node::Element(_)) => {}
        _ => return Err(MarkupError::InvalidPath(path.to_vec())),
    }
    if let Node::Element(el) = siblings.remove(index) {
        let children = el.children;
        siblings.splice(index..index, children);
    }
    Ok(())
}

/// Insert nodes at a caret offset
pub fn insert_nodes(nodes: &mut Vec<Node>, offset: usize, new_nodes: Vec<Node>) -> MarkupResult<()> {
    let len = text_len(nodes);
    if offset > len {
        return Err(MarkupError::out_of_bounds(offset, len));
    }

    let boundary = match caret_leaf(nodes, offset) {
        Some(leaf) => {
            split_at(nodes, offset)?;
            if offset == leaf.start && leaf.len > 0 {
                Boundary::before(&leaf.path)
            } else {
                Boundary::after(&leaf.path)
            }
        }
        None => empty_insertion_point(nodes),
    };

    let siblings = children_at_mut(nodes, &boundary.parent)
        .ok_or_else(|| MarkupError::InvalidPath(boundary.parent.clone()))?;
    let index = boundary.index.min(siblings.len());
    siblings.splice(index..index, new_nodes);
    Ok(())
}

/// Where content goes in a fragment with no text: the end of the deepest
/// trailing container, replacing a lone `<br>` placeholder.
fn empty_insertion_point(nodes: &mut Vec<Node>) -> Boundary {
    let mut path = Vec::new();
    let mut current: &[Node] = nodes;
    while let Some(Node::Element(el)) = current.last() {
        if el.is_void() {
            break;
        }
        path.push(current.len() - 1);
        current = &el.children;
    }

    if let Some(children) = children_at_mut(nodes, &path) {
        if children.len() == 1 && matches!(&children[0], Node::Element(el) if el.tag == "br") {
            children.clear();
        }
        let index = children.len();
        return Boundary {
            parent: path,
            index,
        };
    }
    Boundary {
        parent: Vec::new(),
        index: nodes.len(),
    }
}

/// Insert plain text at a caret offset, returning the caret after it
pub fn insert_text(nodes: &mut Vec<Node>, offset: usize, text: &str) -> MarkupResult<usize> {
    let len = text_len(nodes);
    if offset > len {
        return Err(MarkupError::out_of_bounds(offset, len));
    }

    match caret_leaf(nodes, offset) {
        Some(leaf) => {
            if let Some(Node::Text { content }) = node_at_mut(nodes, &leaf.path) {
                let (head, tail) = split_chars(content, offset - leaf.start);
                *content = format!("{}{}{}", head, text, tail);
            }
        }
        None => insert_nodes(nodes, offset, vec![Node::text(text)])?,
    }
    Ok(offset + text.chars().count())
}

/// Paths of text nodes touched by the range; a collapsed range yields the
/// text node at the caret.
pub fn text_leaf_paths(nodes: &[Node], start: usize, end: usize) -> Vec<NodePath> {
    if start >= end {
        return caret_leaf(nodes, start).map(|l| l.path).into_iter().collect();
    }
    leaves(nodes)
        .into_iter()
        .filter(|l| l.is_nonempty_text() && l.start < end && l.end() > start)
        .map(|l| l.path)
        .collect()
}

/// Merge adjacent text, drop empty text and prune emptied inline wrappers.
///
/// With `strip_zero_width`, caret anchors are removed first.
pub fn normalize(nodes: &mut Vec<Node>, strip_zero_width: bool) {
    let old = std::mem::take(nodes);
    for mut node in old {
        match &mut node {
            Node::Text { content } => {
                if strip_zero_width {
                    content.retain(|c| c != crate::ast::ZERO_WIDTH_SPACE);
                }
                if content.is_empty() {
                    continue;
                }
                if let Some(Node::Text { content: prev }) = nodes.last_mut() {
                    prev.push_str(content);
                    continue;
                }
            }
            Node::Element(el) => {
                normalize(&mut el.children, strip_zero_width);
                if el.children.is_empty() && el.is_inline_formatting() {
                    continue;
                }
            }
        }
        nodes.push(node);
    }
}
