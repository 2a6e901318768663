//! # Formatting Command Executor
//!
//! Applies a [`FormatCommand`] to a surface's current selection, writes the
//! result back, reasserts focus and hands the new markup to the controller.
//!
//! Inline styles go through a fallback chain that never fails outward:
//!
//! 1. wrap the range in place when it sits under a single parent
//! 2. otherwise extract the range (cloning partially covered elements),
//!    wrap it and reinsert it
//! 3. if that fails too (stale or out-of-range selection), wrap each text
//!    node in the range individually; font sizes use a `<font size>` step
//!
//! A range spanning several blocks runs the chain once per block, so
//! paragraphs are never split or nested inside an inline wrapper.
//!
//! A collapsed selection gets a styled span holding a zero-width space with
//! the caret placed inside it, so the next typed character inherits the
//! style.

use crate::commands::{Alignment, FormatCommand, ListKind, TableSpec};
use crate::controller::SurfaceController;
use crate::selection::Selection;
use crate::surface::EditableSurface;
use lettercraft_markup::range::{self, NodePath};
use lettercraft_markup::{parse, serialize_nodes, Element, MarkupError, Node, ZERO_WIDTH_SPACE};
use std::ops::{Range, RangeInclusive};
use tracing::{debug, warn};

/// How a command was carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Wrapped,
    Extracted,
    Coarse,
    CaretAnchor,
    Toggled,
    /// Each block in the selection was wrapped separately
    PerBlock,
    Blocks,
    Inserted,
    NoOp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub strategy: Strategy,
    /// Selection after the command
    pub selection: Selection,
    /// New authoritative markup, if the content changed
    pub markup: Option<String>,
}

/// Execute a command against the controller's surface
pub fn execute<S: EditableSurface>(
    controller: &mut SurfaceController<S>,
    command: &FormatCommand,
) -> CommandOutcome {
    let (strategy, selection, markup) =
        edit(controller, |nodes, selection| apply_command(nodes, selection, command));

    debug!(
        command = command.name(),
        ?strategy,
        changed = markup.is_some(),
        "executed formatting command"
    );

    CommandOutcome {
        strategy,
        selection,
        markup,
    }
}

/// Run an edit over the surface content, then write back, refocus and
/// propagate. Without a reported selection the caret is at the end.
pub(crate) fn edit<S, R>(
    controller: &mut SurfaceController<S>,
    f: impl FnOnce(&mut Vec<Node>, Selection) -> (R, Selection),
) -> (R, Selection, Option<String>)
where
    S: EditableSurface,
{
    let surface = controller.surface_mut();
    let id = surface.fragment_id();
    let mut fragment = parse(&surface.markup());
    let len = fragment.text_len();
    let selection = surface
        .selection()
        .filter(|s| s.fragment_id == id)
        .unwrap_or_else(|| Selection::caret(id, len));

    let (result, next) = f(&mut fragment.nodes, selection);
    range::normalize(&mut fragment.nodes, false);
    let next = next.clamped(range::text_len(&fragment.nodes));

    surface.set_markup(&serialize_nodes(&fragment.nodes));
    surface.set_selection(next);
    surface.focus();

    let markup = controller.on_input();
    (result, next, markup)
}

fn apply_command(
    nodes: &mut Vec<Node>,
    selection: Selection,
    command: &FormatCommand,
) -> (Strategy, Selection) {
    match command {
        FormatCommand::Bold => apply_inline(nodes, selection, Element::new("b"), &["b", "strong"]),
        FormatCommand::Italic => apply_inline(nodes, selection, Element::new("i"), &["i", "em"]),
        FormatCommand::Underline => apply_inline(nodes, selection, Element::new("u"), &["u"]),
        FormatCommand::Strike => {
            apply_inline(nodes, selection, Element::new("s"), &["s", "strike", "del"])
        }
        FormatCommand::FontSize { points } => apply_font_size(nodes, selection, *points),
        FormatCommand::FontFamily { family } => apply_inline(
            nodes,
            selection,
            Element::new("span").with_style("font-family", family),
            &[],
        ),
        FormatCommand::Color { color } => apply_inline(
            nodes,
            selection,
            Element::new("span").with_style("color", color),
            &[],
        ),
        FormatCommand::Align { alignment } => apply_alignment(nodes, selection, *alignment),
        FormatCommand::List { kind } => apply_list(nodes, selection, *kind),
        FormatCommand::InsertTable { table } => insert_content(nodes, selection, vec![table_node(*table)]),
        FormatCommand::InsertRule => insert_content(nodes, selection, vec![rule_node()]),
        FormatCommand::InsertImage { src, alt } => {
            insert_content(nodes, selection, vec![image_node(src, alt.as_deref())])
        }
        FormatCommand::InsertRaw { markup } => insert_content(nodes, selection, parse(markup).nodes),
    }
}

/// Nearest `<font size>` step (1..=7) for a point size
pub fn font_size_step(points: f64) -> u8 {
    const STEPS: [f64; 7] = [7.5, 10.0, 12.0, 13.5, 18.0, 24.0, 36.0];
    let mut best = 0;
    for (i, step) in STEPS.iter().enumerate() {
        if (points - step).abs() < (points - STEPS[best]).abs() {
            best = i;
        }
    }
    (best + 1) as u8
}

/// Font sizes outside this range are clamped
const FONT_POINTS: RangeInclusive<f64> = 1.0..=144.0;

fn apply_font_size(nodes: &mut Vec<Node>, selection: Selection, points: f64) -> (Strategy, Selection) {
    if !points.is_finite() {
        warn!(points, "ignoring font size that is not a number");
        return (Strategy::NoOp, selection);
    }
    let points = points.clamp(*FONT_POINTS.start(), *FONT_POINTS.end());
    let wrapper = Element::new("span").with_style("font-size", &format!("{}pt", points));
    let coarse = Element::new("font").with_attribute("size", font_size_step(points).to_string());
    apply_styled(nodes, selection, wrapper, &coarse, &[])
}

fn apply_inline(
    nodes: &mut Vec<Node>,
    selection: Selection,
    wrapper: Element,
    toggle_tags: &[&str],
) -> (Strategy, Selection) {
    let coarse = wrapper.clone();
    apply_styled(nodes, selection, wrapper, &coarse, toggle_tags)
}

fn apply_styled(
    nodes: &mut Vec<Node>,
    selection: Selection,
    wrapper: Element,
    coarse: &Element,
    toggle_tags: &[&str],
) -> (Strategy, Selection) {
    if selection.is_collapsed() {
        return insert_caret_anchor(nodes, selection, wrapper, coarse);
    }
    let (start, end) = (selection.start, selection.end);

    let blocks = range::block_ranges(nodes, start, end);
    if blocks.len() > 1 {
        return apply_per_block(nodes, selection, &blocks, &wrapper, coarse, toggle_tags);
    }

    if !toggle_tags.is_empty() {
        if let Some(path) = covering_toggle(nodes, start, end, toggle_tags) {
            if range::unwrap_element(nodes, &path).is_ok() {
                return (Strategy::Toggled, selection);
            }
        }
    }

    match range::wrap_range(nodes, start, end, wrapper.clone()) {
        Ok(()) => (Strategy::Wrapped, selection),
        Err(MarkupError::Unwrappable { .. }) => {
            match range::extract_and_wrap(nodes, start, end, wrapper) {
                Ok(()) => {
                    debug!(start, end, "selection crosses tags, wrapped by extraction");
                    (Strategy::Extracted, selection)
                }
                Err(err) => coarse_fallback(nodes, selection, coarse, err),
            }
        }
        Err(err) => coarse_fallback(nodes, selection, coarse, err),
    }
}

fn apply_per_block(
    nodes: &mut Vec<Node>,
    selection: Selection,
    blocks: &[Range<usize>],
    wrapper: &Element,
    coarse: &Element,
    toggle_tags: &[&str],
) -> (Strategy, Selection) {
    // Split every run up front so paths found below stay valid
    for run in blocks {
        if let Err(err) = range::split_at(nodes, run.end).and_then(|()| range::split_at(nodes, run.start)) {
            return coarse_fallback(nodes, selection, coarse, err);
        }
    }

    if !toggle_tags.is_empty() {
        let covered: Option<Vec<NodePath>> = blocks
            .iter()
            .map(|run| covering_toggle(nodes, run.start, run.end, toggle_tags))
            .collect();
        if let Some(mut paths) = covered {
            paths.dedup();
            for path in paths.iter().rev() {
                if let Err(err) = range::unwrap_element(nodes, path) {
                    warn!(error = %err, ?path, "could not remove formatting");
                }
            }
            return (Strategy::Toggled, selection);
        }
    }

    let mut strategy = Strategy::PerBlock;
    for run in blocks.iter().rev() {
        let wrapped = match range::wrap_range(nodes, run.start, run.end, wrapper.clone()) {
            Err(MarkupError::Unwrappable { .. }) => {
                range::extract_and_wrap(nodes, run.start, run.end, wrapper.clone())
            }
            other => other,
        };
        if let Err(err) = wrapped {
            warn!(error = %err, start = run.start, end = run.end, "formatting block per text node");
            range::wrap_text_leaves(nodes, run.start, run.end, coarse);
            strategy = Strategy::Coarse;
        }
    }
    debug!(blocks = blocks.len(), "selection spans blocks, wrapped per block");
    (strategy, selection)
}

/// Element exactly covering the range whose tag is one of `tags`
fn covering_toggle(nodes: &mut Vec<Node>, start: usize, end: usize, tags: &[&str]) -> Option<NodePath> {
    let covering = range::covering_elements(nodes, start, end).ok()?;
    let tree: &[Node] = nodes;
    covering.into_iter().find(|path| {
        matches!(
            range::node_at(tree, path),
            Some(Node::Element(el)) if tags.contains(&el.tag.as_str())
        )
    })
}

fn coarse_fallback(
    nodes: &mut Vec<Node>,
    selection: Selection,
    coarse: &Element,
    err: MarkupError,
) -> (Strategy, Selection) {
    warn!(
        error = %err,
        start = selection.start,
        end = selection.end,
        "formatting selection per text node"
    );
    let wrapped = range::wrap_text_leaves(nodes, selection.start, selection.end, coarse);
    let strategy = if wrapped > 0 {
        Strategy::Coarse
    } else {
        Strategy::NoOp
    };
    (strategy, selection.clamped(range::text_len(nodes)))
}

fn insert_caret_anchor(
    nodes: &mut Vec<Node>,
    selection: Selection,
    wrapper: Element,
    coarse: &Element,
) -> (Strategy, Selection) {
    let offset = selection.start;
    let anchor = wrapper.with_children(vec![Node::text(ZERO_WIDTH_SPACE.to_string())]);
    match range::insert_nodes(nodes, offset, vec![Node::Element(anchor)]) {
        Ok(()) => (
            Strategy::CaretAnchor,
            Selection::caret(selection.fragment_id, offset + 1),
        ),
        Err(err) => coarse_fallback(nodes, selection, coarse, err),
    }
}

/// Text node paths touched by the selection, or every top-level node when
/// the content has no text
fn touched_paths(nodes: &[Node], selection: Selection) -> Vec<NodePath> {
    let selection = selection.clamped(range::text_len(nodes));
    let paths = range::text_leaf_paths(nodes, selection.start, selection.end);
    if paths.is_empty() {
        (0..nodes.len()).map(|i| vec![i]).collect()
    } else {
        paths
    }
}

fn nearest_ancestor(nodes: &[Node], path: &[usize], pred: impl Fn(&Element) -> bool) -> Option<NodePath> {
    (1..=path.len())
        .rev()
        .map(|n| &path[..n])
        .find(|prefix| matches!(range::node_at(nodes, prefix), Some(Node::Element(el)) if pred(el)))
        .map(|prefix| prefix.to_vec())
}

fn breaks_inline_run(node: &Node) -> bool {
    match node {
        Node::Element(el) => {
            el.is_block()
                || matches!(
                    el.tag.as_str(),
                    "ul" | "ol" | "table" | "thead" | "tbody" | "tr" | "hr"
                )
        }
        Node::Text { .. } => false,
    }
}

/// Maximal runs of top-level inline nodes containing each seed index
fn inline_runs(nodes: &[Node], seeds: &[usize]) -> Vec<Range<usize>> {
    let mut seeds = seeds.to_vec();
    seeds.sort_unstable();

    let mut runs: Vec<Range<usize>> = Vec::new();
    for seed in seeds {
        if seed >= nodes.len() || runs.iter().any(|run| run.contains(&seed)) {
            continue;
        }
        let mut start = seed;
        while start > 0 && !breaks_inline_run(&nodes[start - 1]) {
            start -= 1;
        }
        let mut end = seed + 1;
        while end < nodes.len() && !breaks_inline_run(&nodes[end]) {
            end += 1;
        }
        runs.push(start..end);
    }
    runs
}

fn placeholder_block(tag: &str) -> Element {
    Element::new(tag).with_children(vec![Node::Element(Element::new("br"))])
}

fn apply_alignment(
    nodes: &mut Vec<Node>,
    selection: Selection,
    alignment: Alignment,
) -> (Strategy, Selection) {
    let value = alignment.as_str();
    if nodes.is_empty() {
        nodes.push(Node::Element(placeholder_block("div").with_style("text-align", value)));
        return (Strategy::Blocks, selection);
    }

    let mut blocks: Vec<NodePath> = Vec::new();
    let mut loose: Vec<usize> = Vec::new();
    for path in touched_paths(nodes, selection) {
        match nearest_ancestor(nodes, &path, Element::is_block) {
            Some(block) if !blocks.contains(&block) => blocks.push(block),
            Some(_) => {}
            None => {
                if !loose.contains(&path[0]) {
                    loose.push(path[0]);
                }
            }
        }
    }

    for block in &blocks {
        if let Some(Node::Element(el)) = range::node_at_mut(nodes, block) {
            el.set_style("text-align", value);
        }
    }

    for run in inline_runs(nodes, &loose).into_iter().rev() {
        let start = run.start;
        let children: Vec<Node> = nodes.drain(run).collect();
        let div = Element::new("div")
            .with_style("text-align", value)
            .with_children(children);
        nodes.insert(start, Node::Element(div));
    }

    (Strategy::Blocks, selection)
}

fn is_list(el: &Element) -> bool {
    matches!(el.tag.as_str(), "ul" | "ol")
}

fn apply_list(nodes: &mut Vec<Node>, selection: Selection, kind: ListKind) -> (Strategy, Selection) {
    let tag = kind.tag();
    if nodes.is_empty() {
        let item = placeholder_block("li");
        nodes.push(Node::Element(Element::new(tag).with_children(vec![Node::Element(item)])));
        return (Strategy::Blocks, selection);
    }

    let touched = touched_paths(nodes, selection);
    let tree: &[Node] = nodes;
    let lists: Option<Vec<NodePath>> = touched
        .iter()
        .map(|path| nearest_ancestor(tree, path, is_list))
        .collect();

    // Selection already sits in lists: unwrap those of this kind, retag others
    if let Some(mut lists) = lists {
        lists.sort();
        lists.dedup();
        for path in lists.iter().rev() {
            let same_kind = matches!(range::node_at(nodes, path), Some(Node::Element(el)) if el.tag == tag);
            if same_kind {
                unwrap_list(nodes, path);
            } else if let Some(Node::Element(el)) = range::node_at_mut(nodes, path) {
                el.tag = tag.to_string();
            }
        }
        return (Strategy::Blocks, selection);
    }

    let roots: Vec<usize> = touched.iter().map(|path| path[0]).collect();
    let (Some(&first), Some(&last)) = (roots.iter().min(), roots.iter().max()) else {
        return (Strategy::NoOp, selection);
    };
    let mut start = first;
    while start > 0 && !breaks_inline_run(&nodes[start - 1]) {
        start -= 1;
    }
    let mut end = last + 1;
    while end < nodes.len() && !breaks_inline_run(&nodes[end]) {
        end += 1;
    }

    let items = list_items(nodes.drain(start..end).collect());
    nodes.insert(start, Node::Element(Element::new(tag).with_children(items)));
    (Strategy::Blocks, selection)
}

/// Turn top-level content into list items: blocks become items, inline runs
/// (split at line breaks) become items, existing lists are flattened
fn list_items(nodes: Vec<Node>) -> Vec<Node> {
    let mut items = Vec::new();
    let mut inline: Vec<Node> = Vec::new();

    fn flush(inline: &mut Vec<Node>, items: &mut Vec<Node>) {
        if !inline.is_empty() {
            let item = Element::new("li").with_children(std::mem::take(inline));
            items.push(Node::Element(item));
        }
    }

    for node in nodes {
        match node {
            Node::Element(el) if is_list(&el) => {
                flush(&mut inline, &mut items);
                items.extend(el.children);
            }
            Node::Element(el) if el.is_block() => {
                flush(&mut inline, &mut items);
                let mut item = Element::new("li");
                if let Some(align) = el.style("text-align") {
                    item.set_style("text-align", &align);
                }
                item.children = el.children;
                if item.children.is_empty() {
                    item.children.push(Node::Element(Element::new("br")));
                }
                items.push(Node::Element(item));
            }
            Node::Element(el) if el.tag == "br" => flush(&mut inline, &mut items),
            other => inline.push(other),
        }
    }
    flush(&mut inline, &mut items);
    items
}

/// Replace the list at `path` with one paragraph per item
fn unwrap_list(nodes: &mut Vec<Node>, path: &[usize]) {
    let Some((&index, parent)) = path.split_last() else {
        return;
    };
    let Some(siblings) = range::children_at_mut(nodes, parent) else {
        return;
    };
    if index >= siblings.len() {
        return;
    }
    let Node::Element(list) = siblings.remove(index) else {
        return;
    };

    let paragraphs: Vec<Node> = list
        .children
        .into_iter()
        .map(|child| match child {
            Node::Element(mut item) if item.tag == "li" => {
                item.tag = "p".to_string();
                Node::Element(item)
            }
            other => other,
        })
        .collect();
    siblings.splice(index..index, paragraphs);
}

fn insert_content(
    nodes: &mut Vec<Node>,
    selection: Selection,
    content: Vec<Node>,
) -> (Strategy, Selection) {
    let selection = selection.clamped(range::text_len(nodes));
    if !selection.is_collapsed() {
        if let Err(err) = range::delete_range(nodes, selection.start, selection.end) {
            warn!(error = %err, "could not remove selection before insert");
        }
    }

    let offset = selection.start;
    let inserted = range::text_len(&content);
    match range::insert_nodes(nodes, offset, content) {
        Ok(()) => (
            Strategy::Inserted,
            Selection::caret(selection.fragment_id, offset + inserted),
        ),
        Err(err) => {
            warn!(error = %err, offset, "insert failed");
            (Strategy::NoOp, selection)
        }
    }
}

const CELL_BORDER: &str = "1px solid #000000";

fn table_node(spec: TableSpec) -> Node {
    let spec = TableSpec::new(spec.rows, spec.cols);
    let cell = |tag: &str| {
        Node::Element(
            Element::new(tag)
                .with_style("border", CELL_BORDER)
                .with_style("padding", "4px")
                .with_children(vec![Node::text("\u{a0}")]),
        )
    };
    let row = |tag: &str| Node::Element(Element::new("tr").with_children((0..spec.cols).map(|_| cell(tag)).collect()));

    let head = Element::new("thead").with_children(vec![row("th")]);
    let body = Element::new("tbody").with_children((0..spec.rows).map(|_| row("td")).collect());
    Node::Element(
        Element::new("table")
            .with_style("border-collapse", "collapse")
            .with_style("width", "100%")
            .with_children(vec![Node::Element(head), Node::Element(body)]),
    )
}

fn rule_node() -> Node {
    Node::Element(
        Element::new("hr")
            .with_style("border", "none")
            .with_style("border-top", CELL_BORDER)
            .with_style("margin", "8px 0"),
    )
}

fn image_node(src: &str, alt: Option<&str>) -> Node {
    Node::Element(
        Element::new("img")
            .with_attribute("src", src)
            .with_attribute("alt", alt.unwrap_or(""))
            .with_style("max-width", "100%"),
    )
}
