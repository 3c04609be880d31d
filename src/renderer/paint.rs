//! Paint - Flow the host document into terminal lines.
//!
//! Block tags start a new line; inline content between them is joined,
//! whitespace-collapsed and word-wrapped by display width. The result is a
//! [`Layout`]: a list of styled lines that can be painted into a
//! [`FrameBuffer`] at any scroll offset.
//!
//! ```text
//! h2           "▸ " / "▾ " marker (expanded class), clickable
//! li           "• " marker, hanging indent
//! ul           children indented by 2
//! img          "[alt]"
//! a            blue underline
//! p.error      red
//! ```

use unicode_width::UnicodeWidthStr;

use crate::dom::{Document, ElementData, NodeId, NodeKind};
use crate::types::{Attr, Rgba, Style};

use super::buffer::FrameBuffer;

const BLOCK_TAGS: &[&str] = &[
    "body", "main", "div", "header", "footer", "section", "h1", "h2", "h3", "p", "ul", "li",
];

const LIST_INDENT: u16 = 2;
const BULLET: &str = "• ";
const COLLAPSED: &str = "▸ ";
const EXPANDED: &str = "▾ ";

// =============================================================================
// Layout output
// =============================================================================

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub style: Style,
}

impl Segment {
    fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    fn width(&self) -> usize {
        self.text.width()
    }
}

/// One terminal row of content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub indent: u16,
    pub segments: Vec<Segment>,
    /// Clickable element this row belongs to.
    pub node: Option<NodeId>,
}

impl Line {
    fn new(indent: u16, node: Option<NodeId>) -> Self {
        Self {
            indent,
            segments: Vec::new(),
            node,
        }
    }

    fn is_blank(&self) -> bool {
        self.segments.iter().all(|s| s.text.trim().is_empty())
    }

    /// The row as unstyled text.
    pub fn plain(&self) -> String {
        let mut out = " ".repeat(self.indent as usize);
        for segment in &self.segments {
            out.push_str(&segment.text);
        }
        out.trim_end().to_string()
    }
}

/// Rows of the buffer that dispatch to `node` when clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitRegion {
    pub y: u16,
    pub height: u16,
    pub node: NodeId,
}

/// Find the clickable node painted at `row`.
pub fn hit_test(regions: &[HitRegion], row: u16) -> Option<NodeId> {
    regions
        .iter()
        .find(|r| row >= r.y && row < r.y + r.height)
        .map(|r| r.node)
}

/// The document flowed at a fixed width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub lines: Vec<Line>,
    /// Elements with a click listener, in document order.
    pub clickables: Vec<NodeId>,
}

impl Layout {
    /// Flow `doc` into lines at `width` columns. `focused` is rendered inverse.
    pub fn compute(doc: &Document, width: u16, focused: Option<NodeId>) -> Self {
        let mut flow = Flow {
            doc,
            width: width.max(1),
            focused,
            layout: Layout::default(),
            pending: Vec::new(),
            marker: None,
            indent: 0,
            clickable: None,
        };
        flow.walk(doc.root(), Style::PLAIN);
        flow.flush();
        while flow.layout.lines.last().is_some_and(Line::is_blank) {
            flow.layout.lines.pop();
        }
        flow.layout
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Largest useful scroll offset for a viewport of `rows`.
    pub fn max_scroll(&self, rows: u16) -> usize {
        self.lines.len().saturating_sub(rows as usize)
    }

    /// First line painted for `node`.
    pub fn line_of(&self, node: NodeId) -> Option<usize> {
        self.lines.iter().position(|line| line.node == Some(node))
    }

    pub fn plain_lines(&self) -> Vec<String> {
        self.lines.iter().map(Line::plain).collect()
    }

    /// Paint the lines starting at `scroll` and return the hit regions.
    pub fn paint(&self, buffer: &mut FrameBuffer, scroll: usize) -> Vec<HitRegion> {
        buffer.clear();
        let mut hits: Vec<HitRegion> = Vec::new();
        let visible = self.lines.iter().skip(scroll).take(buffer.height() as usize);

        for (row, line) in visible.enumerate() {
            let y = row as u16;
            let mut x = line.indent;
            for segment in &line.segments {
                x = buffer.put_str(x, y, &segment.text, segment.style);
            }
            let Some(node) = line.node else { continue };
            match hits.last_mut() {
                Some(last) if last.node == node && last.y + last.height == y => last.height += 1,
                _ => hits.push(HitRegion { y, height: 1, node }),
            }
        }
        hits
    }
}

// =============================================================================
// Flow
// =============================================================================

type Word = Vec<Segment>;

struct Flow<'a> {
    doc: &'a Document,
    width: u16,
    focused: Option<NodeId>,
    layout: Layout,
    /// Inline content of the line being collected.
    pending: Vec<Segment>,
    /// Prefix for the next emitted line of the current block.
    marker: Option<Segment>,
    indent: u16,
    clickable: Option<NodeId>,
}

impl Flow<'_> {
    fn walk(&mut self, id: NodeId, inherited: Style) {
        let doc = self.doc;
        let element = match doc.kind(id) {
            Some(NodeKind::Text(data)) => {
                self.pending.push(Segment::new(data.as_str(), inherited));
                return;
            }
            Some(NodeKind::Element(element)) => element,
            None => return,
        };

        let focused = self.focused == Some(id);
        let style = inherited.merge(element_style(element, focused));

        if element.tag == "img" {
            let alt = element.attrs.get("alt").map(String::as_str).unwrap_or("image");
            self.pending.push(Segment::new(format!("[{alt}]"), style));
            return;
        }

        let clickable = doc.has_listener(id, "click");
        if clickable {
            self.layout.clickables.push(id);
        }

        if !self.is_block(id, element) {
            for child in doc.children(id) {
                self.walk(*child, style);
            }
            return;
        }

        self.flush();
        if gap_before(element) {
            self.blank_line();
        }
        let saved = (self.indent, self.clickable);
        if clickable {
            self.clickable = Some(id);
        }
        self.marker = marker(element).map(|m| Segment::new(m, marker_style(style)));
        if element.tag == "ul" {
            self.indent += LIST_INDENT;
        }

        for child in doc.children(id) {
            self.walk(*child, style);
        }

        self.flush();
        self.marker = None;
        (self.indent, self.clickable) = saved;
    }

    /// Spans directly inside a `div` lay out as their own line.
    fn is_block(&self, id: NodeId, element: &ElementData) -> bool {
        if BLOCK_TAGS.contains(&element.tag.as_str()) {
            return true;
        }
        element.tag == "span"
            && self
                .doc
                .parent(id)
                .and_then(|p| self.doc.element(p))
                .is_some_and(|parent| parent.tag == "div")
    }

    fn blank_line(&mut self) {
        if self.layout.lines.last().is_some_and(|line| !line.is_blank()) {
            self.layout.lines.push(Line::default());
        }
    }

    /// Wrap the pending inline content into lines.
    fn flush(&mut self) {
        let words = split_words(std::mem::take(&mut self.pending));
        if words.is_empty() {
            return;
        }
        let marker = self.marker.take();
        let hang = self.indent + marker.as_ref().map_or(0, |m| m.width() as u16);
        let capacity = self.width.saturating_sub(hang).max(1) as usize;

        let mut line = Line::new(self.indent, self.clickable);
        line.segments.extend(marker);
        let mut used = 0;

        for mut word in words {
            loop {
                let width = word_width(&word);
                let needed = if used == 0 { width } else { width + 1 };
                if used + needed <= capacity {
                    if used > 0 {
                        line.segments.push(Segment::new(" ", space_style(&line, &word)));
                    }
                    line.segments.extend(word);
                    used += needed;
                    break;
                }
                if used > 0 {
                    let full = std::mem::replace(&mut line, Line::new(hang, self.clickable));
                    self.layout.lines.push(full);
                    used = 0;
                    continue;
                }
                let (head, tail) = split_word(word, capacity);
                line.segments.extend(head);
                let full = std::mem::replace(&mut line, Line::new(hang, self.clickable));
                self.layout.lines.push(full);
                if tail.is_empty() {
                    break;
                }
                word = tail;
            }
        }
        if !line.segments.is_empty() {
            self.layout.lines.push(line);
        }
    }
}

fn element_style(element: &ElementData, focused: bool) -> Style {
    let has = |class: &str| element.classes.iter().any(|c| c == class);
    let mut style = match element.tag.as_str() {
        "h1" => Style::new(Rgba::CYAN, Attr::BOLD),
        "h2" => Style::new(Rgba::YELLOW, Attr::BOLD | Attr::UNDERLINE),
        "h3" => Style::new(Rgba::TERMINAL_DEFAULT, Attr::BOLD),
        "a" => Style::new(Rgba::BLUE, Attr::UNDERLINE),
        "p" if has("error") => Style::new(Rgba::RED, Attr::NONE),
        "span" if has("location") || has("phone") || has("email") => {
            Style::new(Rgba::GRAY, Attr::NONE)
        }
        "footer" => Style::new(Rgba::TERMINAL_DEFAULT, Attr::DIM),
        _ => Style::PLAIN,
    };
    if focused {
        style.attrs |= Attr::INVERSE;
    }
    style
}

fn marker(element: &ElementData) -> Option<&'static str> {
    match element.tag.as_str() {
        "li" => Some(BULLET),
        "h2" if element.classes.iter().any(|c| c == "expanded") => Some(EXPANDED),
        "h2" => Some(COLLAPSED),
        _ => None,
    }
}

fn marker_style(style: Style) -> Style {
    Style::new(style.fg, style.attrs.difference(Attr::UNDERLINE))
}

fn gap_before(element: &ElementData) -> bool {
    matches!(element.tag.as_str(), "h2" | "footer")
        || (element.tag == "div" && element.classes.iter().any(|c| c == "profile"))
}

/// Split inline content on whitespace, keeping per-segment styles.
fn split_words(segments: Vec<Segment>) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current: Word = Vec::new();
    for segment in segments {
        for ch in segment.text.chars() {
            if ch.is_whitespace() {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                continue;
            }
            match current.last_mut() {
                Some(last) if last.style == segment.style => last.text.push(ch),
                _ => current.push(Segment::new(ch.to_string(), segment.style)),
            }
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn word_width(word: &Word) -> usize {
    word.iter().map(Segment::width).sum()
}

/// Break a word so the head fits in `capacity` columns (at least one char).
fn split_word(word: Word, capacity: usize) -> (Word, Word) {
    let mut head: Word = Vec::new();
    let mut tail: Word = Vec::new();
    let mut used = 0;
    for segment in word {
        if !tail.is_empty() {
            tail.push(segment);
            continue;
        }
        let mut taken = String::new();
        let mut rest = String::new();
        for ch in segment.text.chars() {
            let width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
            let first = used == 0 && taken.is_empty() && head.is_empty();
            if rest.is_empty() && (used + width <= capacity || first) {
                taken.push(ch);
                used += width;
            } else {
                rest.push(ch);
            }
        }
        if !taken.is_empty() {
            head.push(Segment::new(taken, segment.style));
        }
        if !rest.is_empty() {
            tail.push(Segment::new(rest, segment.style));
        }
    }
    (head, tail)
}

/// Spaces inside a styled run keep its style; spaces between runs are plain.
fn space_style(line: &Line, next: &Word) -> Style {
    match (line.segments.last(), next.first()) {
        (Some(prev), Some(next)) if prev.style == next.style => prev.style,
        _ => Style::PLAIN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Dom;

    fn text_element(dom: &Dom, tag: &str, text: &str) -> NodeId {
        let element = dom.element(tag);
        dom.append(element, dom.text(text));
        element
    }

    fn layout(dom: &Dom, width: u16) -> Layout {
        dom.read(|doc| Layout::compute(doc, width, None))
    }

    #[test]
    fn test_blocks_start_new_lines() {
        let dom = Dom::new();
        let div = dom.element("div");
        dom.append(div, text_element(&dom, "h1", "Name"));
        dom.append(div, dom.space());
        dom.append(div, text_element(&dom, "span", "Role"));
        dom.append(dom.root(), div);

        assert_eq!(layout(&dom, 40).plain_lines(), vec!["Name", "Role"]);
    }

    #[test]
    fn test_inline_text_wraps_by_width() {
        let dom = Dom::new();
        dom.append(dom.root(), text_element(&dom, "p", "one two three four"));
        assert_eq!(layout(&dom, 9).plain_lines(), vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_long_word_is_split() {
        let dom = Dom::new();
        dom.append(dom.root(), text_element(&dom, "p", "abcdefgh"));
        assert_eq!(layout(&dom, 3).plain_lines(), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_list_items_get_bullets_and_hanging_indent() {
        let dom = Dom::new();
        let ul = dom.element("ul");
        dom.append(ul, text_element(&dom, "li", "ship it now"));
        dom.append(dom.root(), ul);

        let lines = layout(&dom, 10).plain_lines();
        assert_eq!(lines, vec!["  • ship", "    it now"]);
    }

    #[test]
    fn test_heading_marker_follows_expanded_class() {
        let dom = Dom::new();
        let h2 = text_element(&dom, "h2", "Profile");
        dom.append(dom.root(), h2);
        assert_eq!(layout(&dom, 20).plain_lines(), vec!["▸ Profile"]);

        dom.toggle_class(h2, "expanded", true);
        assert_eq!(layout(&dom, 20).plain_lines(), vec!["▾ Profile"]);
    }

    #[test]
    fn test_empty_blocks_are_skipped() {
        let dom = Dom::new();
        dom.append(dom.root(), dom.element("div"));
        dom.append(dom.root(), text_element(&dom, "p", "   "));
        assert!(layout(&dom, 20).lines.is_empty());
    }

    #[test]
    fn test_img_renders_alt() {
        let dom = Dom::new();
        let img = dom.element("img");
        dom.attr(img, "alt", Some("portrait"));
        dom.append(dom.root(), img);
        assert_eq!(layout(&dom, 20).plain_lines(), vec!["[portrait]"]);
    }

    #[test]
    fn test_styles_applied() {
        let dom = Dom::new();
        let p = dom.element("p");
        dom.append(p, dom.text("see "));
        dom.append(p, text_element(&dom, "a", "docs"));
        dom.append(dom.root(), p);

        let layout = layout(&dom, 20);
        let link = layout.lines[0]
            .segments
            .iter()
            .find(|s| s.text == "docs")
            .map(|s| s.style);
        assert_eq!(link, Some(Style::new(Rgba::BLUE, Attr::UNDERLINE)));
    }

    #[test]
    fn test_focused_heading_is_inverse() {
        let dom = Dom::new();
        let h2 = text_element(&dom, "h2", "Skills");
        dom.append(dom.root(), h2);
        let layout = dom.read(|doc| Layout::compute(doc, 20, Some(h2)));
        assert!(layout.lines[0].segments[0].style.attrs.contains(Attr::INVERSE));
    }

    #[test]
    fn test_clickables_and_hit_regions() {
        let dom = Dom::new();
        dom.append(dom.root(), text_element(&dom, "p", "intro"));
        let h2 = text_element(&dom, "h2", "Education history");
        dom.append(dom.root(), h2);
        let _dispose = dom.listen(h2, "click", || {});

        let layout = layout(&dom, 12);
        assert_eq!(layout.clickables, vec![h2]);
        // intro, blank, two heading rows
        assert_eq!(layout.height(), 4);
        assert_eq!(layout.line_of(h2), Some(2));

        let mut buffer = FrameBuffer::new(12, 4);
        let hits = layout.paint(&mut buffer, 0);
        assert_eq!(hits, vec![HitRegion { y: 2, height: 2, node: h2 }]);
        assert_eq!(hit_test(&hits, 3), Some(h2));
        assert_eq!(hit_test(&hits, 0), None);

        let hits = layout.paint(&mut buffer, 2);
        assert_eq!(hit_test(&hits, 0), Some(h2));
        assert_eq!(buffer.row_text(0), "▸ Education");
    }
}
