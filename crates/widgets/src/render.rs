//! Drawing a mounted accordion into a ratatui buffer.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, StatefulWidget, Widget},
};

use crate::host::{Host, LineKind};
use crate::style::AccordionStyle;

/// Focus and scroll position of an accordion view.
///
/// Also remembers where headers were drawn last frame, for mouse hit tests.
#[derive(Debug, Clone, Default)]
pub struct AccordionState {
    focused: usize,
    offset: usize,
    area: Rect,
    header_rows: Vec<(u16, usize)>,
}

impl AccordionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the focused header among visible headers.
    pub fn focused(&self) -> usize {
        self.focused
    }

    /// First rendered line.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_focused(&mut self, index: usize) {
        self.focused = index;
    }

    /// Move focus to next header (wraps around).
    pub fn focus_next(&mut self, count: usize) {
        if count > 0 {
            self.focused = (self.focused + 1) % count;
        }
    }

    /// Move focus to previous header (wraps around).
    pub fn focus_prev(&mut self, count: usize) {
        if count > 0 {
            self.focused = if self.focused == 0 {
                count - 1
            } else {
                self.focused - 1
            };
        }
    }

    pub fn focus_first(&mut self) {
        self.focused = 0;
    }

    pub fn focus_last(&mut self, count: usize) {
        self.focused = count.saturating_sub(1);
    }

    /// Keep focus inside `0..count` after headers disappear.
    pub fn clamp(&mut self, count: usize) {
        if self.focused >= count {
            self.focused = count.saturating_sub(1);
        }
    }

    /// Header drawn at the given screen cell during the last render.
    pub fn header_at(&self, column: u16, row: u16) -> Option<usize> {
        if column < self.area.x || column >= self.area.right() {
            return None;
        }
        self.header_rows
            .iter()
            .find(|(y, _)| *y == row)
            .map(|&(_, index)| index)
    }
}

/// Stateful widget rendering a [`Host`].
pub struct AccordionView<'a> {
    host: &'a Host,
    style: AccordionStyle,
    block: Option<Block<'a>>,
}

impl<'a> AccordionView<'a> {
    pub fn new(host: &'a Host) -> Self {
        Self {
            host,
            style: AccordionStyle::default(),
            block: None,
        }
    }

    pub fn style(mut self, style: AccordionStyle) -> Self {
        self.style = style;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl StatefulWidget for AccordionView<'_> {
    type State = AccordionState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let area = match self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };

        state.area = area;
        state.header_rows.clear();
        if area.height == 0 || area.width == 0 {
            return;
        }

        let lines = self.host.lines();
        let header_lines: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.header.is_some())
            .map(|(i, _)| i)
            .collect();
        state.clamp(header_lines.len());

        // Scroll so the focused header stays visible
        let height = area.height as usize;
        if let Some(&focused_line) = header_lines.get(state.focused) {
            if focused_line < state.offset {
                state.offset = focused_line;
            } else if focused_line >= state.offset + height {
                state.offset = focused_line + 1 - height;
            }
        }
        state.offset = state.offset.min(lines.len().saturating_sub(height));

        let indent_width = self.style.indent_width();
        let mut header_index = header_lines.iter().filter(|&&i| i < state.offset).count();

        for (row, line) in lines.iter().skip(state.offset).take(height).enumerate() {
            let y = area.y + row as u16;
            let indent = (line.depth as u16).saturating_mul(indent_width);
            if indent >= area.width {
                if line.header.is_some() {
                    header_index += 1;
                }
                continue;
            }
            let x = area.x + indent;
            let max_width = (area.width - indent) as usize;

            match line.kind {
                LineKind::Header { open } => {
                    let style = if header_index == state.focused {
                        self.style.focused_header
                    } else {
                        self.style.header
                    };
                    buf.set_style(Rect::new(area.x, y, area.width, 1), style);
                    let label = format!("{} {}", self.style.symbol(open), line.text);
                    buf.set_stringn(x, y, label, max_width, style);
                    state.header_rows.push((y, header_index));
                    header_index += 1;
                }
                LineKind::Content => {
                    buf.set_stringn(x, y, &line.text, max_width, self.style.content);
                }
            }
        }
    }
}
