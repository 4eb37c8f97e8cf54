/// Window of `max` items around `selected`, as a half-open `(start, end)` range.
///
/// Everything is shown when it fits. Otherwise the selection sits at `max / 2`
/// unless that would run past either edge.
pub fn window_around(selected: usize, total: usize, max: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if max == 0 || max >= total {
        return (0, total);
    }

    let start = selected.saturating_sub(max / 2);
    let end = (start + max).min(total);
    (end.saturating_sub(max), end)
}

/// Slice of `len` lines visible from `scroll` in a body of `height` lines.
/// The slice never runs past the end; the start slides back instead.
pub fn visible_range(scroll: usize, len: usize, height: usize) -> (usize, usize) {
    if len == 0 {
        return (0, 0);
    }
    let scroll = scroll.min(len - 1);
    let end = (scroll + height).min(len);
    (end.saturating_sub(height).min(scroll), end)
}

/// Selected row plus the detail pane scroll offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    index: usize,
    detail_scroll: usize,
}

impl Selection {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn detail_scroll(&self) -> usize {
        self.detail_scroll
    }

    /// Select `next` clamped to `[0, len - 1]`; moving resets the detail scroll.
    pub fn set(&mut self, next: isize, len: usize) {
        if len == 0 {
            self.index = 0;
            self.detail_scroll = 0;
            return;
        }
        let next = next.clamp(0, len as isize - 1) as usize;
        if next != self.index {
            self.detail_scroll = 0;
        }
        self.index = next;
    }

    pub fn move_by(&mut self, delta: isize, len: usize) {
        self.set(self.index as isize + delta, len);
    }

    /// Keep the index in range after the row list changed
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.index = 0;
        } else if self.index >= len {
            self.index = len - 1;
        }
    }

    /// Scroll the detail pane; `lines` bounds the offset to `[0, lines - 1]`
    pub fn scroll_detail(&mut self, delta: isize, lines: usize) {
        let max = lines.saturating_sub(1) as isize;
        self.detail_scroll = (self.detail_scroll as isize + delta).clamp(0, max.max(0)) as usize;
    }

    pub fn reset_detail(&mut self) {
        self.detail_scroll = 0;
    }
}
