use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders},
    Frame,
};

/// Share of the library whose cover lookup has finished
pub struct LookupSummary {
    found: usize,
    cached: usize,
    missing: usize,
    total: usize,
}

impl LookupSummary {
    pub fn new(found: usize, cached: usize, missing: usize, total: usize) -> Self {
        Self {
            found,
            cached,
            missing,
            total,
        }
    }

    /// Widths of the found and missing segments for a bar `width` cells wide
    fn segments(&self, width: usize) -> (usize, usize) {
        if self.total == 0 {
            return (0, 0);
        }
        let found = (self.found.min(self.total) * width) / self.total;
        let missing = (self.missing.min(self.total) * width) / self.total;
        (found, missing.min(width - found))
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Covers");

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let bar_width = inner.width.saturating_sub(2) as usize;

        if bar_width == 0 {
            return;
        }

        let (found_width, missing_width) = self.segments(bar_width);
        let empty_width = bar_width.saturating_sub(found_width + missing_width);

        let mut spans = Vec::new();

        if found_width > 0 {
            spans.push(Span::styled(
                "█".repeat(found_width),
                Style::default().fg(Color::Green),
            ));
        }

        if missing_width > 0 {
            spans.push(Span::styled(
                "█".repeat(missing_width),
                Style::default().fg(Color::Red),
            ));
        }

        if empty_width > 0 {
            spans.push(Span::styled(
                "░".repeat(empty_width),
                Style::default().fg(Color::DarkGray),
            ));
        }

        let bar_area = Rect {
            x: inner.x + 1,
            y: inner.y,
            width: bar_width as u16,
            height: 1,
        };

        frame.render_widget(Line::from(spans), bar_area);

        let legend = Line::from(vec![
            Span::styled("● ", Style::default().fg(Color::Green)),
            Span::raw(format!("Found: {} ", self.found)),
            Span::styled("● ", Style::default().fg(Color::Yellow)),
            Span::raw(format!("Cached: {} ", self.cached)),
            Span::styled("● ", Style::default().fg(Color::Red)),
            Span::raw(format!("Missing: {}", self.missing)),
        ]);

        if inner.height > 1 {
            let legend_area = Rect {
                x: inner.x + 1,
                y: inner.y + 1,
                width: inner.width.saturating_sub(2),
                height: 1,
            };
            frame.render_widget(legend, legend_area);
        }
    }
}

pub struct StatusLegend;

impl StatusLegend {
    pub fn render(frame: &mut Frame, area: Rect) {
        let legend = Line::from(vec![
            Span::styled("[✓]", Style::default().fg(Color::Green)),
            Span::raw(" Found | "),
            Span::styled("[~]", Style::default().fg(Color::Yellow)),
            Span::raw(" Cached | "),
            Span::styled("[✗]", Style::default().fg(Color::Red)),
            Span::raw(" Not Found | "),
            Span::styled("[!]", Style::default().fg(Color::Magenta)),
            Span::raw(" Error"),
        ]);

        frame.render_widget(legend, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_scale_to_width() {
        assert_eq!(LookupSummary::new(5, 0, 5, 10).segments(20), (10, 10));
        assert_eq!(LookupSummary::new(1, 1, 0, 4).segments(10), (2, 0));
        assert_eq!(LookupSummary::new(0, 0, 0, 0).segments(10), (0, 0));
    }

    #[test]
    fn test_segments_never_overflow() {
        // Retried lookups can push counts past the track total
        let (found, missing) = LookupSummary::new(8, 0, 8, 10).segments(10);
        assert!(found + missing <= 10);
    }
}
