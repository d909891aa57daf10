use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::App;
use crate::color_scheme::ColorScheme;
use crate::sample::Sample;

/// One core's row: the label text and how much of the row the bar covers
#[derive(Debug, Clone, PartialEq)]
pub struct BarRow {
    pub label: String,
    /// Usage as received, in percent
    pub usage: f64,
    /// `usage / 100`, not clamped
    pub fill_ratio: f64,
}

/// Project a sample onto bar rows, in core order.
pub fn bar_rows(sample: &Sample) -> Vec<BarRow> {
    sample
        .cores()
        .iter()
        .map(|&usage| BarRow {
            label: format_usage(usage),
            usage,
            fill_ratio: usage / 100.0,
        })
        .collect()
}

/// `12.5` -> `"12.50%"`
pub fn format_usage(usage: f64) -> String {
    format!("{:.2}%", usage)
}

/// Cells of a `width`-wide row covered by a bar at `usage` percent.
///
/// Scales before dividing so whole percentages land on exact cell counts.
/// The usage itself is never clamped; the grid just can't draw past either
/// edge of the row.
pub fn filled_cells(usage: f64, width: u16) -> u16 {
    let cells = (usage * width as f64 / 100.0).floor();
    if cells.is_nan() || cells <= 0.0 {
        0
    } else if cells >= width as f64 {
        width
    } else {
        cells as u16
    }
}

/// Draw one row per core, top to bottom. Rows past the bottom are clipped.
pub fn draw_bars(f: &mut Frame, app: &App, area: Rect) {
    let cs = &app.color_scheme;
    let rows = bar_rows(&app.sample);

    for (i, row) in rows.iter().enumerate().take(area.height as usize) {
        let row_area = Rect {
            x: area.x,
            y: area.y + i as u16,
            width: area.width,
            height: 1,
        };
        f.render_widget(Paragraph::new(row_line(row, area.width, cs)), row_area);
    }
}

/// The row is a full-width band: filled cells first, then the empty track,
/// with the label written over the left edge.
fn row_line(row: &BarRow, width: u16, cs: &ColorScheme) -> Line<'static> {
    let width = width as usize;
    let mut text: String = format!(" {}", row.label).chars().take(width).collect();
    let pad = width.saturating_sub(text.chars().count());
    text.push_str(&" ".repeat(pad));

    let filled = filled_cells(row.usage, width as u16) as usize;
    let split = text
        .char_indices()
        .nth(filled)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let (head, tail) = text.split_at(split);

    Line::from(vec![
        Span::styled(head.to_string(), cs.filled_style()),
        Span::styled(tail.to_string(), cs.empty_style()),
    ])
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn rows_match_input(cores in prop::collection::vec(-50.0f64..250.0, 0..64)) {
            let rows = bar_rows(&Sample::new(cores.clone()));
            prop_assert_eq!(rows.len(), cores.len());
            for (row, &v) in rows.iter().zip(&cores) {
                prop_assert_eq!(&row.label, &format!("{:.2}%", v));
                prop_assert_eq!(row.usage, v);
                prop_assert_eq!(row.fill_ratio, v / 100.0);
            }
        }

        #[test]
        fn fill_is_bounded_floor(v in -50.0f64..250.0, width in 0u16..400) {
            let expected = (v * width as f64 / 100.0).floor().clamp(0.0, width as f64) as u16;
            let cells = filled_cells(v, width);
            prop_assert_eq!(cells, expected);
            prop_assert!(cells <= width);
        }

        #[test]
        fn whole_percent_is_exact_on_any_width(v in 0u16..=100, width in 1u16..400) {
            prop_assert_eq!(filled_cells(v as f64, width) as u32, v as u32 * width as u32 / 100);
        }
    }

    #[test]
    fn one_row_per_core_in_order() {
        let sample = Sample::new(vec![3.0, 1.0, 2.0]);
        let labels: Vec<String> = bar_rows(&sample).into_iter().map(|r| r.label).collect();
        assert_eq!(labels, ["3.00%", "1.00%", "2.00%"]);
    }

    #[test]
    fn empty_sample_has_no_rows() {
        assert!(bar_rows(&Sample::default()).is_empty());
    }

    #[test]
    fn labels_have_two_decimals() {
        assert_eq!(format_usage(0.0), "0.00%");
        assert_eq!(format_usage(12.5), "12.50%");
        assert_eq!(format_usage(99.999), "100.00%");
        assert_eq!(format_usage(33.333), "33.33%");
    }

    #[test]
    fn fill_ratio_is_not_clamped() {
        let rows = bar_rows(&Sample::new(vec![50.0, 150.0, -20.0]));
        assert_eq!(rows[0].fill_ratio, 0.5);
        assert_eq!(rows[1].fill_ratio, 1.5);
        assert_eq!(rows[2].fill_ratio, -0.2);
    }

    #[test]
    fn filled_cells_scale_with_width() {
        assert_eq!(filled_cells(0.0, 40), 0);
        assert_eq!(filled_cells(50.0, 40), 20);
        assert_eq!(filled_cells(100.0, 40), 40);
        assert_eq!(filled_cells(25.5, 40), 10);
    }

    #[test]
    fn whole_percentages_fill_exact_cells() {
        for v in 0..=100u16 {
            let rows = bar_rows(&Sample::new(vec![v as f64]));
            assert_eq!(filled_cells(rows[0].usage, 100), v, "usage {}%", v);
        }
    }

    #[test]
    fn filled_cells_stop_at_the_row_edges() {
        assert_eq!(filled_cells(150.0, 40), 40);
        assert_eq!(filled_cells(-20.0, 40), 0);
        assert_eq!(filled_cells(f64::NAN, 40), 0);
    }

    #[test]
    fn row_line_spans_full_width() {
        let cs = ColorScheme::from_id(crate::color_scheme::ColorSchemeId::Default);
        let row = BarRow {
            label: "50.00%".into(),
            usage: 50.0,
            fill_ratio: 0.5,
        };
        let line = row_line(&row, 20, &cs);
        assert_eq!(line.spans[0].content, " 50.00%   ");
        assert_eq!(line.spans[1].content.len(), 10);
        assert_eq!(line.width(), 20);
    }

    #[test]
    fn label_is_truncated_on_narrow_rows() {
        let cs = ColorScheme::from_id(crate::color_scheme::ColorSchemeId::Default);
        let row = BarRow {
            label: "100.00%".into(),
            usage: 100.0,
            fill_ratio: 1.0,
        };
        let line = row_line(&row, 4, &cs);
        assert_eq!(line.spans[0].content, " 100");
        assert_eq!(line.spans[1].content, "");
    }
}
