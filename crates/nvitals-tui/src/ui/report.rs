use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table},
    Frame,
};

use nvitals_core::models::REPORT_YEARS;
use nvitals_core::report::{Metric, ReportMode, ReportView, SeriesStatus};
use nvitals_core::utils::truncate_string;

use crate::app::App;
use crate::ui::styles;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Width of the summary card
const SUMMARY_WIDTH: u16 = 56;

pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    match app.report {
        Some(ref report) => match report.mode() {
            ReportMode::Summary => render_summary(frame, report, area),
            ReportMode::Full => render_full(frame, app, report, area),
        },
        None => render_empty(frame, app, area),
    }
}

fn render_empty(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.pending_county {
        Some(ref fips) => vec![Line::from(vec![
            Span::styled(spinner_frame(app.tick), styles::title_style()),
            Span::styled(format!(" Loading county {}...", fips), styles::muted_style()),
        ])],
        None => vec![Line::from(vec![
            Span::styled("Press ", styles::muted_style()),
            Span::styled("[o]", styles::help_key_style()),
            Span::styled(" to open a county by FIPS code", styles::muted_style()),
        ])],
    };

    let area = centered_line(area);
    frame.render_widget(Paragraph::new(lines).centered(), area);
}

// ============================================================================
// Summary
// ============================================================================

fn render_summary(frame: &mut Frame, report: &ReportView, area: Rect) {
    let metrics = report.summary_metrics();
    let height = metrics.len() as u16 + 7;
    let card = super::render::centered_rect_fixed(SUMMARY_WIDTH, height, area);
    let interior = SUMMARY_WIDTH.saturating_sub(4) as usize;

    let mut lines = vec![
        Line::from(Span::styled(
            truncate_string(report.county_name(), interior),
            styles::title_style(),
        )),
        Line::from(Span::styled(report.header_line(), styles::muted_style())),
        Line::from(""),
    ];

    for metric in &metrics {
        lines.push(metric_line(metric, interior));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[Enter]", styles::help_key_style()),
        Span::styled(" Show Detailed Report", styles::help_desc_style()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), card);
}

/// Label on the left, value right-aligned to `width`.
fn metric_line(metric: &Metric, width: usize) -> Line<'static> {
    let label = format!(" {}", metric.label);
    let padding = width.saturating_sub(label.chars().count() + metric.value.chars().count());
    Line::from(vec![
        Span::styled(label, styles::muted_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(metric.value.clone(), styles::value_style()),
    ])
}

// ============================================================================
// Full report
// ============================================================================

fn render_full(frame: &mut Frame, app: &App, report: &ReportView, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                          // Header
            Constraint::Length(5),                          // Quick stats
            Constraint::Min(REPORT_YEARS.len() as u16 + 2), // Trend chart
            Constraint::Length(7),                          // Indicators
            Constraint::Length(1),                          // Actions
        ])
        .split(area);

    render_header(frame, report, chunks[0]);
    render_tiles(frame, report, chunks[1]);
    render_chart(frame, app, report, chunks[2]);
    render_indicators(frame, report, chunks[3]);
    render_actions(frame, chunks[4]);
}

fn render_header(frame: &mut Frame, report: &ReportView, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            format!(" {}", report.county_name()),
            styles::title_style(),
        )),
        Line::from(Span::styled(
            format!(" {}", report.header_line()),
            styles::muted_style(),
        )),
    ];

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_tiles(frame: &mut Frame, report: &ReportView, area: Rect) {
    let metrics = report.full_metrics();
    let constraints = vec![Constraint::Ratio(1, metrics.len() as u32); metrics.len()];
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (metric, tile) in metrics.iter().zip(tiles.iter()) {
        let width = tile.width.saturating_sub(2) as usize;
        let mut lines = vec![
            Line::from(Span::styled(
                truncate_string(&metric.label, width),
                styles::muted_style(),
            )),
            Line::from(Span::styled(metric.value.clone(), styles::value_style())),
        ];
        if let Some(ref note) = metric.note {
            lines.push(Line::from(Span::styled(
                truncate_string(note, width),
                styles::muted_style(),
            )));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(false));

        frame.render_widget(Paragraph::new(lines).block(block), *tile);
    }
}

fn render_chart(frame: &mut Frame, app: &App, report: &ReportView, area: Rect) {
    let first = REPORT_YEARS[0];
    let last = REPORT_YEARS[REPORT_YEARS.len() - 1];
    let title = format!(" Drug Overdose Trend ({}-{}) ", first, last);

    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = match report.chart_rows() {
        Some(rows) => rows,
        None => {
            let line = Line::from(vec![
                Span::styled(spinner_frame(app.tick), styles::title_style()),
                Span::styled(" Loading trend data...", styles::muted_style()),
            ]);
            frame.render_widget(Paragraph::new(line).centered(), centered_line(inner));
            return;
        }
    };

    if rows.is_empty() {
        let message = match report.status() {
            SeriesStatus::Partial { .. } => "Trend data could not be loaded",
            _ => "No trend data available",
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message, styles::muted_style())).centered(),
            centered_line(inner),
        );
        return;
    }

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(1); rows.len()])
        .split(inner);

    for (row, row_area) in rows.iter().zip(row_areas.iter()) {
        let parts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(6), Constraint::Min(10)])
            .split(*row_area);

        frame.render_widget(
            Paragraph::new(Span::styled(format!(" {}", row.year), styles::muted_style())),
            parts[0],
        );

        let gauge = Gauge::default()
            .gauge_style(styles::bar_style(row.suppressed))
            .ratio(row.ratio().clamp(0.0, 1.0))
            .label(row.label.clone());
        frame.render_widget(gauge, parts[1]);
    }
}

fn render_indicators(frame: &mut Frame, report: &ReportView, area: Rect) {
    let header = Row::new([Cell::from("Indicator"), Cell::from("Value")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = report
        .indicator_rows()
        .into_iter()
        .map(|row| {
            Row::new(vec![Cell::from(row.label), Cell::from(row.value)])
                .style(styles::list_item_style())
        })
        .collect();

    let widths = [Constraint::Percentage(60), Constraint::Percentage(40)];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(" Socioeconomic Indicators ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );

    frame.render_widget(table, area);
}

fn render_actions(frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [c]", styles::help_key_style()),
        Span::styled(" Copy Link  ", styles::help_desc_style()),
        Span::styled("[s]", styles::help_key_style()),
        Span::styled(" Download Data (CSV)  ", styles::help_desc_style()),
        Span::styled("[Esc]", styles::help_key_style()),
        Span::styled(" Back to Summary", styles::help_desc_style()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// A single line vertically centered in `area`.
fn centered_line(area: Rect) -> Rect {
    Rect::new(area.x, area.y + area.height / 2, area.width, area.height.min(1))
}
