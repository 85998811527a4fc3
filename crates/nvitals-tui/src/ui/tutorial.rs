use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use nvitals_core::tutorial::TutorialWizard;

use crate::ui::styles;

const OVERLAY_WIDTH: u16 = 72;
const OVERLAY_HEIGHT: u16 = 18;

pub fn render_overlay(frame: &mut Frame, wizard: &TutorialWizard) {
    let Some(step) = wizard.current_step() else {
        return;
    };

    let area = super::render::centered_rect_fixed(OVERLAY_WIDTH, OVERLAY_HEIGHT, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(step.title, styles::title_style())),
        Line::from(""),
    ];

    for item in step.content {
        lines.push(Line::from(vec![
            Span::styled("  • ", styles::highlight_style()),
            Span::styled(*item, styles::help_desc_style()),
        ]));
    }
    lines.push(Line::from(""));

    if wizard.is_last_step() {
        let mark = if wizard.dismiss_permanently() { "x" } else { " " };
        lines.push(Line::from(vec![
            Span::styled(format!("  [{}] ", mark), styles::help_key_style()),
            Span::styled("Do not show tutorial again", styles::help_desc_style()),
            Span::styled("  (space)", styles::muted_style()),
        ]));
        lines.push(Line::from(""));
    }

    lines.push(step_dots(wizard));
    lines.push(Line::from(""));
    lines.push(button_line(wizard));

    let block = Block::default()
        .title(format!(" {} ", wizard.progress_label()))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn step_dots(wizard: &TutorialWizard) -> Line<'static> {
    let current = wizard.current_index();
    let mut spans = vec![Span::raw("  ")];
    for i in 0..wizard.step_count() {
        let is_current = current == Some(i);
        let dot = if is_current { "● " } else { "○ " };
        spans.push(Span::styled(dot, styles::step_dot_style(is_current)));
    }
    Line::from(spans)
}

fn button_line(wizard: &TutorialWizard) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    if !wizard.is_first_step() {
        spans.push(Span::styled("[←]", styles::help_key_style()));
        spans.push(Span::styled(" Previous   ", styles::help_desc_style()));
    }
    spans.push(Span::styled("[→]", styles::help_key_style()));
    spans.push(Span::styled(
        format!(" {}   ", wizard.next_label()),
        styles::help_desc_style(),
    ));
    spans.push(Span::styled("[Esc]", styles::help_key_style()));
    spans.push(Span::styled(" Close", styles::muted_style()));
    Line::from(spans)
}
