use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, List, ListItem, Paragraph};
use ratatui::{Frame, Terminal};

use super::{UsageReport, WEEKDAY_LABELS};

const MAX_BARS: usize = 10;
const BAR_COLORS: [Color; 5] = [
    Color::Cyan,
    Color::LightGreen,
    Color::Yellow,
    Color::Magenta,
    Color::LightBlue,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewMode {
    Programs,
    Hours,
    Weekdays,
    Dates,
    Frequency,
}

impl ViewMode {
    fn next(self) -> Self {
        match self {
            ViewMode::Programs => ViewMode::Hours,
            ViewMode::Hours => ViewMode::Weekdays,
            ViewMode::Weekdays => ViewMode::Dates,
            ViewMode::Dates => ViewMode::Frequency,
            ViewMode::Frequency => ViewMode::Programs,
        }
    }

    fn title(self) -> &'static str {
        match self {
            ViewMode::Programs => "Active time per program",
            ViewMode::Hours => "Active time per hour of day",
            ViewMode::Weekdays => "Active time per weekday",
            ViewMode::Dates => "Active time per day",
            ViewMode::Frequency => "Segments per program",
        }
    }
}

pub struct ReportApp {
    report: UsageReport,
    view: ViewMode,
}

impl ReportApp {
    pub fn new(report: UsageReport) -> Self {
        Self {
            report,
            view: ViewMode::Programs,
        }
    }

    pub fn run(mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;

            if !event::poll(Duration::from_millis(200))? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Tab => self.view = self.view.next(),
                    KeyCode::Char('p') => self.view = ViewMode::Programs,
                    KeyCode::Char('h') => self.view = ViewMode::Hours,
                    KeyCode::Char('w') => self.view = ViewMode::Weekdays,
                    KeyCode::Char('d') => self.view = ViewMode::Dates,
                    KeyCode::Char('f') => self.view = ViewMode::Frequency,
                    _ => {}
                }
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(10),
                Constraint::Length(10),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.draw_bar_chart(frame, chunks[0]);
        self.draw_detail_list(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn bar_data(&self) -> Vec<(String, u64)> {
        match self.view {
            ViewMode::Programs => self
                .report
                .by_program
                .iter()
                .take(MAX_BARS)
                .map(|(name, secs)| (name.clone(), *secs as u64))
                .collect(),
            ViewMode::Hours => self
                .report
                .by_hour
                .iter()
                .enumerate()
                .map(|(hour, secs)| (format!("{:02}", hour), *secs as u64))
                .collect(),
            ViewMode::Weekdays => self
                .report
                .by_weekday
                .iter()
                .enumerate()
                .map(|(day, secs)| (WEEKDAY_LABELS[day].to_string(), *secs as u64))
                .collect(),
            ViewMode::Dates => {
                let skip = self.report.by_date.len().saturating_sub(MAX_BARS);
                self.report
                    .by_date
                    .iter()
                    .skip(skip)
                    .map(|(date, secs)| (date.format("%m-%d").to_string(), *secs as u64))
                    .collect()
            }
            ViewMode::Frequency => self
                .report
                .frequency
                .iter()
                .take(MAX_BARS)
                .map(|(name, count)| (name.clone(), *count))
                .collect(),
        }
    }

    fn draw_bar_chart(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let data = self.bar_data();
        if data.iter().all(|(_, value)| *value == 0) {
            let empty = Paragraph::new("No activity recorded yet. Start the tracker!")
                .block(Block::default().borders(Borders::ALL).title(self.view.title()));
            frame.render_widget(empty, area);
            return;
        }

        let bar_width = if area.width < 80 { 5 } else { 8 };
        let bars: Vec<Bar> = data
            .iter()
            .enumerate()
            .map(|(i, (label, value))| {
                let value_label = match self.view {
                    ViewMode::Frequency => value.to_string(),
                    _ => format_duration(*value),
                };
                Bar::default()
                    .value(*value)
                    .label(Line::from(truncate(label, bar_width as usize)))
                    .text_value(value_label)
                    .style(Style::default().fg(BAR_COLORS[i % BAR_COLORS.len()]))
                    .value_style(Style::default().fg(Color::White))
            })
            .collect();

        let chart = BarChart::default()
            .block(Block::default().borders(Borders::ALL).title(self.view.title()))
            .bar_width(bar_width)
            .bar_gap(1)
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, area);
    }

    fn draw_detail_list(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let items: Vec<ListItem> = self
            .bar_data()
            .into_iter()
            .filter(|(_, value)| *value > 0)
            .map(|(label, value)| {
                let display = match self.view {
                    ViewMode::Frequency => format!("  {} - {} segments", label, value),
                    _ => format!("  {} - {}", label, format_duration(value)),
                };
                ListItem::new(Line::from(display))
            })
            .collect();

        let list =
            List::new(items).block(Block::default().borders(Borders::ALL).title("Details"));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let summary = format!(
            "active {} | idle {} | Tab/p/h/w/d/f switch view | q quit",
            format_duration(self.report.active_secs as u64),
            format_duration(self.report.idle_secs as u64),
        );
        let footer = Paragraph::new(summary).block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, area);
    }
}

fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h{}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", secs)
    }
}

fn truncate(label: &str, width: usize) -> String {
    if label.len() <= width {
        label.to_string()
    } else {
        let cut: String = label.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_format_compactly() {
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(150), "2m");
        assert_eq!(format_duration(3660), "1h1m");
    }

    #[test]
    fn long_labels_are_truncated() {
        assert_eq!(truncate("Firefox", 8), "Firefox");
        assert_eq!(truncate("Visual Studio Code", 8), "Visual …");
    }

    #[test]
    fn views_cycle_through_all_modes() {
        let mut view = ViewMode::Programs;
        for _ in 0..5 {
            view = view.next();
        }
        assert_eq!(view, ViewMode::Programs);
    }
}
