//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for choosing the candidate feature
//! set, imputation strategy, and holdout split, then renders the
//! predicted-vs-actual chart and the over/under-valued highlights.
//!
//! The CSV is ingested once at startup; every settings change refits in
//! memory through the same pipeline as `hv fit`.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::cli::FitArgs;
use crate::domain::{ImputeStrategy, ModelSpec};
use crate::error::AppError;
use crate::io::ingest::IngestedData;

mod plotters_chart;

use plotters_chart::HvPlottersChart;

/// Start the TUI.
pub fn run(args: FitArgs) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::compute(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(args)?;
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::compute(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::compute(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: crate::domain::FitConfig,
    ingest: IngestedData,
    selected_field: usize,
    status: String,
    run: Option<crate::app::pipeline::RunOutput>,
}

impl App {
    fn new(args: FitArgs) -> Result<Self, AppError> {
        let config = crate::app::fit_config_from_args(&args);

        let csv_path = crate::data::fetch::ensure_housing_csv(config.csv_path.as_deref())?;
        let ingest = crate::io::ingest::load_districts(&csv_path)?;

        let mut app = Self {
            config,
            ingest,
            selected_field: 0,
            status: "Fitting...".to_string(),
            run: None,
        };
        app.refit()?;
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::compute(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::compute(format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::compute(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < 3 {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1)?,
            KeyCode::Right => self.adjust_field(1)?,
            KeyCode::Char('r') => {
                self.config.split_seed = self.config.split_seed.wrapping_add(1);
                self.refit()?;
                self.status = format!("Resplit with seed {}.", self.config.split_seed);
            }
            KeyCode::Char('m') => {
                self.config.model_spec = next_model_spec(self.config.model_spec);
                self.refit()?;
                self.status = format!("model: {:?}", self.config.model_spec);
            }
            _ => {}
        }

        Ok(false)
    }

    fn adjust_field(&mut self, delta: i32) -> Result<(), AppError> {
        match self.selected_field {
            0 => {
                self.config.model_spec = if delta >= 0 {
                    next_model_spec(self.config.model_spec)
                } else {
                    prev_model_spec(self.config.model_spec)
                };
                self.refit()?;
                self.status = format!("model: {:?}", self.config.model_spec);
            }
            1 => {
                self.config.impute = match self.config.impute {
                    ImputeStrategy::Median => ImputeStrategy::Mean,
                    ImputeStrategy::Mean => ImputeStrategy::Median,
                };
                self.refit()?;
                self.status = format!("impute: {}", self.config.impute.display_name());
            }
            2 => {
                let step = if delta >= 0 { 0.05 } else { -0.05 };
                let next = (self.config.test_ratio + step).clamp(0.05, 0.5);
                self.config.test_ratio = (next * 100.0).round() / 100.0;
                self.refit()?;
                self.status = format!("test ratio: {:.0}%", self.config.test_ratio * 100.0);
            }
            3 => {
                let next = if delta >= 0 {
                    self.config.top_n.saturating_add(5)
                } else {
                    self.config.top_n.saturating_sub(5)
                };
                self.config.top_n = next.max(5);
                self.refit()?;
                self.status = format!("top: {}", self.config.top_n);
            }
            _ => {}
        }
        Ok(())
    }

    fn refit(&mut self) -> Result<(), AppError> {
        let run = crate::app::pipeline::run_fit_with_data(&self.config, self.ingest.clone())?;
        self.run = Some(run);
        Ok(())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("hv", Style::default().fg(Color::Cyan)),
            Span::raw(" — housing value screen"),
        ]));

        let model_name = self
            .run
            .as_ref()
            .map(|r| r.selection.best.model.display_name.clone())
            .unwrap_or_else(|| "-".to_string());

        lines.push(Line::from(Span::styled(
            format!(
                "model: {model_name} | impute: {} | holdout: {:.0}% (seed {}) | rows: {}",
                self.config.impute.display_name(),
                self.config.test_ratio * 100.0,
                self.config.split_seed,
                self.ingest.rows_used,
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some(run) = &self.run {
            lines.push(Line::from(Span::styled(
                format!(
                    "holdout rmse={:.0} mae={:.0} r2={:.3} | train bic={:.1}",
                    run.holdout.rmse,
                    run.holdout.mae,
                    run.holdout.r2,
                    run.selection.best.quality.bic,
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(8)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Predicted vs actual").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let (identity, points, over, under, x_bounds, y_bounds) = chart_series(run);

        let (chart_rect, insets) = chart_layout(inner);
        let widget = HvPlottersChart {
            identity: &identity,
            points: &points,
            overvalued: &over,
            undervalued: &under,
            x_bounds,
            y_bounds,
            x_label: "fitted ($)",
            y_label: "observed ($)",
            fmt_x: fmt_axis_dollars,
            fmt_y: fmt_axis_dollars,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items = Vec::new();
        items.push(ListItem::new(format!("Model: {:?}", self.config.model_spec)));
        items.push(ListItem::new(format!(
            "Impute: {}",
            self.config.impute.display_name()
        )));
        items.push(ListItem::new(format!(
            "Holdout: {:.0}%",
            self.config.test_ratio * 100.0
        )));
        items.push(ListItem::new(format!("Top-N: {}", self.config.top_n)));

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  r resplit  m model  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Build chart series for Plotters.
fn chart_series(
    run: &crate::app::pipeline::RunOutput,
) -> (
    Vec<(f64, f64)>,
    Vec<(f64, f64)>,
    Vec<(f64, f64)>,
    Vec<(f64, f64)>,
    [f64; 2],
    [f64; 2],
) {
    let mut points = Vec::with_capacity(run.residuals.len());
    for r in &run.residuals {
        points.push((r.y_fit, r.row.median_house_value));
    }

    let over = run
        .rankings
        .overvalued
        .iter()
        .map(|r| (r.y_fit, r.row.median_house_value))
        .collect::<Vec<_>>();
    let under = run
        .rankings
        .undervalued
        .iter()
        .map(|r| (r.y_fit, r.row.median_house_value))
        .collect::<Vec<_>>();

    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in &points {
        lo = lo.min(x).min(y);
        hi = hi.max(x).max(y);
    }
    if !lo.is_finite() || !hi.is_finite() || hi <= lo {
        lo = 0.0;
        hi = 1.0;
    }
    let pad = ((hi - lo).abs() * 0.05).max(1e-12);
    let lo = lo - pad;
    let hi = hi + pad;

    // A shared range keeps the identity line at 45 degrees.
    let x_bounds = [lo, hi];
    let y_bounds = [lo, hi];

    let n = 200usize;
    let mut identity = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let v = lo + u * (hi - lo);
        identity.push((v, v));
    }

    (identity, points, over, under, x_bounds, y_bounds)
}

fn next_model_spec(cur: ModelSpec) -> ModelSpec {
    match cur {
        ModelSpec::Auto => ModelSpec::Income,
        ModelSpec::Income => ModelSpec::Geo,
        ModelSpec::Geo => ModelSpec::Full,
        ModelSpec::Full => ModelSpec::Auto,
        ModelSpec::All => ModelSpec::Auto,
    }
}

fn prev_model_spec(cur: ModelSpec) -> ModelSpec {
    match cur {
        ModelSpec::Auto => ModelSpec::Full,
        ModelSpec::Income => ModelSpec::Auto,
        ModelSpec::Geo => ModelSpec::Income,
        ModelSpec::Full => ModelSpec::Geo,
        ModelSpec::All => ModelSpec::Auto,
    }
}

fn fmt_axis_dollars(v: f64) -> String {
    format!("{:.0}k", v / 1000.0)
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis_dollars(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_dollars(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("fitted ($)")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("observed ($)")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
