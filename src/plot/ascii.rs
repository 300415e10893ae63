//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed points: `o`
//! - identity line (fitted == observed): `-`
//! - optional highlights: `O` (overvalued), `U` (undervalued)

use std::collections::HashSet;

use crate::domain::DistrictResidual;
use crate::io::export::ResultPoint;
use crate::report::Rankings;

/// Highlight class for a plotted point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    None,
    Over,
    Under,
}

/// One point on the predicted-vs-actual plane.
#[derive(Debug, Clone, Copy)]
pub struct PlotPoint {
    pub y_fit: f64,
    pub y_obs: f64,
    pub highlight: Highlight,
}

/// Render a plot for in-memory evaluation residuals.
pub fn render_ascii_plot(
    residuals: &[DistrictResidual],
    width: usize,
    height: usize,
    rankings: Option<&Rankings>,
) -> String {
    let (over_ids, under_ids) = rankings
        .map(|r| {
            (
                r.overvalued.iter().map(|x| x.index).collect::<HashSet<_>>(),
                r.undervalued.iter().map(|x| x.index).collect::<HashSet<_>>(),
            )
        })
        .unwrap_or_default();

    let points: Vec<PlotPoint> = residuals
        .iter()
        .map(|r| PlotPoint {
            y_fit: r.y_fit,
            y_obs: r.row.median_house_value,
            highlight: if over_ids.contains(&r.index) {
                Highlight::Over
            } else if under_ids.contains(&r.index) {
                Highlight::Under
            } else {
                Highlight::None
            },
        })
        .collect();

    render_pred_actual_plot(&points, width, height)
}

/// Render a plot from a re-loaded results CSV (no highlights).
pub fn render_ascii_plot_from_results(points: &[ResultPoint], width: usize, height: usize) -> String {
    let points: Vec<PlotPoint> = points
        .iter()
        .map(|p| PlotPoint {
            y_fit: p.y_fit,
            y_obs: p.y_obs,
            highlight: Highlight::None,
        })
        .collect();
    render_pred_actual_plot(&points, width, height)
}

/// Core renderer: scatter on the predicted/actual plane plus the
/// identity line a perfect model would sit on.
pub fn render_pred_actual_plot(points: &[PlotPoint], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = fit_range(points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = obs_range(points, x_min, x_max).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the identity line first (so points can overlay).
    let line = sample_identity(x_min, x_max, width);
    draw_polyline(&mut grid, &line, x_min, x_max, y_min, y_max);

    for p in points {
        let x = map_x(p.y_fit, x_min, x_max, width);
        let y = map_y(p.y_obs, y_min, y_max, height);
        let ch = match p.highlight {
            Highlight::Over => 'O',
            Highlight::Under => 'U',
            Highlight::None => 'o',
        };
        grid[y][x] = ch;
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: fitted=[{x_min:.2}, {x_max:.2}] | observed=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn fit_range(points: &[PlotPoint]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for p in points {
        min_x = min_x.min(p.y_fit);
        max_x = max_x.max(p.y_fit);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn obs_range(points: &[PlotPoint], x_min: f64, x_max: f64) -> Option<(f64, f64)> {
    // The identity line spans [x_min, x_max] on the y axis too.
    let mut min_y = x_min;
    let mut max_y = x_max;
    for p in points {
        min_y = min_y.min(p.y_obs);
        max_y = max_y.max(p.y_obs);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn sample_identity(x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let v = x_min + u * (x_max - x_min);
        out.push((v, v));
    }
    out
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(v: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((v - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(v: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((v - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(
    grid: &mut [Vec<char>],
    line: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    if line.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in line {
        let xx = map_x(x, x_min, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, xx, yy, '-');
        } else {
            grid[yy][xx] = '-';
        }
        prev = Some((xx, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_golden_snapshot_small() {
        let points = vec![
            PlotPoint {
                y_fit: 0.0,
                y_obs: 0.0,
                highlight: Highlight::None,
            },
            PlotPoint {
                y_fit: 4.0,
                y_obs: 4.0,
                highlight: Highlight::None,
            },
        ];

        let txt = render_pred_actual_plot(&points, 10, 5);
        let expected = concat!(
            "Plot: fitted=[0.00, 4.00] | observed=[-0.20, 4.20]\n",
            "         o\n",
            "      --- \n",
            "    --    \n",
            " ---      \n",
            "o         \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn highlights_use_distinct_marks() {
        let points = vec![
            PlotPoint {
                y_fit: 0.0,
                y_obs: 10.0,
                highlight: Highlight::Over,
            },
            PlotPoint {
                y_fit: 10.0,
                y_obs: 0.0,
                highlight: Highlight::Under,
            },
        ];
        let txt = render_pred_actual_plot(&points, 12, 6);
        assert!(txt.contains('O'));
        assert!(txt.contains('U'));
    }

    #[test]
    fn degenerate_input_still_renders() {
        let points = vec![PlotPoint {
            y_fit: 3.0,
            y_obs: 3.0,
            highlight: Highlight::None,
        }];
        let txt = render_pred_actual_plot(&points, 10, 5);
        assert!(txt.starts_with("Plot:"));
        assert_eq!(txt.lines().count(), 6);
    }
}
