// crates/core/src/charts.rs
//! PNG chart rendering for aggregate views.
//!
//! Charts are drawn straight into an `RgbImage`: bars, histogram buckets and
//! scatter points over a white canvas with a black axis frame and a gray
//! zero line. Rendering is in memory; [`Chart::save`] is the only I/O.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use crate::error::PipelineError;

pub const SENTIMENT_DISTRIBUTION_CHART: &str = "sentiment_distribution_vader.png";
pub const SCORE_HISTOGRAM_CHART: &str = "sentiment_score_distribution_vader.png";
pub const TOP_COMPANIES_CHART: &str = "top_10_company_sentiment_vader.png";
pub const LOCATIONS_CHART: &str = "locations_sentiment.png";
pub const RATING_SCATTER_CHART: &str = "ratings_vs_sentiment.png";
pub const REVENUE_SCATTER_CHART: &str = "revenue_vs_sentiment.png";
pub const CROSSCHECK_COMPANY_CHART: &str = "company_sentiment_bar.png";
pub const CROSSCHECK_HISTOGRAM_CHART: &str = "sentiment_histogram.png";

/// Charts the dashboard shows, in display order.
pub const DASHBOARD_CHARTS: [&str; 6] = [
    SENTIMENT_DISTRIBUTION_CHART,
    SCORE_HISTOGRAM_CHART,
    TOP_COMPANIES_CHART,
    LOCATIONS_CHART,
    RATING_SCATTER_CHART,
    REVENUE_SCATTER_CHART,
];

pub mod colors {
    use image::Rgb;

    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    pub const GRAY: Rgb<u8> = Rgb([160, 160, 160]);
    pub const GREEN: Rgb<u8> = Rgb([68, 170, 110]);
    pub const RED: Rgb<u8> = Rgb([200, 70, 70]);
    pub const BLUE: Rgb<u8> = Rgb([40, 90, 200]);
    pub const PURPLE: Rgb<u8> = Rgb([128, 0, 128]);
    pub const PINK: Rgb<u8> = Rgb([255, 160, 190]);
    pub const SKY_BLUE: Rgb<u8> = Rgb([135, 206, 235]);
    pub const ORANGE: Rgb<u8> = Rgb([255, 165, 0]);
}

/// Canvas size and plot margin.
#[derive(Debug, Clone, Copy)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            margin: 40,
        }
    }
}

/// A rendered chart and the file name it is saved under.
pub struct Chart {
    pub file_name: &'static str,
    pub image: RgbImage,
}

impl Chart {
    pub fn new(file_name: &'static str, image: RgbImage) -> Self {
        Self { file_name, image }
    }

    /// Save as PNG under `dir`, returning the written path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, PipelineError> {
        let path = dir.join(self.file_name);
        self.image.save(&path).map_err(|e| PipelineError::Chart {
            path: path.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "Chart saved");
        Ok(path)
    }
}

/// Value-to-pixel mapping for one axis.
#[derive(Debug, Clone, Copy)]
struct Axis {
    min: f64,
    max: f64,
    start_px: f64,
    len_px: f64,
}

impl Axis {
    fn new(min: f64, max: f64, start_px: u32, len_px: u32) -> Self {
        let (min, max) = if (max - min).abs() < f64::EPSILON {
            (min - 1.0, max + 1.0)
        } else {
            (min, max)
        };
        Self {
            min,
            max,
            start_px: start_px as f64,
            len_px: len_px as f64,
        }
    }

    fn to_px(self, v: f64) -> f64 {
        self.start_px + (v - self.min) / (self.max - self.min) * self.len_px
    }
}

struct Canvas {
    config: ChartConfig,
    image: RgbImage,
}

impl Canvas {
    fn new(config: ChartConfig) -> Self {
        Self {
            config,
            image: RgbImage::from_pixel(config.width, config.height, colors::WHITE),
        }
    }

    fn plot_width(&self) -> u32 {
        self.config.width.saturating_sub(2 * self.config.margin).max(1)
    }

    fn plot_height(&self) -> u32 {
        self.config.height.saturating_sub(2 * self.config.margin).max(1)
    }

    /// Vertical axis mapping values to rows; larger values sit higher.
    fn y_axis(&self, min: f64, max: f64) -> Axis {
        Axis::new(min, max, self.config.margin, self.plot_height())
    }

    fn x_axis(&self, min: f64, max: f64) -> Axis {
        Axis::new(min, max, self.config.margin, self.plot_width())
    }

    fn row_for(&self, y: Axis, v: f64) -> i64 {
        // flip: pixel rows grow downward
        let from_top = y.to_px(v) - y.start_px;
        (y.start_px + y.len_px - from_top).round() as i64
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x >= 0 && y >= 0 && (x as u32) < self.config.width && (y as u32) < self.config.height {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
        let (xa, xb) = (x0.min(x1), x0.max(x1));
        let (ya, yb) = (y0.min(y1), y0.max(y1));
        for y in ya..=yb {
            for x in xa..=xb {
                self.put(x, y, color);
            }
        }
    }

    fn hline(&mut self, y: i64, color: Rgb<u8>) {
        let m = self.config.margin as i64;
        let right = m + self.plot_width() as i64;
        for x in m..=right {
            self.put(x, y, color);
        }
    }

    fn frame(&mut self) {
        let m = self.config.margin as i64;
        let right = m + self.plot_width() as i64;
        let bottom = m + self.plot_height() as i64;
        for x in m..=right {
            self.put(x, m, colors::BLACK);
            self.put(x, bottom, colors::BLACK);
        }
        for y in m..=bottom {
            self.put(m, y, colors::BLACK);
            self.put(right, y, colors::BLACK);
        }
    }

    fn finish(mut self) -> RgbImage {
        self.frame();
        self.image
    }
}

/// Vertical bars, one per value, drawn from a zero baseline.
///
/// Negative values hang below the baseline.
pub fn bar_chart(config: ChartConfig, values: &[f64], color: Rgb<u8>) -> RgbImage {
    bar_chart_colored(config, &values.iter().map(|v| (*v, color)).collect::<Vec<_>>())
}

/// Vertical bars with a color per bar.
pub fn bar_chart_colored(config: ChartConfig, bars: &[(f64, Rgb<u8>)]) -> RgbImage {
    let mut canvas = Canvas::new(config);
    if bars.is_empty() {
        return canvas.finish();
    }

    let lo = bars.iter().map(|b| b.0).fold(0.0_f64, f64::min);
    let hi = bars.iter().map(|b| b.0).fold(0.0_f64, f64::max);
    let y = canvas.y_axis(lo, hi);
    let baseline = canvas.row_for(y, 0.0);

    let slot = canvas.plot_width() as f64 / bars.len() as f64;
    let left = canvas.config.margin as f64;
    for (i, (value, color)) in bars.iter().enumerate() {
        let x0 = (left + i as f64 * slot + slot * 0.15).round() as i64;
        let x1 = (left + (i + 1) as f64 * slot - slot * 0.15).round() as i64;
        let top = canvas.row_for(y, *value);
        canvas.fill_rect(x0, baseline, x1.max(x0), top, *color);
    }
    canvas.hline(baseline, colors::GRAY);
    canvas.finish()
}

/// Count values into `bins` equal-width buckets spanning their min..max.
pub fn histogram_counts(values: &[f64], bins: usize) -> Vec<usize> {
    let bins = bins.max(1);
    let mut counts = vec![0usize; bins];
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return counts;
    }
    let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;
    for v in finite {
        let idx = if span == 0.0 {
            bins / 2
        } else {
            (((v - lo) / span) * bins as f64).floor() as usize
        };
        // the maximum lands in the last bucket
        counts[idx.min(bins - 1)] += 1;
    }
    counts
}

/// Histogram of `values` over `bins` buckets.
pub fn histogram(config: ChartConfig, values: &[f64], bins: usize, color: Rgb<u8>) -> RgbImage {
    let counts: Vec<f64> = histogram_counts(values, bins)
        .into_iter()
        .map(|c| c as f64)
        .collect();
    let mut canvas = Canvas::new(config);
    if values.is_empty() {
        return canvas.finish();
    }

    let y = canvas.y_axis(0.0, counts.iter().copied().fold(0.0, f64::max));
    let baseline = canvas.row_for(y, 0.0);
    let slot = canvas.plot_width() as f64 / counts.len() as f64;
    let left = canvas.config.margin as f64;
    for (i, count) in counts.iter().enumerate() {
        if *count == 0.0 {
            continue;
        }
        let x0 = (left + i as f64 * slot).round() as i64;
        let x1 = (left + (i + 1) as f64 * slot).round() as i64 - 1;
        let top = canvas.row_for(y, *count);
        canvas.fill_rect(x0, baseline, x1.max(x0), top, color);
        // bucket edge
        for yy in top.min(baseline)..=top.max(baseline) {
            canvas.put(x1.max(x0), yy, colors::BLACK);
        }
    }
    canvas.finish()
}

/// Scatter plot of `(x, y)` points; non-finite points are skipped.
pub fn scatter(config: ChartConfig, points: &[(f64, f64)], color: Rgb<u8>) -> RgbImage {
    let mut canvas = Canvas::new(config);
    let points: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if points.is_empty() {
        return canvas.finish();
    }

    let (x_lo, x_hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.0), hi.max(p.0)));
    let (y_lo, y_hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.1), hi.max(p.1)));
    let x_axis = canvas.x_axis(x_lo, x_hi);
    let y_axis = canvas.y_axis(y_lo, y_hi);

    if y_lo < 0.0 && y_hi > 0.0 {
        let zero = canvas.row_for(y_axis, 0.0);
        canvas.hline(zero, colors::GRAY);
    }
    for (x, y) in points {
        let px = x_axis.to_px(x).round() as i64;
        let py = canvas.row_for(y_axis, y);
        canvas.fill_rect(px - 2, py - 2, px + 2, py + 2, color);
    }
    canvas.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> ChartConfig {
        ChartConfig {
            width: 100,
            height: 80,
            margin: 10,
        }
    }

    #[test]
    fn test_histogram_counts_cover_all_values() {
        let values = [-1.0, -0.5, 0.0, 0.5, 1.0];
        let counts = histogram_counts(&values, 4);
        assert_eq!(counts.iter().sum::<usize>(), 5);
        assert_eq!(counts, vec![1, 1, 1, 2]);
    }

    #[test]
    fn test_histogram_counts_constant_and_empty() {
        assert_eq!(histogram_counts(&[0.3, 0.3], 3), vec![0, 2, 0]);
        assert_eq!(histogram_counts(&[], 3), vec![0, 0, 0]);
        assert_eq!(histogram_counts(&[f64::NAN, 1.0], 2).iter().sum::<usize>(), 1);
    }

    #[test]
    fn test_bar_chart_draws_bars() {
        let img = bar_chart(small(), &[0.5, -0.5], colors::PURPLE);
        assert_eq!(img.dimensions(), (100, 80));
        assert!(img.pixels().any(|p| *p == colors::PURPLE));
    }

    #[test]
    fn test_empty_inputs_render_blank_frame() {
        let img = bar_chart(small(), &[], colors::PURPLE);
        assert!(!img.pixels().any(|p| *p == colors::PURPLE));
        let img = scatter(small(), &[(f64::NAN, 1.0)], colors::BLUE);
        assert!(!img.pixels().any(|p| *p == colors::BLUE));
    }

    #[test]
    fn test_scatter_and_histogram_draw_marks() {
        let img = scatter(small(), &[(1.0, 0.2), (3.0, -0.4)], colors::BLUE);
        assert!(img.pixels().any(|p| *p == colors::BLUE));
        let img = histogram(small(), &[0.1, 0.2, 0.9], 5, colors::ORANGE);
        assert!(img.pixels().any(|p| *p == colors::ORANGE));
    }

    #[test]
    fn test_chart_save_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let chart = Chart::new(TOP_COMPANIES_CHART, bar_chart(small(), &[0.1], colors::PURPLE));
        let path = chart.save(dir.path()).unwrap();
        assert!(path.ends_with(TOP_COMPANIES_CHART));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_chart_save_into_missing_dir_fails() {
        let chart = Chart::new(TOP_COMPANIES_CHART, bar_chart(small(), &[0.1], colors::PURPLE));
        let err = chart.save(Path::new("/definitely/not/a/dir")).unwrap_err();
        assert!(matches!(err, PipelineError::Chart { .. }));
    }
}
