use std::io::Cursor;

use anyhow::Result;
use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};

use crate::presenter::ChartSeries;

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 630;
const MARGIN: f32 = 60.0;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const LINE: Rgba<u8> = Rgba([9, 9, 11, 255]);
const GRID: Rgba<u8> = Rgba([228, 228, 231, 255]);

/// Draw the ranking series as a PNG line chart. Better (smaller) rankings are
/// drawn higher when the series asks for a reversed axis.
pub fn render_chart_png(series: &ChartSeries) -> Result<Vec<u8>> {
    if series.values.is_empty() {
        anyhow::bail!("no points to draw");
    }

    let mut img: RgbaImage = ImageBuffer::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    draw_grid(&mut img);

    let points = plot_points(series);
    for pair in points.windows(2) {
        draw_line_segment_mut(&mut img, pair[0], pair[1], LINE);
        // Second pass one pixel down for a 2px stroke
        draw_line_segment_mut(
            &mut img,
            (pair[0].0, pair[0].1 + 1.0),
            (pair[1].0, pair[1].1 + 1.0),
            LINE,
        );
    }

    for &(x, y) in &points {
        let center = (x.round() as i32, y.round() as i32);
        draw_filled_circle_mut(&mut img, center, 4, BACKGROUND);
        draw_hollow_circle_mut(&mut img, center, 4, LINE);
    }

    // Encode as PNG
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    img.write_to(&mut cursor, image::ImageFormat::Png)?;

    Ok(buffer)
}

/// Pixel positions of each value, left to right.
fn plot_points(series: &ChartSeries) -> Vec<(f32, f32)> {
    let min = series.values.iter().copied().min().unwrap_or(0) as f32;
    let max = series.values.iter().copied().max().unwrap_or(0) as f32;
    let span = (max - min).max(1.0);

    let plot_w = WIDTH as f32 - 2.0 * MARGIN;
    let plot_h = HEIGHT as f32 - 2.0 * MARGIN;
    let n = series.values.len();

    series
        .values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x = if n == 1 {
                WIDTH as f32 / 2.0
            } else {
                MARGIN + plot_w * i as f32 / (n - 1) as f32
            };

            // 0.0 = top of the plot area
            let t = if max == min {
                0.5
            } else {
                (v as f32 - min) / span
            };
            let t = if series.reverse_y { t } else { 1.0 - t };

            (x, MARGIN + plot_h * t)
        })
        .collect()
}

fn draw_grid(img: &mut RgbaImage) {
    let rows = 5;
    let plot_h = HEIGHT as f32 - 2.0 * MARGIN;
    for r in 0..=rows {
        let y = MARGIN + plot_h * r as f32 / rows as f32;
        draw_line_segment_mut(img, (MARGIN, y), (WIDTH as f32 - MARGIN, y), GRID);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: Vec<u64>, reverse_y: bool) -> ChartSeries {
        ChartSeries {
            labels: values.iter().map(|_| String::new()).collect(),
            values,
            reverse_y,
        }
    }

    #[test]
    fn reversed_axis_puts_better_rank_higher() {
        let points = plot_points(&series(vec![100, 80], true));
        // smaller ranking -> smaller y (higher on screen)
        assert!(points[1].1 < points[0].1);

        let points = plot_points(&series(vec![100, 80], false));
        assert!(points[1].1 > points[0].1);
    }

    #[test]
    fn single_point_is_centered() {
        let points = plot_points(&series(vec![42], true));
        assert_eq!(points, vec![(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0)]);
    }

    #[test]
    fn encodes_png() {
        let png = render_chart_png(&series(vec![300, 250, 260, 200], true)).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), WIDTH);
        assert_eq!(decoded.height(), HEIGHT);
    }

    #[test]
    fn empty_series_is_an_error() {
        assert!(render_chart_png(&series(vec![], true)).is_err());
    }
}
