use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::telemetry::error::GrapherError;
use crate::telemetry::scale::ValueRange;
use crate::telemetry::view::{FrameSnapshot, GraphStyle};
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub graph: GraphStyle,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 400,
            background: RGBColor(10, 10, 10),
            graph: GraphStyle::Line,
        }
    }
}
/// Horizontal and vertical grid divisions drawn behind the series.
const GRID_ROWS: usize = 4;
const GRID_COLUMNS: usize = 8;
/// Draws the visible channels of a frame on its own value range.
///
/// Only shapes are drawn. plotters is built without a font backend, so the
/// chart carries no caption, tick labels or legend.
pub fn render_frame_png(frame: &FrameSnapshot, style: PlotStyle) -> Result<Vec<u8>, GrapherError> {
    if frame.is_empty() {
        return Err(GrapherError::NothingToExport);
    }
    if style.width == 0 || style.height == 0 {
        return Err(GrapherError::Plot("image size must be non-zero".into()));
    }
    let mut buffer = vec![0u8; style.width as usize * style.height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let range = if frame.range.span() > 0.0 && frame.range.span().is_finite() {
            frame.range
        } else {
            ValueRange::new(frame.range.min - 50.0, frame.range.min + 50.0)
        };
        let x_max = frame.time_span().max(f64::EPSILON);
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .build_cartesian_2d(0f64..x_max, range.min..range.max)?;
        let grid = WHITE.mix(0.1);
        chart.draw_series((0..=GRID_ROWS).map(|i| {
            let y = range.min + range.span() * i as f64 / GRID_ROWS as f64;
            PathElement::new(vec![(0.0, y), (x_max, y)], grid)
        }))?;
        chart.draw_series((0..=GRID_COLUMNS).map(|i| {
            let x = x_max * i as f64 / GRID_COLUMNS as f64;
            PathElement::new(vec![(x, range.min), (x, range.max)], grid)
        }))?;
        for channel in (0..frame.channel_count()).filter(|c| frame.is_visible(*c)) {
            let [r, g, b] = frame.colors.get(channel).copied().unwrap_or([255, 255, 255]);
            let color = RGBColor(r, g, b);
            let points = frame.series(channel);
            match style.graph {
                GraphStyle::Line => {
                    chart.draw_series(LineSeries::new(
                        points.iter().map(|p| (p[0], p[1])),
                        &color,
                    ))?;
                }
                GraphStyle::Dots => {
                    chart.draw_series(
                        points
                            .iter()
                            .map(|p| Circle::new((p[0], p[1]), 2, color.filled())),
                    )?;
                }
                GraphStyle::Bars => {
                    let base = range.min.max(0.0).min(range.max);
                    chart.draw_series(points.iter().map(|p| {
                        PathElement::new(vec![(p[0], base), (p[0], p[1])], color)
                    }))?;
                }
            }
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
pub fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, GrapherError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| GrapherError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::buffer::Sample;
    fn frame() -> FrameSnapshot {
        let samples = (0..32)
            .map(|i| Sample::new(vec![i as f64, 100.0 - i as f64]))
            .collect();
        FrameSnapshot::from_table(
            samples,
            vec!["A".into(), "B".into()],
            vec![[0x67, 0xd8, 0xef], [0xd0, 0x26, 0x62]],
            ValueRange::new(0.0, 100.0),
        )
    }
    #[test]
    fn renders_every_style_to_png() {
        for graph in [GraphStyle::Line, GraphStyle::Dots, GraphStyle::Bars] {
            let style = PlotStyle {
                graph,
                ..PlotStyle::default()
            };
            let png = render_frame_png(&frame(), style).unwrap();
            assert_eq!(&png[1..4], b"PNG");
        }
    }
    #[test]
    fn renders_odd_sizes_flat_ranges_and_hidden_channels() {
        let mut flat = FrameSnapshot::from_table(
            (0..5).map(|_| Sample::new(vec![3.0, 3.0])).collect(),
            vec!["A".into(), "B".into()],
            vec![[0x67, 0xd8, 0xef], [0xd0, 0x26, 0x62]],
            ValueRange::new(3.0, 3.0),
        );
        flat.visible = vec![false, true];
        for graph in [GraphStyle::Line, GraphStyle::Dots, GraphStyle::Bars] {
            let style = PlotStyle {
                width: 321,
                height: 123,
                graph,
                ..PlotStyle::default()
            };
            let png = render_frame_png(&flat, style).unwrap();
            let decoded = image::load_from_memory(&png).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (321, 123));
        }
    }
    #[test]
    fn zero_sized_image_is_an_error() {
        let style = PlotStyle {
            width: 0,
            ..PlotStyle::default()
        };
        assert!(matches!(render_frame_png(&frame(), style), Err(GrapherError::Plot(_))));
    }
    #[test]
    fn empty_frame_is_rejected() {
        let empty = FrameSnapshot::from_table(Vec::new(), vec!["A".into()], vec![[0, 0, 0]], ValueRange::new(0.0, 1.0));
        assert!(render_frame_png(&empty, PlotStyle::default()).is_err());
    }
}
