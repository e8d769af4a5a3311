use approx::assert_abs_diff_eq;
use gridplot::api::{Figure, FigureConfig, PlotOptions};
use gridplot::core::{
    AspectPolicy, CellSpec, CoordinateTransform, DEFAULT_RENORMALIZATION_BITS, DataPoint, Rect,
    SeriesStyle, Viewport,
};
use gridplot::render::NullRenderer;

fn unit_transform() -> CoordinateTransform {
    CoordinateTransform::new(
        Rect::new(0.0, 0.0, 1.0, 1.0),
        Rect::new(0.0, 0.0, 1000.0, 1000.0),
        AspectPolicy::None,
        DEFAULT_RENORMALIZATION_BITS,
    )
    .expect("transform")
}

#[test]
fn small_pan_keeps_renormalization_matrix() {
    let mut transform = unit_transform();
    let before = *transform.renormalization_matrix();

    let update = transform
        .set_limits(Rect::new(0.5, 0.0, 1.5, 1.0))
        .expect("limits");

    assert!(!update.renormalized);
    assert_eq!(transform.renormalization_generation(), 1);
    assert_eq!(*transform.renormalization_matrix(), before);
}

#[test]
fn far_pan_rebuilds_renormalization_matrix() {
    let mut transform = unit_transform();

    let update = transform
        .set_limits(Rect::new(1.0e7, 0.0, 1.0e7 + 1.0, 1.0))
        .expect("limits");

    assert!(update.renormalized);
    assert_eq!(transform.renormalization_generation(), 2);
    let (rx, ry) = transform.renormalize_point(DataPoint::new(1.0e7 + 0.5, 0.5));
    assert_abs_diff_eq!(rx, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(ry, 0.0, epsilon = 1e-12);
}

#[test]
fn deep_zoom_rebuilds_renormalization_matrix() {
    let mut transform = unit_transform();

    let update = transform
        .set_limits(Rect::new(0.0, 0.0, 1.0e-6, 1.0e-6))
        .expect("limits");

    assert!(update.renormalized);
    let view = transform.view_matrix();
    assert_eq!(view.entry(0, 0), 1.0);
    assert_eq!(view.entry(1, 1), 1.0);
    assert_eq!(view.entry(0, 3), 0.0);
    assert_eq!(view.entry(1, 3), 0.0);
}

#[test]
fn renormalized_view_stays_within_precision_budget() {
    let mut transform = unit_transform();
    let budget = transform.renormalization_threshold();
    for limits in [
        Rect::new(3.0, 3.0, 4.0, 4.0),
        Rect::new(1.0e5, -2.0e5, 1.0e5 + 10.0, -2.0e5 + 10.0),
        Rect::new(-1.0e9, 0.0, -1.0e9 + 1.0e-3, 1.0e-3),
    ] {
        transform.set_limits(limits).expect("limits");
        let (ml, mb) = transform.renormalization_matrix().apply(limits.l, limits.b);
        let (mr, mt) = transform.renormalization_matrix().apply(limits.r, limits.t);
        let (pw, ph) = transform.pixel_extent();
        let view_w = 2.0 * transform.view_inverse().entry(0, 0);
        let view_h = 2.0 * transform.view_inverse().entry(1, 1);
        assert!(ml.abs().max(mr.abs()) <= view_w * budget / pw);
        assert!(mb.abs().max(mt.abs()) <= view_h * budget / ph);
    }
}

#[test]
fn screen_mapping_survives_renormalization() {
    let mut transform = unit_transform();
    transform
        .set_limits(Rect::new(1.0e7, 0.0, 1.0e7 + 1.0, 1.0))
        .expect("limits");
    let screen = transform.data_to_screen(DataPoint::new(1.0e7 + 0.25, 0.75));
    assert_abs_diff_eq!(screen.x, 250.0, epsilon = 1e-3);
    assert_abs_diff_eq!(screen.y, 750.0, epsilon = 1e-9);
}

#[test]
fn series_vertices_follow_renormalization() {
    let mut figure = Figure::new(
        FigureConfig::new(Viewport::new(800, 600)),
        NullRenderer::default(),
    )
    .expect("figure");
    let plot = figure
        .add_plot(
            CellSpec::cell(1, 1, 1),
            PlotOptions::default().with_limits(0.0, 0.0, 1.0, 1.0),
        )
        .expect("plot");
    let series = figure
        .plot_mut(plot)
        .expect("plot")
        .add_lines(
            vec![DataPoint::new(1.0e7, 0.0), DataPoint::new(1.0e7 + 1.0, 1.0)],
            SeriesStyle::default(),
        )
        .expect("series");

    figure
        .set_limits(plot, Rect::new(1.0e7, 0.0, 1.0e7 + 1.0, 1.0))
        .expect("limits");

    let plot = figure.plot(plot).expect("plot");
    assert_eq!(plot.transform().renormalization_generation(), 2);
    let vertices = plot
        .artifact(series)
        .and_then(|artifact| artifact.as_series())
        .expect("series artifact")
        .renormalized_vertices();
    assert_eq!(vertices.len(), 2);
    for (vertex, expected) in vertices.iter().zip([[-1.0_f32, -1.0], [1.0, 1.0]]) {
        assert_abs_diff_eq!(vertex[0], expected[0], epsilon = 1e-4);
        assert_abs_diff_eq!(vertex[1], expected[1], epsilon = 1e-4);
    }
}
