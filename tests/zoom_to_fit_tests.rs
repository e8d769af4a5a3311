use approx::assert_abs_diff_eq;
use gridplot::api::{Figure, FigureConfig, PlotOptions};
use gridplot::core::{AspectPolicy, CellSpec, DataPoint, PlotId, Rect, SeriesStyle, Viewport};
use gridplot::render::NullRenderer;

fn figure_with_plot(options: PlotOptions) -> (Figure<NullRenderer>, PlotId) {
    let mut figure = Figure::new(
        FigureConfig::new(Viewport::new(800, 600)),
        NullRenderer::default(),
    )
    .expect("figure");
    let plot = figure
        .add_plot(CellSpec::cell(1, 1, 1), options)
        .expect("plot");
    (figure, plot)
}

#[test]
fn single_point_is_centered_with_nonzero_extent() {
    let (mut figure, plot) = figure_with_plot(PlotOptions::default());
    figure
        .plot_mut(plot)
        .expect("plot")
        .add_points(vec![DataPoint::new(3.0, 3.0)], SeriesStyle::default())
        .expect("points");

    assert!(figure.zoom_to_fit(plot).expect("fit"));

    let limits = figure.plot(plot).expect("plot").limits();
    assert_eq!(limits.center(), DataPoint::new(3.0, 3.0));
    assert!(limits.width() > 0.0);
    assert!(limits.height() > 0.0);
    assert_eq!(limits, Rect::new(2.5, 2.5, 3.5, 3.5));
}

#[test]
fn empty_plot_leaves_view_unchanged() {
    let (mut figure, plot) = figure_with_plot(PlotOptions::default().with_limits(0.0, 0.0, 4.0, 2.0));
    let before = figure.plot(plot).expect("plot").limits();

    assert!(!figure.zoom_to_fit(plot).expect("fit"));
    assert_eq!(figure.plot(plot).expect("plot").limits(), before);
}

#[test]
fn margin_expands_data_bounds_about_center() {
    let (mut figure, plot) = figure_with_plot(PlotOptions::default());
    figure
        .plot_mut(plot)
        .expect("plot")
        .add_lines(
            vec![DataPoint::new(0.0, 0.0), DataPoint::new(10.0, 20.0)],
            SeriesStyle::default(),
        )
        .expect("lines");

    assert!(figure.zoom_to_fit_with_margin(plot, 1.5).expect("fit"));

    let limits = figure.plot(plot).expect("plot").limits();
    assert_abs_diff_eq!(limits.l, -2.5, epsilon = 1e-12);
    assert_abs_diff_eq!(limits.r, 12.5, epsilon = 1e-12);
    assert_abs_diff_eq!(limits.b, -5.0, epsilon = 1e-12);
    assert_abs_diff_eq!(limits.t, 25.0, epsilon = 1e-12);
}

#[test]
fn non_finite_values_and_hidden_series_are_ignored() {
    let (mut figure, plot) = figure_with_plot(PlotOptions::default());
    let target = figure.plot_mut(plot).expect("plot");
    target
        .add_lines(
            vec![
                DataPoint::new(1.0, 1.0),
                DataPoint::new(f64::NAN, f64::NAN),
                DataPoint::new(f64::INFINITY, f64::NEG_INFINITY),
                DataPoint::new(f64::NAN, 1.5),
                DataPoint::new(2.0, 2.0),
            ],
            SeriesStyle::default(),
        )
        .expect("lines");
    let hidden = target
        .add_lines(
            vec![DataPoint::new(-1_000.0, -1_000.0), DataPoint::new(1_000.0, 1_000.0)],
            SeriesStyle::default(),
        )
        .expect("hidden lines");
    target.set_artifact_visible(hidden, false).expect("hide");

    assert!(figure.zoom_to_fit_with_margin(plot, 1.0).expect("fit"));
    assert_eq!(
        figure.plot(plot).expect("plot").limits(),
        Rect::new(1.0, 1.0, 2.0, 2.0)
    );
}

#[test]
fn square_aspect_grows_the_short_side() {
    let (mut figure, plot) =
        figure_with_plot(PlotOptions::default().with_aspect(AspectPolicy::Square));
    figure
        .plot_mut(plot)
        .expect("plot")
        .add_lines(
            vec![DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 1.0)],
            SeriesStyle::default(),
        )
        .expect("lines");

    assert!(figure.zoom_to_fit_with_margin(plot, 1.0).expect("fit"));

    let target = figure.plot(plot).expect("plot");
    let limits = target.limits();
    let (pw, ph) = target.transform().pixel_extent();
    assert_abs_diff_eq!(limits.width() / limits.height(), pw / ph, epsilon = 1e-9);
    assert!(limits.l <= 0.0 && limits.r >= 1.0);
    assert!(limits.b <= 0.0 && limits.t >= 1.0);
    assert_abs_diff_eq!(limits.center().x, 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(limits.center().y, 0.5, epsilon = 1e-12);
}

#[test]
fn fit_reaches_shared_partners() {
    let mut figure = Figure::new(
        FigureConfig::new(Viewport::new(800, 600)),
        NullRenderer::default(),
    )
    .expect("figure");
    let left = figure
        .add_plot(CellSpec::cell(1, 2, 1), PlotOptions::default())
        .expect("left");
    let right = figure
        .add_plot(CellSpec::cell(1, 2, 2), PlotOptions::default().sharing_y(left))
        .expect("right");
    figure
        .plot_mut(left)
        .expect("left")
        .add_lines(
            vec![DataPoint::new(0.0, 40.0), DataPoint::new(1.0, 60.0)],
            SeriesStyle::default(),
        )
        .expect("lines");

    assert!(figure.zoom_to_fit_with_margin(left, 1.0).expect("fit"));

    let right_limits = figure.plot(right).expect("right").limits();
    assert_eq!((right_limits.b, right_limits.t), (40.0, 60.0));
}
