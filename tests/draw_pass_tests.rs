use approx::assert_abs_diff_eq;
use gridplot::api::{Figure, FigureConfig, PlotOptions, XLabelSide, YLabelSide};
use gridplot::core::{CellSpec, DataPoint, PixelRect, PlotId, SeriesStyle, Viewport};
use gridplot::render::{Anchor, Color, NullRenderer, PrimitiveKind};

fn figure_with_plot() -> (Figure<NullRenderer>, PlotId) {
    let mut figure = Figure::new(
        FigureConfig::new(Viewport::new(800, 600)),
        NullRenderer::default(),
    )
    .expect("figure");
    let plot = figure
        .add_plot(CellSpec::cell(1, 1, 1), PlotOptions::default())
        .expect("plot");
    (figure, plot)
}

fn full_frame(figure: &Figure<NullRenderer>) -> PixelRect {
    let fb = figure.framebuffer();
    PixelRect::new(0, 0, fb.width as i32, fb.height as i32)
}

fn is_line(kind: PrimitiveKind) -> bool {
    matches!(kind, PrimitiveKind::LineStrip { .. })
}

fn is_points(kind: PrimitiveKind) -> bool {
    matches!(kind, PrimitiveKind::Points { .. })
}

fn is_glyphs(kind: PrimitiveKind) -> bool {
    kind == PrimitiveKind::Glyphs
}

#[test]
fn border_is_drawn_first_then_tick_labels() {
    let (mut figure, plot) = figure_with_plot();
    figure.draw().expect("draw");

    let tick_count = {
        let target = figure.plot(plot).expect("plot");
        target.h_ticks().len() + target.v_ticks().len()
    };
    let full = full_frame(&figure);
    let backend = figure.backend();
    assert_eq!(backend.frames_begun, 1);
    assert_eq!(backend.frames_presented, 1);

    let border = &backend.commands[0];
    assert_eq!(border.kind, PrimitiveKind::LineStrip { width: 1.0 });
    assert_eq!(border.vertex_count, 5);
    assert_eq!(border.viewport, full);
    assert_eq!(border.color, Color::BLACK);
    assert_eq!(backend.count_kind(is_glyphs), tick_count);
    assert_eq!(backend.commands.len(), 1 + tick_count);
}

#[test]
fn series_draws_in_plot_framebuffer_rect() {
    let (mut figure, plot) = figure_with_plot();
    let red = Color::rgb(1.0, 0.0, 0.0);
    figure
        .plot_mut(plot)
        .expect("plot")
        .add_lines(
            vec![DataPoint::new(-0.5, -0.5), DataPoint::new(0.5, 0.5), DataPoint::new(0.75, 0.0)],
            SeriesStyle::default().with_color(red),
        )
        .expect("lines");
    figure.draw().expect("draw");

    let viewport = figure.plot(plot).expect("plot").framebuffer_rect();
    let last = figure.backend().commands.last().expect("commands");
    assert!(is_line(last.kind));
    assert_eq!(last.vertex_count, 3);
    assert_eq!(last.viewport, viewport);
    assert_eq!(last.color, red);
}

#[test]
fn non_finite_samples_split_the_polyline() {
    let (mut figure, plot) = figure_with_plot();
    figure
        .plot_mut(plot)
        .expect("plot")
        .add_lines(
            vec![
                DataPoint::new(-0.5, -0.5),
                DataPoint::new(0.0, 0.0),
                DataPoint::new(f64::NAN, f64::NAN),
                DataPoint::new(0.25, 0.25),
                DataPoint::new(0.5, 0.5),
                DataPoint::new(0.6, f64::INFINITY),
                DataPoint::new(0.7, 0.7),
            ],
            SeriesStyle::default(),
        )
        .expect("lines");
    figure.draw().expect("draw");

    let viewport = figure.plot(plot).expect("plot").framebuffer_rect();
    let runs: Vec<usize> = figure
        .backend()
        .commands
        .iter()
        .filter(|command| command.viewport == viewport)
        .map(|command| command.vertex_count)
        .collect();
    assert_eq!(runs, [2, 2]);
}

#[test]
fn markers_are_drawn_for_every_run_including_singletons() {
    let (mut figure, plot) = figure_with_plot();
    figure
        .plot_mut(plot)
        .expect("plot")
        .add_points(
            vec![
                DataPoint::new(0.0, 0.0),
                DataPoint::new(f64::NAN, 0.0),
                DataPoint::new(0.5, 0.5),
                DataPoint::new(0.6, 0.6),
            ],
            SeriesStyle::default(),
        )
        .expect("points");
    figure.draw().expect("draw");

    let viewport = figure.plot(plot).expect("plot").framebuffer_rect();
    let artifact_commands: Vec<_> = figure
        .backend()
        .commands
        .iter()
        .filter(|command| command.viewport == viewport)
        .collect();
    assert_eq!(artifact_commands.len(), 2);
    assert!(artifact_commands.iter().all(|command| is_points(command.kind)));
    assert_eq!(artifact_commands[0].kind, PrimitiveKind::Points { size: 3.0 });
    assert_eq!(artifact_commands[0].vertex_count, 1);
    assert_eq!(artifact_commands[1].vertex_count, 2);
}

#[test]
fn steps_expand_to_staircase() {
    let (mut figure, plot) = figure_with_plot();
    figure
        .plot_mut(plot)
        .expect("plot")
        .add_steps(
            vec![DataPoint::new(-0.5, 0.0), DataPoint::new(0.0, 0.5), DataPoint::new(0.5, -0.5)],
            SeriesStyle::default(),
        )
        .expect("steps");
    figure.draw().expect("draw");

    let last = figure.backend().commands.last().expect("commands");
    assert!(is_line(last.kind));
    assert_eq!(last.vertex_count, 5);
}

#[test]
fn reference_lines_outside_view_are_skipped() {
    let (mut figure, plot) = figure_with_plot();
    let target = figure.plot_mut(plot).expect("plot");
    target.add_hline(0.5, SeriesStyle::default()).expect("hline");
    target.add_vline(5.0, SeriesStyle::default()).expect("vline");
    target
        .add_vline(-0.25, SeriesStyle::default().with_line_width(None))
        .expect("vline");
    figure.draw().expect("draw");

    let viewport = figure.plot(plot).expect("plot").framebuffer_rect();
    let lines: Vec<_> = figure
        .backend()
        .commands
        .iter()
        .filter(|command| command.viewport == viewport)
        .collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|command| command.vertex_count == 2));
    assert_eq!(lines[1].kind, PrimitiveKind::LineStrip { width: 1.0 });
}

#[test]
fn hidden_artifacts_and_plots_are_not_drawn() {
    let (mut figure, plot) = figure_with_plot();
    let series = figure
        .plot_mut(plot)
        .expect("plot")
        .add_lines(
            vec![DataPoint::new(0.0, 0.0), DataPoint::new(0.5, 0.5)],
            SeriesStyle::default(),
        )
        .expect("lines");
    figure
        .plot_mut(plot)
        .expect("plot")
        .set_artifact_visible(series, false)
        .expect("hide series");
    figure.draw().expect("draw");
    let viewport = figure.plot(plot).expect("plot").framebuffer_rect();
    assert!(
        figure
            .backend()
            .commands
            .iter()
            .all(|command| command.viewport != viewport)
    );

    figure.plot_mut(plot).expect("plot").hide();
    figure.draw().expect("draw");
    assert!(figure.backend().commands.is_empty());
    assert_eq!(figure.backend().frames_presented, 2);
}

#[test]
fn artifacts_draw_in_insertion_order() {
    let (mut figure, plot) = figure_with_plot();
    let blue = Color::rgb(0.0, 0.0, 1.0);
    let green = Color::rgb(0.0, 1.0, 0.0);
    let target = figure.plot_mut(plot).expect("plot");
    let first = target
        .add_lines(
            vec![DataPoint::new(0.0, 0.0), DataPoint::new(0.5, 0.5)],
            SeriesStyle::default().with_color(blue),
        )
        .expect("first");
    let second = target
        .add_hline(0.0, SeriesStyle::default().with_color(green))
        .expect("second");
    assert_eq!(target.draw_order(), vec![first, second]);
    figure.draw().expect("draw");

    let colors: Vec<Color> = figure
        .backend()
        .commands
        .iter()
        .rev()
        .take(2)
        .map(|command| command.color)
        .collect();
    assert_eq!(colors, [green, blue]);
}

#[test]
fn text_geometry_is_uploaded_once() {
    let (mut figure, _plot) = figure_with_plot();
    figure.draw().expect("draw");
    let uploads = figure.backend().text_uploads;
    assert!(uploads > 0);

    figure.dirty_flag().mark();
    figure.draw().expect("draw");
    assert_eq!(figure.backend().text_uploads, uploads);
}

#[test]
fn axis_titles_sit_outside_tick_labels() {
    let (mut figure, plot) = figure_with_plot();
    let target = figure.plot_mut(plot).expect("plot");
    target.set_x_label("time [s]", XLabelSide::Bottom);
    target.set_y_label("amplitude", YLabelSide::Left);
    figure.draw().expect("draw");

    let target = figure.plot(plot).expect("plot");
    let rect = target.pixel_rect();
    let font = target.font().size_px;
    let (x, y) = (f64::from(rect.x), f64::from(rect.y));
    let (w, h) = (f64::from(rect.width), f64::from(rect.height));

    let x_title = target.x_label().expect("x title");
    assert_eq!(x_title.anchor(), Anchor::N);
    assert_abs_diff_eq!(x_title.position().x, x + w / 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(x_title.position().y, y - font - 6.0, epsilon = 1e-9);

    let widest_tick = target
        .v_tick_labels()
        .iter()
        .map(|label| label.text().chars().count() as f64 * font * 0.6)
        .fold(0.0, f64::max);
    let y_title = target.y_label().expect("y title");
    assert_eq!(y_title.anchor(), Anchor::S);
    assert_abs_diff_eq!(y_title.theta(), std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    assert_abs_diff_eq!(
        y_title.position().x,
        x - widest_tick - (font + 4.0),
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(y_title.position().y, y + h / 2.0, epsilon = 1e-9);

    let tick_count = target.h_ticks().len() + target.v_ticks().len();
    assert_eq!(figure.backend().count_kind(is_glyphs), tick_count + 2);
}

#[test]
fn moving_y_title_between_sides_keeps_south_anchor() {
    let (mut figure, plot) = figure_with_plot();
    let target = figure.plot_mut(plot).expect("plot");
    target.set_y_label("volts", YLabelSide::Right);
    target.set_y_label("volts", YLabelSide::Left);
    figure.draw().expect("draw");

    let target = figure.plot(plot).expect("plot");
    let y_title = target.y_label().expect("y title");
    assert_eq!(y_title.anchor(), Anchor::S);
    assert!(y_title.position().x < f64::from(target.pixel_rect().x));
}

#[test]
fn right_and_top_titles_are_placed_past_the_box() {
    let (mut figure, plot) = figure_with_plot();
    let target = figure.plot_mut(plot).expect("plot");
    target.set_x_label("top", XLabelSide::Top);
    target.set_y_label("right", YLabelSide::Right);
    figure.draw().expect("draw");

    let target = figure.plot(plot).expect("plot");
    let rect = target.pixel_rect();
    let font = target.font().size_px;
    let x_title = target.x_label().expect("x title");
    assert_eq!(
        x_title.position().y,
        f64::from(rect.y + rect.height) + 18.0
    );
    let y_title = target.y_label().expect("y title");
    assert_eq!(y_title.anchor(), Anchor::S);
    assert_eq!(
        y_title.position().x,
        f64::from(rect.x + rect.width) + font + 4.0
    );
}

#[test]
fn clearing_a_title_removes_it() {
    let (mut figure, plot) = figure_with_plot();
    let target = figure.plot_mut(plot).expect("plot");
    target.set_x_label("time", XLabelSide::Bottom);
    target.set_x_label("", XLabelSide::Bottom);
    assert!(target.x_label().is_none());
}

#[test]
fn free_labels_follow_window_fractions() {
    let (mut figure, _plot) = figure_with_plot();
    let label = figure
        .add_label("42 fps", 0.5, 1.0, Anchor::N)
        .expect("label");
    let position = figure.label(label).expect("label").label().position();
    assert_eq!((position.x, position.y), (400.0, 600.0));

    figure
        .resize(Viewport::new(1001, 700), Viewport::new(1001, 700))
        .expect("resize");
    let position = figure.label(label).expect("label").label().position();
    assert_eq!((position.x, position.y), (501.0, 700.0));

    figure.draw().expect("draw");
    let last = figure.backend().commands.last().expect("commands");
    assert!(is_glyphs(last.kind));
    assert_eq!(last.vertex_count, 6);

    assert!(figure.set_label_text(label, "60 fps").expect("set text"));
    assert!(!figure.set_label_text(label, "60 fps").expect("same text"));
    assert!(figure.remove_label(label));
    assert!(!figure.remove_label(label));
}

#[test]
fn draw_clears_dirty_flag_and_counts_frames() {
    let (mut figure, _plot) = figure_with_plot();
    assert!(figure.dirty_flag().is_dirty());
    figure.draw().expect("draw");
    assert!(!figure.dirty_flag().is_dirty());
    assert_eq!(figure.dirty_flag().frame_count(), 1);
}

#[test]
fn iconified_figure_skips_drawing() {
    let (mut figure, _plot) = figure_with_plot();
    figure
        .handle_event(gridplot::interaction::InputEvent::Iconified(true))
        .expect("iconify");
    figure.draw().expect("draw");
    assert_eq!(figure.backend().frames_begun, 0);
    assert!(figure.dirty_flag().is_dirty());
}
