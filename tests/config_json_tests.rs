use std::time::Duration;

use gridplot::api::{
    DEFAULT_ZOOM_TO_FIT_MARGIN, FIGURE_CONFIG_JSON_SCHEMA_V1, FigureConfig, PlotGutter,
    PlotOptions, SchedulerConfig,
};
use gridplot::core::{AspectPolicy, DEFAULT_RENORMALIZATION_BITS, LayoutPadding, Rect, Viewport};
use gridplot::error::PlotError;
use gridplot::render::Font;
use gridplot::telemetry;

#[test]
fn versioned_payload_round_trips() {
    let config = FigureConfig::new(Viewport::new(1280, 720))
        .with_framebuffer(Viewport::new(2560, 1440))
        .with_layout_padding(LayoutPadding::uniform(0.02))
        .with_max_ticks(8, 5)
        .with_renormalization_bits(18)
        .with_label_font(Font::new("mono", 14.0))
        .with_zoom_to_fit_margin(1.2);

    let json = config.to_json_pretty().expect("serialize");
    assert!(json.contains(&format!("\"schema_version\": {FIGURE_CONFIG_JSON_SCHEMA_V1}")));

    let parsed = FigureConfig::from_json_str(&json).expect("parse");
    assert_eq!(parsed, config);
}

#[test]
fn bare_config_fills_defaults() {
    let parsed = FigureConfig::from_json_str(r#"{"window":{"width":640,"height":480}}"#)
        .expect("parse");

    assert_eq!(parsed, FigureConfig::new(Viewport::new(640, 480)));
    assert_eq!(parsed.framebuffer_size(), Viewport::new(640, 480));
    assert_eq!(parsed.renormalization_bits, DEFAULT_RENORMALIZATION_BITS);
    assert_eq!(parsed.zoom_to_fit_margin, DEFAULT_ZOOM_TO_FIT_MARGIN);
    assert_eq!(parsed.plot_gutter, PlotGutter::default());
}

#[test]
fn unsupported_schema_version_is_rejected() {
    let json = r#"{"schema_version":7,"config":{"window":{"width":640,"height":480}}}"#;
    let err = FigureConfig::from_json_str(json).expect_err("future schema");
    assert!(matches!(err, PlotError::Config(message) if message.contains('7')));
}

#[test]
fn malformed_json_is_a_config_error() {
    assert!(matches!(
        FigureConfig::from_json_str("{ not json"),
        Err(PlotError::Config(_))
    ));
}

#[test]
fn invalid_values_fail_validation() {
    assert!(matches!(
        FigureConfig::from_json_str(r#"{"window":{"width":0,"height":480}}"#),
        Err(PlotError::InvalidViewport { width: 0, .. })
    ));

    let gutter = FigureConfig::new(Viewport::new(640, 480)).with_plot_gutter(PlotGutter {
        left: 0.6,
        bottom: 0.0,
    });
    assert!(matches!(gutter.validate(), Err(PlotError::Config(_))));

    let bits = FigureConfig::new(Viewport::new(640, 480)).with_renormalization_bits(60);
    assert!(matches!(bits.validate(), Err(PlotError::Config(_))));

    let margin = FigureConfig::new(Viewport::new(640, 480)).with_zoom_to_fit_margin(0.0);
    assert!(matches!(margin.validate(), Err(PlotError::Config(_))));
}

#[test]
fn plot_options_deserialize_with_defaults() {
    let options: PlotOptions =
        serde_json::from_str(r#"{"aspect":"Square","limits":{"l":0.0,"b":1.0,"r":2.0,"t":3.0}}"#)
            .expect("options");
    assert_eq!(options.aspect, AspectPolicy::Square);
    assert_eq!(options.limits, Some(Rect::new(0.0, 1.0, 2.0, 3.0)));
    assert!(options.visible);
    assert_eq!(options.border_width, 1.0);
    assert_eq!(options.share_x, None);
}

#[test]
fn scheduler_config_defaults_and_validation() {
    let config: SchedulerConfig = serde_json::from_str("{}").expect("scheduler config");
    assert_eq!(config, SchedulerConfig::default());
    assert_eq!(config.idle_sleep, Duration::from_millis(5));

    let zero = SchedulerConfig::default().with_fps_window(Duration::ZERO);
    assert!(matches!(zero.validate(), Err(PlotError::Config(_))));
}

#[test]
fn tracing_helpers_are_safe_to_call_repeatedly() {
    let first = telemetry::init_default_tracing();
    let second = telemetry::init_default_tracing();
    assert!(!second);
    if cfg!(not(feature = "telemetry")) {
        assert!(!first);
    }
    assert!(!telemetry::init_tracing_with_filter(telemetry::DEFAULT_FILTER));
}
