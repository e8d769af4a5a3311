use gridplot::core::{
    AspectPolicy, CoordinateTransform, DEFAULT_RENORMALIZATION_BITS, DataPoint, Rect,
};
use proptest::prelude::*;

fn tolerance(value: f64) -> f64 {
    1e-6 * value.abs().max(1.0)
}

proptest! {
    #[test]
    fn screen_roundtrip_recovers_data_point(
        center_x in -1.0e9f64..1.0e9,
        center_y in -1.0e9f64..1.0e9,
        width in 1.0e-3f64..1.0e6,
        height in 1.0e-3f64..1.0e6,
        fx in 0.0f64..1.0,
        fy in 0.0f64..1.0,
        pixel_w in 50.0f64..4_000.0,
        pixel_h in 50.0f64..4_000.0
    ) {
        let limits = Rect::from_center(DataPoint::new(center_x, center_y), width, height);
        let transform = CoordinateTransform::new(
            limits,
            Rect::new(10.0, 20.0, 10.0 + pixel_w, 20.0 + pixel_h),
            AspectPolicy::None,
            DEFAULT_RENORMALIZATION_BITS,
        )
        .expect("transform");

        let point = DataPoint::new(limits.l + fx * limits.width(), limits.b + fy * limits.height());
        let back = transform.screen_to_data(transform.data_to_screen(point));

        prop_assert!((back.x - point.x).abs() <= tolerance(point.x));
        prop_assert!((back.y - point.y).abs() <= tolerance(point.y));
    }

    #[test]
    fn roundtrip_holds_after_panning_away(
        start_extent in 1.0e-2f64..1.0e3,
        target_x in -1.0e8f64..1.0e8,
        target_y in -1.0e8f64..1.0e8,
        extent in 1.0e-2f64..1.0e3,
        fx in 0.0f64..1.0,
        fy in 0.0f64..1.0
    ) {
        let mut transform = CoordinateTransform::new(
            Rect::new(0.0, 0.0, start_extent, start_extent),
            Rect::new(0.0, 0.0, 800.0, 600.0),
            AspectPolicy::None,
            DEFAULT_RENORMALIZATION_BITS,
        )
        .expect("transform");
        let limits = Rect::from_center(DataPoint::new(target_x, target_y), extent, extent);
        transform.set_limits(limits).expect("limits");

        let point = DataPoint::new(limits.l + fx * extent, limits.b + fy * extent);
        let back = transform.screen_to_data(transform.data_to_screen(point));

        prop_assert!((back.x - point.x).abs() <= tolerance(point.x));
        prop_assert!((back.y - point.y).abs() <= tolerance(point.y));
    }

    #[test]
    fn renormalized_magnitudes_stay_within_budget(
        target_x in -1.0e9f64..1.0e9,
        target_y in -1.0e9f64..1.0e9,
        extent in 1.0e-4f64..1.0e4
    ) {
        let mut transform = CoordinateTransform::new(
            Rect::new(-1.0, -1.0, 1.0, 1.0),
            Rect::new(0.0, 0.0, 1_000.0, 1_000.0),
            AspectPolicy::None,
            DEFAULT_RENORMALIZATION_BITS,
        )
        .expect("transform");
        let limits = Rect::from_center(DataPoint::new(target_x, target_y), extent, extent);
        transform.set_limits(limits).expect("limits");

        let (ml, mb) = transform.renormalization_matrix().apply(limits.l, limits.b);
        let (mr, mt) = transform.renormalization_matrix().apply(limits.r, limits.t);
        let (pw, ph) = transform.pixel_extent();
        let budget = transform.renormalization_threshold();
        let view_w = 2.0 * transform.view_inverse().entry(0, 0);
        let view_h = 2.0 * transform.view_inverse().entry(1, 1);

        prop_assert!(ml.abs().max(mr.abs()) <= view_w * budget / pw);
        prop_assert!(mb.abs().max(mt.abs()) <= view_h * budget / ph);
    }
}
