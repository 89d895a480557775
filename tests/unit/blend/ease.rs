use super::*;

#[test]
fn endpoints_are_fixed() {
    for ease in [
        BlendEase::Linear,
        BlendEase::InQuad,
        BlendEase::OutQuad,
        BlendEase::InOutQuad,
        BlendEase::InCubic,
        BlendEase::OutCubic,
        BlendEase::InOutCubic,
        BlendEase::Smooth,
    ] {
        assert!((ease.apply(0.0) - 0.0).abs() < 1e-12, "{ease:?}");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-12, "{ease:?}");
    }
}

#[test]
fn input_is_clamped() {
    assert_eq!(BlendEase::Linear.apply(-3.0), 0.0);
    assert_eq!(BlendEase::InQuad.apply(7.0), 1.0);
}

#[test]
fn midpoints_match_curves() {
    assert!((BlendEase::InQuad.apply(0.5) - 0.25).abs() < 1e-12);
    assert!((BlendEase::OutQuad.apply(0.5) - 0.75).abs() < 1e-12);
    assert!((BlendEase::Smooth.apply(0.5) - 0.5).abs() < 1e-12);
}

#[test]
fn parse_accepts_snake_case_names() {
    assert_eq!(BlendEase::parse("in_out_cubic"), Some(BlendEase::InOutCubic));
    assert_eq!(BlendEase::parse("smooth"), Some(BlendEase::Smooth));
    assert_eq!(BlendEase::parse("bouncy"), None);
}
