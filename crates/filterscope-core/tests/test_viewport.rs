mod common;

use approx::assert_relative_eq;

use filterscope_core::viewport::{render, scaled_size, Resample, ViewportId, ViewportState, Viewports};

use common::rgb_frame;

#[test]
fn test_default_state() {
    let state = ViewportState::default();
    assert_eq!(state.zoom(), 1.0);
    assert_eq!(state.pan(), (0.0, 0.0));
}

#[test]
fn test_zoom_steps_compound() {
    let mut state = ViewportState::default();
    state.zoom_by(1.1);
    state.zoom_by(1.1);
    assert_relative_eq!(state.zoom(), 1.21, epsilon = 1e-5);
    state.zoom_by(0.9);
    assert_relative_eq!(state.zoom(), 1.089, epsilon = 1e-5);
}

#[test]
fn test_zoom_clamped_to_range() {
    let mut state = ViewportState::default();
    for _ in 0..50 {
        state.zoom_by(1.1);
    }
    assert_eq!(state.zoom(), 3.0);

    for _ in 0..100 {
        state.zoom_by(0.9);
    }
    assert_relative_eq!(state.zoom(), 0.1, epsilon = 1e-6);
}

#[test]
fn test_set_zoom_clamps_and_ignores_non_finite() {
    let mut state = ViewportState::default();
    state.set_zoom(5.0);
    assert_eq!(state.zoom(), 3.0);
    state.set_zoom(0.01);
    assert_relative_eq!(state.zoom(), 0.1, epsilon = 1e-6);
    state.set_zoom(1.5);
    assert_eq!(state.zoom(), 1.5);
    state.set_zoom(f32::NAN);
    assert_eq!(state.zoom(), 1.5);
}

#[test]
fn test_zoom_ignores_bad_factors() {
    let mut state = ViewportState::default();
    state.zoom_by(0.0);
    state.zoom_by(-2.0);
    state.zoom_by(f32::NAN);
    state.zoom_by(f32::INFINITY);
    assert_eq!(state.zoom(), 1.0);
}

#[test]
fn test_pan_accumulates_and_reset_restores() {
    let mut state = ViewportState::default();
    state.pan_by(10.0, -4.0);
    state.pan_by(2.5, 1.0);
    state.zoom_by(2.0);
    assert_eq!(state.pan(), (12.5, -3.0));

    state.reset();
    assert_eq!(state, ViewportState::default());
}

#[test]
fn test_viewports_are_independent() {
    let mut views = Viewports::default();
    views.get_mut(ViewportId::Original).zoom_by(2.0);
    assert_eq!(views.get(ViewportId::Original).zoom(), 2.0);
    assert_eq!(views.get(ViewportId::Filtered).zoom(), 1.0);
}

#[test]
fn test_scaled_size_never_zero() {
    assert_eq!(scaled_size(640, 480, 0.5), (320, 240));
    assert_eq!(scaled_size(3, 2, 0.1), (1, 1));
}

#[test]
fn test_render_scales_and_carries_pan() {
    let frame = rgb_frame(20, 10, [30, 60, 90]);
    let mut state = ViewportState::default();
    state.zoom_by(1.5);
    state.pan_by(7.0, 8.0);

    let view = render(&frame, &state, Resample::Linear);
    assert_eq!((view.width(), view.height()), (30, 15));
    assert_eq!(view.offset, (7.0, 8.0));
    assert_eq!(view.image.get_pixel(10, 10).0, [30, 60, 90]);
}

#[test]
fn test_render_unit_zoom_is_exact_copy() {
    let frame = rgb_frame(5, 4, [1, 2, 3]);
    let view = render(&frame, &ViewportState::default(), Resample::Nearest);
    assert_eq!(view.image, frame.to_rgb_image());
}

#[test]
fn test_render_gray_frame_as_rgb() {
    let frame = common::gray_frame(4, 4, 200);
    let view = render(&frame, &ViewportState::default(), Resample::Linear);
    assert_eq!(view.image.get_pixel(0, 0).0, [200, 200, 200]);
}
