//! Exercises the camera controls and the spotlight that follows them
//! through the public API.

use cgmath::{InnerSpace, Point3};
use winit::keyboard::KeyCode;

use lantern::camera::{Camera, InputState};
use lantern::config::Config;
use lantern::pipelines::spotlight::SpotlightUniform;

fn camera_from(settings: &Config) -> Camera {
    Camera::new(
        Point3::new(0.0, 0.0, 5.0),
        settings.move_speed,
        settings.mouse_sensitivity,
        settings.fov,
        settings.min_fov,
        settings.max_fov,
    )
}

#[test]
fn walking_forward_moves_along_the_view_direction() {
    let settings = Config::default();
    let mut camera = camera_from(&settings);
    let mut input = InputState::default();
    assert!(input.handle_key(KeyCode::KeyW, true));

    camera.process_keyboard(&input, 1.0);
    // One second at the default speed, straight down -Z.
    assert!((camera.position.z - (5.0 - settings.move_speed)).abs() < 1e-5);
    assert!(camera.position.x.abs() < 1e-5);
}

#[test]
fn strafing_is_perpendicular_to_the_view_direction() {
    let settings = Config::default();
    let mut camera = camera_from(&settings);
    let mut input = InputState::default();
    input.handle_key(KeyCode::KeyD, true);

    let front = camera.front();
    camera.process_keyboard(&input, 1.0);
    let moved = camera.position - Point3::new(0.0, 0.0, 5.0);
    assert!(moved.dot(front).abs() < 1e-5);
    assert!(moved.magnitude() > 0.0);
}

#[test]
fn unbound_keys_are_ignored() {
    let mut input = InputState::default();
    assert!(!input.handle_key(KeyCode::KeyQ, true));
    assert!(!input.forward && !input.backward && !input.left && !input.right);
}

#[test]
fn scroll_zoom_respects_the_configured_limits() {
    let settings = Config::default();
    let mut camera = camera_from(&settings);
    camera.process_scroll(-1000.0);
    assert_eq!(camera.fov(), settings.max_fov);
    camera.process_scroll(1000.0);
    assert_eq!(camera.fov(), settings.min_fov);
}

#[test]
fn raw_mouse_motion_turns_the_camera_without_cursor_positions() {
    // A locked cursor delivers raw motion deltas only, never cursor
    // positions; look controls must work from deltas alone.
    let settings = Config::default();
    let mut camera = camera_from(&settings);
    let before = camera.front();

    camera.process_mouse_delta(100.0, -40.0);
    let after = camera.front();
    assert!((after - before).magnitude() > 0.1);
    assert!(camera.pitch() > 0.0);
}

#[test]
fn spotlight_tracks_camera_after_mouse_movement() {
    let settings = Config::default();
    let mut camera = camera_from(&settings);
    // First sample only seeds the cursor position.
    camera.process_mouse_movement(400.0, 300.0);
    camera.process_mouse_movement(500.0, 300.0);

    let mut light = SpotlightUniform::new();
    light.follow_camera(&camera);
    assert_eq!(light.position, [0.0, 0.0, 5.0]);
    // The uploaded direction points back at the light, opposite the view.
    let front = camera.front();
    for (l, f) in light.direction.iter().zip([-front.x, -front.y, -front.z]) {
        assert!((l - f).abs() < 1e-5);
    }
}
