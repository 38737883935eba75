use super::*;

#[test]
fn premul_rounds_channels() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c, Rgba8Premul { r: 128, g: 64, b: 0, a: 128 });
    assert_eq!(
        Rgba8Premul::from_straight([10, 20, 30, 255]),
        Rgba8Premul { r: 10, g: 20, b: 30, a: 255 }
    );
}

#[test]
fn device_pixels_scale_and_round_up() {
    assert_eq!(SurfaceSize::new(100.5, 20.0).device_pixels(), (101, 20));
    assert_eq!(
        SurfaceSize::new(100.0, 20.0).with_scale(2.0).device_pixels(),
        (200, 40)
    );
}

#[test]
fn device_pixels_tolerate_garbage_input() {
    assert_eq!(SurfaceSize::new(-5.0, f64::NAN).device_pixels(), (0, 0));
    assert_eq!(
        SurfaceSize::new(10.0, 10.0).with_scale(0.0).device_pixels(),
        (10, 10)
    );
}
