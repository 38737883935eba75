use super::*;

const ALL: [Ease; 3] = [Ease::Linear, Ease::OutQuad, Ease::OutCubic];

#[test]
fn endpoints_are_stable() {
    for ease in ALL {
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
        assert_eq!(ease.apply(-3.0), 0.0);
        assert_eq!(ease.apply(7.0), 1.0);
        assert_eq!(ease.apply(f64::NAN), 0.0);
    }
}

#[test]
fn monotonic_dense_sweep() {
    for ease in ALL {
        let mut prev = ease.apply(0.0);
        for i in 1..=1000 {
            let v = ease.apply(f64::from(i) / 1000.0);
            assert!(v >= prev, "{ease:?} decreased at {i}");
            prev = v;
        }
    }
}

#[test]
fn out_quad_front_loads() {
    assert_eq!(Ease::OutQuad.apply(0.5), 0.75);
}

#[test]
fn progress_clamps_and_handles_zero_duration() {
    assert_eq!(progress(50.0, 100.0), 0.5);
    assert_eq!(progress(-10.0, 100.0), 0.0);
    assert_eq!(progress(500.0, 100.0), 1.0);
    assert_eq!(progress(0.0, 0.0), 1.0);
}
