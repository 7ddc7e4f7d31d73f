//! Integration tests: cart-pendulum under successive loop closure.

use ms_core::StateVector;
use ms_plants::{PendulumController, PendulumDesign, PendulumParams, Uncertainty, pendulum};
use ms_sim::{SimOptions, SimRecord, StopSignal, run, run_with_stop};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn opts(t_end: f64) -> SimOptions {
    SimOptions {
        t_start: 0.0,
        t_end,
        t_plot: 0.1,
        check_finite: true,
    }
}

#[test]
fn designed_controller_balances_and_tracks_across_draws() {
    let params = PendulumParams::default();
    let ctrl = PendulumController::design(&params, &PendulumDesign::default()).unwrap();

    for seed in 0..5 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut plant =
            pendulum::build_plant(&params, &Uncertainty::default(), &mut rng).unwrap();
        let mut ctrl = ctrl.clone();
        let mut record = SimRecord::new();

        let summary = run(&mut plant, &mut ctrl, &|_t: f64| 0.5, &mut record, &opts(20.0)).unwrap();
        assert_eq!(summary.samples, 200);

        let z = plant.state()[0];
        assert!((z - 0.5).abs() < 0.05, "seed {seed}: cart at {z}");
        assert!(record.max_abs_component(1) < 0.05, "seed {seed}: rod fell");
        assert!(record.max_abs_input() <= params.f_max);
    }
}

#[test]
fn uncontrolled_pendulum_falls_over() {
    let params = PendulumParams {
        theta0: 0.05,
        ..PendulumParams::default()
    };
    let mut rng = StdRng::seed_from_u64(0);
    let mut plant = pendulum::build_plant(&params, &Uncertainty::none(), &mut rng).unwrap();
    let mut zero = |_r: f64, _x: &StateVector<4>| 0.0;

    run(&mut plant, &mut zero, &|_t: f64| 0.0, &mut SimRecord::new(), &opts(2.0)).unwrap();
    assert!(plant.state()[1] > 1.0);
}

#[test]
fn stop_signal_ends_run_early() {
    let params = PendulumParams::default();
    let mut rng = StdRng::seed_from_u64(0);
    let mut plant = pendulum::build_plant(&params, &Uncertainty::none(), &mut rng).unwrap();
    let mut ctrl = PendulumController::design(&params, &PendulumDesign::default()).unwrap();

    let stop = StopSignal::new();
    let trigger = stop.clone();
    let mut record = SimRecord::new();
    // Raise the stop from inside the reference source after five samples
    let reference = move |t: f64| {
        if t >= 0.45 {
            trigger.stop();
        }
        0.0
    };

    let summary =
        run_with_stop(&mut plant, &mut ctrl, &reference, &mut record, &opts(50.0), &stop).unwrap();
    assert!(summary.stopped);
    assert_eq!(summary.samples, 6);
    assert_eq!(record.len(), 6);
    assert_eq!(summary.steps, 60);
}
