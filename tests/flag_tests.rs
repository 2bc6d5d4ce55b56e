use pennant::{
    ClothConfig, ClothMesh, Edge, EdgeSet, FlagConfig, FlagError, FlagSimulation, Hoisting,
    LinkKind, Orientation, SolverConfig, StepObserver, Vec3,
};
use pennant::vec::Vec as _;

const DT: f64 = 1.0 / 60.0;

fn small_flag(orientation: Orientation) -> FlagSimulation<f64> {
    // 3 x 2 segments -> 4 columns, 3 rows.
    let cloth = ClothMesh::new(&ClothConfig::new(3.0, 2.0, 1.0, 1.0));
    FlagSimulation::new(cloth, SolverConfig::new(), orientation, Hoisting::Dexter)
}

fn assert_pins_at_rest(flag: &FlagSimulation<f64>) {
    let particles = flag.cloth().particles();
    for &idx in flag.pins() {
        assert_eq!(particles[idx].position, particles[idx].original, "pin {} drifted", idx);
    }
}

#[test]
fn pins_hold_exactly_every_frame() {
    let mut flag: FlagSimulation<f64> = FlagSimulation::from_config(&FlagConfig::default(), None);
    flag.set_wind(Vec3::new(6.0, 0.5, 2.0));
    assert_eq!(flag.pins().len(), flag.cloth().rows());

    for _ in 0..200 {
        flag.simulate(DT);
        assert_pins_at_rest(&flag);
    }
    assert!(flag.is_finite());
}

#[test]
fn pin_stride_and_duplicate_edges() {
    let mut flag = small_flag(Orientation::Horizontal);

    // Top every 2nd: 0, 2. Left every 2nd: 0, 8. Corner 0 counted once.
    flag.pin(EdgeSet::only(Edge::Top).with(Edge::Left), 2);
    let mut pins = flag.pins().to_vec();
    pins.sort_unstable();
    assert_eq!(pins, vec![0, 2, 8]);

    flag.pin(EdgeSet::only(Edge::Top), 1);
    assert_eq!(flag.pins().len(), 5);
    assert!(flag.pins().iter().all(|&i| flag.cloth().particles()[i].pinned));
}

#[test]
fn zero_spacing_falls_back_to_one() {
    let mut flag = small_flag(Orientation::Horizontal);
    flag.pin(EdgeSet::only(Edge::Right), 0);
    assert_eq!(flag.pins(), &[3, 7, 11]);
}

#[test]
fn empty_edge_set_pins_nothing() {
    let mut flag = small_flag(Orientation::Horizontal);
    flag.pin(EdgeSet::from_names(["sideways"]), 1);
    assert!(flag.pins().is_empty());
}

#[test]
fn pin_at_is_bounds_checked() {
    let mut flag = small_flag(Orientation::Horizontal);
    assert!(flag.pin_at(3, 2).is_ok());
    assert_eq!(
        flag.pin_at(4, 2),
        Err(FlagError::ParticleOutOfBounds { x: 4, y: 2, columns: 4, rows: 3 })
    );
}

#[test]
fn unpinned_flag_falls_freely() {
    let mut flag = small_flag(Orientation::Horizontal);
    flag.pin(EdgeSet::only(Edge::Left), 1);
    for _ in 0..10 {
        flag.simulate(DT);
    }
    flag.unpin();
    assert!(flag.pins().is_empty());

    for _ in 0..30 {
        flag.simulate(DT);
    }
    let hoist = flag.cloth().particle_at(0, 0).unwrap();
    assert!(!hoist.pinned);
    assert!(hoist.position.y < hoist.original.y);
}

#[test]
fn anti_stretch_links_hold_after_every_step() {
    let mut flag: FlagSimulation<f64> = FlagSimulation::from_config(&FlagConfig::default(), None);
    flag.set_wind(Vec3::new(8.0, 0.0, 3.0));
    for _ in 0..120 {
        flag.simulate(DT);
        assert!(flag.max_length_stretch() < 1e-9);
    }

    flag.set_orientation(Orientation::Vertical);
    for _ in 0..120 {
        flag.simulate(DT);
        assert!(flag.max_length_stretch() < 1e-9);
        assert_pins_at_rest(&flag);
    }
}

#[test]
fn hoist_pins_move_with_orientation() {
    let mut flag: FlagSimulation<f64> = FlagSimulation::from_config(&FlagConfig::default(), None);
    flag.set_wind(Vec3::new(5.0, 0.0, 2.0));
    for _ in 0..30 {
        flag.simulate(DT);
    }

    flag.set_orientation(Orientation::Vertical);
    let columns = flag.cloth().columns();
    let mut pins = flag.pins().to_vec();
    pins.sort_unstable();
    assert_eq!(pins, (0..columns).collect::<Vec<_>>());
    assert!(flag.pins_follow_hoist());

    // The old hoist below the corner hangs free.
    let left = flag.cloth().particle_at(0, 3).unwrap();
    assert!(!left.pinned);

    for _ in 0..120 {
        flag.simulate(DT);
        for x in 0..columns {
            let p = flag.cloth().particle_at(x, 0).unwrap();
            assert!(p.pinned);
            assert_eq!(p.position, p.original);
        }
    }

    flag.set_orientation(Orientation::Horizontal);
    assert_eq!(flag.pins().len(), flag.cloth().rows());
    assert!(flag.pins().iter().all(|&i| i % columns == 0));
}

#[test]
fn explicit_pins_stay_when_orientation_changes() {
    let mut flag = small_flag(Orientation::Horizontal);
    flag.pin(EdgeSet::only(Edge::Left), 1);
    assert!(!flag.pins_follow_hoist());

    flag.set_orientation(Orientation::Vertical);
    assert_eq!(flag.pins(), &[0, 4, 8]);
}

#[test]
fn orientation_switch_reorders_links_top_to_bottom() {
    let mut flag = small_flag(Orientation::Horizontal);
    assert_eq!(flag.hoist_edge(), Edge::Left);

    flag.set_orientation(Orientation::Vertical);
    assert_eq!(flag.hoist_edge(), Edge::Top);

    let columns = flag.cloth().columns();
    let links = flag.length_constraints();
    assert_eq!(links.len(), columns * (flag.cloth().rows() - 1));
    for c in links {
        assert_eq!(c.kind, LinkKind::Length);
        assert_eq!(c.b, c.a + columns);
    }
    // Within a column each link starts where the previous one ended.
    for pair in links.windows(2) {
        if pair[0].a % columns == pair[1].a % columns {
            assert_eq!(pair[0].b, pair[1].a);
        }
    }
}

#[test]
fn stored_order_never_restretches_links_nearer_the_pin() {
    let mut flag = small_flag(Orientation::Horizontal);
    flag.set_orientation(Orientation::Vertical);
    flag.pin(EdgeSet::only(Edge::Top), 1);

    // Stretch the sheet downward to twice its height.
    for p in flag.cloth_mut().particles_mut() {
        p.position.y *= 2.0;
    }

    let links = flag.length_constraints().to_vec();
    for (k, link) in links.iter().enumerate() {
        link.limit(flag.cloth_mut().particles_mut());
        let particles = flag.cloth().particles();
        for earlier in &links[..=k] {
            assert!(earlier.length(particles) <= earlier.rest_length + 1e-12);
        }
    }
}

#[test]
fn zero_dt_is_a_no_op() {
    let mut flag: FlagSimulation<f64> = FlagSimulation::from_config(&FlagConfig::default(), None);
    flag.set_wind(Vec3::new(4.0, 0.0, 1.0));
    for _ in 0..10 {
        flag.simulate(DT);
    }
    let before = flag.cloth().positions();
    flag.simulate(0.0);
    assert_eq!(flag.cloth().positions(), before);
}

#[test]
fn corner_pinned_sheet_stays_bounded() {
    let cloth = ClothMesh::new(&ClothConfig::new(2.0, 2.0, 1.0, 1.0));
    assert_eq!(cloth.particle_count(), 9);
    let mut flag = FlagSimulation::new(cloth, SolverConfig::new(), Orientation::Horizontal, Hoisting::Dexter);
    flag.pin_at(0, 0).unwrap();

    let span = 2.0f64;
    for _ in 0..100 {
        flag.simulate(0.016);
        assert!(flag.is_finite());
        for p in flag.cloth().particles() {
            assert!(p.position.length() < 4.0 * span, "diverged to {:?}", p.position);
        }
    }
    assert_pins_at_rest(&flag);
}

#[test]
fn structural_error_decays_frame_by_frame() {
    let cloth = ClothMesh::new(&ClothConfig::new(1.8, 1.2, 0.2, 0.12));
    let solver = SolverConfig::new()
        .with_gravity(Vec3::zero())
        .with_aero_coefficient(0.0);
    let mut flag = FlagSimulation::new(cloth, solver, Orientation::Horizontal, Hoisting::Dexter);
    flag.pin(EdgeSet::only(Edge::Left), 1);

    for p in flag.cloth_mut().particles_mut() {
        p.position.x *= 1.05;
        p.previous = p.position;
    }
    let initial = flag.cloth().max_deviation(LinkKind::Structural);
    assert!(initial > 0.005);

    let mut history = vec![initial];
    for _ in 0..300 {
        flag.simulate(DT);
        history.push(flag.cloth().max_deviation(LinkKind::Structural));
    }

    // No frame ends further from rest than the sheet started.
    for (frame, &error) in history.iter().enumerate() {
        assert!(error <= initial * 1.05, "frame {}: {} > {}", frame, error, initial);
    }

    // Relaxation corrections ride along as Verlet velocity, so single frames
    // may wobble; the envelope over 30 frames must keep shrinking.
    let envelope: Vec<f64> = history[1..]
        .chunks(30)
        .map(|w| w.iter().cloned().fold(0.0f64, f64::max))
        .collect();
    for (i, pair) in envelope.windows(2).enumerate() {
        assert!(pair[1] <= pair[0], "window {} grew: {:?}", i + 1, envelope);
    }
    assert!(history[300] < 1e-6, "still off by {}", history[300]);
}

#[test]
fn structural_error_stays_bounded_in_wind() {
    let mut flag: FlagSimulation<f64> = FlagSimulation::from_config(&FlagConfig::default(), None);
    flag.set_wind(Vec3::new(3.0, 0.0, 1.0));
    let spacing = flag.cloth().spacing_x();

    for frame in 0..300 {
        flag.simulate(DT);
        let error = flag.cloth().max_deviation(LinkKind::Structural);
        assert!(error < 0.2 * spacing, "frame {}: {}", frame, error);
        if frame >= 150 {
            assert!(error < 0.15 * spacing, "frame {}: {}", frame, error);
        }
    }
}

#[test]
fn reset_is_idempotent_and_keeps_configuration() {
    let mut flag: FlagSimulation<f64> = FlagSimulation::from_config(&FlagConfig::default(), None);
    flag.set_wind(Vec3::new(5.0, 0.0, 2.0));
    for _ in 0..50 {
        flag.simulate(DT);
    }
    let pins = flag.pins().to_vec();
    let links = flag.length_constraints().len();

    flag.reset();
    let once = flag.cloth().positions();
    flag.reset();
    assert_eq!(flag.cloth().positions(), once);

    assert!(flag.cloth().particles().iter().all(|p| p.position == p.original));
    assert_eq!(flag.pins(), &pins[..]);
    assert_eq!(flag.length_constraints().len(), links);
}

#[test]
fn render_fills_collaborator_buffer() {
    let mut flag = small_flag(Orientation::Horizontal);
    flag.pin(EdgeSet::only(Edge::Left), 1);
    flag.simulate(DT);

    let mut buffer = vec![0.0f64; 12 * 3];
    flag.render(&mut buffer).unwrap();
    for (chunk, p) in buffer.chunks(3).zip(flag.cloth().particles()) {
        assert_eq!(chunk, &[p.position.x, p.position.y, p.position.z]);
    }

    let mut wrong = vec![0.0f64; 10];
    assert_eq!(
        flag.render(&mut wrong),
        Err(FlagError::BufferSize { expected: 36, actual: 10 })
    );
}

#[derive(Default)]
struct Counter {
    integrations: usize,
    passes: usize,
    pin_rounds: usize,
    length_rounds: usize,
    completed: usize,
}

impl StepObserver for Counter {
    fn on_integrate(&mut self) { self.integrations += 1; }
    fn on_relaxation_pass(&mut self, _pass: usize) { self.passes += 1; }
    fn on_pins_applied(&mut self, _count: usize) { self.pin_rounds += 1; }
    fn on_length_constraints(&mut self, _count: usize) { self.length_rounds += 1; }
    fn on_step_complete(&mut self) { self.completed += 1; }
}

#[test]
fn observer_sees_update_sequence() {
    let mut flag = small_flag(Orientation::Horizontal);
    let mut counter = Counter::default();
    for _ in 0..3 {
        flag.simulate_observed(DT, &mut counter);
    }
    flag.simulate_observed(0.0, &mut counter);

    assert_eq!(counter.integrations, 3);
    assert_eq!(counter.passes, 3 * flag.solver().iterations);
    assert_eq!(counter.pin_rounds, 3);
    assert_eq!(counter.length_rounds, 3);
    assert_eq!(counter.completed, 4);
}
