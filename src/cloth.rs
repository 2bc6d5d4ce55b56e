//! Cloth sheet: a Verlet particle grid with structural, shear, and bend links.

use crate::float::Float;
use crate::vec::{Vec, Vec3};
use crate::particle::Particle;
use crate::constraint::{DistanceConstraint, LinkKind};
use crate::config::SolverConfig;
use crate::error::{FlagError, FlagResult};
use crate::observer::{NoOpStepObserver, StepObserver};
use alloc::vec::Vec as AllocVec;
use tracing::{debug, trace, warn};

/// Default sheet width in metres.
pub const DEFAULT_WIDTH: f64 = 1.8;
/// Default sheet height in metres.
pub const DEFAULT_HEIGHT: f64 = 1.2;
/// Default areal density in kg/m².
pub const DEFAULT_AREAL_DENSITY: f64 = 0.11;
/// Default grid spacing in metres.
pub const DEFAULT_REST_DISTANCE: f64 = 0.12;
/// Grid spacing never drops below this.
pub const MIN_REST_DISTANCE: f64 = 1e-3;
/// Upper bound on segments along either axis.
pub const MAX_SEGMENTS: usize = 256;

/// Physical description of a cloth sheet.
#[derive(Clone, Debug)]
pub struct ClothConfig<F: Float> {
    pub width: F,
    pub height: F,
    /// Total mass of the sheet, shared evenly by all particles.
    pub mass: F,
    pub rest_distance: F,
    pub structural_stiffness: F,
    pub shear_stiffness: F,
    pub bend_stiffness: F,
}

impl<F: Float> ClothConfig<F> {
    pub fn new(width: F, height: F, mass: F, rest_distance: F) -> Self {
        ClothConfig {
            width,
            height,
            mass,
            rest_distance,
            structural_stiffness: F::one(),
            shear_stiffness: F::one(),
            bend_stiffness: F::from_f32(0.5),
        }
    }

    /// Set per-kind stiffness, each clamped to [0, 1].
    pub fn with_stiffness(mut self, structural: F, shear: F, bend: F) -> Self {
        self.structural_stiffness = structural.clamp(F::zero(), F::one());
        self.shear_stiffness = shear.clamp(F::zero(), F::one());
        self.bend_stiffness = bend.clamp(F::zero(), F::one());
        self
    }
}

impl<F: Float> Default for ClothConfig<F> {
    fn default() -> Self {
        let width = F::from_f64(DEFAULT_WIDTH);
        let height = F::from_f64(DEFAULT_HEIGHT);
        ClothConfig::new(
            width,
            height,
            F::from_f64(DEFAULT_AREAL_DENSITY) * width * height,
            F::from_f64(DEFAULT_REST_DISTANCE),
        )
    }
}

fn positive_or<F: Float>(value: F, fallback: F, parameter: &'static str) -> F {
    if value.is_finite() && value > F::zero() {
        value
    } else {
        warn!(parameter, value = ?value, fallback = ?fallback, "invalid cloth parameter, using fallback");
        fallback
    }
}

fn rest_distance_of<F: Float>(value: F) -> F {
    let min = F::from_f64(MIN_REST_DISTANCE);
    let value = positive_or(value, F::from_f64(DEFAULT_REST_DISTANCE), "rest_distance");
    if value < min {
        warn!(value = ?value, min = ?min, "rest distance below minimum, clamping");
        min
    } else {
        value
    }
}

fn segments_for<F: Float>(extent: F, rest_distance: F) -> usize {
    let n = (extent / rest_distance).round().to_f64();
    if n > MAX_SEGMENTS as f64 {
        warn!(requested = n, max = MAX_SEGMENTS, "segment count capped");
        MAX_SEGMENTS
    } else if n >= 1.0 {
        n as usize
    } else {
        1
    }
}

/// A cloth mesh built from a rectangular grid of Verlet particles.
///
/// Particle `(x, y)` has index `y * columns + x`. Row 0 is the top edge at
/// `y = 0` and the sheet hangs towards negative y in the z = 0 plane.
#[derive(Clone, Debug)]
pub struct ClothMesh<F: Float> {
    particles: AllocVec<Particle<Vec3<F>>>,
    constraints: AllocVec<DistanceConstraint<Vec3<F>>>,
    triangles: AllocVec<[usize; 3]>,
    x_segments: usize,
    y_segments: usize,
    width: F,
    height: F,
    rest_distance: F,
    spacing_x: F,
    spacing_y: F,
    particle_mass: F,
}

impl<F: Float> ClothMesh<F> {
    /// Build the particle grid and its links.
    ///
    /// Invalid dimensions, masses and spacings are replaced with the nearest
    /// usable value; construction never fails.
    ///
    /// Links are created in this order:
    /// - Structural: horizontal + vertical neighbours (rest = cell spacing)
    /// - Shear: both cell diagonals (rest = cell diagonal)
    /// - Bend: skip-one horizontal + vertical (rest = twice the spacing)
    pub fn new(config: &ClothConfig<F>) -> Self {
        let rest_distance = rest_distance_of(config.rest_distance);
        let width = positive_or(config.width, F::from_f64(DEFAULT_WIDTH), "width");
        let height = positive_or(config.height, F::from_f64(DEFAULT_HEIGHT), "height");
        let mass = positive_or(
            config.mass,
            F::from_f64(DEFAULT_AREAL_DENSITY) * width * height,
            "mass",
        );

        let x_segments = segments_for(width, rest_distance);
        let y_segments = segments_for(height, rest_distance);
        let spacing_x = width / F::from_usize(x_segments);
        let spacing_y = height / F::from_usize(y_segments);
        let cols = x_segments + 1;
        let rows = y_segments + 1;
        let particle_mass = mass / F::from_usize(cols * rows);

        let mut particles = AllocVec::with_capacity(cols * rows);
        for y in 0..rows {
            for x in 0..cols {
                let pos = Vec3::new(
                    F::from_usize(x) * spacing_x,
                    -(F::from_usize(y) * spacing_y),
                    F::zero(),
                );
                particles.push(Particle::new(pos, particle_mass));
            }
        }

        let diag_length = (spacing_x * spacing_x + spacing_y * spacing_y).sqrt();
        let structural = config.structural_stiffness;
        let shear = config.shear_stiffness;
        let bend = config.bend_stiffness;
        let mut constraints = AllocVec::new();

        // Structural: horizontal
        for y in 0..rows {
            for x in 0..(cols - 1) {
                let a = y * cols + x;
                constraints.push(DistanceConstraint::new(a, a + 1, spacing_x, structural, LinkKind::Structural));
            }
        }

        // Structural: vertical
        for y in 0..(rows - 1) {
            for x in 0..cols {
                let a = y * cols + x;
                constraints.push(DistanceConstraint::new(a, a + cols, spacing_y, structural, LinkKind::Structural));
            }
        }

        // Shear: diagonals
        for y in 0..(rows - 1) {
            for x in 0..(cols - 1) {
                let tl = y * cols + x;
                let tr = tl + 1;
                let bl = tl + cols;
                let br = bl + 1;
                constraints.push(DistanceConstraint::new(tl, br, diag_length, shear, LinkKind::Shear));
                constraints.push(DistanceConstraint::new(tr, bl, diag_length, shear, LinkKind::Shear));
            }
        }

        // Bend: skip-one horizontal
        for y in 0..rows {
            for x in 0..(cols.saturating_sub(2)) {
                let a = y * cols + x;
                constraints.push(DistanceConstraint::new(a, a + 2, spacing_x * F::two(), bend, LinkKind::Bend));
            }
        }

        // Bend: skip-one vertical
        for y in 0..(rows.saturating_sub(2)) {
            for x in 0..cols {
                let a = y * cols + x;
                constraints.push(DistanceConstraint::new(a, a + 2 * cols, spacing_y * F::two(), bend, LinkKind::Bend));
            }
        }

        // Two counter-clockwise (seen from +z) triangles per cell.
        let mut triangles = AllocVec::with_capacity(x_segments * y_segments * 2);
        for y in 0..y_segments {
            for x in 0..x_segments {
                let a = y * cols + x;
                let b = a + cols;
                let c = b + 1;
                let d = a + 1;
                triangles.push([a, b, d]);
                triangles.push([b, c, d]);
            }
        }

        debug!(
            x_segments,
            y_segments,
            spacing_x = ?spacing_x,
            spacing_y = ?spacing_y,
            particle_mass = ?particle_mass,
            constraints = constraints.len(),
            "built cloth mesh"
        );

        ClothMesh {
            particles,
            constraints,
            triangles,
            x_segments,
            y_segments,
            width,
            height,
            rest_distance,
            spacing_x,
            spacing_y,
            particle_mass,
        }
    }

    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.columns() + x
    }

    /// Bounds-checked [`ClothMesh::index`].
    pub fn try_index(&self, x: usize, y: usize) -> FlagResult<usize> {
        if x < self.columns() && y < self.rows() {
            Ok(self.index(x, y))
        } else {
            Err(FlagError::ParticleOutOfBounds {
                x,
                y,
                columns: self.columns(),
                rows: self.rows(),
            })
        }
    }

    pub fn particle_at(&self, x: usize, y: usize) -> FlagResult<&Particle<Vec3<F>>> {
        let idx = self.try_index(x, y)?;
        Ok(&self.particles[idx])
    }

    /// Advance one frame with no observer attached.
    pub fn simulate(&mut self, dt: F, config: &SolverConfig<F>) {
        self.simulate_observed(dt, config, &mut NoOpStepObserver);
    }

    /// Advance one frame: forces, integration, then relaxation passes.
    pub fn simulate_observed<O: StepObserver>(
        &mut self,
        dt: F,
        config: &SolverConfig<F>,
        observer: &mut O,
    ) {
        self.advance(dt, config, observer);
        observer.on_step_complete();
    }

    /// Runs the step without reporting completion. Returns `false` when `dt`
    /// is zero, negative or not finite and nothing happened.
    pub(crate) fn advance<O: StepObserver>(
        &mut self,
        dt: F,
        config: &SolverConfig<F>,
        observer: &mut O,
    ) -> bool {
        if !dt.is_finite() || dt <= F::zero() {
            return false;
        }
        let dt = if dt > config.max_step {
            trace!(dt = ?dt, max_step = ?config.max_step, "clamping time step");
            config.max_step
        } else {
            dt
        };

        let sub_steps = config.sub_steps.max(1);
        let sub_dt = dt / F::from_usize(sub_steps);

        for _sub in 0..sub_steps {
            for p in self.particles.iter_mut() {
                p.apply_acceleration(config.gravity);
            }
            self.accumulate_wind(config, sub_dt);

            for p in self.particles.iter_mut() {
                p.integrate(sub_dt, config.damping);
            }
            observer.on_integrate();

            for i in 0..config.iterations {
                for c in self.constraints.iter() {
                    c.resolve(&mut self.particles);
                }
                observer.on_relaxation_pass(i);
            }
        }
        true
    }

    /// Aerodynamic force per triangle, shared equally by its corners.
    ///
    /// `F = n * (n · (wind - v)) * area * aero_coefficient` with `n` the unit
    /// normal and `v` the mean corner velocity. A tunable approximation, not
    /// a fluid model.
    fn accumulate_wind(&mut self, config: &SolverConfig<F>, dt: F) {
        if config.aero_coefficient.is_near_zero(F::from_f32(1e-12)) {
            return;
        }
        let third = F::one() / F::from_f32(3.0);
        let half = F::one() / F::two();

        for &[a, b, c] in self.triangles.iter() {
            let pa = self.particles[a].position;
            let pb = self.particles[b].position;
            let pc = self.particles[c].position;

            let cross = (pb - pa).cross(pc - pa);
            let twice_area = cross.length();
            if twice_area.is_near_zero(F::from_f32(1e-12)) {
                continue;
            }
            let normal = cross.scale(F::one() / twice_area);

            let velocity = (self.particles[a].velocity(dt)
                + self.particles[b].velocity(dt)
                + self.particles[c].velocity(dt))
                .scale(third);
            let relative = config.wind - velocity;
            let magnitude = normal.dot(relative) * twice_area * half * config.aero_coefficient;
            let share = normal.scale(magnitude * third);

            self.particles[a].apply_force(share);
            self.particles[b].apply_force(share);
            self.particles[c].apply_force(share);
        }
    }

    /// Restore every particle to its rest position with zero velocity.
    /// Links and pinned flags are left as they are.
    pub fn reset(&mut self) {
        for p in self.particles.iter_mut() {
            p.reset();
        }
        debug!(particles = self.particles.len(), "cloth reset");
    }

    /// Largest `|length - rest|` over links of one kind.
    pub fn max_deviation(&self, kind: LinkKind) -> F {
        self.constraints
            .iter()
            .filter(|c| c.kind == kind)
            .fold(F::zero(), |acc, c| acc.max(c.deviation(&self.particles)))
    }

    pub fn positions(&self) -> AllocVec<Vec3<F>> {
        self.particles.iter().map(|p| p.position).collect()
    }

    /// Copy positions as flat `[x0, y0, z0, x1, ...]` in row-major order.
    pub fn write_positions(&self, out: &mut [F]) -> FlagResult<()> {
        let expected = self.particles.len() * 3;
        if out.len() != expected {
            return Err(FlagError::BufferSize { expected, actual: out.len() });
        }
        for (chunk, p) in out.chunks_exact_mut(3).zip(self.particles.iter()) {
            chunk[0] = p.position.x;
            chunk[1] = p.position.y;
            chunk[2] = p.position.z;
        }
        Ok(())
    }

    pub fn particles(&self) -> &[Particle<Vec3<F>>] { &self.particles }
    pub fn particles_mut(&mut self) -> &mut [Particle<Vec3<F>>] { &mut self.particles }
    pub fn constraints(&self) -> &[DistanceConstraint<Vec3<F>>] { &self.constraints }
    pub fn triangles(&self) -> &[[usize; 3]] { &self.triangles }
    pub fn x_segments(&self) -> usize { self.x_segments }
    pub fn y_segments(&self) -> usize { self.y_segments }
    pub fn columns(&self) -> usize { self.x_segments + 1 }
    pub fn rows(&self) -> usize { self.y_segments + 1 }
    pub fn width(&self) -> F { self.width }
    pub fn height(&self) -> F { self.height }
    pub fn rest_distance(&self) -> F { self.rest_distance }
    pub fn spacing_x(&self) -> F { self.spacing_x }
    pub fn spacing_y(&self) -> F { self.spacing_y }
    pub fn particle_mass(&self) -> F { self.particle_mass }
    pub fn particle_count(&self) -> usize { self.particles.len() }
    pub fn constraint_count(&self) -> usize { self.constraints.len() }
}
