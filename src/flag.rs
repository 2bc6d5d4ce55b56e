//! Flag simulation: a cloth sheet anchored to a hoist, with anti-stretch links.

use crate::float::Float;
use crate::vec::{Vec, Vec3};
use crate::cloth::{ClothConfig, ClothMesh};
use crate::constraint::{DistanceConstraint, LinkKind};
use crate::config::SolverConfig;
use crate::error::FlagResult;
use crate::geometry::GridGeometry;
use crate::observer::{NoOpStepObserver, StepObserver};
use crate::pin::{Edge, EdgeSet};
use crate::settings::{AssetSize, FlagConfig};
use alloc::vec::Vec as AllocVec;
use tracing::{debug, warn};

/// How the flag hangs from its support.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Attached along the left edge to an upright pole.
    #[default]
    Horizontal,
    /// Hung from the top edge, like a banner.
    Vertical,
}

impl Orientation {
    pub fn from_name(name: &str) -> Option<Orientation> {
        match name.trim() {
            n if n.eq_ignore_ascii_case("horizontal") => Some(Orientation::Horizontal),
            n if n.eq_ignore_ascii_case("vertical") => Some(Orientation::Vertical),
            _ => None,
        }
    }

    /// The grid edge attached to the support.
    pub fn hoist_edge(self) -> Edge {
        match self {
            Orientation::Horizontal => Edge::Left,
            Orientation::Vertical => Edge::Top,
        }
    }
}

/// Which face of the picture shows on the front of the sheet.
///
/// Only the texture mapping depends on this; the solver ignores it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Hoisting {
    #[default]
    Dexter,
    /// Mirrored picture.
    Sinister,
}

impl Hoisting {
    pub fn from_name(name: &str) -> Option<Hoisting> {
        match name.trim() {
            n if n.eq_ignore_ascii_case("dexter") => Some(Hoisting::Dexter),
            n if n.eq_ignore_ascii_case("sinister") => Some(Hoisting::Sinister),
            _ => None,
        }
    }
}

/// Anti-stretch links running away from `hoist`, one per neighbour pair
/// along the axis perpendicular to it.
///
/// Order matters: within each row (or column) links are listed from the
/// hoist outward, and every link's `a` endpoint is the one nearer the hoist.
fn length_constraints_from<F: Float>(
    cloth: &ClothMesh<F>,
    hoist: Edge,
) -> AllocVec<DistanceConstraint<Vec3<F>>> {
    let cols = cloth.columns();
    let rows = cloth.rows();
    let sx = cloth.spacing_x();
    let sy = cloth.spacing_y();
    let link = |a: usize, b: usize, rest: F| DistanceConstraint::<Vec3<F>>::new(a, b, rest, F::one(), LinkKind::Length);

    let mut links = AllocVec::new();
    match hoist {
        Edge::Left => {
            for y in 0..rows {
                for x in 0..(cols - 1) {
                    links.push(link(cloth.index(x, y), cloth.index(x + 1, y), sx));
                }
            }
        }
        Edge::Right => {
            for y in 0..rows {
                for x in (1..cols).rev() {
                    links.push(link(cloth.index(x, y), cloth.index(x - 1, y), sx));
                }
            }
        }
        Edge::Top => {
            for x in 0..cols {
                for y in 0..(rows - 1) {
                    links.push(link(cloth.index(x, y), cloth.index(x, y + 1), sy));
                }
            }
        }
        Edge::Bottom => {
            for x in 0..cols {
                for y in (1..rows).rev() {
                    links.push(link(cloth.index(x, y), cloth.index(x, y - 1), sy));
                }
            }
        }
    }
    links
}

/// A waving flag: one [`ClothMesh`] plus a pinning policy and anti-stretch
/// links ordered from the hoist edge outward.
///
/// Each [`simulate`](FlagSimulation::simulate) call runs, in order:
/// 1. cloth integration and relaxation,
/// 2. pins snapped back to their rest positions (position and previous),
/// 3. anti-stretch links in stored order.
#[derive(Clone, Debug)]
pub struct FlagSimulation<F: Float> {
    cloth: ClothMesh<F>,
    solver: SolverConfig<F>,
    orientation: Orientation,
    hoisting: Hoisting,
    hoist_edge: Edge,
    pins: AllocVec<usize>,
    pin_spacing: usize,
    /// Pins sit on the hoist edge and move with it.
    pins_follow_hoist: bool,
    length_constraints: AllocVec<DistanceConstraint<Vec3<F>>>,
}

impl<F: Float> FlagSimulation<F> {
    /// Wrap a cloth. Length links are built for the orientation's hoist
    /// edge; nothing is pinned yet.
    pub fn new(cloth: ClothMesh<F>, solver: SolverConfig<F>, orientation: Orientation, hoisting: Hoisting) -> Self {
        let hoist_edge = orientation.hoist_edge();
        let length_constraints = length_constraints_from(&cloth, hoist_edge);
        FlagSimulation {
            cloth,
            solver,
            orientation,
            hoisting,
            hoist_edge,
            pins: AllocVec::new(),
            pin_spacing: 1,
            pins_follow_hoist: false,
            length_constraints,
        }
    }

    /// Build a flag from parsed settings.
    ///
    /// `asset` is the size of the picture shown on the flag, used to resolve
    /// `auto` extents. Pins follow `config.pin`. Without explicit edges the
    /// hoist edge is pinned and stays pinned across orientation changes.
    pub fn from_config(config: &FlagConfig, asset: Option<AssetSize>) -> Self {
        let (width, height) = config.resolve_dimensions(asset);
        let cloth_config = ClothConfig::new(
            F::from_f64(width),
            F::from_f64(height),
            F::from_f64(config.mass * width * height),
            F::from_f64(config.rest_distance),
        );

        let mut solver = SolverConfig::new();
        if let Some([x, y, z]) = config.wind {
            solver = solver.with_wind(Vec3::new(F::from_f64(x), F::from_f64(y), F::from_f64(z)));
        }

        let mut flag = FlagSimulation::new(ClothMesh::new(&cloth_config), solver, config.orientation, config.hoisting);
        match config.pin.edges {
            Some(edges) => flag.pin(edges, config.pin.spacing),
            None => flag.pin_hoist(config.pin.spacing),
        }
        flag
    }

    /// Advance one frame with no observer attached.
    pub fn simulate(&mut self, dt: F) {
        self.simulate_observed(dt, &mut NoOpStepObserver);
    }

    /// Advance one frame. A zero, negative or non-finite `dt` leaves every
    /// particle untouched.
    pub fn simulate_observed<O: StepObserver>(&mut self, dt: F, observer: &mut O) {
        if self.cloth.advance(dt, &self.solver, observer) {
            self.apply_pins();
            observer.on_pins_applied(self.pins.len());

            for c in self.length_constraints.iter() {
                c.limit(self.cloth.particles_mut());
            }
            observer.on_length_constraints(self.length_constraints.len());
        }
        observer.on_step_complete();
    }

    fn apply_pins(&mut self) {
        let particles = self.cloth.particles_mut();
        for &idx in self.pins.iter() {
            particles[idx].reset();
        }
    }

    /// Copy current positions into the collaborator's vertex buffer as flat
    /// `[x0, y0, z0, x1, ...]`, row-major.
    pub fn render(&self, buffer: &mut [F]) -> FlagResult<()> {
        self.cloth.write_positions(buffer)
    }

    /// Pin every `spacing`-th particle along each selected edge.
    ///
    /// Adds to the existing pins; particles already pinned are skipped. A
    /// spacing of zero is treated as one. Explicit pins no longer move with
    /// the hoist edge.
    pub fn pin(&mut self, edges: EdgeSet, spacing: usize) {
        let spacing = if spacing == 0 {
            warn!("pin spacing must be at least 1, using 1");
            1
        } else {
            spacing
        };
        self.pin_spacing = spacing;
        self.pins_follow_hoist = false;
        let cols = self.cloth.columns();
        let rows = self.cloth.rows();

        let mut added = 0;
        for edge in edges.iter() {
            for idx in edge.indices(cols, rows, spacing) {
                if self.pin_index(idx) {
                    added += 1;
                }
            }
        }
        debug!(edges = ?edges, spacing, added, pins = self.pins.len(), "pinned edges");
    }

    /// Pin every `spacing`-th particle of the hoist edge. These pins are
    /// moved to the new hoist when the orientation or hoist edge changes.
    pub fn pin_hoist(&mut self, spacing: usize) {
        self.pin(EdgeSet::only(self.hoist_edge), spacing);
        self.pins_follow_hoist = true;
    }

    /// Pin a single grid particle.
    pub fn pin_at(&mut self, x: usize, y: usize) -> FlagResult<()> {
        let idx = self.cloth.try_index(x, y)?;
        self.pin_index(idx);
        self.pins_follow_hoist = false;
        Ok(())
    }

    fn pin_index(&mut self, idx: usize) -> bool {
        if self.pins.contains(&idx) {
            return false;
        }
        let particle = &mut self.cloth.particles_mut()[idx];
        particle.pin();
        particle.reset();
        self.pins.push(idx);
        true
    }

    /// Release every pin; the sheet falls freely afterwards.
    pub fn unpin(&mut self) {
        let particles = self.cloth.particles_mut();
        for idx in self.pins.drain(..) {
            particles[idx].unpin();
        }
        self.pins_follow_hoist = false;
        debug!("released all pins");
    }

    /// Switch orientation and rebuild the anti-stretch links.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        self.set_hoist_edge(orientation.hoist_edge());
    }

    /// Rebuild the anti-stretch links to run away from `edge`.
    ///
    /// Pins placed with [`pin_hoist`](FlagSimulation::pin_hoist) are released
    /// and re-placed along `edge` with the same spacing. Other pins stay.
    pub fn set_hoist_edge(&mut self, edge: Edge) {
        self.hoist_edge = edge;
        self.length_constraints = length_constraints_from(&self.cloth, edge);
        debug!(hoist = edge.name(), links = self.length_constraints.len(), "rebuilt length constraints");

        if self.pins_follow_hoist {
            let spacing = self.pin_spacing;
            self.unpin();
            self.pin_hoist(spacing);
        }
    }

    pub fn set_hoisting(&mut self, hoisting: Hoisting) {
        self.hoisting = hoisting;
    }

    pub fn set_wind(&mut self, wind: Vec3<F>) {
        self.solver.wind = wind;
    }

    /// Restore every particle to its rest shape. Pins and links stay.
    pub fn reset(&mut self) {
        self.cloth.reset();
    }

    /// Largest amount by which an anti-stretch link exceeds its rest length.
    pub fn max_length_stretch(&self) -> F {
        let particles = self.cloth.particles();
        self.length_constraints
            .iter()
            .fold(F::zero(), |acc, c| acc.max(c.length(particles) - c.rest_length))
    }

    /// Index buffer and texture coordinates for the render collaborator.
    pub fn geometry(&self) -> GridGeometry<F> {
        GridGeometry::from_cloth(&self.cloth, self.orientation, self.hoisting)
    }

    /// `true` while every particle position is finite.
    pub fn is_finite(&self) -> bool {
        self.cloth.particles().iter().all(|p| p.position.is_finite() && p.previous.is_finite())
    }

    pub fn cloth(&self) -> &ClothMesh<F> { &self.cloth }
    pub fn cloth_mut(&mut self) -> &mut ClothMesh<F> { &mut self.cloth }
    pub fn solver(&self) -> &SolverConfig<F> { &self.solver }
    pub fn solver_mut(&mut self) -> &mut SolverConfig<F> { &mut self.solver }
    pub fn pins(&self) -> &[usize] { &self.pins }
    pub fn pin_spacing(&self) -> usize { self.pin_spacing }
    pub fn pins_follow_hoist(&self) -> bool { self.pins_follow_hoist }
    pub fn length_constraints(&self) -> &[DistanceConstraint<Vec3<F>>] { &self.length_constraints }
    pub fn orientation(&self) -> Orientation { self.orientation }
    pub fn hoisting(&self) -> Hoisting { self.hoisting }
    pub fn hoist_edge(&self) -> Edge { self.hoist_edge }
}
