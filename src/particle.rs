//! Verlet particles with position-based dynamics.

use crate::float::Float;
use crate::vec::Vec;

/// A Verlet particle with implicit velocity.
///
/// Velocity is never stored: it is `position - previous`. Constraint
/// relaxation moves `position` alone, which feeds the correction back into
/// the next integration step.
#[derive(Clone, Debug)]
pub struct Particle<V: Vec> {
    pub position: V,
    pub previous: V,
    /// Rest position, restored by pins and by [`Particle::reset`].
    pub original: V,
    pub acceleration: V,
    pub mass: V::Scalar,
    pub inv_mass: V::Scalar,
    pub pinned: bool,
}

fn inverse<F: Float>(mass: F) -> F {
    if mass.is_near_zero(F::from_f32(1e-10)) {
        F::zero()
    } else {
        F::one() / mass
    }
}

impl<V: Vec> Particle<V> {
    pub fn new(position: V, mass: V::Scalar) -> Self {
        Particle {
            position,
            previous: position,
            original: position,
            acceleration: V::zero(),
            mass,
            inv_mass: inverse(mass),
            pinned: false,
        }
    }

    pub fn apply_force(&mut self, force: V) {
        if !self.pinned {
            self.acceleration = self.acceleration + force.scale(self.inv_mass);
        }
    }

    pub fn apply_acceleration(&mut self, accel: V) {
        if !self.pinned {
            self.acceleration = self.acceleration + accel;
        }
    }

    pub fn integrate(&mut self, dt: V::Scalar, damping: V::Scalar) {
        if self.pinned {
            self.acceleration = V::zero();
            return;
        }
        let velocity = (self.position - self.previous).scale(damping);
        let new_position = self.position + velocity + self.acceleration.scale(dt * dt);
        self.previous = self.position;
        self.position = new_position;
        self.acceleration = V::zero();
    }

    pub fn velocity(&self, dt: V::Scalar) -> V {
        if dt.is_near_zero(V::Scalar::from_f32(1e-30)) {
            return V::zero();
        }
        (self.position - self.previous).scale(V::Scalar::one() / dt)
    }

    /// Treat the particle as infinitely heavy.
    pub fn pin(&mut self) {
        self.pinned = true;
        self.inv_mass = V::Scalar::zero();
        self.acceleration = V::zero();
    }

    pub fn unpin(&mut self) {
        self.pinned = false;
        self.inv_mass = inverse(self.mass);
    }

    /// Snap to the rest position with zero velocity.
    pub fn reset(&mut self) {
        self.position = self.original;
        self.previous = self.original;
        self.acceleration = V::zero();
    }
}
