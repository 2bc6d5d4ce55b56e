//! Distance constraints between pairs of particles.

use crate::float::Float;
use crate::vec::Vec;
use crate::particle::Particle;

/// What a distance link models in the cloth.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LinkKind {
    /// Direct horizontal or vertical neighbours.
    Structural,
    /// Diagonal neighbours within a cell.
    Shear,
    /// Neighbours two apart along a row or column.
    Bend,
    /// Anti-stretch link added by the flag along the hoist-to-free axis.
    Length,
}

/// Keeps particles `a` and `b` near `rest_length` apart.
///
/// Particles are referenced by index into the owning particle slice; the
/// constraint never owns them.
#[derive(Clone, Debug)]
pub struct DistanceConstraint<V: Vec> {
    pub a: usize,
    pub b: usize,
    pub rest_length: V::Scalar,
    pub stiffness: V::Scalar,
    pub kind: LinkKind,
}

impl<V: Vec> DistanceConstraint<V> {
    pub fn new(a: usize, b: usize, rest_length: V::Scalar, stiffness: V::Scalar, kind: LinkKind) -> Self {
        DistanceConstraint { a, b, rest_length, stiffness, kind }
    }

    /// Current length of the link.
    pub fn length(&self, particles: &[Particle<V>]) -> V::Scalar {
        particles[self.a].position.distance(particles[self.b].position)
    }

    /// Absolute difference between the current and the rest length.
    pub fn deviation(&self, particles: &[Particle<V>]) -> V::Scalar {
        (self.length(particles) - self.rest_length).abs()
    }

    /// One relaxation step.
    ///
    /// The correction is split by inverse mass, so a pinned endpoint stays
    /// put and its partner absorbs the whole correction.
    pub fn resolve(&self, particles: &mut [Particle<V>]) {
        let a_pos = particles[self.a].position;
        let b_pos = particles[self.b].position;
        let a_inv = particles[self.a].inv_mass;
        let b_inv = particles[self.b].inv_mass;

        let w_total = a_inv + b_inv;
        if w_total.is_near_zero(V::Scalar::from_f32(1e-10)) {
            return; // both pinned
        }

        let delta = b_pos - a_pos;
        let dist = delta.length();
        if dist.is_near_zero(V::Scalar::from_f32(1e-10)) {
            return; // degenerate
        }

        let error = dist - self.rest_length;
        let correction = delta.scale(error * self.stiffness / dist);

        if !particles[self.a].pinned {
            particles[self.a].position = a_pos + correction.scale(a_inv / w_total);
        }
        if !particles[self.b].pinned {
            particles[self.b].position = b_pos - correction.scale(b_inv / w_total);
        }
    }

    /// One-sided stretch limit anchored at `a`.
    ///
    /// Only acts when the link is longer than `rest_length`, and only moves
    /// `b`. Applying a chain of these outward from an anchor leaves every
    /// earlier link untouched.
    ///
    /// `b.previous` is shifted along with `b.position`, so the correction
    /// does not turn into velocity on the next integration.
    pub fn limit(&self, particles: &mut [Particle<V>]) {
        if particles[self.b].pinned {
            return;
        }
        let a_pos = particles[self.a].position;
        let b_pos = particles[self.b].position;

        let delta = b_pos - a_pos;
        let dist = delta.length();
        if dist <= self.rest_length || dist.is_near_zero(V::Scalar::from_f32(1e-10)) {
            return;
        }

        let excess = (dist - self.rest_length) * self.stiffness;
        let shift = delta.scale(excess / dist);
        let b = &mut particles[self.b];
        b.position = b_pos - shift;
        b.previous = b.previous - shift;
    }
}
