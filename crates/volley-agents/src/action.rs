// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use volley_core::math::{self, Vec3};

/// Number of action components.
pub const ACTION_LEN: usize = 2;

/// A bounded paddle command: target velocity on y and z as fractions of the
/// maximum paddle speed.
///
/// Components are clamped to `[-1, 1]` on construction; non-finite inputs
/// become zero.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Action([f32; ACTION_LEN]);

impl Action {
    /// The "do nothing" action.
    pub const ZERO: Self = Self([0.0; ACTION_LEN]);

    /// Creates an action from its y and z components.
    pub fn new(vy: f32, vz: f32) -> Self {
        Self([bound(vy), bound(vz)])
    }

    /// Returns the components.
    #[inline]
    pub fn components(&self) -> [f32; ACTION_LEN] {
        self.0
    }

    /// Sum of the absolute components.
    pub fn magnitude(&self) -> f32 {
        self.0.iter().map(|c| c.abs()).sum()
    }

    /// Scales the action to a world velocity. The x axis is never driven.
    pub fn to_velocity(&self, max_speed: f32) -> Vec3 {
        Vec3::new(0.0, self.0[0] * max_speed, self.0[1] * max_speed)
    }

    /// Inverse of [`to_velocity`](Self::to_velocity) on y and z, clamped.
    pub fn from_velocity(velocity: Vec3, max_speed: f32) -> Self {
        Self::new(
            math::scale_clamped(velocity.y, max_speed),
            math::scale_clamped(velocity.z, max_speed),
        )
    }
}

impl From<[f32; ACTION_LEN]> for Action {
    fn from(value: [f32; ACTION_LEN]) -> Self {
        Self::new(value[0], value[1])
    }
}

fn bound(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_are_bounded() {
        let action = Action::new(3.0, -0.25);
        assert_eq!(action.components(), [1.0, -0.25]);
        assert_eq!(Action::from([f32::NAN, -7.0]).components(), [0.0, -1.0]);
    }

    #[test]
    fn test_velocity_scaling() {
        let action = Action::new(1.0, -0.5);
        assert_eq!(action.to_velocity(15.0), Vec3::new(0.0, 15.0, -7.5));
        assert_eq!(action.magnitude(), 1.5);
        assert_eq!(
            Action::from_velocity(Vec3::new(0.0, 12.0, -30.0), 15.0),
            Action::new(0.8, -1.0)
        );
    }
}
