//! Head -> neck -> spine damping chain.
//!
//! One tracked head rotation is spread down the trunk with decreasing
//! influence: the head takes it raw, the neck a fraction plus a fixed neutral
//! tilt, the spine a smaller fraction. A tuned heuristic, not an IK solve.

use mimic_api_core::Euler;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DampingChain {
    pub neck_divisor: f32,
    /// Added to the damped neck rotation (radians, XYZ).
    pub neck_bias: [f32; 3],
    pub spine_divisor: f32,
}

impl Default for DampingChain {
    fn default() -> Self {
        Self {
            neck_divisor: 5.0,
            neck_bias: [0.3, 0.0, 0.0],
            spine_divisor: 10.0,
        }
    }
}

/// Trunk rotations derived from one head rotation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrunkRotations {
    pub head: Euler,
    pub neck: Euler,
    pub spine: Euler,
}

impl DampingChain {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("neck_divisor", self.neck_divisor),
            ("spine_divisor", self.spine_divisor),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidDivisor { field, value });
            }
        }
        if self.neck_bias.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::NonFinite { field: "neck_bias" });
        }
        Ok(())
    }

    pub fn neck(&self, head: Euler) -> Euler {
        head.scaled(self.neck_divisor).offset(self.neck_bias)
    }

    pub fn spine(&self, head: Euler) -> Euler {
        head.scaled(self.spine_divisor)
    }

    pub fn distribute(&self, head: Euler) -> TrunkRotations {
        TrunkRotations {
            head,
            neck: self.neck(head),
            spine: self.spine(head),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() <= 1e-6, "left={a} right={b}");
    }

    #[test]
    fn default_chain_arithmetic() {
        let trunk = DampingChain::default().distribute(Euler::new(0.5, 0.0, 0.0));
        approx(trunk.head.x, 0.5);
        approx(trunk.neck.x, 0.4);
        approx(trunk.spine.x, 0.05);
        approx(trunk.neck.y, 0.0);
    }

    #[test]
    fn bias_only_applies_to_neck() {
        let chain = DampingChain {
            neck_divisor: 2.0,
            neck_bias: [0.0, 0.1, 0.0],
            spine_divisor: 4.0,
        };
        let trunk = chain.distribute(Euler::new(0.0, 0.4, -0.8));
        approx(trunk.neck.y, 0.3);
        approx(trunk.neck.z, -0.4);
        approx(trunk.spine.y, 0.1);
        approx(trunk.spine.z, -0.2);
    }
}
