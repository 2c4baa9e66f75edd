//! Small dense-network toolkit used by the policy-gradient agents.
//!
//! Everything runs on the CPU over plain `Vec<f32>` buffers. Layers expose an
//! analytic backward pass so callers can assemble a gradient for any scalar
//! objective without a tape.

pub mod gaussian;
pub mod loss;
pub mod nn;
pub mod optim;
pub mod tensor;

pub use gaussian::DiagGaussian;
pub use loss::policy_gradient_loss;
pub use nn::{Dense, Layer, Sequential, TanhAct};
pub use optim::{Adam, Sgd};
pub use tensor::Tensor;
