use crate::tensor::Tensor;
use anyhow::{ensure, Result};

/// A differentiable layer operating on a single input vector.
///
/// `backward` receives the layer input and the gradient of the objective with
/// respect to the layer output, and returns the gradient with respect to the
/// input together with one gradient per parameter (same order as `params`).
pub trait Layer {
    fn forward(&self, x: &Tensor) -> Tensor;
    fn backward(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Vec<Tensor>);
    fn params(&self) -> Vec<&Tensor> { Vec::new() }
    fn params_mut(&mut self) -> Vec<&mut Tensor> { Vec::new() }
    /// Input width, when the layer constrains it.
    fn in_dim(&self) -> Option<usize> { None }
}

/// A fully connected layer `y = W x + b`.
#[derive(Clone, Debug)]
pub struct Dense {
    /// Weights, shape `[out_dim, in_dim]`.
    pub w: Tensor,
    /// Bias, shape `[out_dim]`.
    pub b: Tensor,
    pub in_dim: usize,
    pub out_dim: usize,
}

impl Dense {
    /// # Panics
    /// If the weight or bias lengths do not match the given dimensions.
    #[must_use]
    pub fn new(weights: Vec<f32>, bias: Vec<f32>, in_dim: usize, out_dim: usize) -> Self {
        assert_eq!(weights.len(), in_dim * out_dim);
        assert_eq!(bias.len(), out_dim);
        Self {
            w: Tensor::from_vec(vec![out_dim, in_dim], weights),
            b: Tensor::from_vec(vec![out_dim], bias),
            in_dim,
            out_dim,
        }
    }

    /// Glorot-uniform weights, zero bias.
    pub fn random(in_dim: usize, out_dim: usize, rng: &mut fastrand::Rng) -> Self {
        let limit = (6.0 / (in_dim + out_dim) as f32).sqrt();
        let weights = (0..in_dim * out_dim)
            .map(|_| rng.f32() * 2.0 * limit - limit)
            .collect();
        Self::new(weights, vec![0.0; out_dim], in_dim, out_dim)
    }

    /// Returns `(dx, dw, db)`.
    #[must_use]
    pub fn backward_parts(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Tensor, Tensor) {
        let mut grad_input = vec![0.0; self.in_dim];
        let mut grad_w = vec![0.0; self.in_dim * self.out_dim];
        let mut grad_b = vec![0.0; self.out_dim];
        for o in 0..self.out_dim {
            let go = grad.data[o];
            for i in 0..self.in_dim {
                grad_w[o * self.in_dim + i] += go * x.data[i];
                grad_input[i] += self.w.data[o * self.in_dim + i] * go;
            }
            grad_b[o] += go;
        }
        (
            Tensor::from_vec(vec![self.in_dim], grad_input),
            Tensor::from_vec(vec![self.out_dim, self.in_dim], grad_w),
            Tensor::from_vec(vec![self.out_dim], grad_b),
        )
    }
}

impl Layer for Dense {
    fn forward(&self, x: &Tensor) -> Tensor {
        let mut y = vec![0f32; self.out_dim];
        for (o, out) in y.iter_mut().enumerate() {
            let row = &self.w.data[o * self.in_dim..(o + 1) * self.in_dim];
            *out = self.b.data[o] + row.iter().zip(&x.data).map(|(w, v)| w * v).sum::<f32>();
        }
        Tensor::from_vec(vec![self.out_dim], y)
    }

    fn backward(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Vec<Tensor>) {
        let (dx, dw, db) = self.backward_parts(x, grad);
        (dx, vec![dw, db])
    }

    fn params(&self) -> Vec<&Tensor> { vec![&self.w, &self.b] }
    fn params_mut(&mut self) -> Vec<&mut Tensor> { vec![&mut self.w, &mut self.b] }
    fn in_dim(&self) -> Option<usize> { Some(self.in_dim) }
}

#[derive(Default, Clone, Copy, Debug)]
pub struct TanhAct;

impl Layer for TanhAct {
    fn forward(&self, x: &Tensor) -> Tensor {
        let data: Vec<f32> = x.data.iter().map(|&v| v.tanh()).collect();
        Tensor::from_vec(x.shape.clone(), data)
    }

    fn backward(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Vec<Tensor>) {
        let data: Vec<f32> = x
            .data
            .iter()
            .zip(&grad.data)
            .map(|(&v, &g)| {
                let t = v.tanh();
                g * (1.0 - t * t)
            })
            .collect();
        (Tensor::from_vec(x.shape.clone(), data), Vec::new())
    }
}

/// A stack of layers applied in order.
#[derive(Default)]
pub struct Sequential {
    layers: Vec<Box<dyn Layer>>,
}

impl Sequential {
    #[must_use]
    pub fn new() -> Self { Self { layers: Vec::new() } }

    /// Dense layers of the given widths with a tanh between each pair.
    /// The output layer is linear.
    pub fn mlp(widths: &[usize], rng: &mut fastrand::Rng) -> Self {
        let mut net = Self::new();
        let n = widths.len().saturating_sub(1);
        for (i, pair) in widths.windows(2).enumerate() {
            net.push(Dense::random(pair[0], pair[1], rng));
            if i + 1 < n {
                net.push(TanhAct);
            }
        }
        net
    }

    pub fn push<L: Layer + 'static>(&mut self, layer: L) { self.layers.push(Box::new(layer)); }

    pub fn len(&self) -> usize { self.layers.len() }

    pub fn is_empty(&self) -> bool { self.layers.is_empty() }

    /// Width expected by the first layer that declares one.
    pub fn in_dim(&self) -> Option<usize> {
        self.layers.iter().find_map(|l| l.in_dim())
    }

    /// Runs the stack, returning the output and every intermediate activation
    /// (input first) for use in [`Sequential::backward`].
    pub fn forward(&self, x: &Tensor) -> Result<(Tensor, Vec<Tensor>)> {
        if let Some(dim) = self.in_dim() {
            ensure!(x.len() == dim, "input width {} does not match network input {}", x.len(), dim);
        }
        let mut out = x.clone();
        let mut activations = vec![out.clone()];
        for layer in &self.layers {
            out = layer.forward(&out);
            activations.push(out.clone());
        }
        Ok((out, activations))
    }

    /// Backpropagates `grad` (gradient w.r.t. the network output).
    ///
    /// Parameter gradients come back in the same order as [`Sequential::params_mut`].
    pub fn backward(&self, activations: &[Tensor], grad: &Tensor) -> (Tensor, Vec<Tensor>) {
        let mut grad_out = grad.clone();
        let mut per_layer = Vec::with_capacity(self.layers.len());
        for (layer, activation) in self
            .layers
            .iter()
            .rev()
            .zip(activations.iter().rev().skip(1))
        {
            let (g_in, p) = layer.backward(activation, &grad_out);
            grad_out = g_in;
            per_layer.push(p);
        }
        let param_grads = per_layer.into_iter().rev().flatten().collect();
        (grad_out, param_grads)
    }

    pub fn params(&self) -> Vec<&Tensor> {
        self.layers.iter().flat_map(|l| l.params()).collect()
    }

    pub fn params_mut(&mut self) -> Vec<&mut Tensor> {
        let mut out = Vec::new();
        for layer in &mut self.layers {
            out.extend(layer.params_mut());
        }
        out
    }
}
