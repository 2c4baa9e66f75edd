use ml::{policy_gradient_loss, Adam, Dense, Layer, Sequential, Sgd, TanhAct, Tensor};

fn close(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (*x - *y).abs() < 1e-5)
}

#[test]
fn dense_backward_gradients() {
    let w = vec![1.0, 2.0,
                 -3.0, 0.5];
    let b = vec![0.1, -0.2];
    let x = Tensor::from_vec(vec![2], vec![0.5, -1.0]);
    let dense = Dense::new(w, b, 2, 2);
    let grad_out = Tensor::from_vec(vec![2], vec![1.0, -2.0]);
    let (dx, dw, db) = dense.backward_parts(&x, &grad_out);
    let expected_dx = vec![1.0 * 1.0 + -3.0 * (-2.0), 2.0 * 1.0 + 0.5 * (-2.0)];
    let expected_dw = vec![0.5 * 1.0, -1.0 * 1.0,
                           0.5 * (-2.0), -1.0 * (-2.0)];
    assert!(close(&dx.data, &expected_dx));
    assert!(close(&dw.data, &expected_dw));
    assert!(close(&db.data, &grad_out.data));
}

#[test]
fn tanh_forward_backward() {
    let x = Tensor::from_vec(vec![2], vec![0.0, 1.0]);
    let t = TanhAct;
    let y = t.forward(&x);
    let expected = vec![0.0f32.tanh(), 1.0f32.tanh()];
    assert!(close(&y.data, &expected));
    let grad_out = Tensor::from_vec(vec![2], vec![0.2, -0.1]);
    let (dx, params) = t.backward(&x, &grad_out);
    let exp_dx = vec![0.2 * (1.0 - expected[0].powi(2)), -0.1 * (1.0 - expected[1].powi(2))];
    assert!(close(&dx.data, &exp_dx));
    assert!(params.is_empty());
}

#[test]
fn sequential_forward_backward() {
    let mut seq = Sequential::new();
    seq.push(Dense::new(vec![1.0], vec![0.0], 1, 1));
    seq.push(TanhAct);
    seq.push(Dense::new(vec![0.5], vec![0.0], 1, 1));
    let x = Tensor::from_vec(vec![1], vec![2.0]);
    let (out, activations) = seq.forward(&x).unwrap();
    let h1: f32 = 2.0;
    let h1a = h1.tanh();
    assert!((out.data[0] - 0.5 * h1a).abs() < 1e-6);
    assert_eq!(activations.len(), 4);

    let grad_out = Tensor::from_vec(vec![1], vec![1.0]);
    let (dx, grads) = seq.backward(&activations, &grad_out);
    // forward parameter order: dw1, db1, dw2, db2
    assert_eq!(grads.len(), 4);
    let dtanh = 1.0 - h1a * h1a;
    assert!(close(&grads[0].data, &[2.0 * 0.5 * dtanh]));
    assert!(close(&grads[1].data, &[0.5 * dtanh]));
    assert!(close(&grads[2].data, &[h1a]));
    assert!(close(&grads[3].data, &[1.0]));
    assert!(close(&dx.data, &[0.5 * dtanh]));
}

#[test]
fn sequential_gradient_matches_finite_difference() {
    let mut rng = fastrand::Rng::with_seed(9);
    let mut seq = Sequential::mlp(&[3, 4, 2], &mut rng);
    let x = Tensor::from_vec(vec![3], vec![0.3, -0.7, 1.1]);
    // objective: sum of outputs
    let objective = |s: &Sequential| s.forward(&x).unwrap().0.data.iter().sum::<f32>();

    let (_, activations) = seq.forward(&x).unwrap();
    let (_, grads) = seq.backward(&activations, &Tensor::from_vec(vec![2], vec![1.0, 1.0]));

    let eps = 1e-3;
    let base = objective(&seq);
    let analytic = grads[0].data[1];
    seq.params_mut()[0].data[1] += eps;
    let numeric = (objective(&seq) - base) / eps;
    assert!((analytic - numeric).abs() < 1e-2, "analytic {analytic} numeric {numeric}");
}

#[test]
fn sequential_rejects_wrong_input_width() {
    let mut rng = fastrand::Rng::with_seed(0);
    let seq = Sequential::mlp(&[3, 2], &mut rng);
    assert!(seq.forward(&Tensor::from_vec(vec![2], vec![1.0, 2.0])).is_err());
    assert_eq!(seq.in_dim(), Some(3));
}

#[test]
fn mlp_places_tanh_between_dense_layers() {
    let mut rng = fastrand::Rng::with_seed(0);
    let seq = Sequential::mlp(&[2, 5, 5, 1], &mut rng);
    // dense, tanh, dense, tanh, dense
    assert_eq!(seq.len(), 5);
    assert_eq!(seq.params().len(), 6);
}

#[test]
fn sgd_update() {
    let mut param = Tensor::from_vec(vec![2], vec![1.0, -1.0]);
    let grad = Tensor::from_vec(vec![2], vec![0.5, -0.5]);
    let opt = Sgd::new(0.1);
    opt.step(&mut [(&mut param, &grad)]);
    assert!(close(&param.data, &[0.95, -0.95]));
}

#[test]
fn adam_update() {
    let mut param = Tensor::from_vec(vec![1], vec![1.0]);
    let grad = Tensor::from_vec(vec![1], vec![0.1]);
    let mut opt = Adam::new(0.1);
    opt.step(&mut [(&mut param, &grad)]);
    // after first step of Adam with zero init moments
    let m_hat: f32 = 0.1;
    let v_hat: f32 = 0.01;
    let expected = 1.0 - 0.1 * m_hat / (v_hat.sqrt() + 1e-8f32);
    assert!((param.data[0] - expected).abs() < 1e-6);
    assert_eq!(opt.steps(), 1);
}

#[test]
fn policy_gradient_loss_calc() {
    let log_probs = [-0.1, -0.2, -0.3];
    let returns = [1.0, 0.5, -0.5];
    let loss = policy_gradient_loss(&log_probs, &returns);
    let expected = (-(-0.1 * 1.0 + -0.2 * 0.5 + -0.3 * -0.5)) / 3.0;
    assert!((loss - expected).abs() < 1e-6);
    assert_eq!(policy_gradient_loss(&[], &[]), 0.0);
}
