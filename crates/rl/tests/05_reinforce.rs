mod common;

use common::{close, unit_action_space};
use rl::{
    compute_returns, ActionOutput, Batch, Config, Metric, Normalizer, Policy, Reinforce, RlError,
    Space,
};

/// Records every call so tests can inspect what the learner passed through.
#[derive(Default)]
struct SpyPolicy {
    action: Vec<f32>,
    seen_observations: Vec<Vec<f32>>,
    improve_calls: Vec<(Vec<Vec<f32>>, Vec<Vec<f32>>, Vec<f32>)>,
    fail_improve: bool,
}

impl Policy for SpyPolicy {
    fn get_action(&mut self, observation: &[f32]) -> anyhow::Result<ActionOutput> {
        self.seen_observations.push(observation.to_vec());
        Ok(ActionOutput {
            action: self.action.clone(),
            means: vec![0.25; self.action.len()],
            stds: vec![0.5; self.action.len()],
        })
    }

    fn improve(
        &mut self,
        observations: &[Vec<f32>],
        actions: &[Vec<f32>],
        returns: &[f32],
    ) -> anyhow::Result<f32> {
        if self.fail_improve {
            anyhow::bail!("optimizer diverged");
        }
        self.improve_calls
            .push((observations.to_vec(), actions.to_vec(), returns.to_vec()));
        Ok(returns.iter().sum())
    }
}

fn observation_space() -> Space {
    Space::bounded(vec![0.0, -1.0], vec![10.0, 1.0]).unwrap()
}

fn agent(policy: SpyPolicy, discount: f32) -> Reinforce<SpyPolicy> {
    let config = Config { discount, ..Config::default() };
    Reinforce::new(policy, &observation_space(), &unit_action_space(1), &config).unwrap()
}

fn spy(action: Vec<f32>) -> SpyPolicy {
    SpyPolicy { action, ..SpyPolicy::default() }
}

#[test]
fn act_scales_observation_and_records_diagnostics() {
    let mut a = agent(spy(vec![0.3]), 0.9);
    let action = a.act(&[5.0, 0.0]).unwrap();
    assert_eq!(action, vec![0.3]);
    assert!(close(&a.policy().seen_observations[0], &[0.0, 0.0]));

    let d = a.diagnostics();
    assert_eq!(d.series(Metric::ActionMean, 0), &[0.25]);
    assert_eq!(d.series(Metric::ActionStd, 0), &[0.5]);
    assert_eq!(d.dims(Metric::ScaledObservation), 2);
    assert_eq!(d.series(Metric::Action, 0), &[0.3]);
}

#[test]
fn act_rejects_policy_actions_of_the_wrong_width() {
    let mut a = agent(spy(vec![0.1, 0.2]), 0.9);
    let err = a.act(&[1.0, 0.0]).unwrap_err();
    assert!(matches!(err, RlError::InvalidAction { expected: 1, got: 2 }));
    // a rejected action leaves no partial diagnostics behind
    assert!(a.diagnostics().is_empty());
}

#[test]
fn learn_passes_normalized_discounted_returns() {
    let mut a = agent(spy(vec![0.0]), 0.9);
    let batch = Batch {
        observations: vec![vec![5.0, 0.0]; 3],
        actions: vec![vec![0.1], vec![0.2], vec![0.3]],
        rewards: vec![1.0, 1.0, 1.0],
    };
    let loss = a.learn_batch(&batch).unwrap();

    let raw = compute_returns(&batch.rewards, 0.9);
    let scale = Normalizer::batch_scale(&raw);
    let expected: Vec<f32> = raw.iter().map(|r| r / scale).collect();

    let (obs, actions, returns) = &a.policy().improve_calls[0];
    assert!(close(returns, &expected));
    // scale-only: every return keeps its sign
    assert!(returns.iter().all(|r| *r > 0.0));
    assert_eq!(actions, &batch.actions);
    assert!(obs.iter().all(|o| close(o, &[0.0, 0.0])));
    assert!((loss - expected.iter().sum::<f32>()).abs() < 1e-5);
    assert_eq!(a.diagnostics().series(Metric::Loss, 0), &[loss]);
}

#[test]
fn mismatched_batch_lengths_are_fatal() {
    let mut a = agent(spy(vec![0.0]), 0.9);
    let batch = Batch {
        observations: vec![vec![0.0, 0.0]; 3],
        actions: vec![vec![0.0]; 2],
        rewards: vec![1.0; 3],
    };
    assert!(matches!(a.learn_batch(&batch), Err(RlError::BatchShape(_))));
    assert!(a.policy().improve_calls.is_empty());
}

#[test]
fn mismatched_row_widths_are_fatal() {
    let mut a = agent(spy(vec![0.0]), 0.9);
    let batch = Batch {
        observations: vec![vec![0.0, 0.0], vec![0.0]],
        actions: vec![vec![0.0]; 2],
        rewards: vec![1.0; 2],
    };
    assert!(matches!(a.learn_batch(&batch), Err(RlError::BatchShape(_))));
    let batch = Batch {
        observations: vec![vec![0.0, 0.0]; 2],
        actions: vec![vec![0.0], vec![0.0, 1.0]],
        rewards: vec![1.0; 2],
    };
    assert!(matches!(a.learn_batch(&batch), Err(RlError::BatchShape(_))));
}

#[test]
fn empty_batch_is_fatal() {
    let mut a = agent(spy(vec![0.0]), 0.9);
    assert!(matches!(a.learn(), Err(RlError::BatchShape(_))));
}

#[test]
fn improve_failures_propagate_unchanged() {
    let mut a = agent(SpyPolicy { action: vec![0.0], fail_improve: true, ..SpyPolicy::default() }, 0.9);
    let batch = Batch {
        observations: vec![vec![0.0, 0.0]],
        actions: vec![vec![0.0]],
        rewards: vec![1.0],
    };
    let err = a.learn_batch(&batch).unwrap_err();
    assert!(matches!(err, RlError::Policy(_)));
    assert_eq!(err.to_string(), "optimizer diverged");
    assert!(a.diagnostics().series(Metric::Loss, 0).is_empty());
}

#[test]
fn invalid_discount_is_rejected_at_construction() {
    let config = Config { discount: 1.5, ..Config::default() };
    let res = Reinforce::new(spy(vec![0.0]), &observation_space(), &unit_action_space(1), &config);
    assert!(matches!(res, Err(RlError::Configuration(_))));
}

#[test]
fn reset_clears_trajectory_and_diagnostics() {
    let mut a = agent(spy(vec![0.0]), 0.9);
    let obs = vec![1.0, 0.0];
    let action = a.act(&obs).unwrap();
    a.remember(obs, action, 1.0, rl::StepInfo::default());
    assert_eq!(a.memory().len(), 1);
    a.reset();
    assert!(a.memory().is_empty());
    assert!(a.diagnostics().is_empty());
}
