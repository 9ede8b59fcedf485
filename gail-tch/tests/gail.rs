use anyhow::Result;
use gail_core::{
    buffer::{ACTIONS, DONE, VECTOR_OBS},
    record::Record,
    ActionSpec, AgentBuffer, BehaviorSpec, Column, Demonstration, GailError, RewardProvider,
};
use gail_tch::gail::{GailConfig, GailRewardProvider};
use std::sync::{Mutex, MutexGuard};
use tempdir::TempDir;

const GAIL_KEYS: [&str; 3] = [
    "Losses/GAIL Discriminator Loss",
    "Policy/GAIL Policy Estimate",
    "Policy/GAIL Expert Estimate",
];

const VAIL_KEYS: [&str; 2] = ["Policy/GAIL Beta", "Losses/GAIL KL Loss"];

// The random number generator of tch is shared by all tests in this file.
static RNG: Mutex<()> = Mutex::new(());

fn lock_rng() -> MutexGuard<'static, ()> {
    let _ = env_logger::builder().is_test(true).try_init();
    RNG.lock().unwrap_or_else(|e| e.into_inner())
}

fn vector_visual_spec() -> BehaviorSpec {
    BehaviorSpec::new(vec![vec![8], vec![24, 26, 1]], ActionSpec::Continuous(2))
}

fn vector_spec(action_spec: ActionSpec) -> BehaviorSpec {
    BehaviorSpec::new(vec![vec![4]], action_spec)
}

/// Buffer of `n` experiences with all vector observations set to `value`.
fn filled_buffer(spec: &BehaviorSpec, n: usize, value: f32) -> AgentBuffer {
    let mut buffer = AgentBuffer::zeros(spec, n);
    let size = spec.vector_obs_size();
    buffer
        .insert(VECTOR_OBS, Column::new(vec![size], vec![value; size * n]).unwrap())
        .unwrap();
    buffer
}

fn assert_keys(record: &Record, keys: &[&str]) {
    let mut actual = record.keys().cloned().collect::<Vec<_>>();
    let mut expected = keys.iter().map(|k| k.to_string()).collect::<Vec<_>>();
    actual.sort();
    expected.sort();
    assert_eq!(actual, expected);
}

#[test]
fn test_gail_scenario() -> Result<()> {
    let _lock = lock_rng();
    let spec = vector_visual_spec();
    let config = GailConfig::default().encoding_size(32).seed(42);
    let mut provider =
        GailRewardProvider::with_demo_buffer(spec.clone(), config, filled_buffer(&spec, 16, 1.0))?;
    let batch = AgentBuffer::zeros(&spec, 4);

    let rewards = provider.evaluate(&batch)?;
    assert_eq!(rewards.len(), 4);
    assert!(rewards.iter().all(|r| r.is_finite() && *r >= 0.0));

    let record = provider.update(&batch)?;
    assert_keys(&record, &GAIL_KEYS);
    assert!(record.get_scalar(GAIL_KEYS[0])?.is_finite());
    assert!(provider.beta().is_none());

    assert_eq!(provider.name(), "GAIL");
    assert!(provider.ignore_done());
    assert_eq!(provider.gamma(), 0.99);
    assert_eq!(provider.strength(), 1.0);
    Ok(())
}

#[test]
fn test_vail_scenario() -> Result<()> {
    let _lock = lock_rng();
    let spec = vector_visual_spec();
    let config = GailConfig::default()
        .encoding_size(32)
        .use_vail(true)
        .seed(42);
    let mut provider =
        GailRewardProvider::with_demo_buffer(spec.clone(), config, filled_buffer(&spec, 16, 1.0))?;
    let batch = AgentBuffer::zeros(&spec, 4);
    assert_eq!(provider.beta(), Some(0.0));

    for _ in 0..3 {
        let record = provider.update(&batch)?;
        let keys = GAIL_KEYS.iter().chain(VAIL_KEYS.iter()).copied().collect::<Vec<_>>();
        assert_keys(&record, &keys);

        let beta = record.get_scalar("Policy/GAIL Beta")?;
        let kl = record.get_scalar("Losses/GAIL KL Loss")?;
        assert!(beta >= 0.0);
        assert!(kl.is_finite());
    }

    let rewards = provider.evaluate(&batch)?;
    assert_eq!(rewards.len(), 4);
    assert!(rewards.iter().all(|r| r.is_finite() && *r >= 0.0));
    Ok(())
}

#[test]
fn test_discrete_actions() -> Result<()> {
    let _lock = lock_rng();
    let spec = vector_spec(ActionSpec::Discrete(vec![3, 2]));
    let config = GailConfig::default().encoding_size(16).use_actions(true);

    let mut demo_buffer = filled_buffer(&spec, 10, 0.5);
    demo_buffer.insert(ACTIONS, Column::new(vec![2], [2.0, 1.0].repeat(10))?)?;
    demo_buffer.insert(DONE, Column::from_scalars(vec![1.0; 10]))?;
    let mut provider = GailRewardProvider::with_demo_buffer(spec.clone(), config, demo_buffer)?;

    let batch = filled_buffer(&spec, 6, -0.5);
    let record = provider.update(&batch)?;
    assert_keys(&record, &GAIL_KEYS);
    assert_eq!(provider.evaluate(&batch)?.len(), 6);

    // One value per action instead of one per branch
    let mut batch = batch;
    batch.insert(ACTIONS, Column::new(vec![1], vec![0.0; 6])?)?;
    let err = provider.evaluate(&batch).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GailError>(),
        Some(GailError::ShapeMismatch { .. })
    ));
    Ok(())
}

#[test]
fn test_observation_size_mismatch() -> Result<()> {
    let _lock = lock_rng();
    let spec = vector_spec(ActionSpec::Continuous(1));
    let config = GailConfig::default().encoding_size(16);
    let mut provider =
        GailRewardProvider::with_demo_buffer(spec.clone(), config, filled_buffer(&spec, 4, 1.0))?;

    let mut batch = AgentBuffer::new();
    batch.insert(VECTOR_OBS, Column::zeros(vec![5], 3))?;
    assert!(provider.evaluate(&batch).is_err());
    assert!(provider.update(&batch).is_err());
    Ok(())
}

#[test]
fn test_determinism() -> Result<()> {
    let _lock = lock_rng();
    let spec = vector_spec(ActionSpec::Continuous(2));
    let run = || -> Result<Vec<(String, f32)>> {
        let config = GailConfig::default()
            .encoding_size(16)
            .use_actions(true)
            .use_vail(true)
            .seed(7);
        let demo_buffer = filled_buffer(&spec, 32, 1.0);
        let mut provider = GailRewardProvider::with_demo_buffer(spec.clone(), config, demo_buffer)?;
        let batch = filled_buffer(&spec, 8, -1.0);
        let mut stats = vec![];
        for _ in 0..3 {
            let record = provider.update(&batch)?;
            let mut keys = record.keys().cloned().collect::<Vec<_>>();
            keys.sort();
            for key in keys {
                let value = record.get_scalar(&key)?;
                stats.push((key, value));
            }
        }
        Ok(stats)
    };

    let stats1 = run()?;
    let stats2 = run()?;
    assert_eq!(stats1.len(), stats2.len());
    for ((k1, v1), (k2, v2)) in stats1.iter().zip(stats2.iter()) {
        assert_eq!(k1, k2);
        assert!((v1 - v2).abs() <= 1e-6 * v1.abs().max(1.0), "{}: {} != {}", k1, v1, v2);
    }
    Ok(())
}

#[test]
fn test_discriminator_learns_expert() -> Result<()> {
    let _lock = lock_rng();
    let spec = vector_spec(ActionSpec::Continuous(1));
    let config = GailConfig::default()
        .encoding_size(16)
        .learning_rate(1e-3)
        .seed(0);
    let mut provider =
        GailRewardProvider::with_demo_buffer(spec.clone(), config, filled_buffer(&spec, 64, 1.0))?;
    let policy_batch = filled_buffer(&spec, 16, -1.0);
    let expert_like = filled_buffer(&spec, 16, 1.0);

    for _ in 0..200 {
        provider.update(&policy_batch)?;
    }

    let mean = |v: Vec<f32>| v.iter().sum::<f32>() / v.len() as f32;
    let policy_reward = mean(provider.evaluate(&policy_batch)?);
    let expert_reward = mean(provider.evaluate(&expert_like)?);
    assert!(
        expert_reward > policy_reward,
        "expert reward {} <= policy reward {}",
        expert_reward,
        policy_reward
    );
    Ok(())
}

#[test]
fn test_build_from_demo_directory() -> Result<()> {
    let _lock = lock_rng();
    let spec = vector_spec(ActionSpec::Continuous(1));
    let dir = TempDir::new("gail_provider")?;
    Demonstration::new(spec.clone(), filled_buffer(&spec, 3, 1.0))
        .save(dir.path().join("expert_a.demo"))?;
    Demonstration::new(spec.clone(), filled_buffer(&spec, 2, 2.0))
        .save(dir.path().join("expert_b.json"))?;

    let config = GailConfig::default().encoding_size(16).demo_path(dir.path());
    config.save(dir.path().join("gail.yaml"))?;
    let config = GailConfig::load(dir.path().join("gail.yaml"))?;
    let mut provider = GailRewardProvider::build(spec.clone(), config)?;
    assert_eq!(provider.demo_buffer().num_experiences(), 5);

    // More experiences than the demonstrations hold
    let record = provider.update(&filled_buffer(&spec, 8, 0.0))?;
    assert_keys(&record, &GAIL_KEYS);

    // Demonstrations of another behavior
    let other = vector_spec(ActionSpec::Discrete(vec![2]));
    let config = GailConfig::default().encoding_size(16).demo_path(dir.path());
    assert!(GailRewardProvider::build(other, config).is_err());
    Ok(())
}
