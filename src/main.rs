//! Trains the baseline point-cloud classifier with the fixed reference
//! configuration. There are no flags; set `RUST_LOG` to change verbosity.

use std::process::ExitCode;

use rand::{rngs::StdRng, SeedableRng};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ferrite_cls::{train_loop, PointClassifier, PointCloudDataset, DatasetSource, Result, TrainConfig};

fn run() -> Result<()> {
    let config = TrainConfig::reference();
    config.validate()?;

    let mut train = PointCloudDataset::load_json(&config.train_path, config.batch_size, config.num_point, config.shuffle_train)?
        .with_seed(config.seed);
    let mut test = PointCloudDataset::load_json(&config.test_path, config.batch_size, config.num_point, config.shuffle_test)?
        .with_seed(config.seed.wrapping_add(1));

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut model = PointClassifier::new(&config.model, train.num_channel(), config.num_classes, &mut rng)?;
    let mut optimizer = config.optimizer.build();

    let history = train_loop(&mut model, optimizer.as_mut(), &mut train, &mut test, &config)?;
    if let Some(last) = history.last() {
        info!(
            epochs = history.len(),
            val_accuracy = last.val_accuracy,
            val_avg_class_accuracy = last.val_avg_class_accuracy,
            "done"
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ferrite_cls=info")),
        )
        .with_target(false)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("training failed: {e}");
            ExitCode::FAILURE
        }
    }
}
