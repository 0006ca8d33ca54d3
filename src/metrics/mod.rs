pub mod running;
pub mod class_accuracy;
pub mod report;
pub mod aggregator;

pub use running::{RunningMetrics, count_correct};
pub use class_accuracy::ClassAccuracy;
pub use report::{WindowReport, EvalReport};
pub use aggregator::MetricsAggregator;
