//! Small statistics helpers shared by the game runner and the learner.
//!
//! - [`descriptive`]: Summary statistics (min, max, mean, median, spread) of a finished series
//! - [`rolling`]: Fixed-window rolling mean over the most recent samples
//!
//! # Examples
//!
//! ```
//! use stackbot_stats::{descriptive::DescriptiveStats, rolling::RollingMean};
//!
//! let stats = DescriptiveStats::new([1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//! assert_eq!(stats.mean, 3.0);
//!
//! let mut recent = RollingMean::new(2);
//! recent.push(1.0);
//! recent.push(3.0);
//! recent.push(5.0);
//! assert_eq!(recent.mean(), Some(4.0));
//! ```

pub mod descriptive;
pub mod rolling;
