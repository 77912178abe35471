/*
 * Copyright 2019 OysterPack Inc.
 *
 *    Licensed under the Apache License, Version 2.0 (the "License");
 *    you may not use this file except in compliance with the License.
 *    You may obtain a copy of the License at
 *
 *        http://www.apache.org/licenses/LICENSE-2.0
 *
 *    Unless required by applicable law or agreed to in writing, software
 *    distributed under the License is distributed on an "AS IS" BASIS,
 *    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *    See the License for the specific language governing permissions and
 *    limitations under the License.
 */

//! Standardizes logging for [vow](https://docs.rs/vow) on top of [log](https://crates.io/crates/log).
//! Given a LogConfig, this crate knows how to initialize the logging system.
//!
//! Every log line carries the name of the thread that emitted it, which is what makes executor
//! hand-offs visible: a pipeline that hops from one executor to another logs each stage from a
//! differently named thread.
//!
//! ```rust
//! fn main() {
//!     vow_log::init(log_config()).unwrap();
//!     // The LogConfig used to initialize the log system can be retrieved.
//!     let log_config = vow_log::config().unwrap();
//!     assert_eq!(log_config.root_level(), vow_log::Level::Warn);
//! }
//!
//! /// The default LogConfig sets the root log level to Warn and logs to stderr.
//! fn log_config() -> vow_log::LogConfig {
//!     Default::default()
//! }
//! ```

#![deny(missing_docs, missing_debug_implementations)]
#![doc(html_root_url = "https://docs.rs/vow_log/0.1.0")]

#[allow(unused_imports)]
#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod config;
pub mod manager;

pub use crate::config::{LogConfig, LogConfigBuilder, LogOutput, Target};
pub use crate::manager::{config, init, is_initialized};

pub use log::{
    // re-export the log macros
    debug,
    error,
    info,
    log,
    log_enabled,
    trace,
    warn,
    // re-export some other common log members
    Level,
    LevelFilter,
};


#[cfg(test)]
pub use crate::tests::run_test;
