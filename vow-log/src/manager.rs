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

//! This module is the anchor point for configuring and initializing the [log](https://crates.io/crates/log) system.

use crate::config::{LogConfig, LogOutput};
use fern::Dispatch;
use lazy_static::lazy_static;
use log::{info, warn, SetLoggerError};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        RwLock,
    },
    thread,
};

const LOG_NOT_INITIALIZED: usize = 0;
const LOG_INITIALIZING: usize = 1;
const LOG_INITIALIZED: usize = 2;
// LOG_STATE transitions: LOG_NOT_INITIALIZED -> LOG_INITIALIZING -> LOG_INITIALIZED
static LOG_STATE: AtomicUsize = AtomicUsize::new(LOG_NOT_INITIALIZED);

lazy_static! {
    static ref LOG_CONFIG: RwLock<Option<LogConfig>> = RwLock::new(None);
}

/// Initializes the logging system.
/// - if the logging system is already initialized, then a warning is logged and the config is
///   ignored
/// - if another thread is initializing, then the call blocks until it is done. If that attempt
///   failed, then initialization is retried using this config.
/// - fails only if a logger was installed outside of this crate
pub fn init(config: LogConfig) -> Result<(), SetLoggerError> {
    initialize_once(&LOG_STATE, || apply(config.clone()))
}

// Runs `initialize` if `state` is LOG_NOT_INITIALIZED. Waiters retry if the attempt they waited on
// failed, thus `initialize` may run more than once, but never concurrently.
fn initialize_once<E, F>(state: &AtomicUsize, mut initialize: F) -> Result<(), E>
where
    F: FnMut() -> Result<(), E>,
{
    loop {
        match state.compare_exchange(
            LOG_NOT_INITIALIZED,
            LOG_INITIALIZING,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => {
                let result = initialize();
                let next = if result.is_ok() {
                    LOG_INITIALIZED
                } else {
                    LOG_NOT_INITIALIZED
                };
                state.store(next, Ordering::SeqCst);
                return result;
            }
            Err(LOG_INITIALIZING) => {
                while state.load(Ordering::SeqCst) == LOG_INITIALIZING {
                    thread::yield_now();
                }
                if state.load(Ordering::SeqCst) == LOG_INITIALIZED {
                    return Ok(());
                }
            }
            Err(_) => {
                warn!("logging has already been initialized");
                return Ok(());
            }
        }
    }
}

fn apply(config: LogConfig) -> Result<(), SetLoggerError> {
    let mut dispatch = Dispatch::new().level(config.root_level().to_level_filter());
    if let Some(target_levels) = config.target_levels() {
        for (target, level) in target_levels {
            dispatch = dispatch.level_for(target.0.clone(), level.to_level_filter());
        }
    }
    configure_output(config.output(), dispatch).apply()?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    if let Ok(mut log_config) = LOG_CONFIG.write() {
        *log_config = Some(config);
    }
    info!("logging has been initialized using config: {}", config_json);
    Ok(())
}

fn configure_output(output: LogOutput, dispatch: Dispatch) -> Dispatch {
    let dispatch = configure_format(dispatch);
    match output {
        LogOutput::Stdout => dispatch.chain(std::io::stdout()),
        LogOutput::Stderr => dispatch.chain(std::io::stderr()),
    }
}

// [time][LEVEL][thread][target] message
fn configure_format(dispatch: Dispatch) -> Dispatch {
    dispatch.format(|out, message, record| {
        let current = thread::current();
        out.finish(format_args!(
            "{}[{}][{}][{}] {}",
            chrono::Local::now().format("[%H:%M:%S%.3f]"),
            record.level(),
            current.name().unwrap_or("<unnamed>"),
            record.target(),
            message
        ))
    })
}

/// Returns true if the log system has been initialized by this crate
pub fn is_initialized() -> bool {
    LOG_STATE.load(Ordering::SeqCst) == LOG_INITIALIZED
}

/// Returns the LogConfig used to initialize the log system.
pub fn config() -> Option<LogConfig> {
    LOG_CONFIG
        .read()
        .ok()
        .and_then(|log_config| log_config.clone())
}
