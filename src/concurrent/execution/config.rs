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

//! Executors config, which can be loaded from JSON, e.g.
//!
//! ```json
//! {
//!   "executors": [
//!     { "id": "01D3W0H2B7KJWNSF8KNK3TT93Y", "kind": "FixedThreadPool", "pool_size": 4 },
//!     { "id": "01D3W0KVK6SSMM0ZNK4TS12DJZ", "kind": "SingleThread" }
//!   ]
//! }
//! ```

use super::{Executor, ExecutorBuilder, ExecutorRegistryError};
use serde::{Deserialize, Serialize};
use vow_log::*;

/// Executors config
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutorsConfig {
    #[serde(default)]
    executors: Vec<ExecutorBuilder>,
}

impl ExecutorsConfig {
    /// constructor
    pub fn new(executors: Vec<ExecutorBuilder>) -> Self {
        Self { executors }
    }

    /// Parses the config from JSON
    pub fn from_json(json: &str) -> Result<Self, ExecutorRegistryError> {
        serde_json::from_str(json).map_err(ExecutorRegistryError::InvalidConfig)
    }

    /// Returns the executor configs
    pub fn executors(&self) -> &[ExecutorBuilder] {
        &self.executors
    }

    /// Builds and registers each executor with the global registry, in config order.
    /// Stops at the first executor that fails to register.
    pub fn register(&self) -> Result<Vec<Executor>, ExecutorRegistryError> {
        self.executors
            .iter()
            .map(|builder| -> Result<Executor, ExecutorRegistryError> {
                let executor = builder.register()?;
                info!("registered executor from config: {:?}", builder);
                Ok(executor)
            })
            .collect()
    }
}
