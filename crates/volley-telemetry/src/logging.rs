// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! `env_logger` bootstrap.
//!
//! The filter is read from `RUST_LOG` when set; otherwise the given default
//! applies. Initialization is idempotent: only the first call installs a
//! logger, later calls return `false`.

use env_logger::{Builder, Env};

/// Installs the process-wide logger with an `info` default filter.
pub fn init_logging() -> bool {
    init_logging_with("info")
}

/// Installs the process-wide logger with `default_filter` (e.g. `"volley=debug"`).
pub fn init_logging_with(default_filter: &str) -> bool {
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}

/// Installs a logger whose output is captured by the test harness.
pub fn init_test_logging() -> bool {
    Builder::from_env(Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_a_noop() {
        init_test_logging();
        assert!(!init_logging());
        assert!(!init_test_logging());
    }
}
