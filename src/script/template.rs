//! FunkLoad test case and configuration templates

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{error, info};

use super::Script;
use crate::{RecorderError, Result};

/// Names derived from the user supplied test name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseNames {
    /// Test name as given
    pub test_name: String,
    /// Python method-safe form of the test name
    pub method_name: String,
    /// Capitalized words form, e.g. `foo_bar` gives `FooBar`
    pub class_name: String,
    /// Generated test module, `test_<ClassName>.py`
    pub script_path: PathBuf,
    /// Generated configuration, `<ClassName>.conf`
    pub configuration_path: PathBuf,
}

impl TestCaseNames {
    /// Derive all names for a test case written into `output_dir`
    ///
    /// # Errors
    ///
    /// Returns error if the test name holds no alphanumeric character
    pub fn new(test_name: &str, output_dir: &Path) -> Result<Self> {
        let class_name = class_name(test_name)?;
        let method_name = test_name
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();

        Ok(Self {
            test_name: test_name.to_string(),
            method_name,
            script_path: output_dir.join(format!("test_{class_name}.py")),
            configuration_path: output_dir.join(format!("{class_name}.conf")),
            class_name,
        })
    }
}

/// Capitalized-words identifier for a test name
///
/// # Errors
///
/// Returns error if the test name holds no alphanumeric character
pub fn class_name(test_name: &str) -> Result<String> {
    let mut name: String = test_name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect()
            })
        })
        .collect();

    if name.is_empty() {
        return Err(RecorderError::InvalidTestName(format!(
            "{test_name:?} has no usable characters"
        )));
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }

    Ok(name)
}

/// Render the FunkLoad test module around a generated script
pub fn render_test_case(script: &Script, names: &TestCaseNames) -> String {
    format!(
        r#"# -*- coding: utf-8 -*-
"""{test_name} FunkLoad test

Recorded against {server_url}.
"""
import unittest
from funkload.FunkLoadTestCase import FunkLoadTestCase
from webunit.utility import Upload


class {class_name}(FunkLoadTestCase):
    """Replay of the recorded {test_name} session.

    This test uses the configuration file {class_name}.conf.
    """

    def setUp(self):
        """Setting up test."""
        self.logd("setUp")
        self.server_url = self.conf_get('main', 'url')

    def test_{method_name}(self):
        server_url = self.server_url
        # begin of test ---------------------------------------------
{script}

        # end of test -----------------------------------------------

    def tearDown(self):
        """Tearing down test."""
        self.logd("tearDown.\n")


if __name__ in ('main', '__main__'):
    unittest.main()
"#,
        test_name = names.test_name,
        server_url = script.server_url(),
        class_name = names.class_name,
        method_name = names.method_name,
        script = script.render(),
    )
}

/// Render the FunkLoad configuration pointing the test at `server_url`
pub fn render_configuration(server_url: &str, names: &TestCaseNames) -> String {
    format!(
        r"# FunkLoad test configuration file
[main]
title={class_name}
label=Recorded {test_name} session
description=Replay of the {test_name} session
url={server_url}

[test_{method_name}]
description=Replay of the recorded {test_name} session

[ftest]
log_to = console file
log_path = {method_name}-test.log
result_path = {method_name}-test.xml
ok_codes = 200:301:302
sleep_time_min = 0
sleep_time_max = 0

[bench]
cycles = 5:15:30
duration = 100
startup_delay = 2
sleep_time = 2
cycle_time = 1
log_to = file
log_path = {method_name}-bench.log
result_path = {method_name}-bench.xml
ok_codes = 200:301:302
sleep_time_min = 0
sleep_time_max = 2
",
        class_name = names.class_name,
        test_name = names.test_name,
        method_name = names.method_name,
        server_url = server_url,
    )
}

/// Write `content` to a new file, refusing to replace an existing one
///
/// Returns `false` when the file already existed and was left untouched.
///
/// # Errors
///
/// Returns error if the file cannot be created or written
pub fn write_new(path: &Path, content: &str) -> Result<bool> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            info!("Creating {}", path.display());
            file.write_all(content.as_bytes())?;
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            error!("File {} already exists, not overwriting", path.display());
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
