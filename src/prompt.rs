// Copyright 2025 Lablup Inc. and Jeongkyu Shin
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

//! Terminal prompts. Everything asked here is collected before the
//! workflow starts, except the remediation confirmation.

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password};

use crate::common::config::{AppConfig, Credentials, Endpoint};
use crate::error::{Error, Result};
use crate::inventory::Volume;

fn prompt_error(e: dialoguer::Error) -> Error {
    Error::Prompt(e.to_string())
}

#[allow(clippy::ptr_arg)]
fn not_blank(input: &String) -> std::result::Result<(), &'static str> {
    if input.trim().is_empty() {
        Err("value cannot be empty")
    } else {
        Ok(())
    }
}

pub fn cluster_name() -> Result<String> {
    let theme = ColorfulTheme::default();
    let name: String = Input::with_theme(&theme)
        .with_prompt("Cluster name")
        .validate_with(not_blank)
        .interact_text()
        .map_err(prompt_error)?;
    Ok(name.trim().to_string())
}

/// Username from `--user` or a prompt; password from the environment or a
/// hidden prompt.
pub fn credentials(user: Option<String>, endpoint: &Endpoint) -> Result<Credentials> {
    let theme = ColorfulTheme::default();

    let username = match user {
        Some(user) => user,
        None => Input::with_theme(&theme)
            .with_prompt(format!("Username for {}", endpoint.host))
            .validate_with(not_blank)
            .interact_text()
            .map_err(prompt_error)?,
    };

    let password = match std::env::var(AppConfig::PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => {
            tracing::debug!("Using password from {}", AppConfig::PASSWORD_ENV);
            password
        }
        _ => Password::with_theme(&theme)
            .with_prompt(format!("Password for {username}@{}", endpoint.host))
            .interact()
            .map_err(prompt_error)?,
    };

    Ok(Credentials::new(username, password))
}

pub fn confirm_remediation(targets: &[Volume]) -> Result<bool> {
    let hosts = {
        let mut names: Vec<&str> = targets.iter().map(|v| v.host_name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    };
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "Set round-robin to switch paths every {} command(s) on {} volume(s) across {hosts} host(s)?",
            AppConfig::TARGET_COMMANDS_PER_PATH,
            targets.len(),
        ))
        .default(false)
        .interact()
        .map_err(prompt_error)
}
