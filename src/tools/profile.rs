//! wegene-get-profiles

use super::{missing_token_text, ToolOutput};
use crate::context::AppContext;
use crate::error::{Error, Result};
use crate::types::Profile;

/// Tool text plus the profiles to publish, when the fetch worked
#[derive(Debug, Clone)]
pub struct ProfilesOutcome {
    pub output: ToolOutput,
    pub profiles: Option<Vec<Profile>>,
}

impl ProfilesOutcome {
    fn failure(text: String) -> Self {
        Self {
            output: ToolOutput::Failure(text),
            profiles: None,
        }
    }
}

/// Fetch the profiles under the authorized account.
///
/// Does not touch the in-memory profile list; the gateway owns that.
pub async fn get_profiles(ctx: &AppContext) -> Result<ProfilesOutcome> {
    let Some(token) = ctx.tokens.get_token()? else {
        return Ok(ProfilesOutcome::failure(missing_token_text()));
    };

    let profiles = match ctx.client.get_profiles(&token).await {
        Ok(profiles) => profiles,
        Err(err @ Error::Upstream { .. }) => {
            return Ok(ProfilesOutcome::failure(format!(
                "Error: Failed to get profile: {}",
                err
            )));
        }
        Err(err) => return Err(err),
    };

    Ok(ProfilesOutcome {
        output: ToolOutput::Success(summarize(&profiles)),
        profiles: Some(profiles),
    })
}

fn summarize(profiles: &[Profile]) -> String {
    let lines: Vec<String> = profiles
        .iter()
        .enumerate()
        .map(|(i, p)| format!("Profile {}: ID={}, Name={}", i + 1, p.profile_id, p.name))
        .collect();

    format!(
        "Successfully retrieved {} profiles(s):\n{}",
        profiles.len(),
        lines.join("\n")
    )
}
