use serde::Deserialize;

use crate::config::AppConfig;
use crate::error::PersistError;
use crate::http_client::http_client;

pub const ANONYMOUS_USER: &str = "anonymous_user";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub app_id: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    #[serde(default)]
    user_id: Option<String>,
}

/// Works out who we are. A fixed user id wins, then anonymous sign-in, then the shared
/// anonymous user. Never fails: persistence just ends up under the anonymous user.
pub fn resolve_identity(config: &AppConfig) -> Identity {
    let user_id = if let Some(user_id) = config.user_id.clone() {
        user_id
    } else if let Some(auth_url) = config.auth_url.as_deref() {
        match sign_in_anonymously(auth_url, &config.app_id) {
            Ok(Some(user_id)) => user_id,
            Ok(None) => ANONYMOUS_USER.to_string(),
            Err(err) => {
                log::warn!("anonymous sign-in failed: {err}");
                ANONYMOUS_USER.to_string()
            }
        }
    } else {
        ANONYMOUS_USER.to_string()
    };

    Identity {
        app_id: config.app_id.clone(),
        user_id,
    }
}

fn sign_in_anonymously(auth_url: &str, app_id: &str) -> Result<Option<String>, PersistError> {
    let resp = http_client()?
        .post(auth_url)
        .json(&serde_json::json!({ "appId": app_id }))
        .send()?;
    let status = resp.status();
    let body = resp.text()?;
    if !status.is_success() {
        return Err(PersistError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let parsed = serde_json::from_str::<SignInResponse>(&body)?;
    Ok(parsed.user_id.filter(|id| !id.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_user_id_skips_sign_in() {
        let config = AppConfig {
            user_id: Some("coach-7".to_string()),
            auth_url: Some("http://127.0.0.1:9/never".to_string()),
            ..AppConfig::default()
        };
        let identity = resolve_identity(&config);
        assert_eq!(identity.user_id, "coach-7");
        assert_eq!(identity.app_id, config.app_id);
    }

    #[test]
    fn no_provider_means_anonymous() {
        let identity = resolve_identity(&AppConfig::default());
        assert_eq!(identity.user_id, ANONYMOUS_USER);
    }
}
