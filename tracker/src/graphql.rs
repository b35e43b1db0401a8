use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::CollectError;
use crate::models::SubmissionStat;

const PROFILE_QUERY: &str = r#"
  query getUserProfile($username: String!) {
    matchedUser(username: $username) {
      username
      profile {
        ranking
        userAvatar
        realName
      }
      submitStats: submitStatsGlobal {
        acSubmissionNum {
          difficulty
          count
          submissions
        }
      }
    }
  }
"#;

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Variables<'a>,
}

#[derive(Debug, Serialize)]
struct Variables<'a> {
    username: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<ResponseData>,
    errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    matched_user: Option<MatchedUser>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedUser {
    pub username: String,
    pub profile: Profile,
    pub submit_stats: SubmitStats,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub ranking: u64,
    pub user_avatar: Option<String>,
    pub real_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitStats {
    pub ac_submission_num: Vec<SubmissionStat>,
}

/// Query the public profile of `username`.
pub async fn fetch_profile(
    client: &Client,
    endpoint: &str,
    username: &str,
) -> Result<MatchedUser, CollectError> {
    let body = GraphqlRequest {
        query: PROFILE_QUERY,
        variables: Variables { username },
    };

    tracing::debug!("querying {} for {}", endpoint, username);
    let response = client
        .post(endpoint)
        .header("Referer", "https://leetcode.com")
        .json(&body)
        .send()
        .await
        .map_err(|e| transport(endpoint, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CollectError::Status(status));
    }

    let text = response.text().await.map_err(|e| transport(endpoint, e))?;
    parse_profile_response(&text, username)
}

/// Turn a raw GraphQL response body into the matched user, rejecting error
/// payloads and unknown users.
pub fn parse_profile_response(body: &str, username: &str) -> Result<MatchedUser, CollectError> {
    let response: GraphqlResponse = serde_json::from_str(body)
        .map_err(|e| CollectError::Api(format!("malformed response: {}", e)))?;

    if let Some(errors) = response.errors {
        return Err(CollectError::Api(format!("GraphQL errors: {}", errors)));
    }

    response
        .data
        .and_then(|d| d.matched_user)
        .ok_or_else(|| CollectError::Api(format!("user '{}' not found", username)))
}

fn transport(endpoint: &str, source: reqwest::Error) -> CollectError {
    CollectError::Transport {
        endpoint: endpoint.to_string(),
        source,
    }
}
