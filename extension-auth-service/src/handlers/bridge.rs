//! Hand-off bridging page.
//!
//! The redirect target after authenticate-and-bind. Its whole contract is:
//! validate the hand-off parameters, publish the credential payload on the
//! well-known channel (`window.authResult` plus an
//! `extension-auth-complete` CustomEvent) so same-page extension code can
//! capture it before any navigation, then perform one guarded, delayed
//! navigation of the user's own tab to the dashboard.

use axum::{extract::Query, response::Html};
use serde::Deserialize;
use utoipa::IntoParams;

/// Channel name extension content scripts listen on.
pub const HANDOFF_EVENT: &str = "extension-auth-complete";

/// Delay before the tab navigates to the dashboard, giving the extension
/// time to read the payload.
const NAVIGATION_DELAY_MS: u32 = 1000;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BridgeQuery {
    pub token: Option<String>,
    pub user_data: Option<String>,
    pub state: Option<String>,
    pub client_redirect: Option<String>,
    pub dashboard_url: Option<String>,
}

/// Bridging page for the extension hand-off
#[utoipa::path(
    get,
    path = "/extension-auth-success",
    params(BridgeQuery),
    responses(
        (status = 200, description = "Bridging page; an error state is still a 200 page"),
    ),
    tag = "Extension Handshake"
)]
pub async fn extension_auth_success(Query(query): Query<BridgeQuery>) -> Html<String> {
    render_bridge_page(&query)
}

pub fn render_bridge_page(query: &BridgeQuery) -> Html<String> {
    let (Some(token), Some(user_data), Some(state)) =
        (&query.token, &query.user_data, &query.state)
    else {
        tracing::warn!("Bridging page loaded without complete hand-off parameters");
        return render_error_page("Authentication data is incomplete. Please sign in again.");
    };

    // The user snapshot travelled URL-encoded through the redirect; anything
    // that does not parse as JSON is a mangled hand-off, not a soft error.
    let user_json: serde_json::Value = match serde_json::from_str(user_data) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "Bridging page received malformed user data");
            return render_error_page("Could not process authentication data. Please sign in again.");
        }
    };

    let payload = serde_json::json!({
        "success": true,
        "token": token,
        "userData": user_json,
        "state": state,
        "dashboardUrl": query.dashboard_url,
        "clientRedirect": query.client_redirect,
    });
    // '<' must not appear literally inside the inline script
    let payload_json = payload.to_string().replace('<', "\\u003c");

    let dashboard_href = query.dashboard_url.as_deref().unwrap_or("/dashboard");

    Html(
        SUCCESS_TEMPLATE
            .replace("__PAYLOAD__", &payload_json)
            .replace("__EVENT__", HANDOFF_EVENT)
            .replace("__DELAY_MS__", &NAVIGATION_DELAY_MS.to_string())
            .replace("__DASHBOARD_HREF__", &escape_attr(dashboard_href)),
    )
}

fn render_error_page(message: &str) -> Html<String> {
    Html(ERROR_TEMPLATE.replace("__MESSAGE__", &escape_attr(message)))
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const SUCCESS_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Extension Authentication</title>
  <style>
    body { font-family: sans-serif; background: #f9fafb; display: flex; justify-content: center; padding-top: 6rem; }
    .card { background: #fff; border-radius: 8px; box-shadow: 0 1px 3px rgba(0,0,0,.1); padding: 2rem 3rem; text-align: center; }
    .muted { color: #6b7280; font-size: .85rem; margin-top: 1rem; }
  </style>
</head>
<body>
  <div class="card">
    <h1>Authentication successful</h1>
    <p>Signing you in…</p>
    <p class="muted">If this page does not redirect, <a href="__DASHBOARD_HREF__">open the dashboard</a>.</p>
  </div>
  <script>
    (function () {
      var payload = __PAYLOAD__;
      var navigated = false;

      // Publish before any navigation so same-page extension code can
      // capture the credential.
      window.authResult = payload;
      window.dispatchEvent(new CustomEvent('__EVENT__', { detail: payload }));

      if (payload.dashboardUrl) {
        window.addEventListener('pagehide', function () { navigated = true; });
        setTimeout(function () {
          // Single-shot, and only while the tab is still foregrounded: a
          // background tab must not yank the user around later.
          if (document.visibilityState === 'visible' && !navigated) {
            navigated = true;
            window.location.href = payload.dashboardUrl;
          }
        }, __DELAY_MS__);
      }
    })();
  </script>
</body>
</html>
"#;

const ERROR_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Extension Authentication</title>
  <style>
    body { font-family: sans-serif; background: #f9fafb; display: flex; justify-content: center; padding-top: 6rem; }
    .card { background: #fff; border-radius: 8px; box-shadow: 0 1px 3px rgba(0,0,0,.1); padding: 2rem 3rem; text-align: center; }
    .error { color: #b91c1c; }
  </style>
</head>
<body>
  <div class="card">
    <h1 class="error">Authentication failed</h1>
    <p>__MESSAGE__</p>
    <p><a href="/extension-auth">Try signing in again</a></p>
  </div>
</body>
</html>
"#;
