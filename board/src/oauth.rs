//! OAuth 2.0 authorization against Google for read-only YouTube access.
//!
//! This module implements [`IdentityProvider`] with the installed-application flow: the user's
//! browser is sent to Google's consent screen, a one-shot HTTP server on localhost receives the
//! redirect, and the authorization code is exchanged (with PKCE) for an access token.

use crate::identity::{Credential, IdentityError, IdentityProvider};
use eyre::Context;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::service::service_fn;
use hyper::{Request, Response, body};
use oauth2::basic::BasicClient;
use oauth2::{
    AccessToken, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    PkceCodeChallenge, RedirectUrl, RevocationUrl, Scope, StandardRevocableToken, TokenResponse,
    TokenUrl, reqwest,
};
use std::future::Future;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://www.googleapis.com/oauth2/v3/token";
const REVOCATION_URL: &str = "https://oauth2.googleapis.com/revoke";

/// Read-only access to the user's YouTube account is all the board needs.
pub const YOUTUBE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/youtube.readonly";

const OAUTH_DONE_HTML: &str = "<!doctype html><html><body>\
    <p>Subscription Board is connected. You can close this tab.</p></body></html>";

/// Google sign-in for the board.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    client_id: String,
    client_secret: Option<String>,
}

/// What the redirect endpoint learned from Google.
type RedirectOutcome = Result<AuthorizationCode, IdentityError>;

impl GoogleIdentity {
    /// Creates a provider for the given OAuth client.
    ///
    /// Google's "Desktop app" clients come with a secret that is not actually confidential; pass
    /// it if you have one.
    pub fn new(client_id: impl Into<String>, client_secret: Option<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
        }
    }

    fn http_client() -> eyre::Result<reqwest::Client> {
        reqwest::ClientBuilder::new()
            // SSRF no thank you.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("build OAuth HTTP client")
    }

    /// Performs a complete OAuth 2.0 authorization flow to obtain a new access token.
    ///
    /// 1. Opening the user's browser for authorization
    /// 2. Setting up a local HTTP server to receive the authorization callback
    /// 3. Exchanging the authorization code for an access token
    async fn authenticate(&self) -> Result<Credential, IdentityError> {
        let csrf = CsrfToken::new_random();
        let (redirect_url, eventually_authorization_code) = self
            .setup_redirect(csrf.clone())
            .await
            .context("set up redirect endpoint")?;

        let mut client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_auth_uri(AuthUrl::new(AUTH_URL.to_string()).context("parse auth URL")?)
            .set_token_uri(TokenUrl::new(TOKEN_URL.to_string()).context("parse token URL")?)
            .set_redirect_uri(redirect_url);
        if let Some(secret) = &self.client_secret {
            client = client.set_client_secret(ClientSecret::new(secret.clone()));
        }

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, _csrf_token) = client
            // We never re-use the CSRF since we only go through the flow exactly once.
            .authorize_url(move || csrf.clone())
            .add_scope(Scope::new(YOUTUBE_READONLY_SCOPE.to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        tracing::info!(url = %auth_url, "asking user to follow OAuth flow");
        webbrowser::open(auth_url.as_ref()).context("open user's browser")?;
        let authorization_code = eventually_authorization_code.await?;

        let http_client = Self::http_client()?;
        let token = match client
            .exchange_code(authorization_code)
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http_client)
            .await
        {
            Ok(token) => token,
            Err(oauth2::RequestTokenError::ServerResponse(sr)) => {
                return Err(IdentityError::Denied {
                    error: sr.error().to_string(),
                    description: sr.error_description().cloned(),
                });
            }
            Err(e) => {
                return Err(eyre::Report::new(e)
                    .wrap_err("exchange authorization code with access token")
                    .into());
            }
        };

        Ok(Credential::new(token.access_token().secret().clone()))
    }

    /// Sets up a local HTTP server to receive the OAuth authorization callback.
    ///
    /// Creates a temporary HTTP server on a random local port to handle the OAuth
    /// redirect after user authorization. The server validates the CSRF token and
    /// extracts either the authorization code or Google's error from the callback.
    ///
    /// # Returns
    ///
    /// A tuple containing:
    /// - The redirect URL to use in the OAuth flow
    /// - A future that resolves to the authorization code when the callback is received
    async fn setup_redirect(
        &self,
        csrf: CsrfToken,
    ) -> eyre::Result<(RedirectUrl, impl Future<Output = RedirectOutcome>)> {
        let socket = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind to localhost")?;
        let addr = socket.local_addr().context("get local address")?;
        let url = RedirectUrl::new(format!("http://{}:{}", addr.ip(), addr.port()))
            .context("construct redirect url")?;
        let (tx, rx) = tokio::sync::oneshot::channel::<RedirectOutcome>();
        tokio::spawn(async move {
            let r = async move {
                let (conn, _) = socket.accept().await.context("accept")?;
                let conn = hyper_util::rt::TokioIo::new(conn);
                let (got, mut gotten) = tokio::sync::mpsc::channel::<RedirectOutcome>(1);
                let service = service_fn(move |req: Request<body::Incoming>| {
                    let csrf = csrf.clone();
                    let got = got.clone();
                    async move {
                        let outcome = parse_callback(req.uri().query().unwrap_or(""), &csrf);
                        let Some(outcome) = outcome else {
                            return Err("invalid csrf token");
                        };
                        let page = if outcome.is_ok() {
                            OAUTH_DONE_HTML
                        } else {
                            "Authorization failed. You can close this tab."
                        };
                        // the receiver only goes away once the server is shutting down
                        let _ = got.send(outcome).await;
                        Ok(Response::new(Full::<Bytes>::from(page)))
                    }
                });
                let mut serve = std::pin::pin!(
                    hyper::server::conn::http1::Builder::new().serve_connection(conn, service)
                );

                tokio::select! {
                    exit = &mut serve => {
                        if let Err(e) = exit {
                            Err(e).context("redirect server got bad request")
                        } else {
                            eyre::bail!("redirect server exit prematurely");
                        }
                    }
                    outcome = gotten.recv() => {
                        serve.as_mut().graceful_shutdown();
                        // let the response make it to the browser
                        let _ = serve.await;
                        outcome.ok_or_else(|| eyre::eyre!("redirect handler went away"))
                    }
                }
            };
            let _ = tx.send(match r.await {
                Ok(outcome) => outcome,
                Err(e) => Err(e.into()),
            });
        });
        Ok((url, async move {
            rx.await
                .context("redirect future dropped prematurely")
                .map_err(IdentityError::from)?
        }))
    }
}

/// Interprets the query string Google redirects back with.
///
/// Returns `None` if the `state` does not match our CSRF token, in which case the request did
/// not come from our flow and is ignored.
fn parse_callback(query: &str, csrf: &CsrfToken) -> Option<RedirectOutcome> {
    let mut presented_state = None;
    let mut presented_code = None;
    let mut presented_error = None;
    let mut presented_description = None;
    for (k, v) in form_urlencoded::parse(query.as_bytes()) {
        match &*k {
            "state" => presented_state = Some(v),
            "code" => presented_code = Some(v),
            "error" => presented_error = Some(v),
            "error_description" => presented_description = Some(v),
            _ => {}
        }
    }
    if presented_state.as_deref() != Some(csrf.secret().as_str()) {
        return None;
    }
    Some(match (presented_code, presented_error) {
        (Some(code), None) => Ok(AuthorizationCode::new(code.into_owned())),
        (_, Some(error)) => Err(IdentityError::Denied {
            error: error.into_owned(),
            description: presented_description.map(|d| d.into_owned()),
        }),
        (None, None) => Err(IdentityError::Denied {
            error: "no authorization code found".to_string(),
            description: None,
        }),
    })
}

impl IdentityProvider for GoogleIdentity {
    async fn request_token(&self) -> Result<Credential, IdentityError> {
        self.authenticate().await
    }

    async fn revoke(&self, credential: &Credential) -> Result<(), IdentityError> {
        let client = BasicClient::new(ClientId::new(self.client_id.clone())).set_revocation_url(
            RevocationUrl::new(REVOCATION_URL.to_string()).context("parse revocation URL")?,
        );
        let http_client = Self::http_client()?;
        let token = StandardRevocableToken::AccessToken(AccessToken::new(
            credential.secret().to_string(),
        ));
        client
            .revoke_token(token)
            .context("build revocation request")?
            .request_async(&http_client)
            .await
            .context("revoke access token")?;
        tracing::debug!("revoked access token");
        Ok(())
    }
}
