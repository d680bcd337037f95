use std::{
    io::{self, BufRead, Read, Write},
    net::{TcpListener, TcpStream},
};

use anyhow::Context;
use async_trait::async_trait;
use randblem_app::{AppError, AuthorizationCallback, AuthorizationCodeSource};
use randblem_bungie::LoginRequest;
use url::Url;

/// Prints the authorize URL and waits for the user to come back with a code.
pub(crate) struct CliCodeSource {
    redirect_url: Option<String>,
}

impl CliCodeSource {
    pub(crate) fn new(redirect_url: Option<String>) -> Self {
        Self { redirect_url }
    }
}

#[async_trait]
impl AuthorizationCodeSource for CliCodeSource {
    async fn authorization_code(
        &mut self,
        login: &LoginRequest,
    ) -> Result<AuthorizationCallback, AppError> {
        println!(
            "Open this URL in your browser and approve access:\n\n{}\n",
            login.authorization_url
        );

        let redirect_url = self.redirect_url.clone();
        let captured = tokio::task::spawn_blocking(move || match redirect_url {
            Some(url) if url.starts_with("http://") => {
                println!("Waiting for callback on {url}");
                wait_for_callback(&url)
            }
            _ => prompt_for_redirect(),
        })
        .await
        .map_err(|err| AppError::AuthorizationCode(format!("callback task failed: {err}")))?;

        captured.map_err(|err| AppError::AuthorizationCode(format!("{err:#}")))
    }
}

fn prompt_for_redirect() -> anyhow::Result<AuthorizationCallback> {
    println!("After approving, paste the full URL your browser was redirected to:");
    print!("> ");
    io::stdout().flush().context("failed to flush prompt")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read redirected URL")?;
    parse_redirect(line.trim())
}

/// Pulls `code` and `state` out of a redirected URL. A bare code is accepted
/// too.
pub(crate) fn parse_redirect(input: &str) -> anyhow::Result<AuthorizationCallback> {
    if input.is_empty() {
        anyhow::bail!("no redirected URL was entered");
    }

    let Ok(url) = Url::parse(input) else {
        return Ok(AuthorizationCallback {
            code: input.to_owned(),
            state: None,
        });
    };

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        if key == "code" {
            code = Some(value.into_owned());
        } else if key == "state" {
            state = Some(value.into_owned());
        }
    }

    let code = code
        .filter(|code| !code.is_empty())
        .context("redirected URL has no `code` query parameter")?;
    Ok(AuthorizationCallback { code, state })
}

fn wait_for_callback(redirect_url: &str) -> anyhow::Result<AuthorizationCallback> {
    let parsed = Url::parse(redirect_url).context("invalid redirect URL")?;
    let host = parsed.host_str().context("redirect URL must include host")?;
    let port = parsed
        .port_or_known_default()
        .context("redirect URL must include a valid port")?;
    let path = parsed.path().to_owned();

    let bind_addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&bind_addr)
        .with_context(|| format!("failed to bind callback listener on {bind_addr}"))?;

    let (mut stream, _) = listener.accept().context("failed to accept callback")?;
    let request = read_http_request(&mut stream).context("failed to read callback request")?;
    let request_line = request
        .lines()
        .next()
        .context("empty callback HTTP request")?;

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default();
    let target = parts.next().unwrap_or_default();
    if method != "GET" {
        write_http_response(&mut stream, 405, "Method Not Allowed", "Only GET is supported.")
            .context("failed writing method not allowed response")?;
        anyhow::bail!("callback request must be GET");
    }

    let target_url = Url::parse(&format!("http://{bind_addr}{target}"))
        .context("invalid callback request target URL")?;
    if target_url.path() != path {
        write_http_response(&mut stream, 404, "Not Found", "Unexpected callback path.")
            .context("failed writing callback path mismatch response")?;
        anyhow::bail!("callback path does not match the redirect URL");
    }

    match parse_redirect(target_url.as_str()) {
        Ok(callback) => {
            write_http_response(
                &mut stream,
                200,
                "OK",
                "Authorization captured. You can close this tab.",
            )
            .context("failed writing success callback response")?;
            Ok(callback)
        }
        Err(err) => {
            write_http_response(&mut stream, 400, "Bad Request", "Missing code query parameter.")
                .context("failed writing bad request callback response")?;
            Err(err)
        }
    }
}

fn read_http_request(stream: &mut TcpStream) -> Result<String, io::Error> {
    let mut buffer = [0_u8; 8192];
    let size = stream.read(&mut buffer)?;
    String::from_utf8(buffer[..size].to_vec())
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error.to_string()))
}

fn write_http_response(
    stream: &mut TcpStream,
    code: u16,
    reason: &str,
    body: &str,
) -> Result<(), io::Error> {
    let response = format!(
        "HTTP/1.1 {code} {reason}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    stream.write_all(response.as_bytes())?;
    stream.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_redirect;

    #[test]
    fn parses_code_and_state_from_redirect() {
        let callback =
            parse_redirect("https://localhost:55555/callback?code=abc123&state=xyz").expect("parse");

        assert_eq!(callback.code, "abc123");
        assert_eq!(callback.state.as_deref(), Some("xyz"));
    }

    #[test]
    fn state_is_optional() {
        let callback = parse_redirect("https://localhost:55555/callback?code=abc123").expect("parse");

        assert_eq!(callback.code, "abc123");
        assert_eq!(callback.state, None);
    }

    #[test]
    fn accepts_a_bare_code() {
        let callback = parse_redirect("abc123").expect("parse");

        assert_eq!(callback.code, "abc123");
        assert_eq!(callback.state, None);
    }

    #[test]
    fn rejects_redirect_without_code() {
        assert!(parse_redirect("https://localhost:55555/callback?error=access_denied").is_err());
        assert!(parse_redirect("").is_err());
    }
}
