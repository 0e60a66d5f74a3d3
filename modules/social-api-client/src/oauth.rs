// OAuth 1.0a HMAC-SHA1 request signing (user context).

use base64::Engine;
use hmac::{Hmac, Mac};
use rand::distr::Alphanumeric;
use rand::Rng;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

#[derive(Debug, Clone)]
pub struct OAuthKeys {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

/// RFC 3986 encoding: everything except unreserved characters.
fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

impl OAuthKeys {
    /// Build the `Authorization` header value for a request.
    pub fn authorization(&self, method: &str, url: &str, params: &[(String, String)]) -> String {
        let nonce: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp().to_string();
        self.authorization_with(method, url, params, &nonce, &timestamp)
    }

    pub(crate) fn authorization_with(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        nonce: &str,
        timestamp: &str,
    ) -> String {
        let oauth_params = vec![
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp),
            ("oauth_token", self.access_token.as_str()),
            ("oauth_version", "1.0"),
        ];

        let signature = self.signature(method, url, params, &oauth_params);

        let mut header: Vec<String> = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, encode(v)))
            .collect();
        header.push(format!("oauth_signature=\"{}\"", encode(&signature)));
        header.sort();
        format!("OAuth {}", header.join(", "))
    }

    fn signature(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        oauth_params: &[(&str, &str)],
    ) -> String {
        let mut pairs: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (encode(k), encode(v)))
            .chain(oauth_params.iter().map(|(k, v)| (encode(k), encode(v))))
            .collect();
        pairs.sort();
        let param_string = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let base = format!(
            "{}&{}&{}",
            method.to_ascii_uppercase(),
            encode(url),
            encode(&param_string)
        );
        let key = format!(
            "{}&{}",
            encode(&self.consumer_secret),
            encode(&self.access_token_secret)
        );

        let mut mac =
            HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
        mac.update(base.as_bytes());
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }
}
