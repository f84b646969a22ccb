//! Message signing for cookies

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length")
}

/// Sign a value as `base64url(value).base64url(hmac)`
pub fn sign_value(value: &str, secret: &[u8]) -> String {
    let mut mac = mac_for(secret);
    mac.update(value.as_bytes());
    let tag = mac.finalize().into_bytes();
    format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(value.as_bytes()),
        URL_SAFE_NO_PAD.encode(tag)
    )
}

/// Verify a value produced by [`sign_value`] and return the original text
pub fn verify_value(signed: &str, secret: &[u8]) -> Option<String> {
    let (payload, tag) = signed.split_once('.')?;
    let payload = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let tag = URL_SAFE_NO_PAD.decode(tag).ok()?;

    let mut mac = mac_for(secret);
    mac.update(&payload);
    mac.verify_slice(&tag).ok()?;
    String::from_utf8(payload).ok()
}
