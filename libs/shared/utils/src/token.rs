use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Signed bearer token carrying a session id:
/// `base64url(session_id) . base64url(hmac_sha256(base64url(session_id)))`.
/// The signature covers the encoded payload, so the store is only consulted
/// for tokens we minted ourselves.
pub fn issue_token(session_id: Uuid, secret: &str) -> Result<String, String> {
    if secret.is_empty() {
        return Err("Session secret is not set".to_string());
    }

    let payload = URL_SAFE_NO_PAD.encode(session_id.as_bytes());

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", payload, signature))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Uuid, String> {
    if secret.is_empty() {
        return Err("Session secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 2 {
        return Err("Invalid token format".to_string());
    }

    let payload_b64 = parts[0];
    let signature_b64 = parts[1];

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err("Invalid signature encoding".to_string());
        }
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(payload_b64.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Session token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| "Invalid payload encoding".to_string())?;

    Uuid::from_slice(&payload).map_err(|_| "Invalid session id".to_string())
}
