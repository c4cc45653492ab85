use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

#[async_trait]
pub trait OtpSender: Send + Sync {
    async fn send_code(&self, identity: &str, code: &str) -> anyhow::Result<()>;
}

/// Development sender: writes the code to the log instead of an SMS/email gateway.
pub struct LogOtpSender;

#[async_trait]
impl OtpSender for LogOtpSender {
    async fn send_code(&self, identity: &str, code: &str) -> anyhow::Result<()> {
        tracing::info!(identity, code, "one-time code issued");
        Ok(())
    }
}

/// RFC 4226 HOTP, six digits.
pub fn hotp(secret: &[u8], counter: u64) -> anyhow::Result<String> {
    let mut mac = HmacSha1::new_from_slice(secret).map_err(|e| anyhow!("invalid OTP key: {e}"))?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = (u32::from(digest[offset] & 0x7f) << 24)
        | (u32::from(digest[offset + 1]) << 16)
        | (u32::from(digest[offset + 2]) << 8)
        | u32::from(digest[offset + 3]);

    Ok(format!("{:06}", binary % 1_000_000))
}

#[derive(Debug)]
struct PendingCode {
    code: String,
    expires_at: NaiveDateTime,
}

/// Outstanding one-time codes, one per identity. Codes are single-use.
#[derive(Debug, Default)]
pub struct OtpStore {
    counter: u64,
    pending: HashMap<String, PendingCode>,
}

impl OtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh code for `identity`, replacing any earlier one.
    pub fn issue(
        &mut self,
        secret: &str,
        identity: &str,
        now: NaiveDateTime,
        ttl_secs: i64,
    ) -> anyhow::Result<String> {
        self.counter += 1;
        let key = format!("{secret}:{identity}");
        let code = hotp(key.as_bytes(), self.counter)?;

        self.pending.insert(
            identity.to_string(),
            PendingCode {
                code: code.clone(),
                expires_at: now + Duration::seconds(ttl_secs),
            },
        );
        Ok(code)
    }

    pub fn verify(&mut self, identity: &str, code: &str, now: NaiveDateTime) -> bool {
        let Some(pending) = self.pending.get(identity) else {
            return false;
        };

        if pending.expires_at <= now {
            self.pending.remove(identity);
            return false;
        }

        if pending.code != code.trim() {
            return false;
        }

        self.pending.remove(identity);
        true
    }
}
