//! Request matcher for host integrations.
//!
//! A request "matches" (and should be refused) when its caller is banned.
//! Anything that prevents a confident answer also matches: an unparseable
//! remote address or a ban list that cannot be queried.

use tracing::{debug, error, info};

use crate::banlist_actor::BanlistHandle;
use crate::config::BanlistConfig;

/// The parts of an inbound request the matcher looks at
pub trait MatchRequest {
    /// Remote address in `host:port` form
    fn remote_addr(&self) -> &str;

    /// Whether a header with this name is present (names are case-insensitive)
    fn has_header(&self, name: &str) -> bool;
}

/// Plain request description for hosts without their own request type
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    pub remote_addr: String,
    pub headers: Vec<(String, String)>,
}

impl RequestInfo {
    pub fn new(remote_addr: impl Into<String>) -> Self {
        Self {
            remote_addr: remote_addr.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl MatchRequest for RequestInfo {
    fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers
            .iter()
            .any(|(header, _)| header.eq_ignore_ascii_case(name))
    }
}

/// Extract the host part of a `host:port` remote address.
///
/// The host is returned verbatim so it compares against banfile lines
/// exactly as written; IPv6 hosts lose their brackets (`[::1]:80` gives
/// `::1`). The port is required but not validated.
pub fn remote_ip(remote_addr: &str) -> Option<String> {
    let host = if let Some(rest) = remote_addr.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        tail.strip_prefix(':')?;
        host
    } else {
        let (host, _port) = remote_addr.rsplit_once(':')?;
        if host.contains([':', '[', ']']) {
            return None;
        }
        host
    };
    Some(host.to_string())
}

#[derive(Clone)]
pub struct BanMatcher {
    banlist: BanlistHandle,
    ban_header: Option<String>,
}

impl BanMatcher {
    pub fn new(banlist: BanlistHandle, ban_header: Option<String>) -> Self {
        Self { banlist, ban_header }
    }

    pub fn from_config(banlist: BanlistHandle, config: &BanlistConfig) -> Self {
        Self::new(banlist, config.ban_header.clone())
    }

    /// Whether the request should be refused
    pub async fn matches<R: MatchRequest + ?Sized>(&self, request: &R) -> bool {
        let Some(ip) = remote_ip(request.remote_addr()) else {
            error!(
                "Error parsing remote addr {:?} into IP & port, denying",
                request.remote_addr()
            );
            return true;
        };

        if let Some(header) = &self.ban_header {
            if request.has_header(header) {
                info!("Banned {} via {} header", ip, header);
                return true;
            }
        }

        match self.banlist.is_banned(&ip).await {
            Ok(true) => {
                debug!("Banned IP {}", ip);
                true
            }
            Ok(false) => {
                debug!("Received request from {}", ip);
                false
            }
            Err(e) => {
                error!("Error checking ban list for {}, denying: {}", ip, e);
                true
            }
        }
    }
}
