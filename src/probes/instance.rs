// src/probes/instance.rs
use gethostname::gethostname;
use std::net::SocketAddr;
use tokio::net::lookup_host;
use tracing::debug;

/// Identity of the instance answering the request, resolved fresh each time
/// so a page served through the load balancer always names the machine that
/// actually rendered it.
#[derive(Debug, Clone)]
pub struct HostIdentity {
    pub hostname: String,
    pub ip: String,
}

impl HostIdentity {
    pub async fn resolve() -> Self {
        let hostname = gethostname().to_string_lossy().into_owned();
        let ip = resolve_ip(&hostname).await.unwrap_or_else(|| {
            debug!(%hostname, "could not resolve a local address");
            "unknown".to_string()
        });

        Self { hostname, ip }
    }
}

/// Resolve the hostname back to an address, preferring IPv4 since that is
/// what the instance registers with the load balancer.
async fn resolve_ip(hostname: &str) -> Option<String> {
    let addrs: Vec<SocketAddr> = lookup_host((hostname, 0u16)).await.ok()?.collect();

    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .map(|addr| addr.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_always_produces_a_hostname() {
        let identity = HostIdentity::resolve().await;
        assert!(!identity.hostname.is_empty());
        assert!(!identity.ip.is_empty());
    }

    #[tokio::test]
    async fn localhost_resolves_to_loopback() {
        let ip = resolve_ip("localhost").await.expect("localhost resolves");
        assert!(ip == "127.0.0.1" || ip == "::1");
    }
}
