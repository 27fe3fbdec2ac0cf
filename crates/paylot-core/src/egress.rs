//! Outbound URL validation.
//!
//! Both outbound targets (the RPC endpoint and the price oracle) are
//! configurable, so every URL is checked before a client is built around it:
//! https only (plain http is reserved for loopback during development), no
//! userinfo or fragment, and no host that is or resolves to a private,
//! link-local, loopback, multicast or unspecified address.
//!
//! Known-good hosts can be allowlisted; an allowlisted host skips DNS
//! resolution entirely, which also keeps validation usable offline.

use crate::{PaylotError, Result};
use std::net::{IpAddr, ToSocketAddrs};

const MAX_RESOLVED_ADDRS: usize = 8;

fn strip_ipv6_brackets(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}

fn is_loopback_host(host: &str) -> bool {
    let host = strip_ipv6_brackets(host);
    host.eq_ignore_ascii_case("localhost")
        || host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}

fn is_disallowed_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_unspecified()
                || v4.is_link_local()
                || v4.is_private()
                || v4.is_multicast()
                || v4.is_broadcast()
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || v6.is_unicast_link_local()
                || v6.is_unique_local()
                || v6.is_multicast()
        }
    }
}

fn validate_scheme(scheme: &str, host: &str) -> Result<()> {
    if scheme == "https" || (scheme == "http" && is_loopback_host(host)) {
        return Ok(());
    }
    Err(PaylotError::ConfigError(
        "outbound URL must be https, or http only for localhost/loopback".into(),
    ))
}

fn validate_resolved_host(host: &str, port: u16) -> Result<()> {
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| PaylotError::ConfigError(format!("failed to resolve host: {e}")))?;

    let mut resolved_any = false;
    for addr in addrs.take(MAX_RESOLVED_ADDRS) {
        resolved_any = true;
        if is_disallowed_ip(addr.ip()) {
            return Err(PaylotError::ConfigError(
                "outbound URL resolves to a disallowed IP range".into(),
            ));
        }
    }

    if resolved_any {
        Ok(())
    } else {
        Err(PaylotError::ConfigError(
            "outbound URL host did not resolve to any IP addresses".into(),
        ))
    }
}

pub fn validate_outbound_url(raw: &str) -> Result<url::Url> {
    validate_outbound_url_with_allowlist(raw, &[])
}

pub fn validate_outbound_url_with_allowlist(raw: &str, allowed_hosts: &[&str]) -> Result<url::Url> {
    let url = url::Url::parse(raw)
        .map_err(|e| PaylotError::ConfigError(format!("invalid outbound URL: {e}")))?;

    if !url.username().is_empty() || url.password().is_some() {
        return Err(PaylotError::ConfigError(
            "outbound URL must not contain userinfo".into(),
        ));
    }
    if url.fragment().is_some() {
        return Err(PaylotError::ConfigError(
            "outbound URL must not contain a fragment".into(),
        ));
    }

    let Some(host) = url.host_str() else {
        return Err(PaylotError::ConfigError(
            "outbound URL must include a host".into(),
        ));
    };

    validate_scheme(url.scheme(), host)?;

    if is_loopback_host(host) {
        return Ok(url);
    }

    if allowed_hosts.iter().any(|h| h.eq_ignore_ascii_case(host)) {
        return Ok(url);
    }

    let bare_host = strip_ipv6_brackets(host);
    if let Ok(ip) = bare_host.parse::<IpAddr>() {
        if is_disallowed_ip(ip) {
            return Err(PaylotError::ConfigError(
                "outbound URL host is in a disallowed IP range".into(),
            ));
        }
        return Ok(url);
    }

    let port = url.port_or_known_default().ok_or_else(|| {
        PaylotError::ConfigError("outbound URL must include a port or known default".into())
    })?;
    validate_resolved_host(host, port)?;

    Ok(url)
}
