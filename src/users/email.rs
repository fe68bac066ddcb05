//! Address checks behind the `email` rule: RFC syntax, then a DNS lookup that
//! the domain can receive mail.

use async_trait::async_trait;
use hickory_resolver::{
    config::{ResolverConfig, ResolverOpts},
    proto::rr::Name,
    TokioAsyncResolver,
};
use tracing::debug;
use validator::ValidateEmail;

/// Top-level names that never resolve on the public internet.
const RESERVED_TLDS: &[&str] = &[
    "test",
    "example",
    "invalid",
    "localhost",
    "local",
    "localdomain",
    "domain",
    "lan",
    "home",
    "host",
    "corp",
    "mail",
    "internal",
    "intranet",
    "private",
];

pub fn is_valid_syntax(email: &str) -> bool {
    email.validate_email()
}

/// Part after the last `@`, without a trailing root dot.
pub fn domain_of(email: &str) -> Option<&str> {
    let (_, domain) = email.rsplit_once('@')?;
    let domain = domain.trim_end_matches('.');
    (!domain.is_empty()).then_some(domain)
}

pub fn has_reserved_tld(domain: &str) -> bool {
    let tld = domain.rsplit('.').next().unwrap_or(domain);
    RESERVED_TLDS.iter().any(|r| tld.eq_ignore_ascii_case(r))
}

/// Verdict from a domain's MX exchanges, or `None` when there are none and the
/// address records decide.
///
/// A lone MX with the root as exchange is an explicit "no mail" (RFC 7505).
pub fn mx_verdict(exchanges: &[Name]) -> Option<bool> {
    match exchanges {
        [] => None,
        [only] if only.is_root() => Some(false),
        _ => Some(true),
    }
}

/// Decides whether a domain accepts mail.
#[async_trait]
pub trait DomainResolver: Send + Sync {
    async fn accepts_mail(&self, domain: &str) -> bool;
}

pub struct DnsResolver {
    resolver: TokioAsyncResolver,
}

impl DnsResolver {
    pub fn new() -> Self {
        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default()),
        }
    }
}

impl Default for DnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DomainResolver for DnsResolver {
    async fn accepts_mail(&self, domain: &str) -> bool {
        if has_reserved_tld(domain) {
            debug!(domain, "reserved top-level domain");
            return false;
        }

        match self.resolver.mx_lookup(domain).await {
            Ok(mx) => {
                let exchanges: Vec<Name> = mx.iter().map(|r| r.exchange().clone()).collect();
                if let Some(accepts) = mx_verdict(&exchanges) {
                    debug!(domain, records = exchanges.len(), accepts, "mx lookup");
                    return accepts;
                }
            }
            Err(e) => debug!(domain, error = %e, "mx lookup failed"),
        }

        match self.resolver.lookup_ip(domain).await {
            Ok(ips) => {
                let found = ips.iter().next().is_some();
                debug!(domain, found, "address lookup");
                found
            }
            Err(e) => {
                debug!(domain, error = %e, "address lookup failed");
                false
            }
        }
    }
}

/// Accepts every domain; used when DNS checks are switched off.
pub struct SyntaxOnly;

#[async_trait]
impl DomainResolver for SyntaxOnly {
    async fn accepts_mail(&self, _domain: &str) -> bool {
        true
    }
}
