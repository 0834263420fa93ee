//! Approval-policy resolution with two-level fallback.

use crate::models::tenant::{ApprovalMode, ApprovalSettings};

/// The effective policy for one (tenant, site) pair. `mode` is never
/// [`ApprovalMode::Default`] after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPolicy {
    pub mode: ApprovalMode,
    pub emails: Vec<String>,
}

/// Resolve the effective approval mode and recipient list.
///
/// Fallback chain: absent tenant settings default to manual with no
/// recipients; an absent site (or one whose mode is the `default` sentinel)
/// inherits the tenant settings verbatim. Otherwise the site's mode wins,
/// and the recipient list falls back independently: the site's list if
/// non-empty, else the tenant's.
///
/// Absence is never an error, and callers re-resolve on every pipeline run
/// since settings can change between submission and approval.
pub fn resolve_approval_policy(
    tenant: Option<&ApprovalSettings>,
    site: Option<&ApprovalSettings>,
) -> ResolvedPolicy {
    let tenant_mode = match tenant.map(|t| t.mode) {
        // The sentinel is only meaningful at site level.
        Some(ApprovalMode::Default) | None => ApprovalMode::Manual,
        Some(mode) => mode,
    };
    let tenant_emails = tenant
        .map(|t| t.auto_approval_emails.clone())
        .unwrap_or_default();

    match site {
        None => ResolvedPolicy {
            mode: tenant_mode,
            emails: tenant_emails,
        },
        Some(site) if site.mode == ApprovalMode::Default => ResolvedPolicy {
            mode: tenant_mode,
            emails: tenant_emails,
        },
        Some(site) => {
            let emails = if site.auto_approval_emails.is_empty() {
                tenant_emails
            } else {
                site.auto_approval_emails.clone()
            };
            ResolvedPolicy {
                mode: site.mode,
                emails,
            }
        }
    }
}
