//! Domain binding lookup.
//!
//! # Design Decisions
//! - Exact host first, then sub-domain, then the `*` entry
//! - Keys are lowercased once at compile time; hosts arrive lowercased
//! - Any hit is authoritative for the rest of the resolution

use std::collections::BTreeMap;

use crate::dispatch::context::DispatchRequest;
use crate::dispatch::WILDCARD;

/// Which key of the table produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainMatchKind {
    Host,
    SubDomain,
    Wildcard,
}

/// A successful domain lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainMatch<'a> {
    pub app: &'a str,
    pub kind: DomainMatchKind,
}

/// Domain or sub-domain to app name.
#[derive(Debug, Clone, Default)]
pub struct DomainBindingTable {
    entries: BTreeMap<String, String>,
}

impl DomainBindingTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
                .collect(),
        }
    }

    /// Look the request up by host, sub-domain and wildcard, in that order.
    pub fn match_request<R: DispatchRequest + ?Sized>(&self, req: &R) -> Option<DomainMatch<'_>> {
        if self.entries.is_empty() {
            return None;
        }

        if let Some(app) = self.entries.get(req.host(true)) {
            return Some(DomainMatch {
                app,
                kind: DomainMatchKind::Host,
            });
        }

        let sub_domain = req.sub_domain();
        if !sub_domain.is_empty() {
            if let Some(app) = self.entries.get(&sub_domain) {
                return Some(DomainMatch {
                    app,
                    kind: DomainMatchKind::SubDomain,
                });
            }
        }

        self.entries.get(WILDCARD).map(|app| DomainMatch {
            app,
            kind: DomainMatchKind::Wildcard,
        })
    }
}
