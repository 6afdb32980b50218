// # Address Targets
//
// The desired state of a run: at most one IPv4 and at most one IPv6 address,
// applied to every requested domain.
//
// ## Usage
//
// ```rust
// use ddns_core::target::{AddressFamily, AddressTargets};
//
// let targets = AddressTargets::new(Some("203.0.113.5".parse().unwrap()), None);
// let desired = targets.for_domain("home.example.com");
//
// assert_eq!(desired.len(), 1);
// assert_eq!(desired[0].family, AddressFamily::V4);
// ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Address family of a record (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    /// IPv4, stored in `A` records
    V4,
    /// IPv6, stored in `AAAA` records
    V6,
}

impl AddressFamily {
    /// DNS record type holding addresses of this family
    pub fn record_type(self) -> &'static str {
        match self {
            AddressFamily::V4 => "A",
            AddressFamily::V6 => "AAAA",
        }
    }

    /// Parse a DNS record type (`A` / `AAAA`, case-insensitive)
    pub fn from_record_type(record_type: &str) -> Option<Self> {
        if record_type.eq_ignore_ascii_case("A") {
            Some(AddressFamily::V4)
        } else if record_type.eq_ignore_ascii_case("AAAA") {
            Some(AddressFamily::V6)
        } else {
            None
        }
    }

    /// Family of an address
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => AddressFamily::V4,
            IpAddr::V6(_) => AddressFamily::V6,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.record_type())
    }
}

/// The addresses to publish in this run
///
/// A family left as `None` is not managed at all: records of that family are
/// neither read nor written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressTargets {
    /// New IPv4 address, if supplied
    pub ipv4: Option<Ipv4Addr>,
    /// New IPv6 address, if supplied
    pub ipv6: Option<Ipv6Addr>,
}

impl AddressTargets {
    pub fn new(ipv4: Option<Ipv4Addr>, ipv6: Option<Ipv6Addr>) -> Self {
        Self { ipv4, ipv6 }
    }

    /// Build targets from raw query values, dropping anything that is not a
    /// valid literal of the expected family
    pub fn parse_lenient(ipv4: Option<&str>, ipv6: Option<&str>) -> Self {
        Self {
            ipv4: ipv4.and_then(|s| s.trim().parse().ok()),
            ipv6: ipv6.and_then(|s| s.trim().parse().ok()),
        }
    }

    /// True when neither family is supplied
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_none() && self.ipv6.is_none()
    }

    /// Families present in this run, v4 first
    pub fn families(&self) -> Vec<AddressFamily> {
        let mut families = Vec::with_capacity(2);
        if self.ipv4.is_some() {
            families.push(AddressFamily::V4);
        }
        if self.ipv6.is_some() {
            families.push(AddressFamily::V6);
        }
        families
    }

    /// Desired address for a family, if managed
    pub fn address(&self, family: AddressFamily) -> Option<IpAddr> {
        match family {
            AddressFamily::V4 => self.ipv4.map(IpAddr::V4),
            AddressFamily::V6 => self.ipv6.map(IpAddr::V6),
        }
    }

    /// Expand into one [`DesiredTarget`] per managed family for `domain`
    pub fn for_domain(&self, domain: &str) -> Vec<DesiredTarget> {
        self.families()
            .into_iter()
            .filter_map(|family| {
                self.address(family)
                    .map(|address| DesiredTarget::new(domain, address))
            })
            .collect()
    }
}

/// One (domain, family, address) tuple to reconcile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredTarget {
    /// Fully-qualified domain name
    pub domain: String,
    /// Address family, always matching `address`
    pub family: AddressFamily,
    /// Address to publish
    pub address: IpAddr,
}

impl DesiredTarget {
    pub fn new(domain: impl Into<String>, address: IpAddr) -> Self {
        Self {
            domain: domain.into(),
            family: AddressFamily::of(&address),
            address,
        }
    }
}
