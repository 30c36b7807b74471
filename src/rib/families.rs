use std::fmt;
use std::net::IpAddr;

use serde::{self, Deserialize, Deserializer, Serialize, Serializer};

/// AFI/SAFI pair a RIB table is read for
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum AddressFamily {
    Ipv4Unicast,
    Ipv6Unicast,
}

impl AddressFamily {
    /// Family a prefix address belongs to
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => AddressFamily::Ipv4Unicast,
            IpAddr::V6(_) => AddressFamily::Ipv6Unicast,
        }
    }

    fn as_config_str(&self) -> &'static str {
        match self {
            AddressFamily::Ipv4Unicast => "ipv4 unicast",
            AddressFamily::Ipv6Unicast => "ipv6 unicast",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let display = match self {
            AddressFamily::Ipv4Unicast => "IPv4 Unicast",
            AddressFamily::Ipv6Unicast => "IPv6 Unicast",
        };
        write!(f, "{}", display)
    }
}

impl Serialize for AddressFamily {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_config_str())
    }
}

impl<'de> Deserialize<'de> for AddressFamily {
    fn deserialize<D>(deserializer: D) -> Result<AddressFamily, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let parts: Vec<String> = s.split_whitespace().map(|p| p.to_lowercase()).collect();
        if parts.len() != 2 {
            return Err(serde::de::Error::custom(format!(
                "Incorrect family format: '{}'",
                s
            )));
        }
        if parts[1] != "unicast" {
            return Err(serde::de::Error::custom(format!(
                "Unsupported SAFI: '{}'",
                parts[1]
            )));
        }
        match parts[0].as_str() {
            "ipv4" => Ok(AddressFamily::Ipv4Unicast),
            "ipv6" => Ok(AddressFamily::Ipv6Unicast),
            afi => Err(serde::de::Error::custom(format!(
                "Unsupported AFI: '{}'",
                afi
            ))),
        }
    }
}
