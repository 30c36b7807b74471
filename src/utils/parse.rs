use std::net::IpAddr;

use ipnetwork::IpNetwork;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Not a valid prefix: '{0}'")]
    MissingLength(String),
    #[error("Invalid prefix '{value}': {reason}")]
    Prefix { value: String, reason: String },
    #[error("Invalid address '{value}': {reason}")]
    Address { value: String, reason: String },
    #[error("Not a valid destination: '{0}'")]
    Destination(String),
}

/// Parse a CIDR prefix (E.g. "10.1.0.0/16") into its network address and length
///
/// The address is masked down to the network, so "10.1.2.3/16" yields
/// `(10.1.0.0, 16)`. A bare address without a length is rejected.
/// ```
/// use route_publisher::utils::parse_prefix;
/// let (network, length) = parse_prefix("192.168.10.7/24").unwrap();
/// assert_eq!(network.to_string(), "192.168.10.0");
/// assert_eq!(length, 24);
/// ```
pub fn parse_prefix(prefix: &str) -> Result<(IpAddr, u8), ParseError> {
    let prefix = prefix.trim();
    if !prefix.contains('/') {
        return Err(ParseError::MissingLength(prefix.to_string()));
    }
    let network: IpNetwork = prefix.parse().map_err(|err| ParseError::Prefix {
        value: prefix.to_string(),
        reason: format!("{}", err),
    })?;
    Ok((network.network(), network.prefix()))
}

/// Parse a single host address (E.g. "10.1.0.7" or "3001:1::1")
pub fn parse_host(addr: &str) -> Result<IpAddr, ParseError> {
    let addr = addr.trim();
    addr.parse().map_err(|err| ParseError::Address {
        value: addr.to_string(),
        reason: format!("{}", err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_parse_prefix() {
        assert_eq!(
            parse_prefix("10.0.0.0/24").unwrap(),
            (IpAddr::from(Ipv4Addr::new(10, 0, 0, 0)), 24)
        );
        assert_eq!(
            parse_prefix(" 10.0.0.5/24 ").unwrap(),
            (IpAddr::from(Ipv4Addr::new(10, 0, 0, 0)), 24)
        );
        assert_eq!(
            parse_prefix("3001:404:a::1/64").unwrap(),
            (IpAddr::from("3001:404:a::".parse::<Ipv6Addr>().unwrap()), 64)
        );
        assert_eq!(
            parse_prefix("0.0.0.0/0").unwrap(),
            (IpAddr::from(Ipv4Addr::new(0, 0, 0, 0)), 0)
        );
    }

    #[test]
    fn test_parse_prefix_errors() {
        assert_eq!(
            parse_prefix("10.0.0.5"),
            Err(ParseError::MissingLength("10.0.0.5".to_string()))
        );
        assert!(matches!(
            parse_prefix("bad-cidr"),
            Err(ParseError::MissingLength(_))
        ));
        assert!(matches!(
            parse_prefix("10.0.0.0/33"),
            Err(ParseError::Prefix { .. })
        ));
        assert!(matches!(
            parse_prefix("10.0.0/24x"),
            Err(ParseError::Prefix { .. })
        ));
    }

    #[test]
    fn test_parse_host() {
        assert_eq!(
            parse_host("192.168.1.9").unwrap(),
            IpAddr::from(Ipv4Addr::new(192, 168, 1, 9))
        );
        assert!(parse_host("not-an-ip").is_err());
        assert!(parse_host("10.0.0.0/24").is_err());
    }
}
