//! Destination address codec
//!
//! Self-delimiting SOCKS5-style encoding shared by the wider proxy protocol:
//! `[atype:u8][addr][port:u16 big-endian]`, where `addr` is 4 bytes for IPv4,
//! 16 bytes for IPv6, or a one-byte length followed by the domain name.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use bytes::BufMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::AddressError;

/// Address type tags
pub mod atype {
    pub const IPV4: u8 = 0x01;
    pub const DOMAIN_NAME: u8 = 0x03;
    pub const IPV6: u8 = 0x04;
}

/// A proxy destination: either a socket address or a domain name with port
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    Ip(SocketAddr),
    Domain(String, u16),
}

impl Address {
    /// Host part, without the port
    pub fn host(&self) -> String {
        match self {
            Address::Ip(addr) => addr.ip().to_string(),
            Address::Domain(domain, _) => domain.clone(),
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            Address::Ip(addr) => addr.port(),
            Address::Domain(_, port) => *port,
        }
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, Address::Domain(..))
    }

    /// Number of bytes `encode` will produce
    pub fn serialized_len(&self) -> usize {
        match self {
            Address::Ip(SocketAddr::V4(_)) => 1 + 4 + 2,
            Address::Ip(SocketAddr::V6(_)) => 1 + 16 + 2,
            Address::Domain(domain, _) => 1 + 1 + domain.len() + 2,
        }
    }

    /// Decode one address from the stream.
    pub async fn read_from<R>(reader: &mut R) -> Result<Self, AddressError>
    where
        R: AsyncRead + Unpin,
    {
        let addr_type = reader.read_u8().await?;
        match addr_type {
            atype::IPV4 => {
                let mut octets = [0u8; 4];
                reader.read_exact(&mut octets).await?;
                let port = reader.read_u16().await?;
                Ok(Address::Ip(SocketAddr::new(
                    IpAddr::V4(Ipv4Addr::from(octets)),
                    port,
                )))
            }
            atype::IPV6 => {
                let mut octets = [0u8; 16];
                reader.read_exact(&mut octets).await?;
                let port = reader.read_u16().await?;
                Ok(Address::Ip(SocketAddr::new(
                    IpAddr::V6(Ipv6Addr::from(octets)),
                    port,
                )))
            }
            atype::DOMAIN_NAME => {
                let len = reader.read_u8().await? as usize;
                let mut name = vec![0u8; len];
                reader.read_exact(&mut name).await?;
                let port = reader.read_u16().await?;
                let domain = String::from_utf8(name).map_err(|_| AddressError::InvalidDomain)?;
                Ok(Address::Domain(domain, port))
            }
            other => Err(AddressError::UnsupportedType(other)),
        }
    }

    /// Encode this address into `buf`.
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> Result<(), AddressError> {
        match self {
            Address::Ip(SocketAddr::V4(addr)) => {
                buf.put_u8(atype::IPV4);
                buf.put_slice(&addr.ip().octets());
                buf.put_u16(addr.port());
            }
            Address::Ip(SocketAddr::V6(addr)) => {
                buf.put_u8(atype::IPV6);
                buf.put_slice(&addr.ip().octets());
                buf.put_u16(addr.port());
            }
            Address::Domain(domain, port) => {
                let len = u8::try_from(domain.len())
                    .map_err(|_| AddressError::DomainTooLong(domain.len()))?;
                buf.put_u8(atype::DOMAIN_NAME);
                buf.put_u8(len);
                buf.put_slice(domain.as_bytes());
                buf.put_u16(*port);
            }
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Ip(addr) => write!(f, "{}", addr),
            Address::Domain(domain, port) => write!(f, "{}:{}", domain, port),
        }
    }
}

impl From<SocketAddr> for Address {
    fn from(value: SocketAddr) -> Self {
        Address::Ip(value)
    }
}

impl From<(IpAddr, u16)> for Address {
    fn from(value: (IpAddr, u16)) -> Self {
        Address::Ip(value.into())
    }
}

impl TryFrom<(&str, u16)> for Address {
    type Error = AddressError;

    fn try_from((host, port): (&str, u16)) -> Result<Self, Self::Error> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(Address::from((ip, port)));
        }
        if host.len() > u8::MAX as usize {
            return Err(AddressError::DomainTooLong(host.len()));
        }
        Ok(Address::Domain(host.to_string(), port))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Parses `host:port`, `ip:port` or `[ipv6]:port`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(Address::Ip(addr));
        }
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| AddressError::Parse(s.to_string()))?;
        if host.is_empty() || host.contains(':') {
            return Err(AddressError::Parse(s.to_string()));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| AddressError::Parse(s.to_string()))?;
        Address::try_from((host, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_decode_domain() {
        let bytes = [
            0x03, 11, b'e', b'x', b'a', b'm', b'p', b'l', b'e', b'.', b'c', b'o', b'm', 0x00, 0x50,
        ];
        let mut reader = &bytes[..];
        let addr = Address::read_from(&mut reader).await.unwrap();
        assert_eq!(addr, Address::Domain("example.com".to_string(), 80));
        assert!(reader.is_empty());
    }

    #[tokio::test]
    async fn test_decode_ipv4_and_ipv6() {
        let mut reader = &[0x01, 10, 0, 0, 1, 0x00, 0x35][..];
        let addr = Address::read_from(&mut reader).await.unwrap();
        assert_eq!(addr, "10.0.0.1:53".parse().unwrap());

        let mut bytes = vec![0x04];
        bytes.extend_from_slice(&Ipv6Addr::LOCALHOST.octets());
        bytes.extend_from_slice(&443u16.to_be_bytes());
        let mut reader = &bytes[..];
        let addr = Address::read_from(&mut reader).await.unwrap();
        assert_eq!(addr.to_string(), "[::1]:443");
    }

    #[tokio::test]
    async fn test_decode_unsupported_type() {
        let mut reader = &[0x02, 1, 2, 3][..];
        let err = Address::read_from(&mut reader).await.unwrap_err();
        assert!(matches!(err, AddressError::UnsupportedType(0x02)));
    }

    #[tokio::test]
    async fn test_decode_truncated() {
        let mut reader = &[0x01, 127, 0][..];
        let err = Address::read_from(&mut reader).await.unwrap_err();
        match err {
            AddressError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_decode_invalid_utf8_domain() {
        let mut reader = &[0x03, 2, 0xff, 0xfe, 0x00, 0x50][..];
        let err = Address::read_from(&mut reader).await.unwrap_err();
        assert!(matches!(err, AddressError::InvalidDomain));
    }

    #[test]
    fn test_encode_layout() {
        let addr: Address = "10.0.0.1:53".parse().unwrap();
        let mut buf = Vec::new();
        addr.encode(&mut buf).unwrap();
        assert_eq!(buf, vec![0x01, 10, 0, 0, 1, 0x00, 0x35]);
        assert_eq!(buf.len(), addr.serialized_len());

        let addr = Address::Domain("a.io".to_string(), 8080);
        let mut buf = Vec::new();
        addr.encode(&mut buf).unwrap();
        assert_eq!(buf, vec![0x03, 4, b'a', b'.', b'i', b'o', 0x1f, 0x90]);
    }

    #[test]
    fn test_encode_domain_too_long() {
        let addr = Address::Domain("a".repeat(256), 80);
        let mut buf = Vec::new();
        assert!(matches!(
            addr.encode(&mut buf),
            Err(AddressError::DomainTooLong(256))
        ));
    }

    #[test]
    fn test_parse_from_str() {
        assert_eq!(
            "example.com:80".parse::<Address>().unwrap(),
            Address::Domain("example.com".to_string(), 80)
        );
        assert!("[::1]:53".parse::<Address>().unwrap().host() == "::1");
        assert!("example.com".parse::<Address>().is_err());
        assert!("example.com:http".parse::<Address>().is_err());
        assert!(":80".parse::<Address>().is_err());
    }

    #[test]
    fn test_try_from_host_port() {
        let addr = Address::try_from(("192.168.1.1", 22u16)).unwrap();
        assert!(!addr.is_domain());
        assert_eq!(addr.port(), 22);

        let addr = Address::try_from(("proxy.local", 1080u16)).unwrap();
        assert!(addr.is_domain());
        assert_eq!(addr.host(), "proxy.local");

        assert!(Address::try_from((&*"x".repeat(300), 1u16)).is_err());
    }
}
