//! Face URI parsing and connection.

use crate::Face;
use ndn_traceroute_core::TracerouteError;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::net::TcpStream;
use tracing::debug;

/// Port NFD listens on for TCP faces.
pub const DEFAULT_TCP_PORT: u16 = 6363;

/// Address family restriction of a TCP face URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    Any,
    V4,
    V6,
}

impl AddressFamily {
    fn accepts(&self, addr: &SocketAddr) -> bool {
        match self {
            AddressFamily::Any => true,
            AddressFamily::V4 => addr.is_ipv4(),
            AddressFamily::V6 => addr.is_ipv6(),
        }
    }

    fn scheme(&self) -> &'static str {
        match self {
            AddressFamily::Any => "tcp",
            AddressFamily::V4 => "tcp4",
            AddressFamily::V6 => "tcp6",
        }
    }
}

/// Where the forwarder listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaceUri {
    /// `tcp://host[:port]`, `tcp4://...` or `tcp6://...`.
    Tcp {
        host: String,
        port: u16,
        family: AddressFamily,
    },
    /// `unix:///path/to/socket`.
    Unix(PathBuf),
}

fn invalid(uri: &str, reason: &str) -> TracerouteError {
    TracerouteError::InvalidFaceUri {
        uri: uri.to_string(),
        reason: reason.to_string(),
    }
}

impl FromStr for FaceUri {
    type Err = TracerouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, rest) = s
            .split_once("://")
            .ok_or_else(|| invalid(s, "missing scheme"))?;

        let family = match scheme.to_ascii_lowercase().as_str() {
            "unix" => {
                if !rest.starts_with('/') || rest.len() < 2 {
                    return Err(invalid(s, "expected an absolute socket path"));
                }
                return Ok(FaceUri::Unix(PathBuf::from(rest)));
            }
            "tcp" => AddressFamily::Any,
            "tcp4" => AddressFamily::V4,
            "tcp6" => AddressFamily::V6,
            _ => return Err(invalid(s, "unsupported scheme")),
        };

        let authority = rest.trim_end_matches('/');
        let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
            let (host, after) = bracketed
                .split_once(']')
                .ok_or_else(|| invalid(s, "unterminated IPv6 literal"))?;
            let port = match after {
                "" => None,
                p => Some(
                    p.strip_prefix(':')
                        .ok_or_else(|| invalid(s, "unexpected text after IPv6 literal"))?,
                ),
            };
            (host, port)
        } else {
            match authority.rsplit_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (authority, None),
            }
        };

        if host.is_empty() {
            return Err(invalid(s, "missing host"));
        }
        let port = match port {
            Some(p) => p.parse::<u16>().map_err(|_| invalid(s, "invalid port"))?,
            None => DEFAULT_TCP_PORT,
        };

        Ok(FaceUri::Tcp {
            host: host.to_string(),
            port,
            family,
        })
    }
}

impl fmt::Display for FaceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaceUri::Tcp { host, port, family } if host.contains(':') => {
                write!(f, "{}://[{}]:{}", family.scheme(), host, port)
            }
            FaceUri::Tcp { host, port, family } => {
                write!(f, "{}://{}:{}", family.scheme(), host, port)
            }
            FaceUri::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}

impl FaceUri {
    /// Opens a stream to the forwarder and wraps it in a [`Face`].
    pub async fn connect(&self) -> Result<Face, TracerouteError> {
        let connect_err = |source: std::io::Error| TracerouteError::Connect {
            uri: self.to_string(),
            source,
        };

        match self {
            FaceUri::Tcp { host, port, family } => {
                let addrs = tokio::net::lookup_host((host.as_str(), *port))
                    .await
                    .map_err(connect_err)?;

                let mut last_err = None;
                for addr in addrs.filter(|a| family.accepts(a)) {
                    debug!(addr = %addr, "Connecting to forwarder");
                    match TcpStream::connect(addr).await {
                        Ok(stream) => {
                            stream.set_nodelay(true).map_err(connect_err)?;
                            return Ok(Face::from_stream(stream, self.to_string()));
                        }
                        Err(e) => last_err = Some(e),
                    }
                }
                Err(connect_err(last_err.unwrap_or_else(|| {
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "no address of the requested family",
                    )
                })))
            }
            #[cfg(unix)]
            FaceUri::Unix(path) => {
                debug!(path = %path.display(), "Connecting to forwarder");
                let stream = tokio::net::UnixStream::connect(path)
                    .await
                    .map_err(connect_err)?;
                Ok(Face::from_stream(stream, self.to_string()))
            }
            #[cfg(not(unix))]
            FaceUri::Unix(_) => Err(invalid(
                &self.to_string(),
                "Unix sockets are not supported on this platform",
            )),
        }
    }
}
