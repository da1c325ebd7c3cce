// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![allow(async_fn_in_trait)]

use std::io;
use std::time::Duration;

use tokio::net::TcpStream;

use crate::common::config::Endpoint;

/// Checks that the management endpoint accepts connections before any
/// credentials are sent.
pub trait ReachabilityProbe {
    async fn probe(&self, endpoint: &Endpoint, timeout: Duration) -> io::Result<()>;
}

/// Opens and immediately drops a TCP connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProbe;

impl ReachabilityProbe for TcpProbe {
    async fn probe(&self, endpoint: &Endpoint, timeout: Duration) -> io::Result<()> {
        let addr = (endpoint.host.as_str(), endpoint.port);
        match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no TCP answer within {timeout:?}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_probe_succeeds_on_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let endpoint = Endpoint {
            scheme: "http".to_string(),
            host: "127.0.0.1".to_string(),
            port,
        };

        let result = TcpProbe.probe(&endpoint, Duration::from_secs(2)).await;
        assert!(result.is_ok(), "probe failed: {result:?}");
    }

    #[tokio::test]
    async fn test_probe_fails_on_closed_port() {
        // Bind then drop to get a port nothing listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let endpoint = Endpoint {
            scheme: "http".to_string(),
            host: "127.0.0.1".to_string(),
            port,
        };

        let result = TcpProbe.probe(&endpoint, Duration::from_secs(2)).await;
        assert!(result.is_err());
    }
}
