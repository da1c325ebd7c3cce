use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::wire::{ClusterSummary, HostSummary, MultipathInfo, MultipathUpdate, ScsiLunSummary};
use crate::common::config::{AppConfig, Credentials, Endpoint};
use crate::error::{Error, Result};
use crate::inventory::{ClusterRef, Host, LunType, MultipathPolicy, Session, Volume};
use crate::traits::ManagementApi;

/// [`ManagementApi`] over the management server's JSON REST interface.
pub struct RestManagementClient {
    client: reqwest::Client,
}

impl RestManagementClient {
    /// `accept_invalid_certs` only affects this client; nothing global changes.
    pub fn new(accept_invalid_certs: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(AppConfig::REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(AppConfig::CONNECTION_TIMEOUT_SECS))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    fn url(base: &str, segments: &[&str]) -> std::result::Result<Url, String> {
        let mut url = Url::parse(base).map_err(|e| format!("invalid base URL {base}: {e}"))?;
        url.path_segments_mut()
            .map_err(|_| format!("base URL {base} cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send_json<B, T>(
        &self,
        session: &Session,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> std::result::Result<T, String>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = Self::url(&session.base_url, segments)?;
        let mut request = self
            .client
            .request(method, url.clone())
            .header(AppConfig::SESSION_HEADER, session.token());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| format!("request to {url} failed: {e}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status} from {url}"));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| format!("invalid response from {url}: {e}"))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> std::result::Result<T, String> {
        self.send_json::<(), T>(session, Method::GET, segments, query, None)
            .await
    }
}

impl ManagementApi for RestManagementClient {
    async fn connect(&self, endpoint: &Endpoint, credentials: &Credentials) -> Result<Session> {
        let auth_error = |message: String| Error::Authentication {
            endpoint: endpoint.to_string(),
            message,
        };

        let base = endpoint.base_url();
        let url = Self::url(&base, &["api", "session"]).map_err(auth_error)?;
        tracing::debug!(endpoint = %endpoint, "Opening session");

        let response = self
            .client
            .post(url)
            .basic_auth(&credentials.username, Some(credentials.password()))
            .send()
            .await
            .map_err(|e| auth_error(format!("request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(auth_error(format!("credentials rejected (HTTP {status})")));
        }
        if !status.is_success() {
            return Err(auth_error(format!("unexpected HTTP {status}")));
        }

        let token: String = response
            .json()
            .await
            .map_err(|e| auth_error(format!("invalid session response: {e}")))?;
        if token.is_empty() {
            return Err(auth_error("server returned an empty session token".to_string()));
        }

        Ok(Session::new(base, token))
    }

    async fn disconnect(&self, session: Session) -> Result<()> {
        let url = Self::url(&session.base_url, &["api", "session"]).map_err(Error::Teardown)?;
        let response = self
            .client
            .delete(url)
            .header(AppConfig::SESSION_HEADER, session.token())
            .send()
            .await
            .map_err(|e| Error::Teardown(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Teardown(format!("HTTP {status}")));
        }
        tracing::debug!(base_url = %session.base_url, "Session closed");
        Ok(())
    }

    async fn resolve_cluster(&self, session: &Session, name: &str) -> Result<ClusterRef> {
        let clusters: Vec<ClusterSummary> = self
            .get_json(session, &["api", "vcenter", "cluster"], &[("names", name)])
            .await
            .map_err(|reason| Error::ClusterResolution {
                name: name.to_string(),
                reason,
            })?;

        clusters
            .into_iter()
            .find(|c| c.name == name)
            .map(|c| ClusterRef {
                id: c.cluster,
                name: c.name,
            })
            .ok_or_else(|| Error::ClusterResolution {
                name: name.to_string(),
                reason: "no cluster with that exact name".to_string(),
            })
    }

    async fn list_hosts(&self, session: &Session, cluster: &ClusterRef) -> Result<Vec<Host>> {
        let hosts: Vec<HostSummary> = self
            .get_json(
                session,
                &["api", "vcenter", "host"],
                &[("clusters", cluster.id.as_str())],
            )
            .await
            .map_err(|message| Error::Inventory {
                operation: "list hosts",
                message,
            })?;

        Ok(hosts.into_iter().map(Host::from).collect())
    }

    async fn list_volumes(
        &self,
        session: &Session,
        hosts: &[Host],
        lun_type: LunType,
    ) -> Result<Vec<Volume>> {
        let mut volumes = Vec::new();
        for host in hosts {
            let luns: Vec<ScsiLunSummary> = self
                .get_json(
                    session,
                    &["api", "vcenter", "host", host.id.as_str(), "storage", "scsi-luns"],
                    &[("lun_type", lun_type.as_str())],
                )
                .await
                .map_err(|message| Error::Inventory {
                    operation: "list volumes",
                    message: format!("{}: {message}", host.name),
                })?;

            volumes.extend(
                luns.into_iter()
                    .filter(|lun| lun.lun_type.eq_ignore_ascii_case(lun_type.as_str()))
                    .map(|lun| lun.into_volume(&host.id, &host.name)),
            );
        }
        Ok(volumes)
    }

    async fn set_volume_threshold(
        &self,
        session: &Session,
        volumes: &[Volume],
        commands_per_path: u32,
    ) -> Result<Vec<Volume>> {
        let update = MultipathUpdate {
            policy: MultipathPolicy::RoundRobin,
            commands_per_path,
        };

        let mut updated = Vec::with_capacity(volumes.len());
        for volume in volumes {
            let lun: ScsiLunSummary = self
                .send_json(
                    session,
                    Method::PATCH,
                    &[
                        "api",
                        "vcenter",
                        "host",
                        volume.host_id.as_str(),
                        "storage",
                        "scsi-luns",
                        volume.canonical_name.as_str(),
                        "multipath",
                    ],
                    &[],
                    Some(&update),
                )
                .await
                .map_err(|message| Error::Remediation {
                    volume: format!("{} on {}", volume.canonical_name, volume.host_name),
                    message,
                })?;

            tracing::debug!(
                volume = %volume.canonical_name,
                host = %volume.host_name,
                commands_per_path,
                "Multipathing updated"
            );
            updated.push(lun.into_volume(&volume.host_id, &volume.host_name));
        }
        Ok(updated)
    }
}

/// Build the JSON a server returns for a LUN; shared with tests and the mock server.
pub fn lun_summary(volume: &Volume, lun_type: LunType) -> ScsiLunSummary {
    ScsiLunSummary {
        canonical_name: volume.canonical_name.clone(),
        lun_type: lun_type.as_str().to_string(),
        capacity_bytes: volume.capacity_bytes,
        multipath: MultipathInfo {
            policy: volume.policy.clone(),
            commands_per_path: volume.commands_per_path,
        },
    }
}
