use std::net::{
    TcpStream,
    ToSocketAddrs,
};
use std::time::Duration;

use crate::config::Config;
use crate::constants::{
    METADATA_AVAILABILITY_ZONE,
    METADATA_INSTANCE_ID,
    METADATA_TOKEN,
    METADATA_TOKEN_HEADER,
    METADATA_TOKEN_TTL_HEADER,
    METADATA_TOKEN_TTL_SECS,
};
use crate::errors::SnapError;

/// Synchronous EC2 instance metadata client
pub struct MetadataClient {
    endpoint: String,
    timeout: Duration,
    agent: ureq::Agent,
}

impl MetadataClient {
    pub fn new(config: &Config) -> Self {
        let timeout = Duration::from_secs(config.metadata.timeout_secs);
        // An endpoint may accept and never answer, e.g. IMDSv2 PUT
        // responses dropped by the hop limit inside containers
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();

        Self {
            endpoint: config.metadata.endpoint.trim_end_matches('/').to_string(),
            timeout,
            agent,
        }
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{key}", self.endpoint)
    }

    /// Returns whether the metadata endpoint accepts TCP connections
    pub fn available(&self) -> bool {
        let host = self
            .endpoint
            .split_once("://")
            .map_or(self.endpoint.as_str(), |(_proto, rest)| rest);
        let host = host.split('/').next().unwrap_or(host);
        let host = match host.contains(':') {
            true => host.to_string(),
            false => format!("{host}:80"),
        };

        let addrs = match host.to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(_) => return false,
        };

        for addr in addrs {
            if TcpStream::connect_timeout(&addr, self.timeout).is_ok() {
                return true;
            }
        }

        false
    }

    // IMDSv2 session token. None if the endpoint only speaks IMDSv1.
    fn token(&self) -> Option<String> {
        self.agent
            .put(&self.url(METADATA_TOKEN))
            .set(METADATA_TOKEN_TTL_HEADER, METADATA_TOKEN_TTL_SECS)
            .call()
            .ok()
            .and_then(|resp| resp.into_string().ok())
    }

    /// Returns the value of metadata `key`, e.g. `meta-data/instance-id`
    pub fn get(&self, key: &str) -> Result<String, SnapError> {
        let url = self.url(key);
        let mut req = self.agent.get(&url);
        if let Some(token) = self.token() {
            req = req.set(METADATA_TOKEN_HEADER, &token);
        }

        let resp = req
            .call()
            .map_err(|err| SnapError::Metadata(format!("failed to GET {url}: {err}")))?;

        let status = resp.status();
        if !(200..=299).contains(&status) {
            return Err(SnapError::Metadata(format!("GET {url}: http status {status}")));
        }

        resp.into_string()
            .map(|body| body.trim().to_string())
            .map_err(|err| SnapError::Metadata(format!("body is not string: {err}")))
    }

    pub fn instance_id(&self) -> Result<String, SnapError> {
        let id = self.get(METADATA_INSTANCE_ID)?;
        if id.is_empty() {
            return Err(SnapError::Metadata("empty instance id".into()));
        }

        Ok(id)
    }

    pub fn availability_zone(&self) -> Result<String, SnapError> {
        self.get(METADATA_AVAILABILITY_ZONE)
    }

    pub fn region(&self) -> Result<String, SnapError> {
        region_from_az(&self.availability_zone()?)
    }
}

/// Region is the availability zone minus its zone letter,
/// e.g. us-east-1a => us-east-1
fn region_from_az(az: &str) -> Result<String, SnapError> {
    let mut chars = az.chars();
    match chars.next_back() {
        Some(zone) if zone.is_ascii_alphabetic() && !chars.as_str().is_empty() => {
            Ok(chars.as_str().to_string())
        }
        _ => Err(SnapError::Metadata(format!("bad availability zone {az:?}"))),
    }
}
