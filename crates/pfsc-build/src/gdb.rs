//! Graph-database backends and their static attributes.

use std::fmt;
use std::str::FromStr;

use pfsc_core::Settings;

use crate::services::{self, ServiceDefinition};

/// Placeholder for the cluster-specific part of a Neptune endpoint.
const NEPTUNE_PLACEHOLDER: &str = "XXXXXXXXXXXXXXXXXXXXXXXXXXX";

/// Which graph database a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GdbCode {
    /// RedisGraph
    Re,
    /// Neo4j
    Nj,
    /// TinkerGraph
    Tk,
    /// JanusGraph
    Ja,
    /// Amazon Neptune (cloud-hosted)
    Np,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown graph database code '{0}'; expected one of: re, nj, tk, ja, np")]
pub struct UnknownGdbCode(pub String);

impl GdbCode {
    pub const ALL: [GdbCode; 5] = [Self::Re, Self::Nj, Self::Tk, Self::Ja, Self::Np];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Re => "re",
            Self::Nj => "nj",
            Self::Tk => "tk",
            Self::Ja => "ja",
            Self::Np => "np",
        }
    }

    pub fn protocol(self) -> &'static str {
        match self {
            Self::Re => "redis",
            Self::Nj => "bolt",
            Self::Tk | Self::Ja | Self::Np => "ws",
        }
    }

    /// Port the database listens on inside its own container.
    pub fn standard_port(self) -> u16 {
        match self {
            Self::Re => 6379,
            Self::Nj => 7687,
            Self::Tk | Self::Ja | Self::Np => 8182,
        }
    }

    pub fn service_name(self) -> &'static str {
        match self {
            Self::Re => "redisgraph",
            Self::Nj => "neo4j",
            Self::Tk => "tinkergraph",
            Self::Ja => "janusgraph",
            Self::Np => "neptune",
        }
    }

    pub fn uri_path(self) -> &'static str {
        match self {
            Self::Re | Self::Nj => "",
            Self::Tk | Self::Ja | Self::Np => "/gremlin",
        }
    }

    /// Deployed as a local container (everything but Neptune).
    pub fn via_container(self) -> bool {
        !matches!(self, Self::Np)
    }

    /// Port published on the host; `None` for Neptune.
    pub fn host_port(self, settings: &Settings) -> Option<u16> {
        match self {
            Self::Re => Some(settings.redisgraph.mca_port),
            Self::Nj => Some(settings.neo4j.bolt_port),
            Self::Tk => Some(settings.tinkergraph.port),
            Self::Ja => Some(settings.janusgraph.port),
            Self::Np => None,
        }
    }

    /// URI for reaching the database from the host.
    pub fn localhost_uri(self, settings: &Settings) -> String {
        match self.host_port(settings) {
            Some(port) => format!(
                "{}://localhost:{port}{}",
                self.protocol(),
                self.uri_path()
            ),
            None => neptune_uri(settings),
        }
    }

    /// URI for reaching the database from another container on the compose network.
    pub fn docker_uri(self, settings: &Settings) -> String {
        if self == Self::Np {
            return neptune_uri(settings);
        }
        format!(
            "{}://{}:{}{}",
            self.protocol(),
            self.service_name(),
            self.standard_port(),
            self.uri_path()
        )
    }

    /// True when the URI cannot be generated and must be configured by hand.
    pub fn requires_manual_uri(self, settings: &Settings) -> bool {
        self == Self::Np && settings.neptune_uri_prefix().is_none()
    }

    /// Compose service for container-deployed backends, with tags from settings.
    pub fn service_definition(self, settings: &Settings) -> Option<ServiceDefinition> {
        match self {
            Self::Re => Some(services::redisgraph(
                settings,
                &settings.redisgraph.image_tag,
            )),
            Self::Nj => Some(services::default_neo4j(settings)),
            Self::Tk => Some(services::tinkergraph(
                settings,
                &settings.tinkergraph.image_tag,
            )),
            Self::Ja => Some(services::janusgraph(
                settings,
                &settings.janusgraph.image_tag,
            )),
            Self::Np => None,
        }
    }
}

/// Neptune endpoint; a placeholder host is used when no prefix is configured.
pub fn neptune_uri(settings: &Settings) -> String {
    let prefix = match settings.neptune_uri_prefix() {
        Some(prefix) => prefix,
        None => NEPTUNE_PLACEHOLDER,
    };
    format!("wss://{prefix}.neptune.amazonaws.com:8182/gremlin")
}

impl fmt::Display for GdbCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for GdbCode {
    type Err = UnknownGdbCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.tag() == s)
            .ok_or_else(|| UnknownGdbCode(s.to_owned()))
    }
}

/// Parse a comma-separated list of codes such as `re,nj`.
pub fn parse_gdb_list(list: &str) -> Result<Vec<GdbCode>, UnknownGdbCode> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
