// security/src/roles.rs
use anyhow::{Context, Result};
use axum::http::Method;
use models::medical::Role;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

/// Policy shipped with the crate; used unless a file overrides it.
const DEFAULT_POLICY_YAML: &str = include_str!("../roles_permissions.yaml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Patients,
    Checkups,
    Appointments,
    Rooms,
    Announcements,
    Users,
    Analysis,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Patients => "patients",
            Resource::Checkups => "checkups",
            Resource::Appointments => "appointments",
            Resource::Rooms => "rooms",
            Resource::Announcements => "announcements",
            Resource::Users => "users",
            Resource::Analysis => "analysis",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn from_method(method: &Method) -> Self {
        match *method {
            Method::POST => Action::Create,
            Method::PUT | Method::PATCH => Action::Update,
            Method::DELETE => Action::Delete,
            _ => Action::Read,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Declarative resource × action → roles table.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: HashMap<(Resource, Action), HashSet<Role>>,
}

impl AccessPolicy {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let raw: HashMap<Resource, HashMap<Action, Vec<Role>>> =
            serde_yaml::from_str(content).context("Failed to parse access policy")?;
        let rules = raw
            .into_iter()
            .flat_map(|(resource, actions)| {
                actions
                    .into_iter()
                    .map(move |(action, roles)| ((resource, action), roles.into_iter().collect()))
            })
            .collect();
        Ok(AccessPolicy { rules })
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read access policy file {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// The policy compiled into the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_yaml_str(DEFAULT_POLICY_YAML)
    }

    pub fn allows(&self, role: Role, resource: Resource, action: Action) -> bool {
        self.rules
            .get(&(resource, action))
            .map_or(false, |roles| roles.contains(&role))
    }
}
